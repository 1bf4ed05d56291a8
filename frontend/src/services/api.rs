//! HTTP client for the backend API.
//!
//! Every response travels in the [`ApiResponse`] envelope; this client
//! unwraps it and folds transport, auth, and validation failures into one
//! [`ApiError`] so callers can pick a user-facing message without inspecting
//! status codes themselves.

use gloo::net::http::{Request, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use shared::{
    ApiResponse, CreateBatchRequest, CreateDeathRecordRequest, CreateEggEntryRequest, Customer,
    DeathRecord, EggEntry, Expense, FeedPurchase, FlockBatch, FlockEvent, Sale, SessionResponse,
    SignInRequest, UserProfile,
};

/// Default backend origin, shared with the log shipper.
pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// What went wrong talking to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 401: the session token is missing or no longer valid.
    Unauthorized,
    /// 404: the resource does not exist.
    NotFound(String),
    /// Other 4xx with a structured error body: the request itself was bad.
    Validation(String),
    /// 5xx: the backend failed.
    Server(String),
    /// The request never completed (offline, DNS, CORS).
    Network(String),
    /// The body was not the envelope we expected.
    Decode(String),
}

impl ApiError {
    /// Message suitable for showing directly in the UI.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Session expired, refresh to continue".to_string(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Server(_) => "Something went wrong, try again shortly".to_string(),
            ApiError::Network(_) => "Can't reach the server. Check your connection.".to_string(),
            ApiError::Decode(_) => "Something went wrong, try again shortly".to_string(),
        }
    }
}

/// Map a non-2xx status (plus the envelope's error message, if the body had
/// one) onto the failure taxonomy. Returns `None` for success statuses.
fn classify_status(status: u16, envelope_error: Option<String>) -> Option<ApiError> {
    let message =
        || envelope_error.clone().unwrap_or_else(|| format!("request failed with status {}", status));
    match status {
        200..=299 => None,
        401 => Some(ApiError::Unauthorized),
        404 => Some(ApiError::NotFound(message())),
        400..=499 => Some(ApiError::Validation(message())),
        _ => Some(ApiError::Server(format!("status {}", status))),
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "unauthorized"),
            ApiError::NotFound(msg) => write!(f, "not found: {}", msg),
            ApiError::Validation(msg) => write!(f, "validation: {}", msg),
            ApiError::Server(msg) => write!(f, "server error: {}", msg),
            ApiError::Network(msg) => write!(f, "network error: {}", msg),
            ApiError::Decode(msg) => write!(f, "decode error: {}", msg),
        }
    }
}

/// API client holding the base URL and the bearer token for the signed-in
/// user. Cheap to clone; components receive it through the provider context.
#[derive(Clone, PartialEq)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
        }
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
        }
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}/api{}", self.base_url, path);
        let response = self
            .authorize(Request::get(&url))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::unwrap_envelope(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}/api{}", self.base_url, path);
        let response = self
            .authorize(Request::post(&url))
            .json(body)
            .map_err(|e| ApiError::Decode(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::unwrap_envelope(response).await
    }

    async fn unwrap_envelope<T: DeserializeOwned>(
        response: gloo::net::http::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if !(200..300).contains(&status) {
            let envelope_error = if status == 401 {
                None
            } else {
                response
                    .json::<ApiResponse<()>>()
                    .await
                    .ok()
                    .and_then(|envelope| envelope.error)
            };
            return Err(classify_status(status, envelope_error)
                .unwrap_or_else(|| ApiError::Server(format!("status {}", status))));
        }

        let envelope = response
            .json::<ApiResponse<T>>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        match (envelope.success, envelope.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(ApiError::Decode("missing data in response".to_string())),
            (false, _) => Err(ApiError::Server(
                envelope.error.unwrap_or_else(|| "unknown".to_string()),
            )),
        }
    }

    /// Exchange credentials for a bearer token.
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<SessionResponse, ApiError> {
        self.post_json("/auth/sign-in", request).await
    }

    /// Invalidate the current session server-side.
    pub async fn sign_out(&self) -> Result<bool, ApiError> {
        self.post_json("/auth/sign-out", &serde_json::json!({})).await
    }

    pub async fn list_flock_batches(&self) -> Result<Vec<FlockBatch>, ApiError> {
        self.get_json("/flock-batches").await
    }

    pub async fn list_death_records(&self) -> Result<Vec<DeathRecord>, ApiError> {
        self.get_json("/death-records").await
    }

    pub async fn list_egg_entries(&self) -> Result<Vec<EggEntry>, ApiError> {
        self.get_json("/egg-entries").await
    }

    pub async fn list_flock_events(&self) -> Result<Vec<FlockEvent>, ApiError> {
        self.get_json("/flock-events").await
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, ApiError> {
        self.get_json("/customers").await
    }

    pub async fn list_sales(&self) -> Result<Vec<Sale>, ApiError> {
        self.get_json("/sales").await
    }

    pub async fn list_expenses(&self) -> Result<Vec<Expense>, ApiError> {
        self.get_json("/expenses").await
    }

    pub async fn list_feed_purchases(&self) -> Result<Vec<FeedPurchase>, ApiError> {
        self.get_json("/feed-purchases").await
    }

    /// The profile is optional: a brand-new account has none yet. Only a
    /// 404 means "no profile"; validation failures still surface.
    pub async fn get_profile(&self) -> Result<Option<UserProfile>, ApiError> {
        match self.get_json("/profile").await {
            Ok(profile) => Ok(Some(profile)),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(other) => Err(other),
        }
    }

    pub async fn create_flock_batch(
        &self,
        request: &CreateBatchRequest,
    ) -> Result<FlockBatch, ApiError> {
        self.post_json("/flock-batches", request).await
    }

    pub async fn create_death_record(
        &self,
        request: &CreateDeathRecordRequest,
    ) -> Result<DeathRecord, ApiError> {
        self.post_json("/death-records", request).await
    }

    pub async fn create_egg_entry(
        &self,
        request: &CreateEggEntryRequest,
    ) -> Result<EggEntry, ApiError> {
        self.post_json("/egg-entries", request).await
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
