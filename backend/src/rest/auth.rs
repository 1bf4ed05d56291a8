//! Session issuance and teardown.
//!
//! Stands in for the hosted auth provider's sign-in exchange: credentials
//! arrive, a bearer token comes back, and the first sign-in provisions the
//! user's profile the way the provider's user-created hook would.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use chrono::Utc;
use tracing::info;

use crate::error::ApiError;
use crate::rest::AppState;
use shared::{ApiResponse, SessionResponse, SignInRequest, UserProfile};

pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let user_id = request.user_id.trim().to_string();
    if user_id.is_empty() {
        return Err(ApiError::Validation("User ID is required".to_string()));
    }

    if state.db.get_profile(&user_id).await?.is_none() {
        state
            .db
            .store_profile(&UserProfile {
                id: user_id.clone(),
                email: request.email.unwrap_or_default(),
                farm_name: None,
                subscription_status: "free".to_string(),
                onboarding_complete: false,
                created_at: Utc::now().to_rfc3339(),
            })
            .await?;
    }

    let token = state.db.create_session(&user_id).await?;
    info!("Issued session for {}", user_id);

    Ok(Json(ApiResponse::ok(SessionResponse { token, user_id })))
}

pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    if !state.db.delete_session(token).await? {
        return Err(ApiError::Unauthorized);
    }

    info!("Session revoked");
    Ok(Json(ApiResponse::ok(true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::Request;
    use chrono::NaiveDate;

    use crate::auth::AuthedUser;
    use crate::db::DbConnection;
    use crate::rest::egg_entries;
    use shared::CreateEggEntryRequest;

    async fn issue_token(state: &AppState, user_id: &str) -> String {
        let response = sign_in(
            State(state.clone()),
            Json(SignInRequest {
                user_id: user_id.to_string(),
                email: Some("farmer@example.com".to_string()),
            }),
        )
        .await
        .unwrap();
        response.0.data.unwrap().token
    }

    #[tokio::test]
    async fn test_sign_in_rejects_blank_user() {
        let state = AppState::new(DbConnection::init_test().await.unwrap());
        let result = sign_in(
            State(state),
            Json(SignInRequest {
                user_id: "   ".to_string(),
                email: None,
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_first_sign_in_provisions_profile_once() {
        let state = AppState::new(DbConnection::init_test().await.unwrap());

        issue_token(&state, "user-1").await;
        let profile = state.db.get_profile("user-1").await.unwrap().unwrap();
        assert_eq!(profile.email, "farmer@example.com");
        assert_eq!(profile.subscription_status, "free");

        // A second sign-in must not overwrite the existing profile.
        sign_in(
            State(state.clone()),
            Json(SignInRequest {
                user_id: "user-1".to_string(),
                email: Some("other@example.com".to_string()),
            }),
        )
        .await
        .unwrap();
        let reloaded = state.db.get_profile("user-1").await.unwrap().unwrap();
        assert_eq!(reloaded.email, "farmer@example.com");
    }

    #[tokio::test]
    async fn test_issued_token_authenticates_a_request() {
        let state = AppState::new(DbConnection::init_test().await.unwrap());
        let token = issue_token(&state, "user-1").await;

        // Drive the token through the extractor exactly as a request would.
        let request = Request::builder()
            .header("authorization", format!("Bearer {}", token))
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let user = AuthedUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(user.user_id, "user-1");

        egg_entries::create_egg_entry(
            State(state.clone()),
            user,
            Json(CreateEggEntryRequest {
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                count: 9,
                notes: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(state.db.list_egg_entries("user-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sign_out_invalidates_the_token() {
        let state = AppState::new(DbConnection::init_test().await.unwrap());
        let token = issue_token(&state, "user-1").await;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );
        sign_out(State(state.clone()), headers).await.unwrap();

        assert_eq!(state.db.session_user(&token).await.unwrap(), None);

        // A second sign-out with the same token is a 401.
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );
        let result = sign_out(State(state), headers).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }
}
