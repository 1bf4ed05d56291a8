//! Bearer-token authentication.
//!
//! The hosted auth provider issues tokens and owns the user directory; this
//! module is the seam where its `getUser(token)` call lands. Tokens map to
//! user IDs through the sessions table, and every handler receives the
//! resolved user through the [`AuthedUser`] extractor.

use anyhow::Result;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;

use crate::db::DbConnection;
use crate::error::ApiError;
use crate::rest::AppState;

impl DbConnection {
    /// Issue a session token for a user
    pub async fn create_session(&self, user_id: &str) -> Result<String> {
        let token = uuid::Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind(&token)
            .bind(user_id)
            .bind(Utc::now().to_rfc3339())
            .execute(self.pool())
            .await?;

        Ok(token)
    }

    /// Resolve a bearer token to its user, None for unknown/expired tokens
    pub async fn session_user(&self, token: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT user_id FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.map(|(user_id,)| user_id))
    }

    /// Drop a session (sign-out)
    pub async fn delete_session(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// The authenticated user for a request. Extraction fails with 401 when the
/// Authorization header is missing, malformed, or unknown.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub user_id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        match state.db.session_user(token).await {
            Ok(Some(user_id)) => Ok(AuthedUser { user_id }),
            Ok(None) => Err(ApiError::Unauthorized),
            Err(e) => Err(ApiError::Internal(e)),
        }
    }
}
