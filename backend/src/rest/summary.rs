//! # REST API for the Flock Summary
//!
//! Read-only: the summary is derived on every request from the user's raw
//! rows, never stored.

use axum::{extract::State, response::IntoResponse, Json};
use tracing::info;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::rest::AppState;
use shared::ApiResponse;

pub async fn get_flock_summary(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/flock-summary for {}", user.user_id);

    let summary = state.flock_service.get_summary(&user.user_id).await?;
    Ok(Json(ApiResponse::ok(summary)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;

    #[tokio::test]
    async fn test_summary_for_empty_account() {
        let state = AppState::new(DbConnection::init_test().await.unwrap());
        let user = AuthedUser {
            user_id: "user-1".to_string(),
        };

        let result = get_flock_summary(State(state.clone()), user).await;
        assert!(result.is_ok());

        let summary = state.flock_service.get_summary("user-1").await.unwrap();
        assert_eq!(summary.total_birds, 0);
        assert_eq!(summary.mortality_rate, 0.0);
    }
}
