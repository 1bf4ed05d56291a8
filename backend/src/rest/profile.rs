//! # REST API for the User Profile

use axum::{extract::State, response::IntoResponse, Json};
use tracing::info;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::rest::AppState;
use shared::ApiResponse;

pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/profile for {}", user.user_id);

    let profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or(ApiError::NotFound("Profile"))?;
    Ok(Json(ApiResponse::ok(profile)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use shared::UserProfile;

    #[tokio::test]
    async fn test_get_profile() {
        let state = AppState::new(DbConnection::init_test().await.unwrap());
        let user = AuthedUser {
            user_id: "user-1".to_string(),
        };

        // No profile yet.
        let missing = get_profile(State(state.clone()), user.clone()).await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));

        state
            .db
            .store_profile(&UserProfile {
                id: "user-1".to_string(),
                email: "farmer@example.com".to_string(),
                farm_name: None,
                subscription_status: "free".to_string(),
                onboarding_complete: false,
                created_at: "2024-01-01T00:00:00Z".to_string(),
            })
            .await
            .unwrap();

        assert!(get_profile(State(state), user).await.is_ok());
    }
}
