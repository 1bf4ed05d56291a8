//! # REST API for Flock Batches
//!
//! Batches are created and updated here; `current_count` is never mutated
//! through this surface (death-record creation owns that).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::rest::AppState;
use shared::{ApiResponse, CreateBatchRequest, UpdateBatchRequest};

pub async fn list_batches(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/flock-batches for {}", user.user_id);

    let batches = state.db.list_batches(&user.user_id).await?;
    Ok(Json(ApiResponse::ok(batches)))
}

pub async fn create_batch(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<CreateBatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/flock-batches - request: {:?}", request);

    let batch = state
        .flock_service
        .create_batch(&user.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(batch))))
}

pub async fn update_batch(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(batch_id): Path<String>,
    Json(request): Json<UpdateBatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("PUT /api/flock-batches/{} - request: {:?}", batch_id, request);

    let batch = state
        .flock_service
        .update_batch(&user.user_id, &batch_id, request)
        .await?;
    Ok(Json(ApiResponse::ok(batch)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use chrono::NaiveDate;
    use shared::{AgeCategory, BatchType};

    async fn setup() -> (AppState, AuthedUser) {
        let db = DbConnection::init_test().await.unwrap();
        let state = AppState::new(db);
        let user = AuthedUser {
            user_id: "user-1".to_string(),
        };
        (state, user)
    }

    fn request() -> CreateBatchRequest {
        CreateBatchRequest {
            batch_name: "Layers".to_string(),
            breed: "Leghorn".to_string(),
            batch_type: BatchType::Hens,
            hens_count: 6,
            roosters_count: 0,
            chicks_count: 0,
            brooding_count: 0,
            acquisition_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            age_at_acquisition: AgeCategory::Adult,
            actual_laying_start_date: None,
            expected_laying_start_date: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let (state, user) = setup().await;

        let created = create_batch(State(state.clone()), user.clone(), Json(request())).await;
        assert!(created.is_ok());

        let batches = state.db.list_batches("user-1").await.unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].current_count, 6);
    }

    #[tokio::test]
    async fn test_update_unknown_batch_is_not_found() {
        let (state, user) = setup().await;

        let result = update_batch(
            State(state),
            user,
            Path("batch::nope".to_string()),
            Json(UpdateBatchRequest {
                batch_name: None,
                breed: None,
                hens_count: None,
                roosters_count: None,
                chicks_count: None,
                brooding_count: None,
                actual_laying_start_date: None,
                expected_laying_start_date: None,
                is_active: Some(false),
                notes: None,
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
