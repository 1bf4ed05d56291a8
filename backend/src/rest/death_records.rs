//! # REST API for Death Records
//!
//! Records are create-and-list only: once logged they are immutable, and
//! creating one decrements the referenced batch's current count.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::rest::AppState;
use shared::{ApiResponse, CreateDeathRecordRequest};

pub async fn list_death_records(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/death-records for {}", user.user_id);

    let records = state.db.list_death_records(&user.user_id).await?;
    Ok(Json(ApiResponse::ok(records)))
}

pub async fn create_death_record(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<CreateDeathRecordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/death-records - request: {:?}", request);

    let record = state
        .flock_service
        .record_death(&user.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(record))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use chrono::NaiveDate;
    use shared::{AgeCategory, BatchType, CreateBatchRequest, DeathCause};

    #[tokio::test]
    async fn test_create_death_record_updates_batch() {
        let db = DbConnection::init_test().await.unwrap();
        let state = AppState::new(db);
        let user = AuthedUser {
            user_id: "user-1".to_string(),
        };

        let batch = state
            .flock_service
            .create_batch(
                "user-1",
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
                },
            )
            .await
            .unwrap();

        let result = create_death_record(
            State(state.clone()),
            user,
            Json(CreateDeathRecordRequest {
                batch_id: batch.id.clone(),
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                count: 2,
                cause: DeathCause::Predator,
                description: "fox".to_string(),
                notes: None,
            }),
        )
        .await;
        assert!(result.is_ok());

        let reloaded = state.db.get_batch("user-1", &batch.id).await.unwrap().unwrap();
        assert_eq!(reloaded.current_count, 4);
    }
}
