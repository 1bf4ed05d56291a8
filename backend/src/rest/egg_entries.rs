//! # REST API for Egg Entries

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use tracing::info;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::rest::{now_millis, AppState};
use shared::{ApiResponse, CreateEggEntryRequest, EggEntry};

pub async fn list_egg_entries(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/egg-entries for {}", user.user_id);

    let entries = state.db.list_egg_entries(&user.user_id).await?;
    Ok(Json(ApiResponse::ok(entries)))
}

pub async fn create_egg_entry(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<CreateEggEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/egg-entries - request: {:?}", request);

    if request.count < 0 {
        return Err(ApiError::Validation(
            "Egg count cannot be negative".to_string(),
        ));
    }

    let entry = EggEntry {
        id: EggEntry::generate_id(now_millis()),
        user_id: user.user_id,
        date: request.date,
        count: request.count,
        notes: request.notes,
        created_at: Utc::now().to_rfc3339(),
    };
    state.db.store_egg_entry(&entry).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(entry))))
}
