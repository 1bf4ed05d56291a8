//! # REST API for Flock Timeline Events

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::rest::AppState;
use shared::{ApiResponse, CreateEventRequest, FlockEvent, UpdateEventRequest};

pub async fn list_events(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/flock-events for {}", user.user_id);

    let events = state.db.list_events(&user.user_id).await?;
    Ok(Json(ApiResponse::ok(events)))
}

pub async fn create_event(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/flock-events - request: {:?}", request);

    if request.description.trim().is_empty() {
        return Err(ApiError::Validation(
            "Event description is required".to_string(),
        ));
    }

    let event = FlockEvent {
        id: Uuid::new_v4().to_string(),
        user_id: user.user_id,
        batch_id: request.batch_id,
        date: request.date,
        event_type: request.event_type,
        description: request.description.trim().to_string(),
        affected_birds: request.affected_birds,
        notes: request.notes,
        created_at: Utc::now().to_rfc3339(),
    };
    state.db.store_event(&event).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(event))))
}

pub async fn update_event(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(event_id): Path<String>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("PUT /api/flock-events/{} - request: {:?}", event_id, request);

    let mut event = state
        .db
        .get_event(&user.user_id, &event_id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;

    if let Some(date) = request.date {
        event.date = date;
    }
    if let Some(event_type) = request.event_type {
        event.event_type = event_type;
    }
    if let Some(description) = request.description {
        if description.trim().is_empty() {
            return Err(ApiError::Validation(
                "Event description is required".to_string(),
            ));
        }
        event.description = description.trim().to_string();
    }
    if request.affected_birds.is_some() {
        event.affected_birds = request.affected_birds;
    }
    if request.notes.is_some() {
        event.notes = request.notes;
    }

    state.db.update_event(&event).await?;
    Ok(Json(ApiResponse::ok(event)))
}

pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("DELETE /api/flock-events/{}", event_id);

    let deleted = state.db.delete_event(&user.user_id, &event_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Event"));
    }

    Ok((StatusCode::NO_CONTENT, ()))
}
