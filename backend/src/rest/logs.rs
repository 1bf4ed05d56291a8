//! # Log sink for the browser client
//!
//! The frontend ships structured log records here so client-side problems
//! land in the server's tracing output. Unauthenticated: logging must work
//! while a session is still being established.

use axum::{response::IntoResponse, Json};
use tracing::{debug, error, info, warn};

use shared::{ApiResponse, ClientLogRequest};

pub async fn ingest_client_log(Json(request): Json<ClientLogRequest>) -> impl IntoResponse {
    let component = request.component.as_deref().unwrap_or("frontend");

    match request.level.as_str() {
        "debug" => debug!("[{}] {}", component, request.message),
        "warn" => warn!("[{}] {}", component, request.message),
        "error" => error!("[{}] {}", component, request.message),
        _ => info!("[{}] {}", component, request.message),
    }

    Json(ApiResponse::ok(()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ingest_accepts_any_level() {
        for level in ["debug", "info", "warn", "error", "unknown"] {
            let _ = ingest_client_log(Json(ClientLogRequest {
                level: level.to_string(),
                message: "hello".to_string(),
                component: Some("provider".to_string()),
            }))
            .await;
        }
    }
}
