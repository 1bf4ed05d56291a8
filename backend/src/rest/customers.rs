//! # REST API for Customer Management

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
use shared::{ApiResponse, CreateCustomerRequest, Customer, UpdateCustomerRequest};

pub async fn list_customers(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/customers for {}", user.user_id);

    let customers = state.db.list_customers(&user.user_id).await?;
    Ok(Json(ApiResponse::ok(customers)))
}

pub async fn create_customer(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/customers - request: {:?}", request);

    if request.name.trim().is_empty() {
        return Err(ApiError::Validation("Customer name is required".to_string()));
    }

    let customer = Customer {
        id: Uuid::new_v4().to_string(),
        user_id: user.user_id,
        name: request.name.trim().to_string(),
        phone: request.phone,
        notes: request.notes,
        is_active: true,
        created_at: Utc::now().to_rfc3339(),
    };
    state.db.store_customer(&customer).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(customer))))
}

pub async fn update_customer(
    State(state): State<AppState>,
    user: AuthedUser,
    Path(customer_id): Path<String>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("PUT /api/customers/{} - request: {:?}", customer_id, request);

    let mut customer = state
        .db
        .get_customer(&user.user_id, &customer_id)
        .await?
        .ok_or(ApiError::NotFound("Customer"))?;

    if let Some(name) = request.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("Customer name is required".to_string()));
        }
        customer.name = name.trim().to_string();
    }
    if request.phone.is_some() {
        customer.phone = request.phone;
    }
    if request.notes.is_some() {
        customer.notes = request.notes;
    }
    if let Some(is_active) = request.is_active {
        customer.is_active = is_active;
    }

    state.db.update_customer(&customer).await?;
    Ok(Json(ApiResponse::ok(customer)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;

    #[tokio::test]
    async fn test_create_and_deactivate_customer() {
        let state = AppState::new(DbConnection::init_test().await.unwrap());
        let user = AuthedUser {
            user_id: "user-1".to_string(),
        };

        let created = create_customer(
            State(state.clone()),
            user.clone(),
            Json(CreateCustomerRequest {
                name: "  Robin  ".to_string(),
                phone: None,
                notes: None,
            }),
        )
        .await;
        assert!(created.is_ok());

        let customers = state.db.list_customers("user-1").await.unwrap();
        assert_eq!(customers[0].name, "Robin");

        let updated = update_customer(
            State(state.clone()),
            user,
            Path(customers[0].id.clone()),
            Json(UpdateCustomerRequest {
                name: None,
                phone: None,
                notes: None,
                is_active: Some(false),
            }),
        )
        .await;
        assert!(updated.is_ok());
        assert!(!state.db.list_customers("user-1").await.unwrap()[0].is_active);
    }

    #[tokio::test]
    async fn test_create_customer_requires_name() {
        let state = AppState::new(DbConnection::init_test().await.unwrap());
        let user = AuthedUser {
            user_id: "user-1".to_string(),
        };

        let result = create_customer(
            State(state),
            user,
            Json(CreateCustomerRequest {
                name: "".to_string(),
                phone: None,
                notes: None,
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
