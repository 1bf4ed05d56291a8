//! # REST API for Sales, Expenses, and Feed Purchases

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthedUser;
use crate::error::ApiError;
use crate::rest::AppState;
use shared::{
    ApiResponse, CreateExpenseRequest, CreateFeedPurchaseRequest, CreateSaleRequest, Expense,
    FeedPurchase, Sale,
};

pub async fn list_sales(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/sales for {}", user.user_id);

    let sales = state.db.list_sales(&user.user_id).await?;
    Ok(Json(ApiResponse::ok(sales)))
}

pub async fn create_sale(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<CreateSaleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/sales - request: {:?}", request);

    if request.dozen_count < 0 || request.individual_count < 0 {
        return Err(ApiError::Validation(
            "Egg counts cannot be negative".to_string(),
        ));
    }
    if request.total_amount < 0.0 {
        return Err(ApiError::Validation(
            "Sale amount cannot be negative".to_string(),
        ));
    }

    let sale = Sale {
        id: Uuid::new_v4().to_string(),
        user_id: user.user_id,
        customer_id: request.customer_id,
        date: request.date,
        dozen_count: request.dozen_count,
        individual_count: request.individual_count,
        total_amount: request.total_amount,
        notes: request.notes,
        created_at: Utc::now().to_rfc3339(),
    };
    state.db.store_sale(&sale).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(sale))))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/expenses for {}", user.user_id);

    let expenses = state.db.list_expenses(&user.user_id).await?;
    Ok(Json(ApiResponse::ok(expenses)))
}

pub async fn create_expense(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<CreateExpenseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/expenses - request: {:?}", request);

    if request.amount < 0.0 {
        return Err(ApiError::Validation(
            "Expense amount cannot be negative".to_string(),
        ));
    }

    let expense = Expense {
        id: Uuid::new_v4().to_string(),
        user_id: user.user_id,
        date: request.date,
        category: request.category,
        amount: request.amount,
        description: request.description,
        created_at: Utc::now().to_rfc3339(),
    };
    state.db.store_expense(&expense).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(expense))))
}

pub async fn list_feed_purchases(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/feed-purchases for {}", user.user_id);

    let purchases = state.db.list_feed_purchases(&user.user_id).await?;
    Ok(Json(ApiResponse::ok(purchases)))
}

pub async fn create_feed_purchase(
    State(state): State<AppState>,
    user: AuthedUser,
    Json(request): Json<CreateFeedPurchaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/feed-purchases - request: {:?}", request);

    if request.amount < 0.0 || request.total_cost < 0.0 {
        return Err(ApiError::Validation(
            "Feed amount and cost cannot be negative".to_string(),
        ));
    }

    let purchase = FeedPurchase {
        id: Uuid::new_v4().to_string(),
        user_id: user.user_id,
        date: request.date,
        feed_type: request.feed_type,
        amount: request.amount,
        total_cost: request.total_cost,
        created_at: Utc::now().to_rfc3339(),
    };
    state.db.store_feed_purchase(&purchase).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(purchase))))
}
