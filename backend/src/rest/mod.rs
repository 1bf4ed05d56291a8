//! HTTP surface: one module per resource, all JSON, all bearer-authenticated
//! except the log sink.

pub mod auth;
pub mod batches;
pub mod customers;
pub mod death_records;
pub mod egg_entries;
pub mod events;
pub mod finance;
pub mod logs;
pub mod profile;
pub mod summary;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::DbConnection;
use crate::domain::FlockService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: DbConnection,
    pub flock_service: FlockService,
}

impl AppState {
    pub fn new(db: DbConnection) -> Self {
        let flock_service = FlockService::new(db.clone());
        Self { db, flock_service }
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// All routes under /api
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/sign-out", post(auth::sign_out))
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route("/customers/:id", put(customers::update_customer))
        .route(
            "/flock-batches",
            get(batches::list_batches).post(batches::create_batch),
        )
        .route("/flock-batches/:id", put(batches::update_batch))
        .route(
            "/death-records",
            get(death_records::list_death_records).post(death_records::create_death_record),
        )
        .route(
            "/egg-entries",
            get(egg_entries::list_egg_entries).post(egg_entries::create_egg_entry),
        )
        .route(
            "/flock-events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/flock-events/:id",
            put(events::update_event).delete(events::delete_event),
        )
        .route("/flock-summary", get(summary::get_flock_summary))
        .route("/profile", get(profile::get_profile))
        .route("/sales", get(finance::list_sales).post(finance::create_sale))
        .route(
            "/expenses",
            get(finance::list_expenses).post(finance::create_expense),
        )
        .route(
            "/feed-purchases",
            get(finance::list_feed_purchases).post(finance::create_feed_purchase),
        )
        .route("/logs", post(logs::ingest_client_log))
}
