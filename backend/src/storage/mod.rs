//! SQL storage for every resource collection, as inherent methods on
//! [`crate::db::DbConnection`]. Every query is scoped to a user_id.

pub mod batches;
pub mod customers;
pub mod deaths;
pub mod eggs;
pub mod events;
pub mod finance;
pub mod profile;
