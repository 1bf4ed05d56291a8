use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod cache;
pub mod metrics;

pub use metrics::{
    compute_flock_summary, BatchSummary, FlockSummary, LayingStatus, MetricsConfig,
    ProductionStatus,
};

/// Standard response envelope returned by every API handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// What kind of birds a batch holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchType {
    Hens,
    Roosters,
    Chicks,
    Mixed,
}

/// Maturity of the birds on the day they were acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeCategory {
    Adult,
    Juvenile,
    Chick,
}

/// Recorded cause of a loss event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Predator,
    Disease,
    Age,
    Injury,
    Unknown,
    Culled,
    Other,
}

/// Timeline event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Acquisition,
    LayingStart,
    Broody,
    Hatching,
    Other,
}

/// A group of birds acquired together and tracked as one unit.
///
/// Batch ID format: "batch::epoch_millis". `current_count` is only ever
/// decremented by death-record creation; batches are soft-deactivated via
/// `is_active`, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlockBatch {
    pub id: String,
    pub user_id: String,
    pub batch_name: String,
    pub breed: String,
    pub batch_type: BatchType,
    pub hens_count: i64,
    pub roosters_count: i64,
    pub chicks_count: i64,
    pub brooding_count: i64,
    pub initial_count: i64,
    pub current_count: i64,
    /// ISO 8601 date (YYYY-MM-DD)
    pub acquisition_date: NaiveDate,
    pub age_at_acquisition: AgeCategory,
    pub actual_laying_start_date: Option<NaiveDate>,
    pub expected_laying_start_date: Option<NaiveDate>,
    pub is_active: bool,
    pub notes: Option<String>,
    /// RFC 3339 timestamp
    pub created_at: String,
    pub updated_at: String,
}

/// One loss event against a batch. Immutable once created; the referenced
/// batch's `current_count` is decremented as a side effect of logging it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathRecord {
    pub id: String,
    pub user_id: String,
    pub batch_id: String,
    pub date: NaiveDate,
    pub count: i64,
    pub cause: DeathCause,
    pub description: String,
    pub notes: Option<String>,
    pub created_at: String,
}

/// One day's egg count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EggEntry {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub count: i64,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Flock timeline entry, ordered by date ascending for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlockEvent {
    pub id: String,
    pub user_id: String,
    pub batch_id: Option<String>,
    pub date: NaiveDate,
    pub event_type: EventType,
    pub description: String,
    pub affected_birds: Option<i64>,
    pub notes: Option<String>,
    pub created_at: String,
}

/// An egg customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

/// A recorded egg sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub user_id: String,
    pub customer_id: Option<String>,
    pub date: NaiveDate,
    pub dozen_count: i64,
    pub individual_count: i64,
    pub total_amount: f64,
    pub notes: Option<String>,
    pub created_at: String,
}

/// A farm expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub created_at: String,
}

/// A feed purchase, tracked for cost-per-egg style reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPurchase {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub feed_type: String,
    pub amount: f64,
    pub total_cost: f64,
    pub created_at: String,
}

/// Profile and subscription state for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub farm_name: Option<String>,
    pub subscription_status: String,
    pub onboarding_complete: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBatchRequest {
    pub batch_name: String,
    pub breed: String,
    pub batch_type: BatchType,
    pub hens_count: i64,
    pub roosters_count: i64,
    pub chicks_count: i64,
    pub brooding_count: i64,
    pub acquisition_date: NaiveDate,
    pub age_at_acquisition: AgeCategory,
    pub actual_laying_start_date: Option<NaiveDate>,
    pub expected_laying_start_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateBatchRequest {
    pub batch_name: Option<String>,
    pub breed: Option<String>,
    pub hens_count: Option<i64>,
    pub roosters_count: Option<i64>,
    pub chicks_count: Option<i64>,
    pub brooding_count: Option<i64>,
    pub actual_laying_start_date: Option<NaiveDate>,
    pub expected_laying_start_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDeathRecordRequest {
    pub batch_id: String,
    pub date: NaiveDate,
    pub count: i64,
    pub cause: DeathCause,
    pub description: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEggEntryRequest {
    pub date: NaiveDate,
    pub count: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub batch_id: Option<String>,
    pub date: NaiveDate,
    pub event_type: EventType,
    pub description: String,
    pub affected_birds: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub date: Option<NaiveDate>,
    pub event_type: Option<EventType>,
    pub description: Option<String>,
    pub affected_birds: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSaleRequest {
    pub customer_id: Option<String>,
    pub date: NaiveDate,
    pub dozen_count: i64,
    pub individual_count: i64,
    pub total_amount: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFeedPurchaseRequest {
    pub date: NaiveDate,
    pub feed_type: String,
    pub amount: f64,
    pub total_cost: f64,
}

/// Credentials presented to the session-issuance endpoint. Stands in for the
/// hosted auth provider's sign-in exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignInRequest {
    pub user_id: String,
    pub email: Option<String>,
}

/// A freshly issued session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: String,
}

/// Structured log record shipped from the browser to the backend log sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientLogRequest {
    pub level: String,
    pub message: String,
    pub component: Option<String>,
}

impl BatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchType::Hens => "hens",
            BatchType::Roosters => "roosters",
            BatchType::Chicks => "chicks",
            BatchType::Mixed => "mixed",
        }
    }
}

impl std::str::FromStr for BatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hens" => Ok(BatchType::Hens),
            "roosters" => Ok(BatchType::Roosters),
            "chicks" => Ok(BatchType::Chicks),
            "mixed" => Ok(BatchType::Mixed),
            other => Err(format!("unknown batch type: {}", other)),
        }
    }
}

impl AgeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeCategory::Adult => "adult",
            AgeCategory::Juvenile => "juvenile",
            AgeCategory::Chick => "chick",
        }
    }
}

impl std::str::FromStr for AgeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adult" => Ok(AgeCategory::Adult),
            "juvenile" => Ok(AgeCategory::Juvenile),
            "chick" => Ok(AgeCategory::Chick),
            other => Err(format!("unknown age category: {}", other)),
        }
    }
}

impl DeathCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeathCause::Predator => "predator",
            DeathCause::Disease => "disease",
            DeathCause::Age => "age",
            DeathCause::Injury => "injury",
            DeathCause::Unknown => "unknown",
            DeathCause::Culled => "culled",
            DeathCause::Other => "other",
        }
    }
}

impl std::str::FromStr for DeathCause {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "predator" => Ok(DeathCause::Predator),
            "disease" => Ok(DeathCause::Disease),
            "age" => Ok(DeathCause::Age),
            "injury" => Ok(DeathCause::Injury),
            "unknown" => Ok(DeathCause::Unknown),
            "culled" => Ok(DeathCause::Culled),
            "other" => Ok(DeathCause::Other),
            other => Err(format!("unknown death cause: {}", other)),
        }
    }
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Acquisition => "acquisition",
            EventType::LayingStart => "laying_start",
            EventType::Broody => "broody",
            EventType::Hatching => "hatching",
            EventType::Other => "other",
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "acquisition" => Ok(EventType::Acquisition),
            "laying_start" => Ok(EventType::LayingStart),
            "broody" => Ok(EventType::Broody),
            "hatching" => Ok(EventType::Hatching),
            "other" => Ok(EventType::Other),
            other => Err(format!("unknown event type: {}", other)),
        }
    }
}

impl FlockBatch {
    /// Generate batch ID from a timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("batch::{}", epoch_millis)
    }

    /// Parse a batch ID to extract the timestamp
    pub fn parse_id(id: &str) -> Result<u64, BatchIdError> {
        let parts: Vec<&str> = id.split("::").collect();
        if parts.len() != 2 || parts[0] != "batch" {
            return Err(BatchIdError::InvalidFormat);
        }

        parts[1]
            .parse::<u64>()
            .map_err(|_| BatchIdError::InvalidTimestamp)
    }

    /// Extract timestamp from batch ID for sorting
    pub fn extract_timestamp(&self) -> Result<u64, BatchIdError> {
        Self::parse_id(&self.id)
    }
}

impl DeathRecord {
    /// Death record ID format: "death::epoch_millis"
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("death::{}", epoch_millis)
    }
}

impl EggEntry {
    /// Egg entry ID format: "egg::epoch_millis"
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("egg::{}", epoch_millis)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchIdError {
    InvalidFormat,
    InvalidTimestamp,
}

impl fmt::Display for BatchIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchIdError::InvalidFormat => write!(f, "Invalid batch ID format"),
            BatchIdError::InvalidTimestamp => write!(f, "Invalid timestamp in batch ID"),
        }
    }
}

impl std::error::Error for BatchIdError {}
