//! Flock management rules.
//!
//! Owns the invariants that span rows: a death record may only be logged
//! against a batch with enough birds left, and logging it is the single
//! mutation path for `current_count`. The summary endpoint delegates the
//! actual arithmetic to `shared::metrics` so the backend and the client
//! compute identical numbers.

use chrono::Utc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

use crate::db::DbConnection;
use crate::error::ApiError;
use shared::{
    compute_flock_summary, CreateBatchRequest, CreateDeathRecordRequest, DeathRecord, FlockBatch,
    FlockSummary, MetricsConfig, UpdateBatchRequest,
};

#[derive(Clone)]
pub struct FlockService {
    db: DbConnection,
    metrics_config: MetricsConfig,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl FlockService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            db,
            metrics_config: MetricsConfig::default(),
        }
    }

    pub fn with_metrics_config(db: DbConnection, metrics_config: MetricsConfig) -> Self {
        Self { db, metrics_config }
    }

    pub async fn create_batch(
        &self,
        user_id: &str,
        request: CreateBatchRequest,
    ) -> Result<FlockBatch, ApiError> {
        if request.batch_name.trim().is_empty() {
            return Err(ApiError::Validation("Batch name is required".to_string()));
        }
        if request.hens_count < 0
            || request.roosters_count < 0
            || request.chicks_count < 0
            || request.brooding_count < 0
        {
            return Err(ApiError::Validation(
                "Bird counts cannot be negative".to_string(),
            ));
        }
        if request.brooding_count > request.hens_count {
            return Err(ApiError::Validation(
                "Brooding count cannot exceed hen count".to_string(),
            ));
        }

        let initial_count = request.hens_count + request.roosters_count + request.chicks_count;
        if initial_count == 0 {
            return Err(ApiError::Validation(
                "A batch needs at least one bird".to_string(),
            ));
        }

        let now = Utc::now().to_rfc3339();
        let batch = FlockBatch {
            id: FlockBatch::generate_id(now_millis()),
            user_id: user_id.to_string(),
            batch_name: request.batch_name.trim().to_string(),
            breed: request.breed,
            batch_type: request.batch_type,
            hens_count: request.hens_count,
            roosters_count: request.roosters_count,
            chicks_count: request.chicks_count,
            brooding_count: request.brooding_count,
            initial_count,
            current_count: initial_count,
            acquisition_date: request.acquisition_date,
            age_at_acquisition: request.age_at_acquisition,
            actual_laying_start_date: request.actual_laying_start_date,
            expected_laying_start_date: request.expected_laying_start_date,
            is_active: true,
            notes: request.notes,
            created_at: now.clone(),
            updated_at: now,
        };

        self.db.store_batch(&batch).await?;
        info!("Created batch {} for user {}", batch.id, user_id);

        Ok(batch)
    }

    pub async fn update_batch(
        &self,
        user_id: &str,
        batch_id: &str,
        request: UpdateBatchRequest,
    ) -> Result<FlockBatch, ApiError> {
        let mut batch = self
            .db
            .get_batch(user_id, batch_id)
            .await?
            .ok_or(ApiError::NotFound("Batch"))?;

        if let Some(name) = request.batch_name {
            if name.trim().is_empty() {
                return Err(ApiError::Validation("Batch name is required".to_string()));
            }
            batch.batch_name = name.trim().to_string();
        }
        if let Some(breed) = request.breed {
            batch.breed = breed;
        }
        if let Some(hens) = request.hens_count {
            batch.hens_count = hens;
        }
        if let Some(roosters) = request.roosters_count {
            batch.roosters_count = roosters;
        }
        if let Some(chicks) = request.chicks_count {
            batch.chicks_count = chicks;
        }
        if let Some(brooding) = request.brooding_count {
            batch.brooding_count = brooding;
        }
        if request.actual_laying_start_date.is_some() {
            batch.actual_laying_start_date = request.actual_laying_start_date;
        }
        if request.expected_laying_start_date.is_some() {
            batch.expected_laying_start_date = request.expected_laying_start_date;
        }
        if let Some(is_active) = request.is_active {
            batch.is_active = is_active;
        }
        if request.notes.is_some() {
            batch.notes = request.notes;
        }

        if batch.hens_count < 0
            || batch.roosters_count < 0
            || batch.chicks_count < 0
            || batch.brooding_count < 0
        {
            return Err(ApiError::Validation(
                "Bird counts cannot be negative".to_string(),
            ));
        }
        if batch.brooding_count > batch.hens_count {
            return Err(ApiError::Validation(
                "Brooding count cannot exceed hen count".to_string(),
            ));
        }

        batch.updated_at = Utc::now().to_rfc3339();
        self.db.update_batch(&batch).await?;

        Ok(batch)
    }

    /// Log a loss. Death records are immutable once created; the batch's
    /// current count is decremented atomically with the insert.
    pub async fn record_death(
        &self,
        user_id: &str,
        request: CreateDeathRecordRequest,
    ) -> Result<DeathRecord, ApiError> {
        if request.count < 1 {
            return Err(ApiError::Validation(
                "Death count must be at least 1".to_string(),
            ));
        }

        let batch = self
            .db
            .get_batch(user_id, &request.batch_id)
            .await?
            .ok_or(ApiError::NotFound("Batch"))?;

        let record = DeathRecord {
            id: DeathRecord::generate_id(now_millis()),
            user_id: user_id.to_string(),
            batch_id: request.batch_id,
            date: request.date,
            count: request.count,
            cause: request.cause,
            description: request.description,
            notes: request.notes,
            created_at: Utc::now().to_rfc3339(),
        };

        let stored = self.db.store_death_record(&record).await?;
        if !stored {
            return Err(ApiError::Validation(format!(
                "Death count {} exceeds the {} birds remaining in this batch",
                record.count, batch.current_count
            )));
        }

        info!(
            "Recorded {} deaths against batch {} for user {}",
            record.count, record.batch_id, user_id
        );

        Ok(record)
    }

    /// Compute the aggregate summary from the user's raw rows.
    pub async fn get_summary(&self, user_id: &str) -> Result<FlockSummary, ApiError> {
        let batches = self.db.list_batches(user_id).await?;
        let deaths = self.db.list_death_records(user_id).await?;
        let eggs = self.db.list_egg_entries(user_id).await?;

        let today = Utc::now().date_naive();
        Ok(compute_flock_summary(
            &batches,
            &deaths,
            &eggs,
            today,
            &self.metrics_config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::{AgeCategory, BatchType, DeathCause};

    fn create_request() -> CreateBatchRequest {
        CreateBatchRequest {
            batch_name: "Spring hens".to_string(),
            breed: "Orpington".to_string(),
            batch_type: BatchType::Hens,
            hens_count: 10,
            roosters_count: 1,
            chicks_count: 0,
            brooding_count: 2,
            acquisition_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            age_at_acquisition: AgeCategory::Adult,
            actual_laying_start_date: Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
            expected_laying_start_date: None,
            notes: None,
        }
    }

    async fn setup() -> FlockService {
        let db = DbConnection::init_test().await.unwrap();
        FlockService::new(db)
    }

    #[tokio::test]
    async fn test_create_batch_derives_counts() {
        let service = setup().await;
        let batch = service.create_batch("user-1", create_request()).await.unwrap();

        assert_eq!(batch.initial_count, 11);
        assert_eq!(batch.current_count, 11);
        assert!(batch.is_active);
    }

    #[tokio::test]
    async fn test_create_batch_rejects_empty_name() {
        let service = setup().await;
        let mut request = create_request();
        request.batch_name = "   ".to_string();

        let err = service.create_batch("user-1", request).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_batch_rejects_brooding_over_hens() {
        let service = setup().await;
        let mut request = create_request();
        request.brooding_count = 11;

        let err = service.create_batch("user-1", request).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_batch_soft_deactivate() {
        let service = setup().await;
        let batch = service.create_batch("user-1", create_request()).await.unwrap();

        let updated = service
            .update_batch(
                "user-1",
                &batch.id,
                UpdateBatchRequest {
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
                },
            )
            .await
            .unwrap();

        assert!(!updated.is_active);
        // Soft-deactivated, never deleted.
        assert!(service
            .db
            .get_batch("user-1", &batch.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_record_death_decrements_and_rejects_excess() {
        let service = setup().await;
        let batch = service.create_batch("user-1", create_request()).await.unwrap();

        let record = service
            .record_death(
                "user-1",
                CreateDeathRecordRequest {
                    batch_id: batch.id.clone(),
                    date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                    count: 3,
                    cause: DeathCause::Disease,
                    description: "respiratory illness".to_string(),
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(record.count, 3);

        let reloaded = service.db.get_batch("user-1", &batch.id).await.unwrap().unwrap();
        assert_eq!(reloaded.current_count, 8);

        // Remaining birds: 8; logging 9 must fail without writing.
        let err = service
            .record_death(
                "user-1",
                CreateDeathRecordRequest {
                    batch_id: batch.id.clone(),
                    date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
                    count: 9,
                    cause: DeathCause::Unknown,
                    description: "bad data".to_string(),
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(service.db.list_death_records("user-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_record_death_unknown_batch() {
        let service = setup().await;
        let err = service
            .record_death(
                "user-1",
                CreateDeathRecordRequest {
                    batch_id: "batch::999".to_string(),
                    date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                    count: 1,
                    cause: DeathCause::Predator,
                    description: "missing".to_string(),
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_summary_reflects_rows() {
        let service = setup().await;
        let batch = service.create_batch("user-1", create_request()).await.unwrap();
        service
            .record_death(
                "user-1",
                CreateDeathRecordRequest {
                    batch_id: batch.id.clone(),
                    date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                    count: 2,
                    cause: DeathCause::Predator,
                    description: "hawk".to_string(),
                    notes: None,
                },
            )
            .await
            .unwrap();

        let summary = service.get_summary("user-1").await.unwrap();
        assert_eq!(summary.active_batches, 1);
        assert_eq!(summary.total_deaths, 2);
        // 2 deaths over 11 initial birds.
        assert_eq!(summary.mortality_rate, 18.18);
        // 10 hens minus 2 brooding, batch has an actual laying date.
        assert_eq!(summary.expected_layers, 8);

        // Other users see an empty summary.
        let empty = service.get_summary("user-2").await.unwrap();
        assert_eq!(empty.active_batches, 0);
        assert_eq!(empty.mortality_rate, 0.0);
    }
}
