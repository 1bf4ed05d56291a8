use anyhow::{anyhow, Result};
use sqlx::{sqlite::SqliteRow, Row};

use crate::db::DbConnection;
use shared::{AgeCategory, BatchType, FlockBatch};

fn row_to_batch(row: &SqliteRow) -> Result<FlockBatch> {
    let batch_type: String = row.get("batch_type");
    let age: String = row.get("age_at_acquisition");

    Ok(FlockBatch {
        id: row.get("id"),
        user_id: row.get("user_id"),
        batch_name: row.get("batch_name"),
        breed: row.get("breed"),
        batch_type: batch_type.parse::<BatchType>().map_err(|e| anyhow!(e))?,
        hens_count: row.get("hens_count"),
        roosters_count: row.get("roosters_count"),
        chicks_count: row.get("chicks_count"),
        brooding_count: row.get("brooding_count"),
        initial_count: row.get("initial_count"),
        current_count: row.get("current_count"),
        acquisition_date: row.get("acquisition_date"),
        age_at_acquisition: age.parse::<AgeCategory>().map_err(|e| anyhow!(e))?,
        actual_laying_start_date: row.get("actual_laying_start_date"),
        expected_laying_start_date: row.get("expected_laying_start_date"),
        is_active: row.get("is_active"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

impl DbConnection {
    /// Insert a new batch row
    pub async fn store_batch(&self, batch: &FlockBatch) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO flock_batches (
                id, user_id, batch_name, breed, batch_type,
                hens_count, roosters_count, chicks_count, brooding_count,
                initial_count, current_count, acquisition_date, age_at_acquisition,
                actual_laying_start_date, expected_laying_start_date,
                is_active, notes, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&batch.id)
        .bind(&batch.user_id)
        .bind(&batch.batch_name)
        .bind(&batch.breed)
        .bind(batch.batch_type.as_str())
        .bind(batch.hens_count)
        .bind(batch.roosters_count)
        .bind(batch.chicks_count)
        .bind(batch.brooding_count)
        .bind(batch.initial_count)
        .bind(batch.current_count)
        .bind(batch.acquisition_date)
        .bind(batch.age_at_acquisition.as_str())
        .bind(batch.actual_laying_start_date)
        .bind(batch.expected_laying_start_date)
        .bind(batch.is_active)
        .bind(&batch.notes)
        .bind(&batch.created_at)
        .bind(&batch.updated_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Get one batch, scoped to its owner
    pub async fn get_batch(&self, user_id: &str, batch_id: &str) -> Result<Option<FlockBatch>> {
        let row = sqlx::query("SELECT * FROM flock_batches WHERE id = ? AND user_id = ?")
            .bind(batch_id)
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;

        row.as_ref().map(row_to_batch).transpose()
    }

    /// List every batch for a user, newest acquisition first
    pub async fn list_batches(&self, user_id: &str) -> Result<Vec<FlockBatch>> {
        let rows = sqlx::query(
            "SELECT * FROM flock_batches WHERE user_id = ? ORDER BY acquisition_date DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_batch).collect()
    }

    /// Write back a full batch row (id and user_id are the key)
    pub async fn update_batch(&self, batch: &FlockBatch) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE flock_batches SET
                batch_name = ?, breed = ?, hens_count = ?, roosters_count = ?,
                chicks_count = ?, brooding_count = ?, current_count = ?,
                actual_laying_start_date = ?, expected_laying_start_date = ?,
                is_active = ?, notes = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&batch.batch_name)
        .bind(&batch.breed)
        .bind(batch.hens_count)
        .bind(batch.roosters_count)
        .bind(batch.chicks_count)
        .bind(batch.brooding_count)
        .bind(batch.current_count)
        .bind(batch.actual_laying_start_date)
        .bind(batch.expected_laying_start_date)
        .bind(batch.is_active)
        .bind(&batch.notes)
        .bind(&batch.updated_at)
        .bind(&batch.id)
        .bind(&batch.user_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
