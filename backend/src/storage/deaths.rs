use anyhow::{anyhow, Result};
use sqlx::{sqlite::SqliteRow, Row};

use crate::db::DbConnection;
use shared::{DeathCause, DeathRecord};

fn row_to_record(row: &SqliteRow) -> Result<DeathRecord> {
    let cause: String = row.get("cause");

    Ok(DeathRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        batch_id: row.get("batch_id"),
        date: row.get("date"),
        count: row.get("count"),
        cause: cause.parse::<DeathCause>().map_err(|e| anyhow!(e))?,
        description: row.get("description"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
    })
}

impl DbConnection {
    /// Insert a death record and decrement the batch's current count in one
    /// transaction. Returns false (and writes nothing) if the batch does not
    /// have `record.count` birds left; death logging is the only mutation
    /// path for `current_count`.
    pub async fn store_death_record(&self, record: &DeathRecord) -> Result<bool> {
        let mut tx = self.pool().begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE flock_batches
            SET current_count = current_count - ?, updated_at = ?
            WHERE id = ? AND user_id = ? AND current_count >= ?
            "#,
        )
        .bind(record.count)
        .bind(&record.created_at)
        .bind(&record.batch_id)
        .bind(&record.user_id)
        .bind(record.count)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO death_records (
                id, user_id, batch_id, date, count, cause, description, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.batch_id)
        .bind(record.date)
        .bind(record.count)
        .bind(record.cause.as_str())
        .bind(&record.description)
        .bind(&record.notes)
        .bind(&record.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// List all of a user's death records, most recent loss first
    pub async fn list_death_records(&self, user_id: &str) -> Result<Vec<DeathRecord>> {
        let rows =
            sqlx::query("SELECT * FROM death_records WHERE user_id = ? ORDER BY date DESC, id DESC")
                .bind(user_id)
                .fetch_all(self.pool())
                .await?;

        rows.iter().map(row_to_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::batches::tests::sample_batch;
    use chrono::NaiveDate;

    fn sample_record(id: &str, batch_id: &str, count: i64) -> DeathRecord {
        DeathRecord {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            batch_id: batch_id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            count,
            cause: DeathCause::Predator,
            description: "raccoon attack overnight".to_string(),
            notes: None,
            created_at: "2024-06-01T08:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_decrements_batch_count() {
        let db = DbConnection::init_test().await.unwrap();
        db.store_batch(&sample_batch("batch::1", "user-1"))
            .await
            .unwrap();

        let stored = db
            .store_death_record(&sample_record("death::1", "batch::1", 3))
            .await
            .unwrap();
        assert!(stored);

        let batch = db.get_batch("user-1", "batch::1").await.unwrap().unwrap();
        assert_eq!(batch.current_count, 9);
        // Initial count is untouched so mortality math stays stable.
        assert_eq!(batch.initial_count, 12);

        let records = db.list_death_records("user-1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].count, 3);
    }

    #[tokio::test]
    async fn test_store_rejects_count_beyond_remaining() {
        let db = DbConnection::init_test().await.unwrap();
        db.store_batch(&sample_batch("batch::1", "user-1"))
            .await
            .unwrap();

        let stored = db
            .store_death_record(&sample_record("death::1", "batch::1", 13))
            .await
            .unwrap();
        assert!(!stored);

        // Nothing was written.
        let batch = db.get_batch("user-1", "batch::1").await.unwrap().unwrap();
        assert_eq!(batch.current_count, 12);
        assert!(db.list_death_records("user-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_rejects_foreign_batch() {
        let db = DbConnection::init_test().await.unwrap();
        db.store_batch(&sample_batch("batch::1", "user-2"))
            .await
            .unwrap();

        // user-1 logging against user-2's batch fails the scoped update.
        let stored = db
            .store_death_record(&sample_record("death::1", "batch::1", 1))
            .await
            .unwrap();
        assert!(!stored);
    }
}
