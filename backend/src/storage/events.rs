use anyhow::{anyhow, Result};
use sqlx::{sqlite::SqliteRow, Row};

use crate::db::DbConnection;
use shared::{EventType, FlockEvent};

fn row_to_event(row: &SqliteRow) -> Result<FlockEvent> {
    let event_type: String = row.get("event_type");

    Ok(FlockEvent {
        id: row.get("id"),
        user_id: row.get("user_id"),
        batch_id: row.get("batch_id"),
        date: row.get("date"),
        event_type: event_type.parse::<EventType>().map_err(|e| anyhow!(e))?,
        description: row.get("description"),
        affected_birds: row.get("affected_birds"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
    })
}

impl DbConnection {
    pub async fn store_event(&self, event: &FlockEvent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO flock_events (
                id, user_id, batch_id, date, event_type, description,
                affected_birds, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(&event.user_id)
        .bind(&event.batch_id)
        .bind(event.date)
        .bind(event.event_type.as_str())
        .bind(&event.description)
        .bind(event.affected_birds)
        .bind(&event.notes)
        .bind(&event.created_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn get_event(&self, user_id: &str, event_id: &str) -> Result<Option<FlockEvent>> {
        let row = sqlx::query("SELECT * FROM flock_events WHERE id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;

        row.as_ref().map(row_to_event).transpose()
    }

    /// List a user's timeline events, date ascending for display
    pub async fn list_events(&self, user_id: &str) -> Result<Vec<FlockEvent>> {
        let rows =
            sqlx::query("SELECT * FROM flock_events WHERE user_id = ? ORDER BY date ASC, id ASC")
                .bind(user_id)
                .fetch_all(self.pool())
                .await?;

        rows.iter().map(row_to_event).collect()
    }

    pub async fn update_event(&self, event: &FlockEvent) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE flock_events SET
                date = ?, event_type = ?, description = ?, affected_birds = ?, notes = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(event.date)
        .bind(event.event_type.as_str())
        .bind(&event.description)
        .bind(event.affected_birds)
        .bind(&event.notes)
        .bind(&event.id)
        .bind(&event.user_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_event(&self, user_id: &str, event_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM flock_events WHERE id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
