use anyhow::Result;
use sqlx::{sqlite::SqliteRow, Row};

use crate::db::DbConnection;
use shared::EggEntry;

fn row_to_entry(row: &SqliteRow) -> EggEntry {
    EggEntry {
        id: row.get("id"),
        user_id: row.get("user_id"),
        date: row.get("date"),
        count: row.get("count"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
    }
}

impl DbConnection {
    pub async fn store_egg_entry(&self, entry: &EggEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO egg_entries (id, user_id, date, count, notes, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(entry.date)
        .bind(entry.count)
        .bind(&entry.notes)
        .bind(&entry.created_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// List all of a user's egg entries, most recent day first
    pub async fn list_egg_entries(&self, user_id: &str) -> Result<Vec<EggEntry>> {
        let rows =
            sqlx::query("SELECT * FROM egg_entries WHERE user_id = ? ORDER BY date DESC, id DESC")
                .bind(user_id)
                .fetch_all(self.pool())
                .await?;

        Ok(rows.iter().map(row_to_entry).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(id: &str, user_id: &str, day: u32, count: i64) -> EggEntry {
        EggEntry {
            id: id.to_string(),
            user_id: user_id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            count,
            notes: None,
            created_at: "2024-06-01T18:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_and_list_scoped() {
        let db = DbConnection::init_test().await.unwrap();
        db.store_egg_entry(&entry("egg::1", "user-1", 1, 10)).await.unwrap();
        db.store_egg_entry(&entry("egg::2", "user-1", 3, 12)).await.unwrap();
        db.store_egg_entry(&entry("egg::3", "user-2", 2, 99)).await.unwrap();

        let entries = db.list_egg_entries("user-1").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "egg::2");
        assert_eq!(entries[1].count, 10);
    }
}
