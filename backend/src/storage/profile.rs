use anyhow::Result;
use sqlx::{sqlite::SqliteRow, Row};

use crate::db::DbConnection;
use shared::UserProfile;

fn row_to_profile(row: &SqliteRow) -> UserProfile {
    UserProfile {
        id: row.get("id"),
        email: row.get("email"),
        farm_name: row.get("farm_name"),
        subscription_status: row.get("subscription_status"),
        onboarding_complete: row.get("onboarding_complete"),
        created_at: row.get("created_at"),
    }
}

impl DbConnection {
    pub async fn store_profile(&self, profile: &UserProfile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO user_profiles (
                id, email, farm_name, subscription_status, onboarding_complete, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.email)
        .bind(&profile.farm_name)
        .bind(&profile.subscription_status)
        .bind(profile.onboarding_complete)
        .bind(&profile.created_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let row = sqlx::query("SELECT * FROM user_profiles WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.as_ref().map(row_to_profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_profile_round_trip() {
        let db = DbConnection::init_test().await.unwrap();
        let profile = UserProfile {
            id: "user-1".to_string(),
            email: "farmer@example.com".to_string(),
            farm_name: Some("Hilltop".to_string()),
            subscription_status: "active".to_string(),
            onboarding_complete: true,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };
        db.store_profile(&profile).await.unwrap();

        assert_eq!(db.get_profile("user-1").await.unwrap(), Some(profile));
        assert!(db.get_profile("user-2").await.unwrap().is_none());
    }
}
