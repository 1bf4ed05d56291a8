use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

// Stand-in for the hosted database service. Every query is scoped by
// user_id, which is what the managed row-level-security policies enforce
// in production.
const DEFAULT_DATABASE_URL: &str = "sqlite:flock_tracker.db";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        token TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_profiles (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL,
        farm_name TEXT,
        subscription_status TEXT NOT NULL DEFAULT 'free',
        onboarding_complete INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS flock_batches (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        batch_name TEXT NOT NULL,
        breed TEXT NOT NULL,
        batch_type TEXT NOT NULL,
        hens_count INTEGER NOT NULL DEFAULT 0,
        roosters_count INTEGER NOT NULL DEFAULT 0,
        chicks_count INTEGER NOT NULL DEFAULT 0,
        brooding_count INTEGER NOT NULL DEFAULT 0,
        initial_count INTEGER NOT NULL,
        current_count INTEGER NOT NULL,
        acquisition_date TEXT NOT NULL,
        age_at_acquisition TEXT NOT NULL,
        actual_laying_start_date TEXT,
        expected_laying_start_date TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS death_records (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        batch_id TEXT NOT NULL,
        date TEXT NOT NULL,
        count INTEGER NOT NULL,
        cause TEXT NOT NULL,
        description TEXT NOT NULL,
        notes TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS egg_entries (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        date TEXT NOT NULL,
        count INTEGER NOT NULL,
        notes TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS flock_events (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        batch_id TEXT,
        date TEXT NOT NULL,
        event_type TEXT NOT NULL,
        description TEXT NOT NULL,
        affected_birds INTEGER,
        notes TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        phone TEXT,
        notes TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sales (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        customer_id TEXT,
        date TEXT NOT NULL,
        dozen_count INTEGER NOT NULL DEFAULT 0,
        individual_count INTEGER NOT NULL DEFAULT 0,
        total_amount REAL NOT NULL,
        notes TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS expenses (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        date TEXT NOT NULL,
        category TEXT NOT NULL,
        amount REAL NOT NULL,
        description TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS feed_purchases (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        date TEXT NOT NULL,
        feed_type TEXT NOT NULL,
        amount REAL NOT NULL,
        total_cost REAL NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
];

/// DbConnection manages database operations
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize the standard database, honoring DATABASE_URL if set
    pub async fn init() -> Result<Self> {
        let url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        Self::new(&url).await
    }

    /// Initialize a test database with a unique name
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }

        Ok(())
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_test_creates_schema() {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");

        // Schema is usable: inserts against core tables succeed.
        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind("tok")
            .bind("user-1")
            .bind("2024-01-01T00:00:00Z")
            .execute(db.pool())
            .await
            .expect("sessions insert failed");

        sqlx::query(
            "INSERT INTO egg_entries (id, user_id, date, count, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind("egg::1")
        .bind("user-1")
        .bind("2024-01-01")
        .bind(12i64)
        .bind("2024-01-01T00:00:00Z")
        .execute(db.pool())
        .await
        .expect("egg_entries insert failed");
    }

    #[tokio::test]
    async fn test_test_databases_are_isolated() {
        let a = DbConnection::init_test().await.unwrap();
        let b = DbConnection::init_test().await.unwrap();

        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind("tok")
            .bind("user-1")
            .bind("2024-01-01T00:00:00Z")
            .execute(a.pool())
            .await
            .unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
            .fetch_one(b.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }
}
