use anyhow::Result;
use sqlx::{sqlite::SqliteRow, Row};

use crate::db::DbConnection;
use shared::Customer;

fn row_to_customer(row: &SqliteRow) -> Customer {
    Customer {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        phone: row.get("phone"),
        notes: row.get("notes"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}

impl DbConnection {
    pub async fn store_customer(&self, customer: &Customer) -> Result<()> {
        sqlx::query(
            "INSERT INTO customers (id, user_id, name, phone, notes, is_active, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&customer.id)
        .bind(&customer.user_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.notes)
        .bind(customer.is_active)
        .bind(&customer.created_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn get_customer(&self, user_id: &str, customer_id: &str) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT * FROM customers WHERE id = ? AND user_id = ?")
            .bind(customer_id)
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.as_ref().map(row_to_customer))
    }

    /// List a user's customers ordered by name
    pub async fn list_customers(&self, user_id: &str) -> Result<Vec<Customer>> {
        let rows = sqlx::query("SELECT * FROM customers WHERE user_id = ? ORDER BY name ASC")
            .bind(user_id)
            .fetch_all(self.pool())
            .await?;

        Ok(rows.iter().map(row_to_customer).collect())
    }

    pub async fn update_customer(&self, customer: &Customer) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE customers SET name = ?, phone = ?, notes = ?, is_active = ? WHERE id = ? AND user_id = ?",
        )
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.notes)
        .bind(customer.is_active)
        .bind(&customer.id)
        .bind(&customer.user_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
