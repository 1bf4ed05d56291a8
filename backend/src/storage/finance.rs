use anyhow::Result;
use sqlx::{sqlite::SqliteRow, Row};

use crate::db::DbConnection;
use shared::{Expense, FeedPurchase, Sale};

fn row_to_sale(row: &SqliteRow) -> Sale {
    Sale {
        id: row.get("id"),
        user_id: row.get("user_id"),
        customer_id: row.get("customer_id"),
        date: row.get("date"),
        dozen_count: row.get("dozen_count"),
        individual_count: row.get("individual_count"),
        total_amount: row.get("total_amount"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
    }
}

fn row_to_expense(row: &SqliteRow) -> Expense {
    Expense {
        id: row.get("id"),
        user_id: row.get("user_id"),
        date: row.get("date"),
        category: row.get("category"),
        amount: row.get("amount"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}

fn row_to_feed(row: &SqliteRow) -> FeedPurchase {
    FeedPurchase {
        id: row.get("id"),
        user_id: row.get("user_id"),
        date: row.get("date"),
        feed_type: row.get("feed_type"),
        amount: row.get("amount"),
        total_cost: row.get("total_cost"),
        created_at: row.get("created_at"),
    }
}

impl DbConnection {
    pub async fn store_sale(&self, sale: &Sale) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sales (
                id, user_id, customer_id, date, dozen_count, individual_count,
                total_amount, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.user_id)
        .bind(&sale.customer_id)
        .bind(sale.date)
        .bind(sale.dozen_count)
        .bind(sale.individual_count)
        .bind(sale.total_amount)
        .bind(&sale.notes)
        .bind(&sale.created_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn list_sales(&self, user_id: &str) -> Result<Vec<Sale>> {
        let rows = sqlx::query("SELECT * FROM sales WHERE user_id = ? ORDER BY date DESC, id DESC")
            .bind(user_id)
            .fetch_all(self.pool())
            .await?;

        Ok(rows.iter().map(row_to_sale).collect())
    }

    pub async fn store_expense(&self, expense: &Expense) -> Result<()> {
        sqlx::query(
            "INSERT INTO expenses (id, user_id, date, category, amount, description, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&expense.id)
        .bind(&expense.user_id)
        .bind(expense.date)
        .bind(&expense.category)
        .bind(expense.amount)
        .bind(&expense.description)
        .bind(&expense.created_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn list_expenses(&self, user_id: &str) -> Result<Vec<Expense>> {
        let rows =
            sqlx::query("SELECT * FROM expenses WHERE user_id = ? ORDER BY date DESC, id DESC")
                .bind(user_id)
                .fetch_all(self.pool())
                .await?;

        Ok(rows.iter().map(row_to_expense).collect())
    }

    pub async fn store_feed_purchase(&self, purchase: &FeedPurchase) -> Result<()> {
        sqlx::query(
            "INSERT INTO feed_purchases (id, user_id, date, feed_type, amount, total_cost, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&purchase.id)
        .bind(&purchase.user_id)
        .bind(purchase.date)
        .bind(&purchase.feed_type)
        .bind(purchase.amount)
        .bind(purchase.total_cost)
        .bind(&purchase.created_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn list_feed_purchases(&self, user_id: &str) -> Result<Vec<FeedPurchase>> {
        let rows =
            sqlx::query("SELECT * FROM feed_purchases WHERE user_id = ? ORDER BY date DESC, id DESC")
                .bind(user_id)
                .fetch_all(self.pool())
                .await?;

        Ok(rows.iter().map(row_to_feed).collect())
    }
}
