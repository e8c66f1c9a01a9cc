//! Postgres borrow ledger store

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::borrow::BorrowRecord,
};

use super::{BorrowStore, LedgerScope};

const LEDGER_SELECT: &str = r#"
SELECT br.id, br.book_id, br.user_id, br.borrow_date, br.return_date, br.returned,
       b.title AS book_title, u.username AS user_username
FROM borrow_records br
JOIN books b ON br.book_id = b.id
JOIN users u ON br.user_id = u.id
"#;

const LEDGER_ORDER: &str = "ORDER BY br.borrow_date DESC, br.id DESC";

#[derive(Clone)]
pub struct PgBorrowStore {
    pool: Pool<Postgres>,
}

impl PgBorrowStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch<'e, E>(&self, executor: E, id: i64) -> AppResult<BorrowRecord>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, BorrowRecord>(&format!("{LEDGER_SELECT} WHERE br.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow record with id {} not found", id)))
    }
}

#[async_trait]
impl BorrowStore for PgBorrowStore {
    async fn borrow(&self, book_id: i64, user_id: i64) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(book_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book_id
            )));
        }

        // Availability check and decrement in one conditional update, so
        // concurrent borrows of the last copy cannot oversell.
        let updated = sqlx::query(
            "UPDATE books SET available_copies = available_copies - 1 \
             WHERE id = $1 AND available_copies > 0",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::BusinessRule(
                "this book is not available".to_string(),
            ));
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO borrow_records (book_id, user_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let record = self.fetch(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(record)
    }

    async fn insert(&self, book_id: i64, user_id: i64) -> AppResult<BorrowRecord> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO borrow_records (book_id, user_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        self.fetch(&self.pool, id).await
    }

    async fn list(&self, scope: &LedgerScope) -> AppResult<Vec<BorrowRecord>> {
        let records = match scope {
            LedgerScope::All => {
                sqlx::query_as::<_, BorrowRecord>(&format!("{LEDGER_SELECT} {LEDGER_ORDER}"))
                    .fetch_all(&self.pool)
                    .await?
            }
            LedgerScope::User(user_id) => {
                sqlx::query_as::<_, BorrowRecord>(&format!(
                    "{LEDGER_SELECT} WHERE br.user_id = $1 {LEDGER_ORDER}"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(records)
    }

    async fn get(&self, id: i64, scope: &LedgerScope) -> AppResult<BorrowRecord> {
        let record = match scope {
            LedgerScope::All => {
                sqlx::query_as::<_, BorrowRecord>(&format!("{LEDGER_SELECT} WHERE br.id = $1"))
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            LedgerScope::User(user_id) => {
                sqlx::query_as::<_, BorrowRecord>(&format!(
                    "{LEDGER_SELECT} WHERE br.id = $1 AND br.user_id = $2"
                ))
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        record.ok_or_else(|| AppError::NotFound(format!("Borrow record with id {} not found", id)))
    }
}
