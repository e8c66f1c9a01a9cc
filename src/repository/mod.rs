//! Storage layer
//!
//! Handlers and services never touch SQL directly: all storage access goes
//! through the `BookStore` and `BorrowStore` traits, so the engine is
//! swappable and the services are unit-testable against mocks.

pub mod books;
pub mod borrows;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::api::stats::{AuthorCount, GenreCount, LibraryStats};
use crate::error::AppResult;
use crate::models::book::{Book, BookFilter, BookPatch, BookPayload};
use crate::models::borrow::BorrowRecord;
use crate::models::user::UserClaims;

/// Visibility scope for borrow ledger queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerScope {
    /// Staff see the whole ledger.
    All,
    /// Everyone else sees only their own records.
    User(i64),
}

impl LedgerScope {
    pub fn for_claims(claims: &UserClaims) -> Self {
        if claims.is_staff {
            LedgerScope::All
        } else {
            LedgerScope::User(claims.user_id)
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn list(&self, filter: &BookFilter) -> AppResult<Vec<Book>>;
    async fn get(&self, id: i64) -> AppResult<Book>;
    async fn get_by_isbn(&self, isbn: &str) -> AppResult<Book>;
    async fn isbn_exists(&self, isbn: &str) -> AppResult<bool>;
    async fn insert(&self, payload: &BookPayload) -> AppResult<Book>;
    /// Inserts all payloads in one transaction; any failure inserts nothing.
    async fn insert_many(&self, payloads: &[BookPayload]) -> AppResult<Vec<Book>>;
    async fn update(&self, id: i64, patch: &BookPatch) -> AppResult<Book>;
    /// Returns the deleted book; borrow records cascade in the schema.
    async fn delete(&self, id: i64) -> AppResult<Book>;
    async fn library_stats(&self) -> AppResult<LibraryStats>;
    async fn count_by_genre(&self) -> AppResult<Vec<GenreCount>>;
    async fn top_authors(&self, limit: i64) -> AppResult<Vec<AuthorCount>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowStore: Send + Sync {
    /// The borrow action: decrement `available_copies` and insert the record
    /// as one atomic operation. Fails without state change when no copy is
    /// available.
    async fn borrow(&self, book_id: i64, user_id: i64) -> AppResult<BorrowRecord>;
    /// Plain ledger insert (no availability change).
    async fn insert(&self, book_id: i64, user_id: i64) -> AppResult<BorrowRecord>;
    async fn list(&self, scope: &LedgerScope) -> AppResult<Vec<BorrowRecord>>;
    async fn get(&self, id: i64, scope: &LedgerScope) -> AppResult<BorrowRecord>;
}

/// Main repository struct aggregating the stores
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub borrows: Arc<dyn BorrowStore>,
}

impl Repository {
    /// Create a Postgres-backed repository on the given connection pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBookStore::new(pool.clone())),
            borrows: Arc::new(borrows::PgBorrowStore::new(pool)),
        }
    }
}
