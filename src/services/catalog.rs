//! Book catalog service

use chrono::{Datelike, Utc};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, BookPatch, BookPayload},
    repository::Repository,
};

/// How many similar books to suggest at most.
const SIMILAR_LIMIT: i64 = 5;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, filter: BookFilter) -> AppResult<Vec<Book>> {
        self.repository.books.list(&filter).await
    }

    pub async fn get(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get(id).await
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        self.repository.books.get_by_isbn(isbn).await
    }

    pub async fn create(&self, payload: BookPayload) -> AppResult<Book> {
        self.repository.books.insert(&payload).await
    }

    /// Create with an explicit duplicate-ISBN check; the unique constraint
    /// would also catch it, but this surfaces a business error up front.
    pub async fn create_checked(&self, payload: BookPayload) -> AppResult<Book> {
        if self.repository.books.isbn_exists(&payload.isbn).await? {
            return Err(AppError::BusinessRule(format!(
                "a book with ISBN {} already exists",
                payload.isbn
            )));
        }
        self.repository.books.insert(&payload).await
    }

    pub async fn update(&self, id: i64, patch: BookPatch) -> AppResult<Book> {
        self.repository.books.update(id, &patch).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<Book> {
        self.repository.books.delete(id).await
    }

    pub async fn bulk_create(&self, payloads: Vec<BookPayload>) -> AppResult<Vec<Book>> {
        self.repository.books.insert_many(&payloads).await
    }

    /// Up to five other books sharing the genre of the given book.
    pub async fn similar(&self, id: i64) -> AppResult<Vec<Book>> {
        let book = self.repository.books.get(id).await?;
        let filter = BookFilter {
            genre: Some(book.genre),
            exclude_id: Some(id),
            limit: Some(SIMILAR_LIMIT),
            ..Default::default()
        };
        self.repository.books.list(&filter).await
    }

    /// Books published in the current calendar year.
    pub async fn recent(&self) -> AppResult<Vec<Book>> {
        let filter = BookFilter {
            published_year: Some(Utc::now().year()),
            ..Default::default()
        };
        self.repository.books.list(&filter).await
    }
}
