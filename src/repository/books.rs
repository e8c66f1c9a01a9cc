//! Postgres book store

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    api::stats::{AuthorCount, GenreCount, LibraryStats},
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, BookPatch, BookPayload},
};

use super::BookStore;

const BOOK_COLUMNS: &str =
    "id, title, author, isbn, genre, published_date, page_count, available_copies, price";

/// Escapes LIKE wildcards so user input matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped.to_lowercase())
}

#[derive(Clone)]
pub struct PgBookStore {
    pool: Pool<Postgres>,
}

impl PgBookStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn list(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE TRUE"
        ));

        if let Some(search) = &filter.search {
            let pattern = like_pattern(search);
            query.push(" AND (LOWER(title) LIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR LOWER(author) LIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR LOWER(isbn) LIKE ");
            query.push_bind(pattern);
            query.push(")");
        }
        if let Some(genre) = &filter.genre {
            query.push(" AND genre = ");
            query.push_bind(genre.clone());
        }
        if let Some(author) = &filter.author {
            query.push(" AND author = ");
            query.push_bind(author.clone());
        }
        if filter.available_only {
            query.push(" AND available_copies > 0");
        }
        if let Some(min_pages) = filter.min_pages {
            query.push(" AND page_count >= ");
            query.push_bind(min_pages);
        }
        if let Some(max_price) = filter.max_price {
            query.push(" AND price <= ");
            query.push_bind(max_price);
        }
        if let Some(year) = filter.published_year {
            query.push(" AND EXTRACT(YEAR FROM published_date)::INT = ");
            query.push_bind(year);
        }
        if let Some(exclude_id) = filter.exclude_id {
            query.push(" AND id <> ");
            query.push_bind(exclude_id);
        }

        query.push(" ORDER BY title, id");
        if let Some(limit) = filter.limit {
            query.push(" LIMIT ");
            query.push_bind(limit);
        }

        let books = query
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn get(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn get_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE isbn = $1"
        ))
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with isbn {} not found", isbn)))
    }

    async fn isbn_exists(&self, isbn: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
            .bind(isbn)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert(&self, payload: &BookPayload) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (title, author, isbn, genre, published_date, page_count, available_copies, price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(&payload.title)
        .bind(&payload.author)
        .bind(&payload.isbn)
        .bind(&payload.genre)
        .bind(payload.published_date)
        .bind(payload.page_count)
        .bind(payload.available_copies.unwrap_or(1))
        .bind(payload.price)
        .fetch_one(&self.pool)
        .await?;
        Ok(book)
    }

    async fn insert_many(&self, payloads: &[BookPayload]) -> AppResult<Vec<Book>> {
        let mut tx = self.pool.begin().await?;
        let mut books = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let book = sqlx::query_as::<_, Book>(&format!(
                r#"
                INSERT INTO books (title, author, isbn, genre, published_date, page_count, available_copies, price)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {BOOK_COLUMNS}
                "#
            ))
            .bind(&payload.title)
            .bind(&payload.author)
            .bind(&payload.isbn)
            .bind(&payload.genre)
            .bind(payload.published_date)
            .bind(payload.page_count)
            .bind(payload.available_copies.unwrap_or(1))
            .bind(payload.price)
            .fetch_one(&mut *tx)
            .await?;
            books.push(book);
        }
        tx.commit().await?;
        Ok(books)
    }

    async fn update(&self, id: i64, patch: &BookPatch) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                isbn = COALESCE($4, isbn),
                genre = COALESCE($5, genre),
                published_date = COALESCE($6, published_date),
                page_count = COALESCE($7, page_count),
                available_copies = COALESCE($8, available_copies),
                price = COALESCE($9, price)
            WHERE id = $1
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.title)
        .bind(&patch.author)
        .bind(&patch.isbn)
        .bind(&patch.genre)
        .bind(patch.published_date)
        .bind(patch.page_count)
        .bind(patch.available_copies)
        .bind(patch.price)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn delete(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!(
            "DELETE FROM books WHERE id = $1 RETURNING {BOOK_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn library_stats(&self) -> AppResult<LibraryStats> {
        let stats = sqlx::query_as::<_, LibraryStats>(
            r#"
            SELECT COUNT(*) AS total_books,
                   COUNT(*) FILTER (WHERE available_copies > 0) AS available_books,
                   COUNT(DISTINCT genre) AS total_genres,
                   COALESCE(AVG(price), 0) AS avg_price,
                   COALESCE(SUM(page_count), 0)::BIGINT AS total_pages
            FROM books
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn count_by_genre(&self) -> AppResult<Vec<GenreCount>> {
        let counts = sqlx::query_as::<_, GenreCount>(
            "SELECT genre, COUNT(*) AS count FROM books GROUP BY genre ORDER BY genre",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    async fn top_authors(&self, limit: i64) -> AppResult<Vec<AuthorCount>> {
        let counts = sqlx::query_as::<_, AuthorCount>(
            r#"
            SELECT author, COUNT(*) AS count
            FROM books
            GROUP BY author
            ORDER BY count DESC, author
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }
}
