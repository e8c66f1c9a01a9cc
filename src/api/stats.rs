//! Statistics endpoints

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppResult;

/// Library-wide aggregates
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct LibraryStats {
    /// Total number of books in the catalog
    pub total_books: i64,
    /// Books with at least one copy available
    pub available_books: i64,
    /// Distinct genres in use
    pub total_genres: i64,
    /// Average price across all books (0 when the catalog is empty)
    #[schema(value_type = String)]
    pub avg_price: Decimal,
    /// Sum of page counts across all books
    pub total_pages: i64,
}

/// Book count for one genre
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct GenreCount {
    pub genre: String,
    pub count: i64,
}

/// Book count for one author
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct AuthorCount {
    pub author: String,
    pub count: i64,
}

/// Catalog breakdown for the viewset stats action
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogBreakdown {
    pub total: i64,
    pub by_genre: Vec<GenreCount>,
    /// Five most prolific authors
    pub top_authors: Vec<AuthorCount>,
}

/// Library statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Library-wide aggregates", body = LibraryStats)
    )
)]
pub async fn library_stats(State(state): State<crate::AppState>) -> AppResult<Json<LibraryStats>> {
    let stats = state.services.stats.library().await?;
    Ok(Json(stats))
}
