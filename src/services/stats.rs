//! Statistics service

use crate::{
    api::stats::{CatalogBreakdown, LibraryStats},
    error::AppResult,
    repository::Repository,
};

/// Grouped stats list the five most prolific authors.
const TOP_AUTHORS: i64 = 5;

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Library-wide aggregates for `GET /stats`.
    pub async fn library(&self) -> AppResult<LibraryStats> {
        self.repository.books.library_stats().await
    }

    /// Catalog breakdown by genre plus the top authors.
    pub async fn catalog_breakdown(&self) -> AppResult<CatalogBreakdown> {
        let totals = self.repository.books.library_stats().await?;
        let by_genre = self.repository.books.count_by_genre().await?;
        let top_authors = self.repository.books.top_authors(TOP_AUTHORS).await?;
        Ok(CatalogBreakdown {
            total: totals.total_books,
            by_genre,
            top_authors,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::*;
    use crate::api::stats::{AuthorCount, GenreCount};
    use crate::repository::{MockBookStore, MockBorrowStore};

    #[tokio::test]
    async fn breakdown_combines_totals_groups_and_authors() {
        let mut books = MockBookStore::new();
        books.expect_library_stats().returning(|| {
            Ok(LibraryStats {
                total_books: 12,
                available_books: 9,
                total_genres: 3,
                avg_price: Decimal::new(1550, 2),
                total_pages: 4200,
            })
        });
        books.expect_count_by_genre().returning(|| {
            Ok(vec![GenreCount {
                genre: "SF".to_string(),
                count: 7,
            }])
        });
        books
            .expect_top_authors()
            .withf(|limit| *limit == 5)
            .returning(|_| {
                Ok(vec![AuthorCount {
                    author: "Frank Herbert".to_string(),
                    count: 4,
                }])
            });

        let service = StatsService::new(Repository {
            books: Arc::new(books),
            borrows: Arc::new(MockBorrowStore::new()),
        });
        let breakdown = service.catalog_breakdown().await.unwrap();
        assert_eq!(breakdown.total, 12);
        assert_eq!(breakdown.by_genre[0].genre, "SF");
        assert_eq!(breakdown.top_authors[0].count, 4);
    }
}
