//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrows, health, stats, viewsets};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libram API",
        version = "0.1.0",
        description = "Book Lending REST API",
        license(name = "MIT")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Stats
        stats::library_stats,
        // Books (generic views)
        books::list_books,
        books::create_book,
        books::create_book_checked,
        books::available_books,
        books::get_book,
        books::update_book,
        books::patch_book,
        books::delete_book,
        books::admin_update_book,
        books::admin_patch_book,
        books::get_book_by_isbn,
        books::browse_books,
        books::add_book,
        books::filter_books,
        books::bulk_create_books,
        // Book collections
        viewsets::catalog_list,
        viewsets::catalog_create,
        viewsets::catalog_retrieve,
        viewsets::catalog_update,
        viewsets::catalog_patch,
        viewsets::catalog_delete,
        viewsets::borrow_book,
        viewsets::catalog_stats,
        viewsets::similar_books,
        viewsets::readonly_list,
        viewsets::readonly_retrieve,
        viewsets::recent_books,
        // Borrow ledger
        borrows::list_borrows,
        borrows::get_borrow,
        borrows::create_borrow,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Genre,
            crate::models::book::BookResponse,
            crate::models::book::BookPayload,
            crate::models::book::BookPatch,
            // Borrows
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::CreateBorrowRequest,
            // Users
            crate::models::user::User,
            // Stats
            crate::api::stats::LibraryStats,
            crate::api::stats::GenreCount,
            crate::api::stats::AuthorCount,
            crate::api::stats::CatalogBreakdown,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "stats", description = "Library statistics"),
        (name = "books", description = "Book catalog management"),
        (name = "books-viewset", description = "Full-CRUD book collection with custom actions"),
        (name = "books-readonly", description = "Read-only book collection"),
        (name = "borrows", description = "Borrow ledger")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
