//! Router-registered book collections
//!
//! Full-CRUD catalog collection with its custom actions (borrow, stats,
//! similar books) and the read-only collection with its `recent` action.

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    Json,
};

use crate::{
    error::AppResult,
    models::book::{BookFilter, BookPatch, BookPayload, BookResponse},
    models::borrow::BorrowRecord,
    policy,
};

use super::{AuthenticatedUser, MaybeAuthenticated, ValidatedJson};

fn to_responses(books: Vec<crate::models::book::Book>) -> Vec<BookResponse> {
    books.into_iter().map(BookResponse::from).collect()
}

/// List all books
#[utoipa::path(
    get,
    path = "/api/books-viewset",
    tag = "books-viewset",
    responses(
        (status = 200, description = "List of books", body = Vec<BookResponse>)
    )
)]
pub async fn catalog_list(
    State(state): State<crate::AppState>,
    method: Method,
    MaybeAuthenticated(claims): MaybeAuthenticated,
) -> AppResult<Json<Vec<BookResponse>>> {
    policy::staff_or_read_only(claims.as_ref(), &method)?;

    let books = state.services.catalog.list(BookFilter::default()).await?;
    Ok(Json(to_responses(books)))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/api/books-viewset",
    tag = "books-viewset",
    security(("bearer_auth" = [])),
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn catalog_create(
    State(state): State<crate::AppState>,
    method: Method,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    ValidatedJson(payload): ValidatedJson<BookPayload>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    policy::staff_or_read_only(claims.as_ref(), &method)?;

    let book = state.services.catalog.create(payload).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

/// Get book details
#[utoipa::path(
    get,
    path = "/api/books-viewset/{id}",
    tag = "books-viewset",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn catalog_retrieve(
    State(state): State<crate::AppState>,
    method: Method,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    Path(id): Path<i64>,
) -> AppResult<Json<BookResponse>> {
    policy::staff_or_read_only(claims.as_ref(), &method)?;

    let book = state.services.catalog.get(id).await?;
    Ok(Json(book.into()))
}

/// Replace a book
#[utoipa::path(
    put,
    path = "/api/books-viewset/{id}",
    tag = "books-viewset",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn catalog_update(
    State(state): State<crate::AppState>,
    method: Method,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<BookPayload>,
) -> AppResult<Json<BookResponse>> {
    policy::staff_or_read_only(claims.as_ref(), &method)?;

    let book = state.services.catalog.update(id, payload.into()).await?;
    Ok(Json(book.into()))
}

/// Partially update a book
#[utoipa::path(
    patch,
    path = "/api/books-viewset/{id}",
    tag = "books-viewset",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookPatch,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn catalog_patch(
    State(state): State<crate::AppState>,
    method: Method,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    Path(id): Path<i64>,
    ValidatedJson(patch): ValidatedJson<BookPatch>,
) -> AppResult<Json<BookResponse>> {
    policy::staff_or_read_only(claims.as_ref(), &method)?;

    let book = state.services.catalog.update(id, patch).await?;
    Ok(Json(book.into()))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/books-viewset/{id}",
    tag = "books-viewset",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn catalog_delete(
    State(state): State<crate::AppState>,
    method: Method,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    policy::staff_or_read_only(claims.as_ref(), &method)?;

    state.services.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Borrow a book: decrements availability and appends a ledger record
#[utoipa::path(
    post,
    path = "/api/books-viewset/{id}/borrow",
    tag = "books-viewset",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 201, description = "Borrow record created", body = BorrowRecord),
        (status = 400, description = "No copies available"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    let record = state.services.lending.borrow(id, claims.user_id).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Catalog breakdown: counts by genre and the top five authors
#[utoipa::path(
    get,
    path = "/api/books-viewset/stats",
    tag = "books-viewset",
    responses(
        (status = 200, description = "Catalog breakdown", body = crate::api::stats::CatalogBreakdown)
    )
)]
pub async fn catalog_stats(
    State(state): State<crate::AppState>,
    method: Method,
    MaybeAuthenticated(claims): MaybeAuthenticated,
) -> AppResult<Json<crate::api::stats::CatalogBreakdown>> {
    policy::staff_or_read_only(claims.as_ref(), &method)?;

    let breakdown = state.services.stats.catalog_breakdown().await?;
    Ok(Json(breakdown))
}

/// Up to five other books sharing this book's genre
#[utoipa::path(
    get,
    path = "/api/books-viewset/{id}/similar_books",
    tag = "books-viewset",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Similar books", body = Vec<BookResponse>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn similar_books(
    State(state): State<crate::AppState>,
    method: Method,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<BookResponse>>> {
    policy::staff_or_read_only(claims.as_ref(), &method)?;

    let books = state.services.catalog.similar(id).await?;
    Ok(Json(to_responses(books)))
}

/// List all books (read-only collection)
#[utoipa::path(
    get,
    path = "/api/books-readonly",
    tag = "books-readonly",
    responses(
        (status = 200, description = "List of books", body = Vec<BookResponse>)
    )
)]
pub async fn readonly_list(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BookResponse>>> {
    let books = state.services.catalog.list(BookFilter::default()).await?;
    Ok(Json(to_responses(books)))
}

/// Get book details (read-only collection)
#[utoipa::path(
    get,
    path = "/api/books-readonly/{id}",
    tag = "books-readonly",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn readonly_retrieve(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.catalog.get(id).await?;
    Ok(Json(book.into()))
}

/// Books published in the current calendar year
#[utoipa::path(
    get,
    path = "/api/books-readonly/recent",
    tag = "books-readonly",
    responses(
        (status = 200, description = "Books published this year", body = Vec<BookResponse>)
    )
)]
pub async fn recent_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BookResponse>>> {
    let books = state.services.catalog.recent().await?;
    Ok(Json(to_responses(books)))
}
