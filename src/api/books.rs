//! Book catalog endpoints (generic views)
//!
//! The router in `main.rs` is the single route table; this module holds the
//! handlers for the `/books*`, `/books-mixin` and `/complex` groups. The
//! viewset-style collections live in [`super::viewsets`].

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::book::{
        BookFilter, BookPatch, BookPayload, BookResponse, BrowseQuery, CatalogQuery, ComplexQuery,
    },
    policy,
};

use super::{AuthenticatedUser, MaybeAuthenticated, ValidatedJson};

fn to_responses(books: Vec<crate::models::book::Book>) -> Vec<BookResponse> {
    books.into_iter().map(BookResponse::from).collect()
}

/// List books with search and exact filters
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(CatalogQuery),
    responses(
        (status = 200, description = "List of books", body = Vec<BookResponse>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    method: Method,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<Vec<BookResponse>>> {
    policy::staff_or_read_only(claims.as_ref(), &method)?;

    let filter = BookFilter {
        search: query.search,
        genre: query.genre,
        author: query.author,
        available_only: query.available.as_deref() == Some("1"),
        ..Default::default()
    };
    let books = state.services.catalog.list(filter).await?;
    Ok(Json(to_responses(books)))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    method: Method,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    ValidatedJson(payload): ValidatedJson<BookPayload>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    policy::staff_or_read_only(claims.as_ref(), &method)?;

    tracing::info!(title = %payload.title, "creating new book");
    let book = state.services.catalog.create(payload).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

/// Create a new book, rejecting duplicate ISBNs up front
#[utoipa::path(
    post,
    path = "/books/create",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid input or duplicate ISBN"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_book_checked(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<BookPayload>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    policy::require_staff(&claims)?;

    let book = state.services.catalog.create_checked(payload).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

/// List only the books with copies available
#[utoipa::path(
    get,
    path = "/books/available",
    tag = "books",
    responses(
        (status = 200, description = "Available books", body = Vec<BookResponse>)
    )
)]
pub async fn available_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BookResponse>>> {
    let filter = BookFilter {
        available_only: true,
        ..Default::default()
    };
    let books = state.services.catalog.list(filter).await?;
    Ok(Json(to_responses(books)))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
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
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    method: Method,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<BookPayload>,
) -> AppResult<Json<BookResponse>> {
    policy::staff_or_read_only(claims.as_ref(), &method)?;

    tracing::info!(book_id = id, "updating book");
    let book = state.services.catalog.update(id, payload.into()).await?;
    Ok(Json(book.into()))
}

/// Partially update a book
#[utoipa::path(
    patch,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookPatch,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn patch_book(
    State(state): State<crate::AppState>,
    method: Method,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    Path(id): Path<i64>,
    ValidatedJson(patch): ValidatedJson<BookPatch>,
) -> AppResult<Json<BookResponse>> {
    policy::staff_or_read_only(claims.as_ref(), &method)?;

    tracing::info!(book_id = id, "updating book");
    let book = state.services.catalog.update(id, patch).await?;
    Ok(Json(book.into()))
}

/// Delete a book (its borrow records cascade)
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    method: Method,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    policy::staff_or_read_only(claims.as_ref(), &method)?;

    let book = state.services.catalog.delete(id).await?;
    tracing::info!(book_id = id, title = %book.title, "deleted book");
    Ok(StatusCode::NO_CONTENT)
}

/// Replace a book (staff-only route)
#[utoipa::path(
    put,
    path = "/books/{id}/update",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn admin_update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<BookPayload>,
) -> AppResult<Json<BookResponse>> {
    policy::require_staff(&claims)?;

    let book = state.services.catalog.update(id, payload.into()).await?;
    Ok(Json(book.into()))
}

/// Partially update a book (staff-only route)
#[utoipa::path(
    patch,
    path = "/books/{id}/update",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookPatch,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn admin_patch_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    ValidatedJson(patch): ValidatedJson<BookPatch>,
) -> AppResult<Json<BookResponse>> {
    policy::require_staff(&claims)?;

    tracing::info!(book_id = id, "partial update for book");
    let book = state.services.catalog.update(id, patch).await?;
    Ok(Json(book.into()))
}

/// Get book details by ISBN
#[utoipa::path(
    get,
    path = "/books/isbn/{isbn}",
    tag = "books",
    params(("isbn" = String, Path, description = "Book ISBN")),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book_by_isbn(
    State(state): State<crate::AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.catalog.get_by_isbn(&isbn).await?;
    Ok(Json(book.into()))
}

/// List books with search and genre filters
#[utoipa::path(
    get,
    path = "/books-mixin",
    tag = "books",
    params(BrowseQuery),
    responses(
        (status = 200, description = "List of books", body = Vec<BookResponse>)
    )
)]
pub async fn browse_books(
    State(state): State<crate::AppState>,
    method: Method,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    Query(query): Query<BrowseQuery>,
) -> AppResult<Json<Vec<BookResponse>>> {
    policy::staff_or_read_only(claims.as_ref(), &method)?;

    let filter = BookFilter {
        search: query.search,
        genre: query.genre,
        ..Default::default()
    };
    let books = state.services.catalog.list(filter).await?;
    Ok(Json(to_responses(books)))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books-mixin",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn add_book(
    State(state): State<crate::AppState>,
    method: Method,
    MaybeAuthenticated(claims): MaybeAuthenticated,
    ValidatedJson(payload): ValidatedJson<BookPayload>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    policy::staff_or_read_only(claims.as_ref(), &method)?;

    let book = state.services.catalog.create(payload).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

/// List books with combined filters (genre, minimum pages, maximum price)
#[utoipa::path(
    get,
    path = "/complex",
    tag = "books",
    security(("bearer_auth" = [])),
    params(ComplexQuery),
    responses(
        (status = 200, description = "List of books", body = Vec<BookResponse>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn filter_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<ComplexQuery>,
) -> AppResult<Json<Vec<BookResponse>>> {
    let filter = BookFilter {
        genre: query.genre,
        min_pages: query.min_pages,
        max_price: query.max_price,
        ..Default::default()
    };
    let books = state.services.catalog.list(filter).await?;
    Ok(Json(to_responses(books)))
}

/// Bulk-create books from an array body
#[utoipa::path(
    post,
    path = "/complex",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = Vec<BookPayload>,
    responses(
        (status = 201, description = "Books created", body = Vec<BookResponse>),
        (status = 400, description = "Body is not an array, or an element is invalid"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn bulk_create_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(body): Json<serde_json::Value>,
) -> AppResult<(StatusCode, Json<Vec<BookResponse>>)> {
    let items = body.as_array().ok_or_else(|| {
        AppError::BusinessRule("request body must be an array of books".to_string())
    })?;

    // Validate the whole batch before inserting anything.
    let mut payloads = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let payload: BookPayload = serde_json::from_value(item.clone())
            .map_err(|e| AppError::BadRequest(format!("item {}: {}", index, e)))?;
        validator::Validate::validate(&payload).map_err(AppError::Validation)?;
        payloads.push(payload);
    }

    let books = state.services.catalog.bulk_create(payloads).await?;
    Ok((StatusCode::CREATED, Json(to_responses(books))))
}
