//! Borrow ledger endpoints
//!
//! The ledger is append-only through this surface: records are created by
//! the borrow action or the create endpoint below, never updated or deleted.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{error::AppResult, models::borrow::{BorrowRecord, CreateBorrowRequest}};

use super::{AuthenticatedUser, ValidatedJson};

/// List borrow records visible to the requester
#[utoipa::path(
    get,
    path = "/api/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Borrow records; staff see all, others only their own", body = Vec<BorrowRecord>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_borrows(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRecord>>> {
    let records = state.services.lending.ledger(&claims).await?;
    Ok(Json(records))
}

/// Get one borrow record
#[utoipa::path(
    get,
    path = "/api/borrows/{id}",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Borrow record ID")),
    responses(
        (status = 200, description = "Borrow record", body = BorrowRecord),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Record not found or not visible to the requester")
    )
)]
pub async fn get_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<BorrowRecord>> {
    let record = state.services.lending.record(id, &claims).await?;
    Ok(Json(record))
}

/// Append a borrow record for the requesting user
#[utoipa::path(
    post,
    path = "/api/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = CreateBorrowRequest,
    responses(
        (status = 201, description = "Borrow record created", body = BorrowRecord),
        (status = 400, description = "Unknown book"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateBorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    // Any client-supplied user id is ignored; the requester is recorded.
    let record = state
        .services
        .lending
        .create_record(request.book, claims.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}
