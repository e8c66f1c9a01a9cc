//! Borrow ledger model and wire types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Borrow record as stored and serialized. `book_title` and `user_username`
/// are denormalized from the joined tables at query time and are read-only.
/// Default ordering is by borrow date, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRecord {
    pub id: i64,
    #[serde(rename = "book")]
    pub book_id: i64,
    pub book_title: String,
    #[serde(rename = "user")]
    pub user_id: i64,
    pub user_username: String,
    /// Set once at creation, immutable thereafter
    pub borrow_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub returned: bool,
}

/// Create request for the borrow ledger endpoint.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBorrowRequest {
    /// Book ID to record a borrowing event for
    pub book: i64,
    /// Ignored; the ledger always records the requesting user
    #[serde(default)]
    pub user: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_original_contract() {
        let record = BorrowRecord {
            id: 3,
            book_id: 7,
            book_title: "Dune".to_string(),
            user_id: 2,
            user_username: "reader".to_string(),
            borrow_date: NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
            return_date: None,
            returned: false,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["book"], 7);
        assert_eq!(value["user"], 2);
        assert_eq!(value["book_title"], "Dune");
        assert_eq!(value["user_username"], "reader");
        assert_eq!(value["returned"], false);
        assert!(value["return_date"].is_null());
    }

    #[test]
    fn create_request_tolerates_client_supplied_user() {
        let request: CreateBorrowRequest =
            serde_json::from_value(serde_json::json!({"book": 5, "user": 99})).unwrap();
        assert_eq!(request.book, 5);
        assert_eq!(request.user, Some(99));
    }
}
