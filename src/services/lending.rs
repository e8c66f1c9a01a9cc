//! Borrow ledger service

use crate::{
    error::{AppError, AppResult},
    models::borrow::BorrowRecord,
    models::user::UserClaims,
    repository::{LedgerScope, Repository},
};

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
}

impl LendingService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book for the requesting user (atomic availability decrement).
    pub async fn borrow(&self, book_id: i64, user_id: i64) -> AppResult<BorrowRecord> {
        self.repository.borrows.borrow(book_id, user_id).await
    }

    /// The ledger as visible to the requester: staff see everything,
    /// everyone else only their own records.
    pub async fn ledger(&self, claims: &UserClaims) -> AppResult<Vec<BorrowRecord>> {
        let scope = LedgerScope::for_claims(claims);
        self.repository.borrows.list(&scope).await
    }

    pub async fn record(&self, id: i64, claims: &UserClaims) -> AppResult<BorrowRecord> {
        let scope = LedgerScope::for_claims(claims);
        self.repository.borrows.get(id, &scope).await
    }

    /// Append a ledger entry without touching availability. The recorded
    /// user is always the requester, whatever the client sent.
    pub async fn create_record(&self, book_id: i64, user_id: i64) -> AppResult<BorrowRecord> {
        match self.repository.books.get(book_id).await {
            Ok(_) => self.repository.borrows.insert(book_id, user_id).await,
            Err(AppError::NotFound(_)) => {
                Err(AppError::field_validation("book", "unknown book id"))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::book::Book;
    use crate::repository::{MockBookStore, MockBorrowStore};

    fn record(id: i64, user_id: i64) -> BorrowRecord {
        BorrowRecord {
            id,
            book_id: 1,
            book_title: "Dune".to_string(),
            user_id,
            user_username: "reader".to_string(),
            borrow_date: NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
            return_date: None,
            returned: false,
        }
    }

    fn service(books: MockBookStore, borrows: MockBorrowStore) -> LendingService {
        LendingService::new(Repository {
            books: Arc::new(books),
            borrows: Arc::new(borrows),
        })
    }

    #[tokio::test]
    async fn staff_sees_the_whole_ledger() {
        let mut borrows = MockBorrowStore::new();
        borrows
            .expect_list()
            .withf(|scope| *scope == LedgerScope::All)
            .returning(|_| Ok(vec![record(1, 2), record(2, 3)]));

        let staff = UserClaims::new(1, "admin", true, 1);
        let ledger = service(MockBookStore::new(), borrows)
            .ledger(&staff)
            .await
            .unwrap();
        assert_eq!(ledger.len(), 2);
    }

    #[tokio::test]
    async fn members_see_only_their_own_records() {
        let mut borrows = MockBorrowStore::new();
        borrows
            .expect_list()
            .withf(|scope| *scope == LedgerScope::User(2))
            .returning(|_| Ok(vec![record(1, 2)]));

        let member = UserClaims::new(2, "reader", false, 1);
        let ledger = service(MockBookStore::new(), borrows)
            .ledger(&member)
            .await
            .unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].user_id, 2);
    }

    #[tokio::test]
    async fn ledger_create_rejects_unknown_book() {
        let mut books = MockBookStore::new();
        books
            .expect_get()
            .returning(|id| Err(AppError::NotFound(format!("Book with id {} not found", id))));
        let mut borrows = MockBorrowStore::new();
        borrows.expect_insert().never();

        let result = service(books, borrows).create_record(99, 2).await;
        match result {
            Err(AppError::Validation(errors)) => {
                assert!(errors.field_errors().contains_key("book"));
            }
            other => panic!("expected validation error, got {:?}", other.map(|r| r.id)),
        }
    }

    #[tokio::test]
    async fn ledger_create_records_the_requester() {
        let mut books = MockBookStore::new();
        books.expect_get().returning(|id| {
            Ok(Book {
                id,
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                isbn: "9780441172719".to_string(),
                genre: "SF".to_string(),
                published_date: NaiveDate::from_ymd_opt(1965, 8, 1).unwrap(),
                page_count: 412,
                available_copies: 1,
                price: Decimal::new(1299, 2),
            })
        });
        let mut borrows = MockBorrowStore::new();
        borrows
            .expect_insert()
            .withf(|book_id, user_id| *book_id == 1 && *user_id == 2)
            .returning(|_, user_id| Ok(record(5, user_id)));

        let created = service(books, borrows).create_record(1, 2).await.unwrap();
        assert_eq!(created.id, 5);
        assert_eq!(created.user_id, 2);
    }
}
