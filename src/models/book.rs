//! Book catalog model and wire types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Book genre classification. Stored as a two-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Genre {
    #[serde(rename = "FI")]
    Fiction,
    #[serde(rename = "SF")]
    SciFi,
    #[serde(rename = "HI")]
    History,
    #[serde(rename = "BI")]
    Biography,
    #[serde(rename = "PR")]
    Programming,
}

impl Genre {
    pub const ALL: [Genre; 5] = [
        Genre::Fiction,
        Genre::SciFi,
        Genre::History,
        Genre::Biography,
        Genre::Programming,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Genre::Fiction => "FI",
            Genre::SciFi => "SF",
            Genre::History => "HI",
            Genre::Biography => "BI",
            Genre::Programming => "PR",
        }
    }

    /// Human-readable label for the wire `genre_display` field.
    pub fn label(&self) -> &'static str {
        match self {
            Genre::Fiction => "Fiction",
            Genre::SciFi => "Science Fiction",
            Genre::History => "History",
            Genre::Biography => "Biography",
            Genre::Programming => "Programming",
        }
    }

    pub fn from_code(code: &str) -> Option<Genre> {
        Genre::ALL.iter().copied().find(|g| g.code() == code)
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Book model from database. Default ordering is by title.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub published_date: NaiveDate,
    pub page_count: i32,
    pub available_copies: i32,
    pub price: Decimal,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

/// Book as serialized on the wire, with derived fields.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    /// ISBN, unique across the catalog
    pub isbn: String,
    /// Two-letter genre code
    pub genre: String,
    /// Human-readable genre label
    pub genre_display: String,
    pub published_date: NaiveDate,
    pub page_count: i32,
    pub available_copies: i32,
    /// Fixed-point price, two fraction digits
    #[schema(value_type = String)]
    pub price: Decimal,
    /// True when at least one copy remains
    pub is_available: bool,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        let genre_display = Genre::from_code(&book.genre)
            .map(|g| g.label().to_string())
            .unwrap_or_else(|| book.genre.clone());
        let is_available = book.is_available();
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            genre: book.genre,
            genre_display,
            published_date: book.published_date,
            page_count: book.page_count,
            available_copies: book.available_copies,
            price: book.price,
            is_available,
        }
    }
}

fn validate_genre_code(code: &str) -> Result<(), ValidationError> {
    if Genre::from_code(code).is_some() {
        return Ok(());
    }
    let mut error = ValidationError::new("genre");
    error.message = Some("unknown genre code".into());
    Err(error)
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        let mut error = ValidationError::new("price");
        error.message = Some("price must not be negative".into());
        return Err(error);
    }
    Ok(())
}

/// Create / full-update request body.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookPayload {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "author must be 1-100 characters"))]
    pub author: String,
    #[validate(length(min = 1, max = 13, message = "isbn must be 1-13 characters"))]
    pub isbn: String,
    #[validate(custom(function = "validate_genre_code"))]
    pub genre: String,
    pub published_date: NaiveDate,
    #[validate(range(min = 0, message = "page count must not be negative"))]
    pub page_count: i32,
    /// Defaults to 1 when omitted
    #[validate(range(min = 0, message = "available copies must not be negative"))]
    pub available_copies: Option<i32>,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String)]
    pub price: Decimal,
}

/// Partial-update request body; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct BookPatch {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100, message = "author must be 1-100 characters"))]
    pub author: Option<String>,
    #[validate(length(min = 1, max = 13, message = "isbn must be 1-13 characters"))]
    pub isbn: Option<String>,
    #[validate(custom(function = "validate_genre_code"))]
    pub genre: Option<String>,
    pub published_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "page count must not be negative"))]
    pub page_count: Option<i32>,
    #[validate(range(min = 0, message = "available copies must not be negative"))]
    pub available_copies: Option<i32>,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
}

impl From<BookPayload> for BookPatch {
    fn from(payload: BookPayload) -> Self {
        Self {
            title: Some(payload.title),
            author: Some(payload.author),
            isbn: Some(payload.isbn),
            genre: Some(payload.genre),
            published_date: Some(payload.published_date),
            page_count: Some(payload.page_count),
            available_copies: payload.available_copies.or(Some(1)),
            price: Some(payload.price),
        }
    }
}

/// Query parameters for `GET /books`
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CatalogQuery {
    /// Substring match on title, author or isbn
    pub search: Option<String>,
    /// Exact genre code
    pub genre: Option<String>,
    /// Exact author name
    pub author: Option<String>,
    /// Pass `1` to restrict to books with copies available
    pub available: Option<String>,
}

/// Query parameters for `GET /books-mixin`
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BrowseQuery {
    pub search: Option<String>,
    pub genre: Option<String>,
}

/// Query parameters for `GET /complex`
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ComplexQuery {
    pub genre: Option<String>,
    pub min_pages: Option<i32>,
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
}

/// Storage-level book filter; combines every supported predicate.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BookFilter {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub author: Option<String>,
    pub available_only: bool,
    pub min_pages: Option<i32>,
    pub max_price: Option<Decimal>,
    pub published_year: Option<i32>,
    pub exclude_id: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> BookPayload {
        BookPayload {
            title: "The Pragmatic Programmer".to_string(),
            author: "David Thomas".to_string(),
            isbn: "9780135957059".to_string(),
            genre: "PR".to_string(),
            published_date: NaiveDate::from_ymd_opt(2019, 9, 13).unwrap(),
            page_count: 352,
            available_copies: None,
            price: Decimal::new(4995, 2),
        }
    }

    #[test]
    fn genre_codes_round_trip() {
        for genre in Genre::ALL {
            assert_eq!(Genre::from_code(genre.code()), Some(genre));
        }
        assert_eq!(Genre::from_code("XX"), None);
        assert_eq!(Genre::SciFi.label(), "Science Fiction");
    }

    #[test]
    fn response_derives_availability_and_label() {
        let book = Book {
            id: 1,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: "9780441172719".to_string(),
            genre: "SF".to_string(),
            published_date: NaiveDate::from_ymd_opt(1965, 8, 1).unwrap(),
            page_count: 412,
            available_copies: 0,
            price: Decimal::new(1299, 2),
        };
        let response = BookResponse::from(book);
        assert!(!response.is_available);
        assert_eq!(response.genre_display, "Science Fiction");
    }

    #[test]
    fn payload_validation_accepts_well_formed_books() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn payload_validation_rejects_bad_fields() {
        let mut bad = payload();
        bad.genre = "ZZ".to_string();
        bad.isbn = "97801359570590000".to_string();
        bad.page_count = -1;
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("genre"));
        assert!(fields.contains_key("isbn"));
        assert!(fields.contains_key("page_count"));
    }

    #[test]
    fn full_update_defaults_available_copies() {
        let patch = BookPatch::from(payload());
        assert_eq!(patch.available_copies, Some(1));
        assert_eq!(patch.title.as_deref(), Some("The Pragmatic Programmer"));
    }
}
