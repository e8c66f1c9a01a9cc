//! API integration tests
//!
//! These drive a running server (default http://localhost:8080) with the
//! seeded users from the migrations: id 1 `admin` (staff) and id 2 `reader`.
//! Tokens are minted locally with the same secret the server is configured
//! with (JWT_SECRET env var, or the default development secret).
//!
//! Run with: cargo test -- --ignored

use std::time::{SystemTime, UNIX_EPOCH};

use libram_server::models::user::UserClaims;
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080";

fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-this-secret-in-production".to_string())
}

fn staff_token() -> String {
    UserClaims::new(1, "admin", true, 1)
        .create_token(&jwt_secret())
        .expect("Failed to mint staff token")
}

fn reader_token() -> String {
    UserClaims::new(2, "reader", false, 1)
        .create_token(&jwt_secret())
        .expect("Failed to mint reader token")
}

/// Unique 13-digit ISBN per call so tests never collide across runs.
fn fresh_isbn() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{:013}", nanos % 10_000_000_000_000)
}

fn book_body(isbn: &str, copies: i32) -> Value {
    json!({
        "title": format!("Test Book {}", isbn),
        "author": "Test Author",
        "isbn": isbn,
        "genre": "PR",
        "published_date": "2020-05-01",
        "page_count": 240,
        "available_copies": copies,
        "price": "19.90"
    })
}

async fn create_book(client: &Client, isbn: &str, copies: i32) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(staff_token())
        .json(&book_body(isbn, copies))
        .send()
        .await
        .expect("Failed to send create request");
    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse create response")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_library_stats_shape() {
    let client = Client::new();

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["total_books"].is_number());
    assert!(body["available_books"].is_number());
    assert!(body["total_genres"].is_number());
    assert!(body["avg_price"].is_string());
    assert!(body["total_pages"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_list_books_is_public_but_create_is_not() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Anonymous create is rejected for missing credentials
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&book_body(&fresh_isbn(), 1))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    // A non-staff token is forbidden
    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(reader_token())
        .json(&book_body(&fresh_isbn(), 1))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_is_rejected_without_creating_a_row() {
    let client = Client::new();
    let isbn = fresh_isbn();
    create_book(&client, &isbn, 1).await;

    let response = client
        .post(format!("{}/books/create", BASE_URL))
        .bearer_auth(staff_token())
        .json(&book_body(&isbn, 1))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].as_str().unwrap().contains(&isbn));

    // Still exactly one book with that ISBN
    let response = client
        .get(format!("{}/books?search={}", BASE_URL, isbn))
        .send()
        .await
        .expect("Failed to send request");
    let books: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert_eq!(books.len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_validation_errors_are_per_field() {
    let client = Client::new();
    let mut body = book_body(&fresh_isbn(), 1);
    body["genre"] = json!("ZZ");
    body["page_count"] = json!(-5);

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(staff_token())
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let errors: Value = response.json().await.expect("Failed to parse response");
    assert!(errors["genre"].is_array());
    assert!(errors["page_count"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_availability_round_trip() {
    let client = Client::new();
    let isbn = fresh_isbn();
    let created = create_book(&client, &isbn, 0).await;
    let id = created["id"].as_i64().expect("No book ID");
    assert_eq!(created["is_available"], false);

    let listed = |books: Vec<Value>| {
        books
            .into_iter()
            .any(|b| b["id"].as_i64() == Some(id))
    };

    // Zero copies: excluded from the available list
    let books: Vec<Value> = client
        .get(format!("{}/books/available", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(!listed(books));

    // Raise to one copy: included
    let response = client
        .patch(format!("{}/books/{}", BASE_URL, id))
        .bearer_auth(staff_token())
        .json(&json!({"available_copies": 1}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let books: Vec<Value> = client
        .get(format!("{}/books/available", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(listed(books));
}

#[tokio::test]
#[ignore]
async fn test_staff_update_succeeds_and_member_update_is_forbidden() {
    let client = Client::new();
    let isbn = fresh_isbn();
    let created = create_book(&client, &isbn, 1).await;
    let id = created["id"].as_i64().expect("No book ID");

    let mut updated = book_body(&isbn, 1);
    updated["title"] = json!("Renamed Book");

    let response = client
        .put(format!("{}/books/{}", BASE_URL, id))
        .bearer_auth(reader_token())
        .json(&updated)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .put(format!("{}/books/{}", BASE_URL, id))
        .bearer_auth(staff_token())
        .json(&updated)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["title"], "Renamed Book");
}

#[tokio::test]
#[ignore]
async fn test_retrieve_by_isbn() {
    let client = Client::new();
    let isbn = fresh_isbn();
    create_book(&client, &isbn, 2).await;

    let response = client
        .get(format!("{}/books/isbn/{}", BASE_URL, isbn))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["isbn"], isbn.as_str());
    assert_eq!(body["genre_display"], "Programming");
}

#[tokio::test]
#[ignore]
async fn test_bulk_create_requires_an_array_and_is_all_or_nothing() {
    let client = Client::new();

    // Non-array body
    let response = client
        .post(format!("{}/complex", BASE_URL))
        .bearer_auth(reader_token())
        .json(&json!({"title": "not a list"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Valid two-element batch
    let isbn_a = fresh_isbn();
    let isbn_b = fresh_isbn();
    let response = client
        .post(format!("{}/complex", BASE_URL))
        .bearer_auth(reader_token())
        .json(&json!([book_body(&isbn_a, 1), book_body(&isbn_b, 1)]))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let created: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert_eq!(created.len(), 2);

    // Batch with one invalid element creates nothing
    let isbn_c = fresh_isbn();
    let mut bad = book_body(&fresh_isbn(), 1);
    bad["genre"] = json!("ZZ");
    let response = client
        .post(format!("{}/complex", BASE_URL))
        .bearer_auth(reader_token())
        .json(&json!([book_body(&isbn_c, 1), bad]))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = client
        .get(format!("{}/books?search={}", BASE_URL, isbn_c))
        .send()
        .await
        .expect("Failed to send request");
    let books: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert!(books.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_borrow_decrements_until_exhausted() {
    let client = Client::new();
    let isbn = fresh_isbn();
    let created = create_book(&client, &isbn, 1).await;
    let id = created["id"].as_i64().expect("No book ID");

    let response = client
        .post(format!("{}/api/books-viewset/{}/borrow", BASE_URL, id))
        .bearer_auth(reader_token())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let record: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(record["book"], id);
    assert_eq!(record["user"], 2);
    assert_eq!(record["returned"], false);

    let body: Value = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["available_copies"], 0);

    // No copies left: the borrow fails and creates no record
    let response = client
        .post(format!("{}/api/books-viewset/{}/borrow", BASE_URL, id))
        .bearer_auth(reader_token())
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrows_never_oversell() {
    let client = Client::new();
    let isbn = fresh_isbn();
    let created = create_book(&client, &isbn, 1).await;
    let id = created["id"].as_i64().expect("No book ID");

    let borrow = |client: Client| async move {
        client
            .post(format!("{}/api/books-viewset/{}/borrow", BASE_URL, id))
            .bearer_auth(reader_token())
            .send()
            .await
            .expect("Failed to send request")
            .status()
    };

    let (a, b, c, d) = tokio::join!(
        borrow(client.clone()),
        borrow(client.clone()),
        borrow(client.clone()),
        borrow(client.clone())
    );

    let successes = [a, b, c, d].iter().filter(|s| s.as_u16() == 201).count();
    assert_eq!(successes, 1);

    let body: Value = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["available_copies"], 0);
}

#[tokio::test]
#[ignore]
async fn test_ledger_is_scoped_to_the_requester() {
    let client = Client::new();
    let isbn = fresh_isbn();
    let created = create_book(&client, &isbn, 5).await;
    let id = created["id"].as_i64().expect("No book ID");

    // One record for the reader, one for the staff user
    for token in [reader_token(), staff_token()] {
        let response = client
            .post(format!("{}/api/borrows", BASE_URL))
            .bearer_auth(token)
            .json(&json!({"book": id, "user": 999}))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 201);
    }

    let reader_records: Vec<Value> = client
        .get(format!("{}/api/borrows", BASE_URL))
        .bearer_auth(reader_token())
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(!reader_records.is_empty());
    assert!(reader_records.iter().all(|r| r["user"] == 2));

    let staff_records: Vec<Value> = client
        .get(format!("{}/api/borrows", BASE_URL))
        .bearer_auth(staff_token())
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(staff_records.iter().any(|r| r["user"] == 1));
    assert!(staff_records.iter().any(|r| r["user"] == 2));
}

#[tokio::test]
#[ignore]
async fn test_unknown_ids_are_not_found() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books/999999999", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let response = client
        .get(format!("{}/books/isbn/0000000000000", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}
