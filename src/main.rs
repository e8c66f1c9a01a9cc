//! Libram Server - Book Lending REST API

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libram_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("libram_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Libram Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::postgres(pool);
    let services = Services::new(repository);

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router. This is the complete route table: every
/// endpoint and its handler is registered here and nowhere else.
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Library statistics
        .route("/stats", get(api::stats::library_stats))
        // Books (generic views)
        .route(
            "/books",
            get(api::books::list_books).post(api::books::create_book),
        )
        .route("/books/create", post(api::books::create_book_checked))
        .route("/books/available", get(api::books::available_books))
        .route(
            "/books/:id",
            get(api::books::get_book)
                .put(api::books::update_book)
                .patch(api::books::patch_book)
                .delete(api::books::delete_book),
        )
        .route(
            "/books/:id/update",
            put(api::books::admin_update_book).patch(api::books::admin_patch_book),
        )
        .route("/books/isbn/:isbn", get(api::books::get_book_by_isbn))
        .route(
            "/books-mixin",
            get(api::books::browse_books).post(api::books::add_book),
        )
        .route(
            "/complex",
            get(api::books::filter_books).post(api::books::bulk_create_books),
        )
        // Full-CRUD book collection with custom actions
        .route(
            "/api/books-viewset",
            get(api::viewsets::catalog_list).post(api::viewsets::catalog_create),
        )
        .route("/api/books-viewset/stats", get(api::viewsets::catalog_stats))
        .route(
            "/api/books-viewset/:id",
            get(api::viewsets::catalog_retrieve)
                .put(api::viewsets::catalog_update)
                .patch(api::viewsets::catalog_patch)
                .delete(api::viewsets::catalog_delete),
        )
        .route(
            "/api/books-viewset/:id/borrow",
            post(api::viewsets::borrow_book),
        )
        .route(
            "/api/books-viewset/:id/similar_books",
            get(api::viewsets::similar_books),
        )
        // Read-only book collection
        .route("/api/books-readonly", get(api::viewsets::readonly_list))
        .route(
            "/api/books-readonly/recent",
            get(api::viewsets::recent_books),
        )
        .route(
            "/api/books-readonly/:id",
            get(api::viewsets::readonly_retrieve),
        )
        // Borrow ledger
        .route(
            "/api/borrows",
            get(api::borrows::list_borrows).post(api::borrows::create_borrow),
        )
        .route("/api/borrows/:id", get(api::borrows::get_borrow))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .merge(routes)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
