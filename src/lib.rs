//! Libram Book Lending System
//!
//! A REST JSON API for a library book catalog and its borrow ledger:
//! filtered listings, CRUD detail routes, aggregate statistics, and the
//! borrow action, behind staff/owner access rules.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
