//! Bookdesk Library Circulation Server
//!
//! A REST JSON API for a lending library: catalog and copies, members,
//! issue/return of books, reservations and a staff dashboard, backed by an
//! in-memory store. The [`client`] module is a typed façade over the same
//! API that keeps the signed-in session on disk.

use std::sync::Arc;

pub mod api;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
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

impl AppState {
    /// Wire services over an existing store
    pub fn new(config: AppConfig, repository: repository::Repository, clock: Arc<dyn clock::Clock>) -> Self {
        let services = services::Services::new(repository, &config, clock);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
