//! Business logic services

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod lending;
pub mod members;
pub mod policy;

use std::sync::Arc;

use crate::{clock::Clock, config::AppConfig, models::PageLimits, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub members: members::MembersService,
    pub lending: lending::LendingService,
    pub dashboard: dashboard::DashboardService,
}

impl Services {
    /// Create all services over one store
    pub fn new(repository: Repository, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let limits = PageLimits {
            default_page_size: config.lending.default_page_size,
            max_page_size: config.lending.max_page_size,
        };

        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            catalog: catalog::CatalogService::new(repository.clone(), clock.clone(), limits),
            members: members::MembersService::new(repository.clone(), clock.clone(), limits),
            lending: lending::LendingService::new(repository.clone(), clock.clone(), config.lending.clone()),
            dashboard: dashboard::DashboardService::new(repository, clock),
        }
    }
}
