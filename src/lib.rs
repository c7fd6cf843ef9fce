//! Maven Jobs backend: role dashboards, lead and client registries, expense
//! claims, targets, daily reports, and job descriptions over Postgres.

pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use sqlx::PgPool;

use crate::db::paging::BatchLimits;
use crate::services::auth::TokenSettings;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: config::AppConfig,
}

impl AppState {
    pub fn batch_limits(&self) -> BatchLimits {
        BatchLimits::from_config(&self.config)
    }

    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings::from(&self.config)
    }
}
