// Library exports for the server, the seed binary and client code
pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod planner;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use sqlx::PgPool;

use config::Config;
use store::postgres::PgMealPlanStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub store: PgMealPlanStore,
    pub config: Arc<Config>,
}
