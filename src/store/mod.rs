//! The meal-plan store port and its adapters.
//!
//! Server handlers talk to [`postgres::PgMealPlanStore`]; client code talks to
//! [`http::HttpMealPlanStore`]; [`memory::InMemoryMealPlanStore`] backs tests
//! and offline use. Everything crossing this boundary is already parsed into
//! domain types.

pub mod http;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::calendar::DateRange;
use crate::models::meal_plan::{CompletedMeal, MealPlanEntry, NewMealPlanEntry};
use crate::services::completion::CompletionRejection;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Meal plan not found")]
    NotFound,
    #[error("{0}")]
    Rejected(#[from] CompletionRejection),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Unexpected(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait MealPlanStore: Send + Sync {
    /// Entries of `user_id` dated inside `range`, ordered by date then meal type.
    async fn list_meal_plans(&self, user_id: Uuid, range: DateRange)
        -> StoreResult<Vec<MealPlanEntry>>;

    async fn get_meal_plan(&self, user_id: Uuid, id: Uuid) -> StoreResult<MealPlanEntry>;

    /// Persists a resolved completion. Fails with `NotFound` for unknown ids and
    /// `Rejected(AlreadyCompleted)` when the entry is no longer pending.
    async fn complete_meal_plan(
        &self,
        user_id: Uuid,
        id: Uuid,
        completion: &CompletedMeal,
    ) -> StoreResult<MealPlanEntry>;

    /// Writes new entries; slots already taken for (date, meal type) are skipped.
    /// Returns the number of entries written.
    async fn bulk_insert_meal_plans(
        &self,
        user_id: Uuid,
        entries: &[NewMealPlanEntry],
    ) -> StoreResult<u64>;
}
