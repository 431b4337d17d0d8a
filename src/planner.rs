//! Client-side controller of the meal-plan screen.
//!
//! Holds the immutable [`ViewState`], the entries loaded for the shown week,
//! and maps store results onto what the screen should show. Loads are split in
//! [`MealPlanner::request`] / [`MealPlanner::apply`] so that a response for a
//! week the user already navigated away from is dropped instead of shown.

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::calendar::{CalendarDay, CalendarError, DateRange, ViewState, WeekWindow};
use crate::models::meal_plan::{CompleteMealRequest, MealPlanEntry};
use crate::services::completion::{self, CompletionRejection};
use crate::services::day_selector::meals_for_day;
use crate::store::{MealPlanStore, StoreError, StoreResult};

/// Parameters a week load was issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRequest {
    pub week_offset: i64,
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    /// The user navigated elsewhere while the request was in flight.
    Stale,
    /// The week is shown empty; pull-to-refresh retries.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    Completed(MealPlanEntry),
    RejectedFutureDate,
    AlreadyCompleted,
    /// The entry vanished server-side; the week has been reloaded.
    NotFound,
    Failed(String),
}

/// One meal of the selected day as the screen renders it.
#[derive(Debug, Clone, Serialize)]
pub struct MealCard<'a> {
    pub entry: &'a MealPlanEntry,
    pub is_future: bool,
    pub can_complete: bool,
}

pub struct MealPlanner<S> {
    store: S,
    user_id: Uuid,
    today: CalendarDay,
    view: ViewState,
    window: WeekWindow,
    entries: Vec<MealPlanEntry>,
}

impl<S: MealPlanStore> MealPlanner<S> {
    pub fn new(store: S, user_id: Uuid, today: CalendarDay) -> Result<Self, CalendarError> {
        let view = ViewState::initial(today);
        let window = view.window(today)?;
        Ok(Self {
            store,
            user_id,
            today,
            view,
            window,
            entries: Vec::new(),
        })
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn window(&self) -> &WeekWindow {
        &self.window
    }

    pub fn entries(&self) -> &[MealPlanEntry] {
        &self.entries
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Moves `delta` weeks and returns the load to issue for the new week.
    pub fn navigate_week(&mut self, delta: i64) -> Result<WeekRequest, CalendarError> {
        let view = self.view.shifted(delta, self.today);
        self.window = view.window(self.today)?;
        self.view = view;
        self.entries.clear();
        Ok(self.request())
    }

    pub fn select_day(&mut self, index: usize) {
        self.view = self.view.select_day(index);
    }

    pub fn selected_day(&self) -> Option<CalendarDay> {
        self.window.day(self.view.selected_day_index)
    }

    pub fn selected_meals(&self) -> Vec<&MealPlanEntry> {
        meals_for_day(&self.window, self.view.selected_day_index, &self.entries)
    }

    pub fn selected_cards(&self) -> Vec<MealCard<'_>> {
        self.selected_meals()
            .into_iter()
            .map(|entry| MealCard {
                entry,
                is_future: entry.date > self.today,
                can_complete: completion::can_complete(entry, self.today).is_ok(),
            })
            .collect()
    }

    pub fn request(&self) -> WeekRequest {
        WeekRequest {
            week_offset: self.view.week_offset,
            range: self.window.range(),
        }
    }

    pub async fn fetch(&self, request: WeekRequest) -> StoreResult<Vec<MealPlanEntry>> {
        self.store.list_meal_plans(self.user_id, request.range).await
    }

    /// Applies a load result, unless the view has moved on since `request`.
    pub fn apply(
        &mut self,
        request: WeekRequest,
        result: StoreResult<Vec<MealPlanEntry>>,
    ) -> LoadOutcome {
        if request != self.request() {
            debug!(
                requested = request.week_offset,
                current = self.view.week_offset,
                "Dropping stale meal plan response"
            );
            return LoadOutcome::Stale;
        }
        match result {
            Ok(entries) => {
                self.entries = entries;
                LoadOutcome::Loaded(self.entries.len())
            }
            Err(e) => {
                warn!("Failed to load meal plans: {}", e);
                self.entries.clear();
                LoadOutcome::Failed(e.to_string())
            }
        }
    }

    /// Loads the currently shown week.
    pub async fn load_week(&mut self) -> LoadOutcome {
        let request = self.request();
        let result = self.fetch(request).await;
        self.apply(request, result)
    }

    /// Completes one of the loaded entries. Future-dated entries are refused
    /// without a round trip and nothing changes locally unless the store
    /// confirms.
    pub async fn complete_meal(
        &mut self,
        id: Uuid,
        request: &CompleteMealRequest,
    ) -> CompletionOutcome {
        let Some(entry) = self.entries.iter().find(|e| e.id == id) else {
            self.load_week().await;
            return CompletionOutcome::NotFound;
        };

        let completed = match completion::complete(entry, request, self.today) {
            Ok(completed) => completed,
            Err(CompletionRejection::FutureDate) => return CompletionOutcome::RejectedFutureDate,
            Err(CompletionRejection::AlreadyCompleted) => {
                return CompletionOutcome::AlreadyCompleted
            }
        };

        match self
            .store
            .complete_meal_plan(self.user_id, id, &completed)
            .await
        {
            Ok(updated) => {
                if let Some(slot) = self.entries.iter_mut().find(|e| e.id == id) {
                    *slot = updated.clone();
                }
                CompletionOutcome::Completed(updated)
            }
            Err(StoreError::NotFound) => {
                self.load_week().await;
                CompletionOutcome::NotFound
            }
            Err(StoreError::Rejected(CompletionRejection::FutureDate)) => {
                CompletionOutcome::RejectedFutureDate
            }
            Err(StoreError::Rejected(CompletionRejection::AlreadyCompleted)) => {
                CompletionOutcome::AlreadyCompleted
            }
            Err(e) => {
                warn!("Failed to complete meal plan {}: {}", id, e);
                CompletionOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::meal_plan::{CompletedMeal, NewMealPlanEntry, NonNegative};
    use crate::services::generator::generate_daily_meal_plans;
    use crate::store::memory::InMemoryMealPlanStore;
    use async_trait::async_trait;

    fn day(s: &str) -> CalendarDay {
        CalendarDay::parse(s).unwrap()
    }

    async fn seeded(user: Uuid, from: &str, to: &str) -> InMemoryMealPlanStore {
        let store = InMemoryMealPlanStore::new();
        let entries = generate_daily_meal_plans(None, day(from), day(to));
        store.bulk_insert_meal_plans(user, &entries).await.unwrap();
        store
    }

    struct OfflineStore;

    #[async_trait]
    impl MealPlanStore for OfflineStore {
        async fn list_meal_plans(&self, _: Uuid, _: DateRange) -> StoreResult<Vec<MealPlanEntry>> {
            Err(StoreError::Unexpected("connection refused".into()))
        }
        async fn get_meal_plan(&self, _: Uuid, _: Uuid) -> StoreResult<MealPlanEntry> {
            Err(StoreError::Unexpected("connection refused".into()))
        }
        async fn complete_meal_plan(
            &self,
            _: Uuid,
            _: Uuid,
            _: &CompletedMeal,
        ) -> StoreResult<MealPlanEntry> {
            Err(StoreError::Unexpected("connection refused".into()))
        }
        async fn bulk_insert_meal_plans(
            &self,
            _: Uuid,
            _: &[NewMealPlanEntry],
        ) -> StoreResult<u64> {
            Err(StoreError::Unexpected("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn loads_the_current_week_with_today_selected() {
        let user = Uuid::new_v4();
        let store = seeded(user, "2024-06-01", "2024-06-30").await;
        let mut planner = MealPlanner::new(store, user, day("2024-06-12")).unwrap();

        assert_eq!(planner.load_week().await, LoadOutcome::Loaded(28));
        assert_eq!(planner.selected_day(), Some(day("2024-06-12")));
        assert_eq!(planner.selected_meals().len(), 4);
        assert_eq!(planner.window().title(), "This week");
    }

    #[tokio::test]
    async fn stale_responses_are_dropped() {
        let user = Uuid::new_v4();
        let store = seeded(user, "2024-06-01", "2024-06-30").await;
        let mut planner = MealPlanner::new(store, user, day("2024-06-12")).unwrap();

        let first = planner.request();
        let first_result = planner.fetch(first).await;
        let second = planner.navigate_week(1).unwrap();
        let second_result = planner.fetch(second).await;

        assert_eq!(planner.apply(second, second_result), LoadOutcome::Loaded(28));
        assert_eq!(planner.apply(first, first_result), LoadOutcome::Stale);
        assert!(planner.entries().iter().all(|e| e.date >= day("2024-06-17")));
    }

    #[tokio::test]
    async fn failed_loads_show_an_empty_week() {
        let mut planner =
            MealPlanner::new(OfflineStore, Uuid::new_v4(), day("2024-06-12")).unwrap();
        assert!(matches!(planner.load_week().await, LoadOutcome::Failed(_)));
        assert!(planner.entries().is_empty());
        assert!(planner.selected_meals().is_empty());
    }

    #[tokio::test]
    async fn future_meals_are_refused_locally() {
        let user = Uuid::new_v4();
        let store = seeded(user, "2024-06-10", "2024-06-16").await;
        let mut planner = MealPlanner::new(store, user, day("2024-06-12")).unwrap();
        planner.load_week().await;
        planner.select_day(4);

        let cards = planner.selected_cards();
        assert!(cards.iter().all(|c| c.is_future && !c.can_complete));
        let id = cards[0].entry.id;

        let outcome = planner.complete_meal(id, &CompleteMealRequest::default()).await;
        assert_eq!(outcome, CompletionOutcome::RejectedFutureDate);
        let stored = planner.store().get_meal_plan(user, id).await.unwrap();
        assert!(!stored.is_completed);
    }

    #[tokio::test]
    async fn completing_today_records_actuals() {
        let user = Uuid::new_v4();
        let store = seeded(user, "2024-06-10", "2024-06-16").await;
        let mut planner = MealPlanner::new(store, user, day("2024-06-12")).unwrap();
        planner.load_week().await;

        let id = planner.selected_meals()[1].id;
        let request = CompleteMealRequest {
            actual_calories: Some(NonNegative::new(610.0).unwrap()),
            ..Default::default()
        };
        let CompletionOutcome::Completed(updated) = planner.complete_meal(id, &request).await else {
            panic!("expected completion");
        };
        assert!(updated.is_completed);
        assert_eq!(updated.actual_calories.map(NonNegative::get), Some(610.0));
        assert_eq!(updated.actual_protein, Some(updated.planned_protein));
        assert!(planner.selected_meals()[1].is_completed);

        let again = planner.complete_meal(id, &request).await;
        assert_eq!(again, CompletionOutcome::AlreadyCompleted);
    }

    #[tokio::test]
    async fn vanished_entries_trigger_a_reload() {
        let user = Uuid::new_v4();
        let store = seeded(user, "2024-06-10", "2024-06-16").await;
        let mut planner = MealPlanner::new(store, user, day("2024-06-12")).unwrap();
        planner.load_week().await;

        let id = planner.selected_meals()[0].id;
        planner.store().remove(id).unwrap();

        let outcome = planner.complete_meal(id, &CompleteMealRequest::default()).await;
        assert_eq!(outcome, CompletionOutcome::NotFound);
        assert_eq!(planner.entries().len(), 27);
        assert!(planner.entries().iter().all(|e| e.id != id));
    }

    #[tokio::test]
    async fn store_failures_leave_state_unchanged() {
        let user = Uuid::new_v4();
        let source = seeded(user, "2024-06-10", "2024-06-16").await;
        let entries = source
            .list_meal_plans(user, DateRange::new(day("2024-06-10"), day("2024-06-16")))
            .await
            .unwrap();

        let mut planner = MealPlanner::new(OfflineStore, user, day("2024-06-12")).unwrap();
        let request = planner.request();
        planner.apply(request, Ok(entries));

        let id = planner.selected_meals()[0].id;
        let outcome = planner.complete_meal(id, &CompleteMealRequest::default()).await;
        assert!(matches!(outcome, CompletionOutcome::Failed(_)));
        assert!(!planner.selected_meals()[0].is_completed);
    }
}
