use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{MealPlanStore, StoreError, StoreResult};
use crate::calendar::DateRange;
use crate::models::meal_plan::{CompletedMeal, MealPlanEntry, NewMealPlanEntry};
use crate::services::completion::CompletionRejection;

/// Process-local store with the same semantics as the Postgres one.
#[derive(Default)]
pub struct InMemoryMealPlanStore {
    entries: Mutex<Vec<MealPlanEntry>>,
}

impl InMemoryMealPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<MealPlanEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Drops an entry, as another device regenerating the plan would.
    pub fn remove(&self, id: Uuid) -> StoreResult<()> {
        self.lock()?.retain(|e| e.id != id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Vec<MealPlanEntry>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unexpected("meal plan store poisoned".into()))
    }
}

#[async_trait]
impl MealPlanStore for InMemoryMealPlanStore {
    async fn list_meal_plans(
        &self,
        user_id: Uuid,
        range: DateRange,
    ) -> StoreResult<Vec<MealPlanEntry>> {
        let mut found: Vec<MealPlanEntry> = self
            .lock()?
            .iter()
            .filter(|e| e.user_id == user_id && range.contains(e.date))
            .cloned()
            .collect();
        found.sort_by_key(|e| (e.date, e.meal_type));
        Ok(found)
    }

    async fn get_meal_plan(&self, user_id: Uuid, id: Uuid) -> StoreResult<MealPlanEntry> {
        self.lock()?
            .iter()
            .find(|e| e.id == id && e.user_id == user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn complete_meal_plan(
        &self,
        user_id: Uuid,
        id: Uuid,
        completion: &CompletedMeal,
    ) -> StoreResult<MealPlanEntry> {
        let mut entries = self.lock()?;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id)
            .ok_or(StoreError::NotFound)?;
        if entry.is_completed {
            return Err(CompletionRejection::AlreadyCompleted.into());
        }
        entry.apply_completion(completion);
        Ok(entry.clone())
    }

    async fn bulk_insert_meal_plans(
        &self,
        user_id: Uuid,
        new_entries: &[NewMealPlanEntry],
    ) -> StoreResult<u64> {
        let mut entries = self.lock()?;
        let mut written = 0;
        for new in new_entries {
            let taken = entries.iter().any(|e| {
                e.user_id == user_id && e.date == new.date && e.meal_type == new.meal_type
            });
            if taken {
                continue;
            }
            entries.push(MealPlanEntry {
                id: Uuid::new_v4(),
                user_id,
                diet_plan_id: new.diet_plan_id,
                date: new.date,
                meal_type: new.meal_type,
                planned_food_name: new.planned_food_name.clone(),
                planned_calories: new.planned.calories,
                planned_protein: new.planned.protein,
                planned_carbs: new.planned.carbs,
                planned_fat: new.planned.fat,
                is_completed: false,
                actual_calories: None,
                actual_protein: None,
                actual_carbs: None,
                actual_fat: None,
                instructions: new.instructions.clone(),
                notes: None,
                diet_plan_name: None,
                diet_type: None,
            });
            written += 1;
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarDay;
    use crate::services::generator::generate_daily_meal_plans;

    fn day(s: &str) -> CalendarDay {
        CalendarDay::parse(s).unwrap()
    }

    #[tokio::test]
    async fn bulk_insert_skips_taken_slots() {
        let store = InMemoryMealPlanStore::new();
        let user = Uuid::new_v4();
        let week = generate_daily_meal_plans(None, day("2024-06-10"), day("2024-06-16"));

        assert_eq!(store.bulk_insert_meal_plans(user, &week).await.unwrap(), 28);
        assert_eq!(store.bulk_insert_meal_plans(user, &week[..8]).await.unwrap(), 0);
        assert_eq!(store.bulk_insert_meal_plans(Uuid::new_v4(), &week[..8]).await.unwrap(), 8);
        assert_eq!(store.len(), 36);
    }

    #[tokio::test]
    async fn list_is_scoped_to_user_and_range() {
        let store = InMemoryMealPlanStore::new();
        let user = Uuid::new_v4();
        let entries = generate_daily_meal_plans(None, day("2024-06-01"), day("2024-06-30"));
        store.bulk_insert_meal_plans(user, &entries).await.unwrap();

        let range = DateRange::new(day("2024-06-10"), day("2024-06-16"));
        let listed = store.list_meal_plans(user, range).await.unwrap();
        assert_eq!(listed.len(), 28);
        assert!(listed.iter().all(|e| range.contains(e.date)));
        assert!(store.list_meal_plans(Uuid::new_v4(), range).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn completing_twice_is_rejected() {
        let user = Uuid::new_v4();
        let store = InMemoryMealPlanStore::new();
        let entries = generate_daily_meal_plans(None, day("2024-06-10"), day("2024-06-10"));
        store.bulk_insert_meal_plans(user, &entries).await.unwrap();
        let id = store
            .list_meal_plans(user, DateRange::single(day("2024-06-10")))
            .await
            .unwrap()[0]
            .id;

        let done = CompletedMeal {
            actual: entries[0].planned,
            notes: "ok".into(),
        };
        let updated = store.complete_meal_plan(user, id, &done).await.unwrap();
        assert!(updated.is_completed);
        assert!(matches!(
            store.complete_meal_plan(user, id, &done).await,
            Err(StoreError::Rejected(CompletionRejection::AlreadyCompleted))
        ));
        assert!(matches!(
            store.complete_meal_plan(user, Uuid::new_v4(), &done).await,
            Err(StoreError::NotFound)
        ));
    }
}
