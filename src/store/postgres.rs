use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{MealPlanStore, StoreError, StoreResult};
use crate::calendar::DateRange;
use crate::models::meal_plan::{CompletedMeal, MealPlanEntry, MealPlanRecord, NewMealPlanEntry};
use crate::services::completion::CompletionRejection;

const ENTRY_COLUMNS: &str = r#"mp.id, mp.user_id, mp.diet_plan_id, mp.date, mp.meal_type,
       mp.planned_food_name, mp.planned_calories, mp.planned_protein,
       mp.planned_carbs, mp.planned_fat, mp.is_completed,
       mp.actual_calories, mp.actual_protein, mp.actual_carbs, mp.actual_fat,
       mp.instructions, mp.notes,
       dp.name AS diet_plan_name, dp.diet_type AS diet_type"#;

const MEAL_ORDER: &str =
    "array_position(ARRAY['breakfast','lunch','dinner','snack']::TEXT[], mp.meal_type)";

#[derive(Clone)]
pub struct PgMealPlanStore {
    pool: PgPool,
}

impl PgMealPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn to_entry(record: MealPlanRecord) -> StoreResult<MealPlanEntry> {
    MealPlanEntry::try_from(record).map_err(|e| StoreError::Unexpected(e.to_string()))
}

#[async_trait]
impl MealPlanStore for PgMealPlanStore {
    async fn list_meal_plans(
        &self,
        user_id: Uuid,
        range: DateRange,
    ) -> StoreResult<Vec<MealPlanEntry>> {
        let records = sqlx::query_as::<_, MealPlanRecord>(&format!(
            r#"SELECT {ENTRY_COLUMNS}
               FROM meal_plans mp
               LEFT JOIN diet_plans dp ON dp.id = mp.diet_plan_id
               WHERE mp.user_id = $1 AND mp.date BETWEEN $2 AND $3
               ORDER BY mp.date, {MEAL_ORDER}"#
        ))
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(to_entry).collect()
    }

    async fn get_meal_plan(&self, user_id: Uuid, id: Uuid) -> StoreResult<MealPlanEntry> {
        let record = sqlx::query_as::<_, MealPlanRecord>(&format!(
            r#"SELECT {ENTRY_COLUMNS}
               FROM meal_plans mp
               LEFT JOIN diet_plans dp ON dp.id = mp.diet_plan_id
               WHERE mp.id = $1 AND mp.user_id = $2"#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        to_entry(record)
    }

    async fn complete_meal_plan(
        &self,
        user_id: Uuid,
        id: Uuid,
        completion: &CompletedMeal,
    ) -> StoreResult<MealPlanEntry> {
        let mut tx = self.pool.begin().await?;

        // Only pending rows match, so concurrent completions cannot both win.
        let updated: Option<Uuid> = sqlx::query_scalar(
            r#"UPDATE meal_plans
               SET is_completed    = TRUE,
                   actual_calories = $3,
                   actual_protein  = $4,
                   actual_carbs    = $5,
                   actual_fat      = $6,
                   notes           = $7,
                   completed_at    = NOW(),
                   updated_at      = NOW()
               WHERE id = $1 AND user_id = $2 AND is_completed = FALSE
               RETURNING id"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(completion.actual.calories.get())
        .bind(completion.actual.protein.get())
        .bind(completion.actual.carbs.get())
        .bind(completion.actual.fat.get())
        .bind(&completion.notes)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM meal_plans WHERE id = $1 AND user_id = $2)",
            )
            .bind(id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
            return Err(if exists {
                CompletionRejection::AlreadyCompleted.into()
            } else {
                StoreError::NotFound
            });
        }

        // Completed plan meals also count towards the day's logged intake.
        sqlx::query(
            r#"INSERT INTO meals
                   (user_id, name, calories, protein, carbs, fat, meal_type, date, notes,
                    source, meal_plan_id)
               SELECT user_id, planned_food_name, actual_calories, actual_protein,
                      actual_carbs, actual_fat, meal_type, date, notes, 'meal_plan', id
               FROM meal_plans WHERE id = $1"#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let record = sqlx::query_as::<_, MealPlanRecord>(&format!(
            r#"SELECT {ENTRY_COLUMNS}
               FROM meal_plans mp
               LEFT JOIN diet_plans dp ON dp.id = mp.diet_plan_id
               WHERE mp.id = $1"#
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        to_entry(record)
    }

    async fn bulk_insert_meal_plans(
        &self,
        user_id: Uuid,
        entries: &[NewMealPlanEntry],
    ) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0;
        for entry in entries {
            let result = sqlx::query(
                r#"INSERT INTO meal_plans
                       (user_id, diet_plan_id, date, meal_type, planned_food_name,
                        planned_calories, planned_protein, planned_carbs, planned_fat,
                        instructions)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                   ON CONFLICT (user_id, date, meal_type) DO NOTHING"#,
            )
            .bind(user_id)
            .bind(entry.diet_plan_id)
            .bind(entry.date)
            .bind(entry.meal_type.as_str())
            .bind(&entry.planned_food_name)
            .bind(entry.planned.calories.get())
            .bind(entry.planned.protein.get())
            .bind(entry.planned.carbs.get())
            .bind(entry.planned.fat.get())
            .bind(&entry.instructions)
            .execute(&mut *tx)
            .await?;
            written += result.rows_affected();
        }
        tx.commit().await?;
        Ok(written)
    }
}
