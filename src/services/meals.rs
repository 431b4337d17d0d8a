use sqlx::PgPool;
use uuid::Uuid;

use crate::models::meal::{LoggedMeal, MealLogQuery};

pub struct MealLogService;

impl MealLogService {
    /// Newest first. With a date only that day's meals are listed.
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        query: &MealLogQuery,
    ) -> anyhow::Result<Vec<LoggedMeal>> {
        let meals = sqlx::query_as::<_, LoggedMeal>(
            r#"SELECT id, user_id, name, calories, protein, carbs, fat, meal_type, date,
                      notes, source, meal_plan_id, created_at
               FROM meals
               WHERE user_id = $1 AND ($2::DATE IS NULL OR date = $2)
               ORDER BY date DESC, created_at DESC
               LIMIT $3"#,
        )
        .bind(user_id)
        .bind(query.date)
        .bind(query.limit())
        .fetch_all(pool)
        .await?;
        Ok(meals)
    }
}
