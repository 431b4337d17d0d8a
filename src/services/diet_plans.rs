use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calendar::{CalendarDay, CalendarError, DateRange};
use crate::error::{ApiError, ApiResult};
use crate::models::diet::{ActivationSummary, ActiveDiet, DietPlan, WeeklyMeal, WeeklyMealRecord};
use crate::services::generator::{generate_diet_meal_plans, generate_weekly_meal_plan};
use crate::services::metrics;
use crate::store::postgres::PgMealPlanStore;
use crate::store::MealPlanStore;

pub const MAX_PLAN_WEEKS: u32 = 52;

/// Period of a diet activated on `today`. The end day is inclusive, so a
/// 30-day diet spans 31 calendar days.
pub fn activation_period(
    today: CalendarDay,
    duration_days: i32,
) -> Result<DateRange, CalendarError> {
    if duration_days < 0 {
        return Err(CalendarError::OutOfRange);
    }
    Ok(DateRange::new(today, today.add_days(i64::from(duration_days))?))
}

pub struct DietPlanService;

impl DietPlanService {
    pub async fn list(pool: &PgPool) -> anyhow::Result<Vec<DietPlan>> {
        let plans = sqlx::query_as::<_, DietPlan>(
            r#"SELECT id, name, diet_type, daily_calories, duration_days, description, created_at
               FROM diet_plans
               ORDER BY created_at DESC, name"#,
        )
        .fetch_all(pool)
        .await?;
        Ok(plans)
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> ApiResult<DietPlan> {
        sqlx::query_as::<_, DietPlan>(
            r#"SELECT id, name, diet_type, daily_calories, duration_days, description, created_at
               FROM diet_plans WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Diet plan not found".into()))
    }

    pub async fn active_diet(pool: &PgPool, user_id: Uuid) -> anyhow::Result<Option<ActiveDiet>> {
        let active = sqlx::query_as::<_, ActiveDiet>(
            r#"SELECT udp.id AS user_diet_plan_id, udp.diet_plan_id, dp.name, dp.diet_type,
                      dp.daily_calories, udp.start_date, udp.end_date
               FROM user_diet_plans udp
               JOIN diet_plans dp ON dp.id = udp.diet_plan_id
               WHERE udp.user_id = $1 AND udp.is_active
               LIMIT 1"#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(active)
    }

    /// Makes `diet_plan_id` the user's only active diet, starting today, and
    /// fills its period with rotating-menu meals. Pending entries already in
    /// the period are replaced; completed ones are kept.
    pub async fn activate(
        store: &PgMealPlanStore,
        user_id: Uuid,
        diet_plan_id: Uuid,
        today: CalendarDay,
    ) -> ApiResult<ActivationSummary> {
        let pool = store.pool();
        let plan = Self::get(pool, diet_plan_id).await?;
        let period = activation_period(today, plan.duration_days)?;

        let mut tx = pool.begin().await?;
        sqlx::query("UPDATE user_diet_plans SET is_active = FALSE WHERE user_id = $1 AND is_active")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        let user_diet_plan_id: Uuid = sqlx::query_scalar(
            r#"INSERT INTO user_diet_plans (user_id, diet_plan_id, is_active, start_date, end_date)
               VALUES ($1, $2, TRUE, $3, $4)
               RETURNING id"#,
        )
        .bind(user_id)
        .bind(diet_plan_id)
        .bind(period.start)
        .bind(period.end)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        let generated_meals = match Self::fill_period(store, user_id, &plan, period).await {
            Ok(n) => n,
            Err(e) => {
                // The enrolment stands; POST /meal-plans/generate can retry.
                warn!("Meal generation after activating {} failed: {}", plan.name, e);
                0
            }
        };

        info!(
            "User {} activated {} ({} - {}), {} meals planned",
            user_id, plan.name, period.start, period.end, generated_meals
        );

        Ok(ActivationSummary {
            user_diet_plan_id,
            diet_plan: plan.name,
            start_date: period.start,
            end_date: period.end,
            generated_meals,
        })
    }

    async fn fill_period(
        store: &PgMealPlanStore,
        user_id: Uuid,
        plan: &DietPlan,
        period: DateRange,
    ) -> ApiResult<u64> {
        clear_pending(store.pool(), user_id, period).await?;
        let entries = generate_diet_meal_plans(
            plan.id,
            &plan.diet_type,
            u32::try_from(plan.daily_calories).unwrap_or(0),
            period.start,
            period.end,
        );
        let written = store.bulk_insert_meal_plans(user_id, &entries).await?;
        metrics::record_generated("activation", written);
        Ok(written)
    }

    /// Regenerates the week-numbered template plan of a diet and stores it in
    /// place of the previous one.
    pub async fn generate_weekly_meals(
        pool: &PgPool,
        diet_plan_id: Uuid,
        weeks: u32,
    ) -> ApiResult<Vec<WeeklyMeal>> {
        if weeks == 0 || weeks > MAX_PLAN_WEEKS {
            return Err(ApiError::BadRequest(format!(
                "weeks must be between 1 and {MAX_PLAN_WEEKS}"
            )));
        }
        let plan = Self::get(pool, diet_plan_id).await?;
        let meals =
            generate_weekly_meal_plan(plan.id, &plan.diet_type, weeks, &mut rand::thread_rng())?;

        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM weekly_meal_plans WHERE diet_plan_id = $1")
            .bind(plan.id)
            .execute(&mut *tx)
            .await?;
        for meal in &meals {
            sqlx::query(
                r#"INSERT INTO weekly_meal_plans
                       (diet_plan_id, week_number, day_of_week, meal_type, food_name,
                        calories, protein, carbs, fat, portion, instructions)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
            )
            .bind(meal.diet_plan_id)
            .bind(meal.week_number as i32)
            .bind(meal.day_of_week as i32)
            .bind(meal.meal_type.as_str())
            .bind(&meal.food_name)
            .bind(meal.macros.calories.get())
            .bind(meal.macros.protein.get())
            .bind(meal.macros.carbs.get())
            .bind(meal.macros.fat.get())
            .bind(&meal.portion)
            .bind(&meal.instructions)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        metrics::record_generated("weekly_template", meals.len() as u64);
        info!(
            "Generated {} weekly meals ({} weeks) for {}",
            meals.len(),
            weeks,
            plan.name
        );
        Ok(meals)
    }

    pub async fn weekly_meals(pool: &PgPool, diet_plan_id: Uuid) -> ApiResult<Vec<WeeklyMeal>> {
        Self::get(pool, diet_plan_id).await?;
        let records = sqlx::query_as::<_, WeeklyMealRecord>(
            r#"SELECT diet_plan_id, week_number, day_of_week, meal_type, food_name,
                      calories, protein, carbs, fat, portion, instructions
               FROM weekly_meal_plans
               WHERE diet_plan_id = $1
               ORDER BY week_number, day_of_week,
                        array_position(ARRAY['breakfast','lunch','dinner','snack']::TEXT[],
                                       meal_type)"#,
        )
        .bind(diet_plan_id)
        .fetch_all(pool)
        .await?;

        records
            .into_iter()
            .map(|r| WeeklyMeal::try_from(r).map_err(ApiError::from))
            .collect()
    }
}

/// Deletes the not yet completed entries of `user_id` inside `range`.
pub async fn clear_pending(pool: &PgPool, user_id: Uuid, range: DateRange) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"DELETE FROM meal_plans
           WHERE user_id = $1 AND date BETWEEN $2 AND $3 AND is_completed = FALSE"#,
    )
    .bind(user_id)
    .bind(range.start)
    .bind(range.end)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
