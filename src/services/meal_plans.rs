use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calendar::{compute_week_dates, CalendarDay, DateRange, WeekWindow};
use crate::error::{ApiError, ApiResult};
use crate::models::diet::GenerationSummary;
use crate::models::meal_plan::{CompleteMealRequest, MealPlanEntry, MealPlanQuery, NewMealPlanEntry};
use crate::services::completion::{self, CompletionRejection};
use crate::services::diet_plans::{clear_pending, DietPlanService, MAX_PLAN_WEEKS};
use crate::services::generator::generate_diet_meal_plans;
use crate::services::metrics;
use crate::store::postgres::PgMealPlanStore;
use crate::store::{MealPlanStore, StoreError, StoreResult};

/// What a GET /meal-plans request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    Day(CalendarDay),
    Week(WeekWindow),
    Range(DateRange),
}

impl ListScope {
    pub fn range(&self) -> DateRange {
        match self {
            ListScope::Day(day) => DateRange::single(*day),
            ListScope::Week(window) => window.range(),
            ListScope::Range(range) => *range,
        }
    }
}

/// `date` wins over `week`, which wins over `start`/`end`. Without any of
/// them the current week is listed.
pub fn resolve_scope(query: &MealPlanQuery, today: CalendarDay) -> ApiResult<ListScope> {
    if let Some(day) = query.date {
        return Ok(ListScope::Day(day));
    }
    if query.week {
        let window = compute_week_dates(today, query.week_offset.unwrap_or(0))?;
        return Ok(ListScope::Week(window));
    }
    match (query.start, query.end) {
        (Some(start), Some(end)) if start <= end => {
            Ok(ListScope::Range(DateRange::new(start, end)))
        }
        (Some(_), Some(_)) => Err(ApiError::BadRequest("start must not be after end".into())),
        (None, None) => Ok(ListScope::Week(compute_week_dates(today, 0)?)),
        _ => Err(ApiError::BadRequest("start and end must be given together".into())),
    }
}

/// How the active diet's period relates to a week the user navigated to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coverage {
    Covered,
    /// The period to store so that it also spans the week.
    Extend(DateRange),
    /// More than [`MAX_PLAN_WEEKS`] weeks outside the period. Listed, never planned.
    TooFar,
}

pub fn plan_extension(current: DateRange, window: &WeekWindow) -> Coverage {
    if current.contains(window.start()) && current.contains(window.end()) {
        return Coverage::Covered;
    }
    let reach = i64::from(MAX_PLAN_WEEKS) * 7;
    let bounds = (current.start.add_days(-reach), current.end.add_days(reach));
    let (Ok(earliest), Ok(latest)) = bounds else {
        return Coverage::TooFar;
    };
    if window.start() < earliest || window.end() > latest {
        return Coverage::TooFar;
    }
    Coverage::Extend(DateRange::new(
        current.start.min(window.start()),
        current.end.max(window.end()),
    ))
}

pub struct MealPlanService;

impl MealPlanService {
    pub async fn list(
        store: &PgMealPlanStore,
        user_id: Uuid,
        query: &MealPlanQuery,
        today: CalendarDay,
    ) -> ApiResult<Vec<MealPlanEntry>> {
        let scope = resolve_scope(query, today)?;
        if let ListScope::Week(window) = &scope {
            metrics::WEEK_LOADS_COUNTER.inc();
            if window.week_offset != 0 {
                // Navigation must still show the week when the extension fails.
                if let Err(e) = Self::ensure_week_covered(store, user_id, window).await {
                    warn!("Failed to extend active diet for user {}: {}", user_id, e);
                }
            }
        }
        Ok(store.list_meal_plans(user_id, scope.range()).await?)
    }

    /// Stretches the active diet's period over `window` and plans the days it
    /// gained. Returns the number of entries written, 0 when the week is
    /// already covered or too far away.
    pub async fn ensure_week_covered(
        store: &PgMealPlanStore,
        user_id: Uuid,
        window: &WeekWindow,
    ) -> ApiResult<u64> {
        let pool = store.pool();
        let Some(active) = DietPlanService::active_diet(pool, user_id).await? else {
            return Ok(0);
        };

        let current = active.period();
        let extended = match plan_extension(current, window) {
            Coverage::Extend(extended) => extended,
            Coverage::Covered => return Ok(0),
            Coverage::TooFar => {
                debug!(
                    "Week {} is beyond the reach of {} ({} - {}), not extending",
                    window.week_offset, active.name, current.start, current.end
                );
                return Ok(0);
            }
        };

        sqlx::query("UPDATE user_diet_plans SET start_date = $1, end_date = $2 WHERE id = $3")
            .bind(extended.start)
            .bind(extended.end)
            .bind(active.user_diet_plan_id)
            .execute(pool)
            .await?;

        // Existing slots are kept by the unique (user, date, meal type) index.
        let entries = generate_diet_meal_plans(
            active.diet_plan_id,
            &active.diet_type,
            u32::try_from(active.daily_calories).unwrap_or(0),
            extended.start,
            extended.end,
        );
        let written = store.bulk_insert_meal_plans(user_id, &entries).await?;
        metrics::record_generated("extension", written);
        info!(
            "Extended {} for user {} to {} - {}, {} new meals",
            active.name, user_id, extended.start, extended.end, written
        );
        Ok(written)
    }

    pub async fn get(store: &PgMealPlanStore, user_id: Uuid, id: Uuid) -> ApiResult<MealPlanEntry> {
        Ok(store.get_meal_plan(user_id, id).await?)
    }

    /// Pending → Completed, refusing future days even if the client did not.
    pub async fn complete(
        store: &PgMealPlanStore,
        user_id: Uuid,
        id: Uuid,
        request: &CompleteMealRequest,
        today: CalendarDay,
    ) -> ApiResult<MealPlanEntry> {
        let result = try_complete(store, user_id, id, request, today).await;

        metrics::record_completion(match &result {
            Ok(_) => "completed",
            Err(StoreError::NotFound) => "not_found",
            Err(StoreError::Rejected(CompletionRejection::FutureDate)) => "future_date",
            Err(StoreError::Rejected(CompletionRejection::AlreadyCompleted)) => "already_completed",
            Err(_) => "error",
        });

        let entry = result?;
        info!("User {} completed {} on {}", user_id, entry.meal_type, entry.date);
        Ok(entry)
    }

    pub async fn bulk_insert(
        store: &PgMealPlanStore,
        user_id: Uuid,
        entries: &[NewMealPlanEntry],
    ) -> ApiResult<u64> {
        let written = store.bulk_insert_meal_plans(user_id, entries).await?;
        metrics::record_generated("bulk", written);
        if written < entries.len() as u64 {
            info!(
                "Bulk insert for user {}: {} of {} entries skipped (slot taken)",
                user_id,
                entries.len() as u64 - written,
                entries.len()
            );
        }
        Ok(written)
    }

    /// Replans the whole period of the active diet. Completed meals stay.
    pub async fn generate(store: &PgMealPlanStore, user_id: Uuid) -> ApiResult<GenerationSummary> {
        let active = DietPlanService::active_diet(store.pool(), user_id)
            .await?
            .ok_or_else(|| ApiError::BadRequest("No active diet plan found".into()))?;
        let period = active.period();

        let cleared = clear_pending(store.pool(), user_id, period).await?;
        let entries = generate_diet_meal_plans(
            active.diet_plan_id,
            &active.diet_type,
            u32::try_from(active.daily_calories).unwrap_or(0),
            period.start,
            period.end,
        );
        let written = store.bulk_insert_meal_plans(user_id, &entries).await?;
        metrics::record_generated("regeneration", written);
        info!(
            "Regenerated {} for user {}: {} cleared, {} written",
            active.name, user_id, cleared, written
        );

        Ok(GenerationSummary {
            message: "Meal plans generated successfully!".into(),
            total_plans: written,
            diet_plan: active.name,
            period: format!("{} - {}", period.start, period.end),
        })
    }
}

async fn try_complete(
    store: &PgMealPlanStore,
    user_id: Uuid,
    id: Uuid,
    request: &CompleteMealRequest,
    today: CalendarDay,
) -> StoreResult<MealPlanEntry> {
    let entry = store.get_meal_plan(user_id, id).await?;
    let completed = completion::complete(&entry, request, today)?;
    store.complete_meal_plan(user_id, id, &completed).await
}
