use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    calendar::CalendarDay,
    error::ApiResult,
    models::{
        auth::AuthenticatedUser,
        diet::{ActivationSummary, ActiveDiet, DietPlan, WeeklyMeal, WeeklyMealsQuery},
    },
    services::diet_plans::DietPlanService,
    AppState,
};

/// GET /diet-plans
pub async fn list_diet_plans(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> ApiResult<Json<Vec<DietPlan>>> {
    Ok(Json(DietPlanService::list(&state.db).await?))
}

/// GET /diet-plans/active (`null` without an active diet)
pub async fn active_diet(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Option<ActiveDiet>>> {
    Ok(Json(DietPlanService::active_diet(&state.db, user.user_id).await?))
}

/// POST /diet-plans/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<ActivationSummary>)> {
    let summary =
        DietPlanService::activate(&state.store, user.user_id, id, CalendarDay::today()).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// POST /diet-plans/{id}/weekly-meals?weeks=N
pub async fn generate_weekly_meals(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(params): Query<WeeklyMealsQuery>,
) -> ApiResult<(StatusCode, Json<Vec<WeeklyMeal>>)> {
    let weeks = params.weeks.unwrap_or(state.config.default_plan_weeks);
    let meals = DietPlanService::generate_weekly_meals(&state.db, id, weeks).await?;
    Ok((StatusCode::CREATED, Json(meals)))
}

/// GET /diet-plans/{id}/weekly-meals
pub async fn list_weekly_meals(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<WeeklyMeal>>> {
    DietPlanService::weekly_meals(&state.db, id).await.map(Json)
}
