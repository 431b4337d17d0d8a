use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    calendar::CalendarDay,
    error::ApiResult,
    models::{
        auth::AuthenticatedUser,
        diet::GenerationSummary,
        meal_plan::{BulkInsertRequest, CompleteMealRequest, MealPlanEntry, MealPlanQuery},
    },
    services::meal_plans::MealPlanService,
    AppState,
};

/// GET /meal-plans?date= | ?week=true&weekOffset= | ?start=&end=
pub async fn list_meal_plans(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<MealPlanQuery>,
) -> ApiResult<Json<Vec<MealPlanEntry>>> {
    MealPlanService::list(&state.store, user.user_id, &params, CalendarDay::today())
        .await
        .map(Json)
}

/// GET /meal-plans/{id}
pub async fn get_meal_plan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MealPlanEntry>> {
    MealPlanService::get(&state.store, user.user_id, id)
        .await
        .map(Json)
}

/// PUT /meal-plans/{id}/complete (422 for future days, 409 when already done)
pub async fn complete_meal_plan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CompleteMealRequest>,
) -> ApiResult<Json<MealPlanEntry>> {
    MealPlanService::complete(&state.store, user.user_id, id, &body, CalendarDay::today())
        .await
        .map(Json)
}

/// POST /meal-plans/bulk
pub async fn bulk_insert(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<BulkInsertRequest>,
) -> ApiResult<Json<Value>> {
    let inserted = MealPlanService::bulk_insert(&state.store, user.user_id, &body.entries).await?;
    Ok(Json(json!({ "inserted": inserted })))
}

/// POST /meal-plans/generate
pub async fn generate(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<GenerationSummary>> {
    MealPlanService::generate(&state.store, user.user_id)
        .await
        .map(Json)
}
