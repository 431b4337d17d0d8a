use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::ApiResult,
    models::{
        auth::AuthenticatedUser,
        meal::{LoggedMeal, MealLogQuery},
    },
    services::meals::MealLogService,
    AppState,
};

/// GET /meals?date=&limit=
pub async fn list_meals(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<MealLogQuery>,
) -> ApiResult<Json<Vec<LoggedMeal>>> {
    Ok(Json(MealLogService::list(&state.db, user.user_id, &params).await?))
}
