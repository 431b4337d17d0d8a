use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{MealPlanStore, StoreError, StoreResult};
use crate::calendar::DateRange;
use crate::models::diet::GenerationSummary;
use crate::models::meal_plan::{
    BulkInsertRequest, CompleteMealRequest, CompletedMeal, MealPlanEntry, NewMealPlanEntry,
};
use crate::services::completion::CompletionRejection;

/// REST client for the meal-plan API. The bearer token identifies the user, so
/// the `user_id` arguments of [`MealPlanStore`] are not sent.
#[derive(Clone)]
pub struct HttpMealPlanStore {
    http: Client,
    base_url: String,
    token: String,
}

#[derive(Deserialize)]
struct BulkInsertResponse {
    inserted: u64,
}

#[derive(Serialize)]
struct WeekQuery {
    week: bool,
    #[serde(rename = "weekOffset")]
    week_offset: i64,
}

impl HttpMealPlanStore {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, token)
    }

    pub fn with_client(
        http: Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<T> {
        let response = request.bearer_auth(&self.token).send().await?;
        decode(response).await
    }

    /// The week `week_offset` weeks from the server's current week. The server
    /// extends an active diet plan to cover it first.
    pub async fn list_week(&self, week_offset: i64) -> StoreResult<Vec<MealPlanEntry>> {
        let query = WeekQuery {
            week: true,
            week_offset,
        };
        self.send(self.http.get(self.url("/meal-plans")).query(&query))
            .await
    }

    /// Regenerates the active diet's meal plans.
    pub async fn generate(&self) -> StoreResult<GenerationSummary> {
        self.send(self.http.post(self.url("/meal-plans/generate")))
            .await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status.to_string());

    Err(error_for(status, message))
}

/// 422 and 409 are only completion rejections when the body says so; axum
/// also answers 422 for request bodies it cannot parse.
fn error_for(status: StatusCode, message: String) -> StoreError {
    let rejection = match status {
        StatusCode::NOT_FOUND => return StoreError::NotFound,
        StatusCode::UNPROCESSABLE_ENTITY => CompletionRejection::FutureDate,
        StatusCode::CONFLICT => CompletionRejection::AlreadyCompleted,
        _ => return StoreError::Unexpected(message),
    };
    if message == rejection.to_string() {
        rejection.into()
    } else {
        StoreError::Unexpected(message)
    }
}

#[async_trait]
impl MealPlanStore for HttpMealPlanStore {
    async fn list_meal_plans(
        &self,
        _user_id: Uuid,
        range: DateRange,
    ) -> StoreResult<Vec<MealPlanEntry>> {
        self.send(self.http.get(self.url("/meal-plans")).query(&range))
            .await
    }

    async fn get_meal_plan(&self, _user_id: Uuid, id: Uuid) -> StoreResult<MealPlanEntry> {
        self.send(self.http.get(self.url(&format!("/meal-plans/{id}"))))
            .await
    }

    async fn complete_meal_plan(
        &self,
        _user_id: Uuid,
        id: Uuid,
        completion: &CompletedMeal,
    ) -> StoreResult<MealPlanEntry> {
        let body = CompleteMealRequest {
            actual_calories: Some(completion.actual.calories),
            actual_protein: Some(completion.actual.protein),
            actual_carbs: Some(completion.actual.carbs),
            actual_fat: Some(completion.actual.fat),
            notes: Some(completion.notes.clone()),
        };
        self.send(
            self.http
                .put(self.url(&format!("/meal-plans/{id}/complete")))
                .json(&body),
        )
        .await
    }

    async fn bulk_insert_meal_plans(
        &self,
        _user_id: Uuid,
        entries: &[NewMealPlanEntry],
    ) -> StoreResult<u64> {
        let body = BulkInsertRequest {
            entries: entries.to_vec(),
        };
        let response: BulkInsertResponse = self
            .send(self.http.post(self.url("/meal-plans/bulk")).json(&body))
            .await?;
        Ok(response.inserted)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        extract::{Path, Query},
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post, put},
        Json, Router,
    };
    use serde_json::json;

    use super::*;
    use crate::calendar::CalendarDay;
    use crate::models::meal_plan::Macros;
    use crate::services::generator::generate_daily_meal_plans;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}/")
    }

    async fn api() -> HttpMealPlanStore {
        let router = Router::new()
            .route(
                "/meal-plans",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    if params.get("week").map(String::as_str) == Some("true")
                        && params.get("weekOffset").map(String::as_str) == Some("-2")
                    {
                        Ok(Json(json!([])))
                    } else {
                        Err(StatusCode::BAD_REQUEST)
                    }
                }),
            )
            .route(
                "/meal-plans/{id}",
                get(|| async {
                    (
                        StatusCode::NOT_FOUND,
                        Json(json!({ "error": "Meal plan not found" })),
                    )
                }),
            )
            .route(
                "/meal-plans/{id}/complete",
                put(|| async {
                    (
                        StatusCode::CONFLICT,
                        Json(json!({ "error": "This meal has already been completed." })),
                    )
                }),
            )
            .route(
                "/meal-plans/bulk",
                post(|Json(body): Json<BulkInsertRequest>| async move {
                    Json(json!({ "inserted": body.entries.len() }))
                }),
            );
        HttpMealPlanStore::new(serve(router).await, "token")
    }

    #[tokio::test]
    async fn week_queries_send_the_offset() {
        let store = api().await;
        assert!(store.list_week(-2).await.unwrap().is_empty());
        assert!(matches!(store.list_week(1).await, Err(StoreError::Unexpected(_))));
    }

    #[tokio::test]
    async fn status_codes_map_to_store_errors() {
        let store = api().await;
        let user = Uuid::new_v4();
        assert!(matches!(
            store.get_meal_plan(user, Uuid::new_v4()).await,
            Err(StoreError::NotFound)
        ));

        let done = CompletedMeal {
            actual: Macros::whole(300, 20, 10, 12),
            notes: "ok".into(),
        };
        assert!(matches!(
            store.complete_meal_plan(user, Uuid::new_v4(), &done).await,
            Err(StoreError::Rejected(CompletionRejection::AlreadyCompleted))
        ));
    }

    #[tokio::test]
    async fn unprocessable_is_a_future_date_only_when_the_body_says_so() {
        let future = Uuid::new_v4();
        let router = Router::new().route(
            "/meal-plans/{id}/complete",
            put(move |Path(id): Path<Uuid>| async move {
                if id == future {
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        Json(json!({ "error": CompletionRejection::FutureDate.to_string() })),
                    )
                        .into_response()
                } else {
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "Failed to deserialize the JSON body into the target type",
                    )
                        .into_response()
                }
            }),
        );
        let store = HttpMealPlanStore::new(serve(router).await, "token");
        let user = Uuid::new_v4();
        let done = CompletedMeal {
            actual: Macros::whole(300, 20, 10, 12),
            notes: "ok".into(),
        };

        assert!(matches!(
            store.complete_meal_plan(user, future, &done).await,
            Err(StoreError::Rejected(CompletionRejection::FutureDate))
        ));
        assert!(matches!(
            store.complete_meal_plan(user, Uuid::new_v4(), &done).await,
            Err(StoreError::Unexpected(msg)) if msg.contains("422")
        ));
    }

    #[test]
    fn conflicts_need_the_already_completed_message() {
        assert!(matches!(
            error_for(StatusCode::CONFLICT, "duplicate key".into()),
            StoreError::Unexpected(_)
        ));
        assert!(matches!(
            error_for(StatusCode::CONFLICT, "This meal has already been completed.".into()),
            StoreError::Rejected(CompletionRejection::AlreadyCompleted)
        ));
        assert!(matches!(
            error_for(StatusCode::NOT_FOUND, String::new()),
            StoreError::NotFound
        ));
    }

    #[tokio::test]
    async fn bulk_insert_reads_the_written_count() {
        let store = api().await;
        let day = CalendarDay::parse("2024-06-10").unwrap();
        let entries = generate_daily_meal_plans(None, day, day);
        assert_eq!(store.bulk_insert_meal_plans(Uuid::new_v4(), &entries).await.unwrap(), 4);
    }
}
