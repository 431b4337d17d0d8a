pub mod diet_plans;
pub mod health;
pub mod meal_plans;
pub mod meals;
pub mod metrics;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};

use crate::middleware::auth::JwtSecret;
use crate::AppState;

/// All API routes. CORS and tracing layers are added by the server binary.
pub fn router(state: AppState) -> Router {
    let jwt_secret = JwtSecret(state.config.jwt_secret.clone());

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics_handler))
        // Meal plans
        .route("/meal-plans", get(meal_plans::list_meal_plans))
        .route("/meal-plans/bulk", post(meal_plans::bulk_insert))
        .route("/meal-plans/generate", post(meal_plans::generate))
        .route("/meal-plans/{id}", get(meal_plans::get_meal_plan))
        .route("/meal-plans/{id}/complete", put(meal_plans::complete_meal_plan))
        // Intake log
        .route("/meals", get(meals::list_meals))
        // Diet plans
        .route("/diet-plans", get(diet_plans::list_diet_plans))
        .route("/diet-plans/active", get(diet_plans::active_diet))
        .route("/diet-plans/{id}/activate", post(diet_plans::activate))
        .route(
            "/diet-plans/{id}/weekly-meals",
            get(diet_plans::list_weekly_meals).post(diet_plans::generate_weekly_meals),
        )
        .layer(Extension(jwt_secret))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::Config;
    use crate::middleware::auth::issue_access_token;
    use crate::store::postgres::PgMealPlanStore;

    const SECRET: &str = "test-secret";

    // The pool never connects; only requests rejected before any query are sent.
    fn app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/mealplan_test")
            .unwrap();
        let config = Config {
            database_url: "postgres://localhost/mealplan_test".into(),
            jwt_secret: SECRET.into(),
            host: "127.0.0.1".into(),
            port: 0,
            app_base_url: "http://localhost".into(),
            db_max_connections: 1,
            default_plan_weeks: 4,
        };
        router(AppState {
            store: PgMealPlanStore::new(pool.clone()),
            db: pool,
            config: Arc::new(config),
        })
    }

    #[tokio::test]
    async fn meal_plans_require_a_token() {
        let response = app()
            .oneshot(Request::get("/meal-plans?week=true").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn tokens_signed_with_another_secret_are_rejected() {
        let token = issue_access_token(Uuid::new_v4(), "other-secret", 60).unwrap();
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri(format!("/meal-plans/{}/complete", Uuid::new_v4()))
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_ranges_are_bad_requests() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, 60).unwrap();
        let response = app()
            .oneshot(
                Request::get("/meal-plans?start=2024-06-12&end=2024-06-10")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn active_diet_and_meal_log_require_a_token() {
        for uri in ["/diet-plans/active", "/meals?date=2024-06-12"] {
            let response = app()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn meal_log_dates_are_validated() {
        let token = issue_access_token(Uuid::new_v4(), SECRET, 60).unwrap();
        let response = app()
            .oneshot(
                Request::get("/meals?date=2024-13-40")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn metrics_are_public() {
        let response = app()
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
