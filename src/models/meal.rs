use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::calendar::CalendarDay;

pub const DEFAULT_MEAL_LOG_LIMIT: i64 = 50;
pub const MAX_MEAL_LOG_LIMIT: i64 = 200;

/// A row of the intake log. Completing a planned meal adds one with
/// `source = "meal_plan"`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LoggedMeal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meal_type: String,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub source: String,
    pub meal_plan_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Query params for GET /meals.
#[derive(Debug, Default, Deserialize)]
pub struct MealLogQuery {
    pub date: Option<CalendarDay>,
    pub limit: Option<i64>,
}

impl MealLogQuery {
    pub fn limit(&self) -> i64 {
        match self.limit {
            Some(n) if n > 0 => n.min(MAX_MEAL_LOG_LIMIT),
            _ => DEFAULT_MEAL_LOG_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(MealLogQuery::default().limit(), 50);
        let query = |limit| MealLogQuery {
            date: None,
            limit: Some(limit),
        };
        assert_eq!(query(10).limit(), 10);
        assert_eq!(query(0).limit(), 50);
        assert_eq!(query(-5).limit(), 50);
        assert_eq!(query(10_000).limit(), 200);
    }
}
