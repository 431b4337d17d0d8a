use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::meal_plan::{Macros, MealType};
use crate::calendar::{CalendarDay, DateRange};

/// Catalogue entry describing one diet a user can follow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DietPlan {
    pub id: Uuid,
    pub name: String,
    /// Diet type key, e.g. "keto" or "mediterranean".
    pub diet_type: String,
    pub daily_calories: i32,
    pub duration_days: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user's active enrolment (at most one per user) joined with its catalogue entry.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ActiveDiet {
    pub user_diet_plan_id: Uuid,
    pub diet_plan_id: Uuid,
    pub name: String,
    pub diet_type: String,
    pub daily_calories: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ActiveDiet {
    pub fn period(&self) -> DateRange {
        DateRange::new(self.start_date.into(), self.end_date.into())
    }
}

/// One slot of a diet's week-numbered template plan (output of the seed generator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMeal {
    pub diet_plan_id: Uuid,
    pub week_number: u32,
    /// 1 = Monday .. 7 = Sunday.
    pub day_of_week: u32,
    pub meal_type: MealType,
    pub food_name: String,
    #[serde(flatten)]
    pub macros: Macros,
    pub portion: String,
    pub instructions: String,
}

/// DB row for `weekly_meal_plans`.
#[derive(Debug, Clone, FromRow)]
pub struct WeeklyMealRecord {
    pub diet_plan_id: Uuid,
    pub week_number: i32,
    pub day_of_week: i32,
    pub meal_type: String,
    pub food_name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub portion: String,
    pub instructions: String,
}

impl TryFrom<WeeklyMealRecord> for WeeklyMeal {
    type Error = anyhow::Error;

    fn try_from(r: WeeklyMealRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            diet_plan_id: r.diet_plan_id,
            week_number: u32::try_from(r.week_number)?,
            day_of_week: u32::try_from(r.day_of_week)?,
            meal_type: r.meal_type.parse()?,
            food_name: r.food_name,
            macros: Macros {
                calories: r.calories.try_into()?,
                protein: r.protein.try_into()?,
                carbs: r.carbs.try_into()?,
                fat: r.fat.try_into()?,
            },
            portion: r.portion,
            instructions: r.instructions,
        })
    }
}

/// Query params for POST /diet-plans/{id}/weekly-meals.
#[derive(Debug, Deserialize)]
pub struct WeeklyMealsQuery {
    pub weeks: Option<u32>,
}

/// Response of POST /diet-plans/{id}/activate.
#[derive(Debug, Serialize)]
pub struct ActivationSummary {
    pub user_diet_plan_id: Uuid,
    pub diet_plan: String,
    pub start_date: CalendarDay,
    pub end_date: CalendarDay,
    pub generated_meals: u64,
}

/// Response of POST /meal-plans/generate.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub message: String,
    pub total_plans: u64,
    pub diet_plan: String,
    pub period: String,
}
