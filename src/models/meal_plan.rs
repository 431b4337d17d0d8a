use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::calendar::CalendarDay;

/// Meal slots of a planned day, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            _ => Err(anyhow::anyhow!("Unknown meal type: {s}")),
        }
    }
}

/// A finite, non-negative quantity (kcal or grams).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct NonNegative(f64);

impl NonNegative {
    pub const ZERO: NonNegative = NonNegative(0.0);

    pub fn new(value: f64) -> anyhow::Result<Self> {
        anyhow::ensure!(
            value.is_finite() && value >= 0.0,
            "value must be a non-negative number, got {value}"
        );
        Ok(Self(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for NonNegative {
    type Error = anyhow::Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonNegative> for f64 {
    fn from(value: NonNegative) -> Self {
        value.0
    }
}

impl From<u32> for NonNegative {
    fn from(value: u32) -> Self {
        Self(f64::from(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Macros {
    pub calories: NonNegative,
    pub protein: NonNegative,
    pub carbs: NonNegative,
    pub fat: NonNegative,
}

impl Macros {
    /// Whole-number macros, as found in the static templates.
    pub fn whole(calories: u32, protein: u32, carbs: u32, fat: u32) -> Self {
        Self {
            calories: calories.into(),
            protein: protein.into(),
            carbs: carbs.into(),
            fat: fat.into(),
        }
    }
}

/// One planned meal of a user's calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub diet_plan_id: Option<Uuid>,
    pub date: CalendarDay,
    pub meal_type: MealType,
    pub planned_food_name: String,
    pub planned_calories: NonNegative,
    pub planned_protein: NonNegative,
    pub planned_carbs: NonNegative,
    pub planned_fat: NonNegative,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub actual_calories: Option<NonNegative>,
    #[serde(default)]
    pub actual_protein: Option<NonNegative>,
    #[serde(default)]
    pub actual_carbs: Option<NonNegative>,
    #[serde(default)]
    pub actual_fat: Option<NonNegative>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet_plan_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet_type: Option<String>,
}

impl MealPlanEntry {
    pub fn planned(&self) -> Macros {
        Macros {
            calories: self.planned_calories,
            protein: self.planned_protein,
            carbs: self.planned_carbs,
            fat: self.planned_fat,
        }
    }

    /// Actual macros, only once every field has been recorded.
    pub fn actual(&self) -> Option<Macros> {
        Some(Macros {
            calories: self.actual_calories?,
            protein: self.actual_protein?,
            carbs: self.actual_carbs?,
            fat: self.actual_fat?,
        })
    }

    /// Applies a completion to the in-memory value.
    pub fn apply_completion(&mut self, completed: &CompletedMeal) {
        self.is_completed = true;
        self.actual_calories = Some(completed.actual.calories);
        self.actual_protein = Some(completed.actual.protein);
        self.actual_carbs = Some(completed.actual.carbs);
        self.actual_fat = Some(completed.actual.fat);
        self.notes = Some(completed.notes.clone());
    }
}

/// DB row. meal_type is stored as TEXT and parsed in `TryFrom`.
#[derive(Debug, Clone, FromRow)]
pub struct MealPlanRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub diet_plan_id: Option<Uuid>,
    pub date: NaiveDate,
    pub meal_type: String,
    pub planned_food_name: String,
    pub planned_calories: f64,
    pub planned_protein: f64,
    pub planned_carbs: f64,
    pub planned_fat: f64,
    pub is_completed: bool,
    pub actual_calories: Option<f64>,
    pub actual_protein: Option<f64>,
    pub actual_carbs: Option<f64>,
    pub actual_fat: Option<f64>,
    pub instructions: Option<String>,
    pub notes: Option<String>,
    pub diet_plan_name: Option<String>,
    pub diet_type: Option<String>,
}

impl TryFrom<MealPlanRecord> for MealPlanEntry {
    type Error = anyhow::Error;

    fn try_from(r: MealPlanRecord) -> Result<Self, Self::Error> {
        let optional = |v: Option<f64>| v.map(NonNegative::new).transpose();
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            diet_plan_id: r.diet_plan_id,
            date: r.date.into(),
            meal_type: r.meal_type.parse()?,
            planned_food_name: r.planned_food_name,
            planned_calories: NonNegative::new(r.planned_calories)?,
            planned_protein: NonNegative::new(r.planned_protein)?,
            planned_carbs: NonNegative::new(r.planned_carbs)?,
            planned_fat: NonNegative::new(r.planned_fat)?,
            is_completed: r.is_completed,
            actual_calories: optional(r.actual_calories)?,
            actual_protein: optional(r.actual_protein)?,
            actual_carbs: optional(r.actual_carbs)?,
            actual_fat: optional(r.actual_fat)?,
            instructions: r.instructions,
            notes: r.notes,
            diet_plan_name: r.diet_plan_name,
            diet_type: r.diet_type,
        })
    }
}

/// A planned meal waiting to be written; the owner comes from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMealPlanEntry {
    #[serde(default)]
    pub diet_plan_id: Option<Uuid>,
    pub date: CalendarDay,
    pub meal_type: MealType,
    pub planned_food_name: String,
    #[serde(flatten)]
    pub planned: Macros,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Body for PUT /meal-plans/{id}/complete. Field names follow the mobile client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteMealRequest {
    #[serde(default)]
    pub actual_calories: Option<NonNegative>,
    #[serde(default)]
    pub actual_protein: Option<NonNegative>,
    #[serde(default)]
    pub actual_carbs: Option<NonNegative>,
    #[serde(default)]
    pub actual_fat: Option<NonNegative>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Resolved result of a completion: what gets persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedMeal {
    pub actual: Macros,
    pub notes: String,
}

/// Query params for GET /meal-plans.
#[derive(Debug, Default, Deserialize)]
pub struct MealPlanQuery {
    pub date: Option<CalendarDay>,
    #[serde(default)]
    pub week: bool,
    #[serde(rename = "weekOffset")]
    pub week_offset: Option<i64>,
    pub start: Option<CalendarDay>,
    pub end: Option<CalendarDay>,
}

/// Body for POST /meal-plans/bulk.
#[derive(Debug, Deserialize, Serialize)]
pub struct BulkInsertRequest {
    pub entries: Vec<NewMealPlanEntry>,
}
