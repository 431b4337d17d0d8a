use serde::Serialize;

use crate::calendar::CalendarDay;
use crate::models::meal_plan::{CompleteMealRequest, CompletedMeal, Macros, MealPlanEntry};

/// Why a completion was refused. These are user notifications, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum CompletionRejection {
    #[error("Meals planned for a future day cannot be completed yet.")]
    FutureDate,
    #[error("This meal has already been completed.")]
    AlreadyCompleted,
}

/// Whether the entry may be completed on `today`.
pub fn can_complete(entry: &MealPlanEntry, today: CalendarDay) -> Result<(), CompletionRejection> {
    if entry.date > today {
        return Err(CompletionRejection::FutureDate);
    }
    if entry.is_completed {
        return Err(CompletionRejection::AlreadyCompleted);
    }
    Ok(())
}

/// Pending → Completed. Missing actuals fall back to the planned values.
pub fn complete(
    entry: &MealPlanEntry,
    request: &CompleteMealRequest,
    today: CalendarDay,
) -> Result<CompletedMeal, CompletionRejection> {
    can_complete(entry, today)?;

    let planned = entry.planned();
    let actual = Macros {
        calories: request.actual_calories.unwrap_or(planned.calories),
        protein: request.actual_protein.unwrap_or(planned.protein),
        carbs: request.actual_carbs.unwrap_or(planned.carbs),
        fat: request.actual_fat.unwrap_or(planned.fat),
    };
    let notes = request
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} (from diet plan)", entry.planned_food_name));

    Ok(CompletedMeal { actual, notes })
}
