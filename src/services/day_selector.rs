use std::collections::HashSet;

use crate::calendar::{CalendarDay, WeekWindow};
use crate::models::meal_plan::{MealPlanEntry, MealType};

/// Entries planned on `day`, at most one per meal type (first one wins).
pub fn meals_on(day: CalendarDay, entries: &[MealPlanEntry]) -> Vec<&MealPlanEntry> {
    let mut seen: HashSet<MealType> = HashSet::new();
    entries
        .iter()
        .filter(|e| e.date == day)
        .filter(|e| seen.insert(e.meal_type))
        .collect()
}

/// Entries of the selected day of `window`; empty when the index is out of range.
pub fn meals_for_day<'a>(
    window: &WeekWindow,
    selected_index: usize,
    entries: &'a [MealPlanEntry],
) -> Vec<&'a MealPlanEntry> {
    match window.day(selected_index) {
        Some(day) => meals_on(day, entries),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::compute_week_dates;
    use crate::models::meal_plan::NonNegative;
    use uuid::Uuid;

    fn entry(date: &str, meal_type: MealType, name: &str) -> MealPlanEntry {
        MealPlanEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            diet_plan_id: None,
            date: CalendarDay::parse(date).unwrap(),
            meal_type,
            planned_food_name: name.to_string(),
            planned_calories: NonNegative::ZERO,
            planned_protein: NonNegative::ZERO,
            planned_carbs: NonNegative::ZERO,
            planned_fat: NonNegative::ZERO,
            is_completed: false,
            actual_calories: None,
            actual_protein: None,
            actual_carbs: None,
            actual_fat: None,
            instructions: None,
            notes: None,
            diet_plan_name: None,
            diet_type: None,
        }
    }

    #[test]
    fn picks_the_selected_date_only() {
        let window = compute_week_dates(CalendarDay::parse("2024-06-12").unwrap(), 0).unwrap();
        let entries = vec![
            entry("2024-06-11", MealType::Lunch, "tuesday lunch"),
            entry("2024-06-12", MealType::Breakfast, "oats"),
            entry("2024-06-12", MealType::Dinner, "fish"),
            entry("2024-06-13", MealType::Dinner, "thursday dinner"),
        ];
        let names: Vec<_> = meals_for_day(&window, 2, &entries)
            .iter()
            .map(|e| e.planned_food_name.as_str())
            .collect();
        assert_eq!(names, ["oats", "fish"]);
    }

    #[test]
    fn duplicate_meal_types_keep_the_first() {
        let window = compute_week_dates(CalendarDay::parse("2024-06-12").unwrap(), 0).unwrap();
        let entries = vec![
            entry("2024-06-10", MealType::Lunch, "first"),
            entry("2024-06-10", MealType::Snack, "nuts"),
            entry("2024-06-10", MealType::Lunch, "second"),
        ];
        let day = meals_for_day(&window, 0, &entries);
        assert_eq!(day.len(), 2);
        assert_eq!(day[0].planned_food_name, "first");

        let mut types: Vec<_> = day.iter().map(|e| e.meal_type).collect();
        types.dedup();
        assert_eq!(types.len(), day.len());
    }

    #[test]
    fn out_of_range_index_is_empty() {
        let window = compute_week_dates(CalendarDay::parse("2024-06-12").unwrap(), 0).unwrap();
        let entries = vec![entry("2024-06-12", MealType::Lunch, "x")];
        assert!(meals_for_day(&window, 7, &entries).is_empty());
    }
}
