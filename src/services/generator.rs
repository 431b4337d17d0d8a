//! Meal-plan generators.
//!
//! - [`generate_weekly_meal_plan`]: expands a diet's day-1 template meals over
//!   `weeks × 7` days with small random jitter.
//! - [`generate_daily_meal_plans`]: one generic entry per meal type per day,
//!   fixed macros, no diet awareness.
//! - [`generate_diet_meal_plans`]: dated entries from the diet's rotating menu,
//!   sized from the plan's daily calorie target.

use rand::Rng;
use uuid::Uuid;

use crate::calendar::CalendarDay;
use crate::models::diet::WeeklyMeal;
use crate::models::meal_plan::{Macros, MealType, NewMealPlanEntry, NonNegative};
use crate::services::diet_templates::{calorie_share, rotating_menu_for, template_for};

pub const MIN_CALORIES: f64 = 100.0;
pub const MIN_PROTEIN: f64 = 5.0;
pub const CALORIE_JITTER: i32 = 20;
pub const PROTEIN_JITTER: i32 = 3;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("No meal plan found for diet type: {0}")]
    UnknownDietType(String),
}

fn jitter<R: Rng>(rng: &mut R, base: NonNegative, spread: i32, floor: f64) -> NonNegative {
    let varied = base.get() + f64::from(rng.gen_range(-spread..=spread));
    NonNegative::new(varied.max(floor)).unwrap_or(base)
}

pub fn generate_weekly_meal_plan<R: Rng>(
    diet_plan_id: Uuid,
    diet_type: &str,
    weeks: u32,
    rng: &mut R,
) -> Result<Vec<WeeklyMeal>, GeneratorError> {
    let template = template_for(diet_type)
        .ok_or_else(|| GeneratorError::UnknownDietType(diet_type.to_string()))?;
    let base_meals: Vec<_> = template.iter().filter(|m| m.day_of_week == 1).collect();

    let mut meals = Vec::with_capacity(weeks as usize * 7 * base_meals.len());
    for week_number in 1..=weeks {
        for day_of_week in 1..=7 {
            for base in &base_meals {
                let macros = base.macros();
                meals.push(WeeklyMeal {
                    diet_plan_id,
                    week_number,
                    day_of_week,
                    meal_type: base.meal_type,
                    food_name: base.food_name.to_string(),
                    macros: Macros {
                        calories: jitter(rng, macros.calories, CALORIE_JITTER, MIN_CALORIES),
                        protein: jitter(rng, macros.protein, PROTEIN_JITTER, MIN_PROTEIN),
                        ..macros
                    },
                    portion: base.portion.to_string(),
                    instructions: base.instructions.to_string(),
                });
            }
        }
    }
    Ok(meals)
}

/// Fixed macros of the generic daily plan.
pub fn generic_macros(meal_type: MealType) -> Macros {
    match meal_type {
        MealType::Breakfast => Macros::whole(350, 20, 25, 18),
        MealType::Lunch => Macros::whole(450, 30, 35, 22),
        MealType::Dinner => Macros::whole(500, 35, 30, 25),
        MealType::Snack => Macros::whole(200, 10, 15, 12),
    }
}

pub fn generate_daily_meal_plans(
    diet_plan_id: Option<Uuid>,
    start: CalendarDay,
    end: CalendarDay,
) -> Vec<NewMealPlanEntry> {
    start
        .iter_through(end)
        .flat_map(|date| {
            MealType::ALL.into_iter().map(move |meal_type| NewMealPlanEntry {
                diet_plan_id,
                date,
                meal_type,
                planned_food_name: format!("Planned {meal_type}"),
                planned: generic_macros(meal_type),
                instructions: None,
            })
        })
        .collect()
}

pub fn generate_diet_meal_plans(
    diet_plan_id: Uuid,
    diet_type: &str,
    daily_calories: u32,
    start: CalendarDay,
    end: CalendarDay,
) -> Vec<NewMealPlanEntry> {
    let menu = rotating_menu_for(diet_type);
    start
        .iter_through(end)
        .flat_map(|date| {
            let day_index = date.days_since(start).rem_euclid(7) as usize;
            MealType::ALL.into_iter().map(move |meal_type| {
                let dishes = menu.dishes(meal_type);
                let dish = dishes[day_index % dishes.len()];
                let calories = (f64::from(daily_calories) * calorie_share(meal_type)).round();
                NewMealPlanEntry {
                    diet_plan_id: Some(diet_plan_id),
                    date,
                    meal_type,
                    planned_food_name: dish.name.to_string(),
                    planned: Macros {
                        calories: NonNegative::new(calories).unwrap_or_default(),
                        protein: dish.protein.into(),
                        carbs: dish.carbs.into(),
                        fat: dish.fat.into(),
                    },
                    instructions: Some(dish.instructions.to_string()),
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day(s: &str) -> CalendarDay {
        CalendarDay::parse(s).unwrap()
    }

    #[test]
    fn two_weeks_of_a_four_meal_template() {
        let mut rng = StdRng::seed_from_u64(7);
        let plan_id = Uuid::new_v4();
        let meals = generate_weekly_meal_plan(plan_id, "vegan", 2, &mut rng).unwrap();

        assert_eq!(meals.len(), 2 * 7 * 4);
        assert!(meals.iter().all(|m| m.macros.calories.get() >= MIN_CALORIES));
        assert!(meals.iter().all(|m| m.macros.protein.get() >= MIN_PROTEIN));
        assert!(meals.iter().all(|m| m.diet_plan_id == plan_id));
        assert_eq!(meals.last().map(|m| (m.week_number, m.day_of_week)), Some((2, 7)));
    }

    #[test]
    fn only_day_one_meals_are_expanded() {
        let mut rng = StdRng::seed_from_u64(1);
        let meals = generate_weekly_meal_plan(Uuid::new_v4(), "keto", 1, &mut rng).unwrap();
        assert_eq!(meals.len(), 7 * 4);
        assert!(meals.iter().all(|m| m.food_name != "Lamb Chops"));
    }

    #[test]
    fn jitter_stays_within_bounds_and_leaves_carbs_and_fat() {
        let mut rng = StdRng::seed_from_u64(99);
        let meals =
            generate_weekly_meal_plan(Uuid::new_v4(), "mediterranean", 8, &mut rng).unwrap();
        for m in meals.iter().filter(|m| m.meal_type == MealType::Breakfast) {
            // Greek yoghurt: 320 kcal, 20g protein, 25g carbs, 16g fat
            assert!((300.0..=340.0).contains(&m.macros.calories.get()));
            assert!((17.0..=23.0).contains(&m.macros.protein.get()));
            assert_eq!(m.macros.carbs.get(), 25.0);
            assert_eq!(m.macros.fat.get(), 16.0);
            assert_eq!(m.portion, "200g Greek yoghurt, 30g hazelnuts, honey");
        }
    }

    #[test]
    fn floors_apply_to_small_meals() {
        let mut rng = StdRng::seed_from_u64(3);
        let low = jitter(&mut rng, NonNegative::new(90.0).unwrap(), CALORIE_JITTER, MIN_CALORIES);
        assert!(low.get() >= MIN_CALORIES);
        let tiny = jitter(&mut rng, NonNegative::new(2.0).unwrap(), PROTEIN_JITTER, MIN_PROTEIN);
        assert_eq!(tiny.get(), MIN_PROTEIN);
    }

    #[test]
    fn unknown_diet_type_is_an_error() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            generate_weekly_meal_plan(Uuid::new_v4(), "carnivore", 2, &mut rng),
            Err(GeneratorError::UnknownDietType("carnivore".into()))
        );
    }

    #[test]
    fn daily_plans_cover_every_meal_of_every_day() {
        let entries = generate_daily_meal_plans(None, day("2024-06-10"), day("2024-06-16"));
        assert_eq!(entries.len(), 28);
        assert_eq!(entries[0].planned_food_name, "Planned breakfast");
        assert_eq!(entries[3].planned, Macros::whole(200, 10, 15, 12));
        assert_eq!(entries[27].date, day("2024-06-16"));
        assert!(generate_daily_meal_plans(None, day("2024-06-16"), day("2024-06-10")).is_empty());
    }

    #[test]
    fn rotating_plans_split_daily_calories() {
        let plan = Uuid::new_v4();
        let entries =
            generate_diet_meal_plans(plan, "keto", 2000, day("2024-06-10"), day("2024-06-11"));
        assert_eq!(entries.len(), 8);

        let calories: Vec<f64> = entries[..4].iter().map(|e| e.planned.calories.get()).collect();
        assert_eq!(calories, [500.0, 700.0, 600.0, 200.0]);
        assert_eq!(entries[0].planned_food_name, "Avocado Omelette");
        assert_eq!(entries[4].planned_food_name, "Keto Smoothie");
        assert!(entries.iter().all(|e| e.diet_plan_id == Some(plan)));
    }

    #[test]
    fn rotating_plans_wrap_short_menus() {
        let entries = generate_diet_meal_plans(
            Uuid::new_v4(),
            "mediterranean",
            1800,
            day("2024-06-10"),
            day("2024-06-13"),
        );
        let breakfasts: Vec<_> = entries
            .iter()
            .filter(|e| e.meal_type == MealType::Breakfast)
            .map(|e| e.planned_food_name.as_str())
            .collect();
        assert_eq!(breakfasts[0], breakfasts[3]);
    }
}
