pub mod completion;
pub mod day_selector;
pub mod diet_plans;
pub mod diet_templates;
pub mod generator;
pub mod meal_plans;
pub mod meals;
pub mod metrics;
