pub mod auth;
pub mod diet;
pub mod meal;
pub mod meal_plan;
