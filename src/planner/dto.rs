use serde::Deserialize;

/// Query parameters for `GET /api/meal-plan`. `calories` and `dining_hall`
/// are required but kept optional here so the handler can answer 400 with a
/// message instead of a query-rejection.
#[derive(Debug, Deserialize)]
pub struct MealPlanQuery {
    pub calories: Option<String>,
    pub dining_hall: Option<String>,
    pub meal_type: Option<String>,
}
