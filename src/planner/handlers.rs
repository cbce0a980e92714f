use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, instrument, warn};

use crate::{
    error::PlannerError,
    planner::{dto::MealPlanQuery, service::MealPlanRequest},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/meal-plan", get(meal_plan))
}

#[instrument(skip(state))]
pub async fn meal_plan(
    State(state): State<AppState>,
    Query(query): Query<MealPlanQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let (Some(calories), Some(dining_hall)) = (query.calories, query.dining_hall) else {
        warn!("meal-plan request missing calories or dining_hall");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Missing required parameters: calories and dining_hall are required"
            })),
        ));
    };

    let req = MealPlanRequest {
        calories,
        dining_hall,
        meal_type: query.meal_type,
    };

    match state.planner.plan(&req).await {
        Ok(plan) => Ok(Json(plan)),
        Err(PlannerError::Unparseable { raw }) => {
            error!("meal planner returned unparseable output");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Invalid response from meal planner",
                    "raw_output": raw,
                })),
            ))
        }
        Err(PlannerError::Failed { code, stderr }) => {
            error!(?code, "meal planner exited nonzero");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to generate meal plan",
                    "details": stderr,
                })),
            ))
        }
        Err(PlannerError::Spawn(e)) => {
            error!(error = %e, "failed to spawn meal planner");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to generate meal plan",
                    "details": e.to_string(),
                })),
            ))
        }
    }
}
