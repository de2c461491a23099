use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::error::ApiError;
use crate::meals::dto::SuggestParams;
use crate::state::AppState;
use crate::store::types::{DietPlanRecord, MealSuggestion};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meals/suggest", get(suggest_meal))
        .route("/diet-plans", get(list_diet_plans))
}

#[instrument(skip(state))]
async fn suggest_meal(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Result<Json<MealSuggestion>, ApiError> {
    let Some(diet) = params.diet.filter(|d| !d.trim().is_empty()) else {
        return Err(ApiError::BadRequest(
            "Missing 'diet' query parameter".into(),
        ));
    };

    match state.store.random_meal_by_diet(&diet).await {
        Ok(Some(suggestion)) => Ok(Json(suggestion)),
        Ok(None) => Err(ApiError::NotFound(format!(
            "No meals available for diet: {diet}"
        ))),
        Err(e) => Err(ApiError::from_store(e, "Internal server error")),
    }
}

#[instrument(skip(state))]
async fn list_diet_plans(
    State(state): State<AppState>,
) -> Result<Json<Vec<DietPlanRecord>>, ApiError> {
    let plans = state
        .store
        .diet_plans()
        .await
        .map_err(|e| ApiError::from_store(e, "Internal Server Error"))?;
    Ok(Json(plans))
}
