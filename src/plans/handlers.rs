use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::plans::dto::AddMealPlanRequest;
use crate::state::AppState;
use crate::store::types::{parse_calendar_date, NewMealPlan, DEFAULT_MEAL_TIME};

pub fn routes() -> Router<AppState> {
    Router::new().route("/meal-plans/add", post(add_meal_plan))
}

#[instrument(skip(state, body))]
async fn add_meal_plan(
    State(state): State<AppState>,
    Json(body): Json<AddMealPlanRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(user_id), Some(meal_id), Some(planned_date)) =
        (body.user_id, body.meal_id, body.planned_date)
    else {
        warn!("meal plan add missing required fields");
        return Err(ApiError::BadRequest(
            "Missing required fields: userId, mealId, plannedDate".into(),
        ));
    };

    let Value::String(raw_date) = planned_date else {
        warn!("plannedDate is not a string");
        return Err(ApiError::BadRequest(
            "plannedDate must be a YYYY-MM-DD string".into(),
        ));
    };
    let planned_date = parse_calendar_date(&raw_date)
        .map_err(|_| ApiError::BadRequest(format!("Invalid plannedDate: {raw_date}")))?;

    let plan = NewMealPlan {
        user_id,
        meal_id,
        planned_date,
        meal_time: body.meal_time.unwrap_or_else(|| DEFAULT_MEAL_TIME.into()),
    };
    state
        .store
        .insert_meal_plan(plan)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to save meal plan"))?;

    info!(user_id, meal_id, "meal plan added");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Meal plan added successfully" })),
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::state::AppState;
    use crate::test_util::{request, seeded_store, test_app};

    #[tokio::test]
    async fn add_meal_plan_created_with_message() {
        let app = test_app(AppState::with_store(seeded_store()));
        let (status, body) = request(
            app,
            Method::POST,
            "/api/meal-plans/add",
            Some(json!({
                "userId": 2,
                "mealId": 42,
                "plannedDate": "2025-04-10",
                "mealTime": "Dinner"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Meal plan added successfully");
    }

    #[tokio::test]
    async fn add_meal_plan_requires_core_fields() {
        let app = test_app(AppState::with_store(seeded_store()));
        let (status, body) = request(
            app,
            Method::POST,
            "/api/meal-plans/add",
            Some(json!({ "userId": 2, "mealId": 42 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Missing required fields: userId, mealId, plannedDate"
        );
    }

    #[tokio::test]
    async fn non_string_planned_date_is_rejected_before_any_store_call() {
        let store = std::sync::Arc::new(seeded_store());
        let state = AppState::from_parts(
            store.clone(),
            std::sync::Arc::new(crate::config::AppConfig::for_tests()),
        );
        let app = test_app(state);
        let (status, body) = request(
            app,
            Method::POST,
            "/api/meal-plans/add",
            Some(json!({ "userId": 2, "mealId": 42, "plannedDate": 20250410 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "plannedDate must be a YYYY-MM-DD string");
        assert_eq!(store.meal_plan_count(), 0);
    }

    #[tokio::test]
    async fn malformed_date_string_is_rejected() {
        let store = std::sync::Arc::new(seeded_store());
        let state = AppState::from_parts(
            store.clone(),
            std::sync::Arc::new(crate::config::AppConfig::for_tests()),
        );
        let app = test_app(state);
        let (status, body) = request(
            app,
            Method::POST,
            "/api/meal-plans/add",
            Some(json!({ "userId": 2, "mealId": 42, "plannedDate": "April 10th" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid plannedDate: April 10th");
        assert_eq!(store.meal_plan_count(), 0);
    }

    #[tokio::test]
    async fn added_plan_shows_up_in_daily_totals() {
        let state = AppState::with_store(seeded_store());

        let (status, _) = request(
            test_app(state.clone()),
            Method::POST,
            "/api/meal-plans/add",
            Some(json!({
                "userId": 2,
                "mealId": 42,
                "plannedDate": "2025-04-10",
                "mealTime": "Dinner"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = request(
            test_app(state),
            Method::GET,
            "/api/user/daily-totals/2?date=2025-04-10",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["TotalCalories"], 520);
        assert_eq!(body["TotalProtein"], 38.0);
        assert_eq!(body["TotalFat"], 28.0);
        assert_eq!(body["TotalCarbs"], 22.0);
        assert_eq!(body["MealCount"], 1);
        assert_eq!(body["ForDate"], "2025-04-10");
    }
}
