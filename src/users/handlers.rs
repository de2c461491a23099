use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::types::{parse_calendar_date, DailyTotals, PreferenceUpdate, UserPreference};
use crate::users::dto::{TotalsParams, UpdatePreferenceRequest};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/preference/:user_id", get(get_preference))
        .route("/user/preference", post(update_preference))
        .route("/user/daily-totals/:user_id", get(daily_totals))
}

#[instrument(skip(state))]
async fn get_preference(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserPreference>, ApiError> {
    match state.store.user_preference(user_id).await {
        Ok(Some(pref)) => Ok(Json(pref)),
        Ok(None) => Err(ApiError::NotFound(format!(
            "No preferences found for user {user_id}"
        ))),
        Err(e) => Err(ApiError::from_store(e, "Internal server error")),
    }
}

/// Diet-only preference write. Resets the calorie goal and allergy text to
/// their defaults as a side effect; see `PreferenceUpdate::diet_only`.
#[instrument(skip(state, body))]
async fn update_preference(
    State(state): State<AppState>,
    Json(body): Json<UpdatePreferenceRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(user_id), Some(diet_name)) = (body.user_id, body.diet_name) else {
        warn!("preference update missing userId or dietName");
        return Err(ApiError::BadRequest("Missing userId or dietName".into()));
    };

    state
        .store
        .update_user_preferences(user_id, PreferenceUpdate::diet_only(diet_name))
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to update preference"))?;

    info!(user_id, "preference updated");
    Ok(Json(json!({
        "message": format!("Preference updated for user {user_id}")
    })))
}

#[instrument(skip(state))]
async fn daily_totals(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(params): Query<TotalsParams>,
) -> Result<Json<DailyTotals>, ApiError> {
    let date = match params.date.as_deref() {
        Some(raw) => parse_calendar_date(raw)
            .map_err(|_| ApiError::BadRequest(format!("Invalid date: {raw}")))?,
        None => OffsetDateTime::now_utc().date(),
    };

    let totals = state
        .store
        .daily_totals(user_id, date)
        .await
        .map_err(|e| ApiError::from_store(e, "Internal server error"))?;
    Ok(Json(totals))
}
