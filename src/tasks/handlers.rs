use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::types::{TaskUpsert, DEFAULT_TASK_STATUS};
use crate::tasks::dto::UpsertTaskRequest;

pub fn routes() -> Router<AppState> {
    Router::new().route("/tasks", post(upsert_task))
}

#[instrument(skip(state, body))]
async fn upsert_task(
    State(state): State<AppState>,
    Json(body): Json<UpsertTaskRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(task_id), Some(file_path), Some(file_name), Some(description)) =
        (body.task_id, body.file_path, body.file_name, body.description)
    else {
        warn!("task upsert missing required fields");
        return Err(ApiError::BadRequest("Missing required task fields".into()));
    };

    let task = TaskUpsert {
        task_id: task_id.clone(),
        file_path,
        file_name,
        description,
        status: body.status.unwrap_or_else(|| DEFAULT_TASK_STATUS.into()),
    };
    state
        .store
        .upsert_task(task)
        .await
        .map_err(|e| ApiError::from_store(e, "Database operation failed"))?;

    info!(%task_id, "task upserted");
    Ok(Json(json!({
        "message": format!("Task {task_id} processed successfully")
    })))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::state::AppState;
    use crate::store::MemoryStore;
    use crate::test_util::{request, test_app};

    #[tokio::test]
    async fn upsert_task_returns_confirmation_message() {
        let app = test_app(AppState::fake());
        let (status, body) = request(
            app,
            Method::POST,
            "/api/tasks",
            Some(json!({
                "task_id": "SYS_01",
                "file_path": "backend/procedures/",
                "file_name": "sp_UpsertTask.sql",
                "description": "Created Registry SP",
                "status": "Completed"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Task SYS_01 processed successfully");
    }

    #[tokio::test]
    async fn upsert_task_without_required_fields_is_rejected() {
        let app = test_app(AppState::fake());
        let (status, body) = request(
            app,
            Method::POST,
            "/api/tasks",
            Some(json!({ "task_id": "SYS_01" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required task fields");
    }

    #[tokio::test]
    async fn status_defaults_to_pending() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let state = AppState::from_parts(
            store.clone(),
            std::sync::Arc::new(crate::config::AppConfig::for_tests()),
        );
        let app = test_app(state);
        let (status, _) = request(
            app,
            Method::POST,
            "/api/tasks",
            Some(json!({
                "task_id": "SYS_02",
                "file_path": "backend/",
                "file_name": "notes.sql",
                "description": "No status given"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let task = store.task("SYS_02").expect("task stored");
        assert_eq!(task.status, "Pending");
    }
}
