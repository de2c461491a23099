use serde::Deserialize;

/// Upsert body; required fields stay optional here so absence turns into a
/// 400 with the documented message instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct UpsertTaskRequest {
    pub task_id: Option<String>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}
