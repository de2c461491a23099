use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UpdatePreferenceRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
    #[serde(rename = "dietName")]
    pub diet_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TotalsParams {
    pub date: Option<String>,
}
