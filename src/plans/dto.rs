use serde::Deserialize;

/// `plannedDate` stays a raw JSON value so a non-string (number, object)
/// can be rejected with a 400 before any store call, rather than failing
/// body deserialization.
#[derive(Debug, Deserialize)]
pub struct AddMealPlanRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
    #[serde(rename = "mealId")]
    pub meal_id: Option<i32>,
    #[serde(rename = "plannedDate")]
    pub planned_date: Option<serde_json::Value>,
    #[serde(rename = "mealTime")]
    pub meal_time: Option<String>,
}
