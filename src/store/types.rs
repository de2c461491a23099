use serde::Serialize;
use time::{format_description::FormatItem, macros::format_description, Date};

/// Calendar-date wire format, `YYYY-MM-DD`. Dates are normalized to this
/// before they reach storage.
pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub const DEFAULT_TASK_STATUS: &str = "Pending";
pub const DEFAULT_MEAL_TIME: &str = "Lunch";
pub const INITIAL_PLAN_STATUS: &str = "Pending";

/// Statuses that count toward daily totals. Declined/completed plans do not.
pub const COUNTED_PLAN_STATUSES: [&str; 2] = ["Pending", "Accepted"];

/// Calorie goal applied by the diet-only preference write.
pub const DEFAULT_CALORIE_GOAL: i32 = 2500;

pub fn parse_calendar_date(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw.trim(), DATE_FORMAT)
}

pub fn format_calendar_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

#[derive(Debug, Clone)]
pub struct TaskUpsert {
    pub task_id: String,
    pub file_path: String,
    pub file_name: String,
    pub description: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MealRow {
    #[serde(rename = "MealID")]
    pub meal_id: i32,
    #[serde(rename = "MealName")]
    pub meal_name: String,
    #[serde(rename = "ImageURL")]
    pub image_url: Option<String>,
    #[serde(rename = "ProteinGrams")]
    pub protein_grams: f64,
    #[serde(rename = "FatGrams")]
    pub fat_grams: f64,
    #[serde(rename = "CarbGrams")]
    pub carb_grams: f64,
    #[serde(rename = "Calories")]
    pub calories: Option<i32>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct IngredientRow {
    #[serde(rename = "IngredientName")]
    pub ingredient_name: String,
    #[serde(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "SmartGroup")]
    pub smart_group: Option<String>,
}

/// One meal plus its ordered ingredient list. `ingredients` serializes as
/// `[]` when the meal has none, never as a missing key.
#[derive(Debug, Clone, Serialize)]
pub struct MealSuggestion {
    #[serde(flatten)]
    pub meal: MealRow,
    pub ingredients: Vec<IngredientRow>,
}

/// Diet plans are opaque to this layer: whatever columns the procedure
/// returns, keyed by column name.
pub type DietPlanRecord = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserPreference {
    #[serde(rename = "ActiveDietName")]
    pub active_diet_name: String,
}

#[derive(Debug, Clone)]
pub struct PreferenceUpdate {
    pub diet_type: String,
    pub calories_goal: i32,
    pub allergies: String,
}

impl PreferenceUpdate {
    /// Diet-only convenience write. Resets the calorie goal to
    /// [`DEFAULT_CALORIE_GOAL`] and clears the allergy text, overwriting
    /// whatever the user had set before.
    pub fn diet_only(diet_name: impl Into<String>) -> Self {
        Self {
            diet_type: diet_name.into(),
            calories_goal: DEFAULT_CALORIE_GOAL,
            allergies: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMealPlan {
    pub user_id: i64,
    pub meal_id: i32,
    pub planned_date: Date,
    pub meal_time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyTotals {
    #[serde(rename = "TotalCalories")]
    pub total_calories: i64,
    #[serde(rename = "TotalProtein")]
    pub total_protein: f64,
    #[serde(rename = "TotalFat")]
    pub total_fat: f64,
    #[serde(rename = "TotalCarbs")]
    pub total_carbs: f64,
    #[serde(rename = "MealCount")]
    pub meal_count: i64,
    #[serde(rename = "ForDate")]
    pub for_date: String,
}

impl DailyTotals {
    pub fn zero(date: Date) -> Self {
        Self {
            total_calories: 0,
            total_protein: 0.0,
            total_fat: 0.0,
            total_carbs: 0.0,
            meal_count: 0,
            for_date: format_calendar_date(date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_calendar_date_accepts_iso_dates() {
        let date = parse_calendar_date("2025-04-10").expect("valid date");
        assert_eq!(format_calendar_date(date), "2025-04-10");
    }

    #[test]
    fn parse_calendar_date_rejects_garbage() {
        assert!(parse_calendar_date("tomorrow").is_err());
        assert!(parse_calendar_date("2025-13-40").is_err());
        assert!(parse_calendar_date("").is_err());
    }

    #[test]
    fn meal_suggestion_serializes_with_wire_field_names() {
        let suggestion = MealSuggestion {
            meal: MealRow {
                meal_id: 42,
                meal_name: "Keto Omelette".into(),
                image_url: None,
                protein_grams: 38.0,
                fat_grams: 28.0,
                carb_grams: 22.0,
                calories: Some(520),
            },
            ingredients: vec![],
        };
        let json = serde_json::to_value(&suggestion).expect("serializable");
        assert_eq!(json["MealID"], 42);
        assert_eq!(json["MealName"], "Keto Omelette");
        assert_eq!(json["ingredients"], serde_json::json!([]));
    }

    #[test]
    fn diet_only_update_resets_goal_and_allergies() {
        let update = PreferenceUpdate::diet_only("Keto");
        assert_eq!(update.diet_type, "Keto");
        assert_eq!(update.calories_goal, DEFAULT_CALORIE_GOAL);
        assert!(update.allergies.is_empty());
    }

    #[test]
    fn zero_totals_carry_the_requested_date() {
        let date = parse_calendar_date("2026-01-30").expect("valid date");
        let totals = DailyTotals::zero(date);
        assert_eq!(totals.meal_count, 0);
        assert_eq!(totals.total_calories, 0);
        assert_eq!(totals.for_date, "2026-01-30");
    }
}
