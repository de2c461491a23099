mod memory;
mod postgres;
pub mod types;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use axum::async_trait;
use time::Date;

use self::types::{
    DailyTotals, DietPlanRecord, MealSuggestion, NewMealPlan, PreferenceUpdate, TaskUpsert,
    UserPreference,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Every pooled connection is busy. The request can be retried.
    #[error("connection pool exhausted")]
    PoolExhausted,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => StoreError::PoolExhausted,
            other => StoreError::Database(other),
        }
    }
}

/// Data-access surface of the service. One method per logical operation;
/// reads distinguish "no rows" (`Ok(None)` / empty vec) from a store
/// failure (`Err`). Constructed once at startup and shared behind an
/// `Arc<dyn MealStore>`, so tests can drop in [`MemoryStore`].
#[async_trait]
pub trait MealStore: Send + Sync {
    /// Cheap connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Insert-or-update a task keyed by its identifier. Callers cannot
    /// tell an insert from an update.
    async fn upsert_task(&self, task: TaskUpsert) -> Result<(), StoreError>;

    /// Pick one random meal in the given diet category together with its
    /// ordered ingredient list. `Ok(None)` means the category has no meals.
    async fn random_meal_by_diet(&self, diet: &str)
        -> Result<Option<MealSuggestion>, StoreError>;

    /// All diet plans as column-name-keyed records, in procedure order.
    async fn diet_plans(&self) -> Result<Vec<DietPlanRecord>, StoreError>;

    /// The user's single active preference row, if any.
    async fn user_preference(&self, user_id: i64)
        -> Result<Option<UserPreference>, StoreError>;

    /// Replace the user's active preference. This is a full write: diet,
    /// calorie goal, and allergies are all overwritten.
    async fn update_user_preferences(
        &self,
        user_id: i64,
        update: PreferenceUpdate,
    ) -> Result<(), StoreError>;

    /// Insert one meal-plan row with status "Pending". No duplicate
    /// detection: identical calls create identical rows.
    async fn insert_meal_plan(&self, plan: NewMealPlan) -> Result<(), StoreError>;

    /// Nutritional totals for a user on a date. Always populated; an empty
    /// day yields zero sums and a zero meal count, never "not found".
    async fn daily_totals(&self, user_id: i64, date: Date) -> Result<DailyTotals, StoreError>;
}
