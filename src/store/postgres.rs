use std::time::Duration;

use anyhow::Context;
use axum::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Column, PgPool, Row, TypeInfo};
use time::Date;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::store::types::{
    DailyTotals, DietPlanRecord, IngredientRow, MealRow, MealSuggestion, NewMealPlan,
    PreferenceUpdate, TaskUpsert, UserPreference, COUNTED_PLAN_STATUSES, INITIAL_PLAN_STATUS,
};
use crate::store::{MealStore, StoreError};

/// Stored-function-backed store. Holds a bounded connection pool; the
/// initial connect doubles as the fatal startup probe, so a process that
/// cannot reach the database never starts serving.
pub struct PgStore {
    pool: PgPool,
    /// Set once at startup: whether `usp_get_daily_totals` exists. When it
    /// does not, [`MealStore::daily_totals`] runs the inline aggregation
    /// instead of probing for the function on every call.
    has_totals_fn: bool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
            warn!(error = %e, "migration failed; continuing with existing schema");
        }

        let has_totals_fn = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM pg_proc WHERE proname = 'usp_get_daily_totals')",
        )
        .fetch_one(&pool)
        .await
        .unwrap_or(false);

        if has_totals_fn {
            info!("daily totals served by usp_get_daily_totals");
        } else {
            warn!("usp_get_daily_totals missing; daily totals will use the inline aggregation");
        }

        Ok(Self {
            pool,
            has_totals_fn,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TotalsRow {
    total_calories: i64,
    total_protein: f64,
    total_fat: f64,
    total_carbs: f64,
    meal_count: i64,
}

impl TotalsRow {
    fn into_totals(self, date: Date) -> DailyTotals {
        DailyTotals {
            total_calories: self.total_calories,
            total_protein: self.total_protein,
            total_fat: self.total_fat,
            total_carbs: self.total_carbs,
            meal_count: self.meal_count,
            for_date: crate::store::types::format_calendar_date(date),
        }
    }
}

#[async_trait]
impl MealStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_task(&self, task: TaskUpsert) -> Result<(), StoreError> {
        sqlx::query("SELECT sp_upsert_task($1, $2, $3, $4, $5)")
            .bind(&task.task_id)
            .bind(&task.file_path)
            .bind(&task.file_name)
            .bind(&task.description)
            .bind(&task.status)
            .execute(&self.pool)
            .await?;
        info!(task_id = %task.task_id, "task synced");
        Ok(())
    }

    async fn random_meal_by_diet(
        &self,
        diet: &str,
    ) -> Result<Option<MealSuggestion>, StoreError> {
        let meal = sqlx::query_as::<_, MealRow>("SELECT * FROM usp_get_random_meal_by_diet($1)")
            .bind(diet)
            .fetch_optional(&self.pool)
            .await?;

        let Some(meal) = meal else {
            warn!(%diet, "no meal found for diet");
            return Ok(None);
        };

        // The source procedure returned the meal header and its ingredients
        // as two sequential result sets; here they are two function calls
        // within the same operation.
        let ingredients =
            sqlx::query_as::<_, IngredientRow>("SELECT * FROM usp_get_meal_ingredients($1)")
                .bind(meal.meal_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(Some(MealSuggestion { meal, ingredients }))
    }

    async fn diet_plans(&self) -> Result<Vec<DietPlanRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM usp_get_diet_plans()")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn user_preference(
        &self,
        user_id: i64,
    ) -> Result<Option<UserPreference>, StoreError> {
        let pref = sqlx::query_as::<_, UserPreference>(
            r#"
            SELECT active_diet_name
            FROM user_preferences
            WHERE user_id = $1 AND is_active
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(pref)
    }

    async fn update_user_preferences(
        &self,
        user_id: i64,
        update: PreferenceUpdate,
    ) -> Result<(), StoreError> {
        sqlx::query("SELECT usp_update_user_preferences($1, $2, $3, $4)")
            .bind(user_id)
            .bind(&update.diet_type)
            .bind(update.calories_goal)
            .bind(&update.allergies)
            .execute(&self.pool)
            .await?;
        info!(user_id, diet = %update.diet_type, "preferences updated");
        Ok(())
    }

    async fn insert_meal_plan(&self, plan: NewMealPlan) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO meal_plans (user_id, meal_id, planned_date, meal_time, status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(plan.user_id)
        .bind(plan.meal_id)
        .bind(plan.planned_date)
        .bind(&plan.meal_time)
        .bind(INITIAL_PLAN_STATUS)
        .execute(&self.pool)
        .await?;
        info!(
            user_id = plan.user_id,
            meal_id = plan.meal_id,
            date = %plan.planned_date,
            "meal plan added"
        );
        Ok(())
    }

    async fn daily_totals(&self, user_id: i64, date: Date) -> Result<DailyTotals, StoreError> {
        if self.has_totals_fn {
            let row = sqlx::query_as::<_, TotalsRow>("SELECT * FROM usp_get_daily_totals($1, $2)")
                .bind(user_id)
                .bind(date)
                .fetch_optional(&self.pool)
                .await?;
            return Ok(match row {
                Some(row) => row.into_totals(date),
                None => DailyTotals::zero(date),
            });
        }

        let statuses: Vec<String> = COUNTED_PLAN_STATUSES
            .iter()
            .map(|s| s.to_string())
            .collect();
        let row = sqlx::query_as::<_, TotalsRow>(
            r#"
            SELECT COALESCE(SUM(m.calories), 0)::BIGINT AS total_calories,
                   COALESCE(SUM(m.protein_grams), 0)::FLOAT8 AS total_protein,
                   COALESCE(SUM(m.fat_grams), 0)::FLOAT8 AS total_fat,
                   COALESCE(SUM(m.carb_grams), 0)::FLOAT8 AS total_carbs,
                   COUNT(mp.plan_id) AS meal_count
            FROM meal_plans mp
            JOIN meals m ON m.meal_id = mp.meal_id
            WHERE mp.user_id = $1
              AND mp.planned_date = $2
              AND mp.status = ANY($3)
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(&statuses)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_totals(date))
    }
}

/// Flatten a row into a column-name-keyed JSON object. Diet plans carry
/// whatever columns the procedure returns, so decoding is by column type
/// rather than a fixed struct; unhandled types fall back to text, then null.
fn row_to_record(row: &PgRow) -> DietPlanRecord {
    let mut record = DietPlanRecord::new();
    for (idx, col) in row.columns().iter().enumerate() {
        let value = match col.type_info().name() {
            "INT2" => row
                .try_get::<Option<i16>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from),
            "INT4" => row
                .try_get::<Option<i32>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from),
            "INT8" => row
                .try_get::<Option<i64>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from),
            "FLOAT8" => row
                .try_get::<Option<f64>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from),
            "BOOL" => row
                .try_get::<Option<bool>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from),
            "DATE" => row
                .try_get::<Option<Date>, _>(idx)
                .ok()
                .flatten()
                .map(|d| Value::from(crate::store::types::format_calendar_date(d))),
            _ => row
                .try_get::<Option<String>, _>(idx)
                .ok()
                .flatten()
                .map(Value::from),
        };
        record.insert(col.name().to_string(), value.unwrap_or(Value::Null));
    }
    record
}
