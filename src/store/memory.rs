use std::collections::HashMap;
use std::sync::Mutex;

use axum::async_trait;
use rand::seq::SliceRandom;
use time::Date;

use crate::store::types::{
    DailyTotals, DietPlanRecord, IngredientRow, MealRow, MealSuggestion, NewMealPlan,
    PreferenceUpdate, TaskUpsert, UserPreference, COUNTED_PLAN_STATUSES, INITIAL_PLAN_STATUS,
};
use crate::store::{MealStore, StoreError};

/// In-process store with the same semantics as [`PgStore`], used by
/// `AppState::fake()` and the handler tests. Seed it with meals and diet
/// plans before wiring it into the router.
///
/// [`PgStore`]: crate::store::PgStore
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    tasks: HashMap<String, TaskUpsert>,
    meals: Vec<SeededMeal>,
    diet_plans: Vec<DietPlanRecord>,
    preferences: HashMap<i64, PreferenceUpdate>,
    meal_plans: Vec<StoredPlan>,
}

struct SeededMeal {
    diet_category: String,
    meal: MealRow,
    ingredients: Vec<IngredientRow>,
}

struct StoredPlan {
    plan: NewMealPlan,
    status: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_meal(&self, diet_category: &str, meal: MealRow, ingredients: Vec<IngredientRow>) {
        self.lock().meals.push(SeededMeal {
            diet_category: diet_category.to_string(),
            meal,
            ingredients,
        });
    }

    pub fn add_diet_plan(&self, record: DietPlanRecord) {
        self.lock().diet_plans.push(record);
    }

    pub fn task(&self, task_id: &str) -> Option<TaskUpsert> {
        self.lock().tasks.get(task_id).cloned()
    }

    pub fn meal_plan_count(&self) -> usize {
        self.lock().meal_plans.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MealStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn upsert_task(&self, task: TaskUpsert) -> Result<(), StoreError> {
        self.lock().tasks.insert(task.task_id.clone(), task);
        Ok(())
    }

    async fn random_meal_by_diet(
        &self,
        diet: &str,
    ) -> Result<Option<MealSuggestion>, StoreError> {
        let inner = self.lock();
        let candidates: Vec<&SeededMeal> = inner
            .meals
            .iter()
            .filter(|m| m.diet_category == diet)
            .collect();
        let picked = candidates.choose(&mut rand::thread_rng());
        Ok(picked.map(|m| MealSuggestion {
            meal: m.meal.clone(),
            ingredients: m.ingredients.clone(),
        }))
    }

    async fn diet_plans(&self) -> Result<Vec<DietPlanRecord>, StoreError> {
        Ok(self.lock().diet_plans.clone())
    }

    async fn user_preference(
        &self,
        user_id: i64,
    ) -> Result<Option<UserPreference>, StoreError> {
        Ok(self.lock().preferences.get(&user_id).map(|p| UserPreference {
            active_diet_name: p.diet_type.clone(),
        }))
    }

    async fn update_user_preferences(
        &self,
        user_id: i64,
        update: PreferenceUpdate,
    ) -> Result<(), StoreError> {
        self.lock().preferences.insert(user_id, update);
        Ok(())
    }

    async fn insert_meal_plan(&self, plan: NewMealPlan) -> Result<(), StoreError> {
        self.lock().meal_plans.push(StoredPlan {
            plan,
            status: INITIAL_PLAN_STATUS.to_string(),
        });
        Ok(())
    }

    async fn daily_totals(&self, user_id: i64, date: Date) -> Result<DailyTotals, StoreError> {
        let inner = self.lock();
        let mut totals = DailyTotals::zero(date);
        for stored in inner.meal_plans.iter().filter(|p| {
            p.plan.user_id == user_id
                && p.plan.planned_date == date
                && COUNTED_PLAN_STATUSES.contains(&p.status.as_str())
        }) {
            let Some(meal) = inner
                .meals
                .iter()
                .find(|m| m.meal.meal_id == stored.plan.meal_id)
            else {
                continue;
            };
            totals.total_calories += i64::from(meal.meal.calories.unwrap_or(0));
            totals.total_protein += meal.meal.protein_grams;
            totals.total_fat += meal.meal.fat_grams;
            totals.total_carbs += meal.meal.carb_grams;
            totals.meal_count += 1;
        }
        Ok(totals)
    }
}
