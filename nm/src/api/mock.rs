//! In-memory MealApi for tests
//!
//! Holds a small catalog, users and plans. Each operation can be made to fail
//! with a status, or held at a gate until the test releases it, which is how
//! tests put requests in flight deterministically.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::Semaphore;

use super::{ApiError, CatalogMeal, MealApi, NewPlanEntry, NewUser, UserRecord, parse_backend_datetime};
use crate::domain::{MealReference, Mood, PlannedMeal, Recommendation, SelectionCriteria, UserKey};

const OPEN_PERMITS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    CreateUser,
    FetchPlan,
    Recommend,
    AddToPlan,
    ListMeals,
    Health,
}

impl MockOp {
    const ALL: [MockOp; 6] = [
        MockOp::CreateUser,
        MockOp::FetchPlan,
        MockOp::Recommend,
        MockOp::AddToPlan,
        MockOp::ListMeals,
        MockOp::Health,
    ];
}

struct MockState {
    next_user_id: i64,
    next_entry_id: i64,
    users: HashMap<UserKey, Option<String>>,
    plans: HashMap<UserKey, Vec<PlannedMeal>>,
    catalog: Vec<CatalogMeal>,
    recommendation: Option<Recommendation>,
    failures: HashMap<MockOp, u16>,
    held: HashMap<MockOp, bool>,
    calls: HashMap<MockOp, usize>,
}

pub struct MockMealApi {
    state: Mutex<MockState>,
    gates: HashMap<MockOp, Semaphore>,
}

fn catalog_meal(id: i64, name: &str, category: &str, time: &str, mood: Mood) -> CatalogMeal {
    CatalogMeal {
        id,
        name: name.to_string(),
        category: Some(category.to_string()),
        suitable_time: Some(time.to_string()),
        mood_tag: Some(mood.as_str().to_string()),
        regional_tag: Some("North Indian".to_string()),
        calories: Some(450),
    }
}

impl MockMealApi {
    /// Backend with the guest user (id 1) and a handful of catalog meals
    pub fn new() -> Self {
        let catalog = vec![
            catalog_meal(1, "Paneer Butter Masala", "Veg", "Dinner", Mood::ComfortCraving),
            catalog_meal(2, "Masala Dosa", "Veg", "Breakfast", Mood::CrispySavory),
            catalog_meal(3, "Rajma Chawal", "Veg", "Lunch", Mood::ComfortCraving),
            catalog_meal(4, "Chicken Chettinad", "Non-Veg", "Dinner", Mood::SpicyKick),
            catalog_meal(5, "Gulab Jamun", "Veg", "Snacking", Mood::SweetTooth),
        ];
        let mut users = HashMap::new();
        users.insert(UserKey::Numeric(1), None);
        let mut plans = HashMap::new();
        plans.insert(UserKey::Numeric(1), Vec::new());

        Self {
            state: Mutex::new(MockState {
                next_user_id: 2,
                next_entry_id: 100,
                users,
                plans,
                catalog,
                recommendation: None,
                failures: HashMap::new(),
                held: HashMap::new(),
                calls: HashMap::new(),
            }),
            gates: MockOp::ALL.iter().map(|op| (*op, Semaphore::new(0))).collect(),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Make every following call of `op` wait for [`release`](Self::release)
    pub fn hold(&self, op: MockOp) {
        self.state().held.insert(op, true);
    }

    /// Let `n` held calls of `op` proceed
    pub fn release(&self, op: MockOp, n: usize) {
        self.gates[&op].add_permits(n);
    }

    /// Stop holding `op` and release anything already waiting
    pub fn open(&self, op: MockOp) {
        self.state().held.insert(op, false);
        self.gates[&op].add_permits(OPEN_PERMITS);
    }

    pub fn fail(&self, op: MockOp, status: u16) {
        self.state().failures.insert(op, status);
    }

    pub fn clear_failure(&self, op: MockOp) {
        self.state().failures.remove(&op);
    }

    pub fn calls(&self, op: MockOp) -> usize {
        self.state().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn seed_user(&self, key: UserKey, email: Option<&str>) {
        let mut state = self.state();
        state.users.insert(key.clone(), email.map(str::to_string));
        state.plans.entry(key).or_default();
    }

    pub fn plan_of(&self, key: &UserKey) -> Vec<PlannedMeal> {
        self.state().plans.get(key).cloned().unwrap_or_default()
    }

    /// Fixed answer for every following `recommend` call
    pub fn set_recommendation(&self, recommendation: Recommendation) {
        self.state().recommendation = Some(recommendation);
    }

    /// Count the call, then wait at the gate and apply any injected failure
    async fn enter(&self, op: MockOp) -> Result<(), ApiError> {
        let held = {
            let mut state = self.state();
            *state.calls.entry(op).or_default() += 1;
            state.held.get(&op).copied().unwrap_or(false)
        };
        if held {
            let permit = self.gates[&op]
                .acquire()
                .await
                .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
            permit.forget();
        }
        match self.state().failures.get(&op) {
            Some(status) => Err(ApiError::Status {
                status: *status,
                message: format!("injected failure for {:?}", op),
            }),
            None => Ok(()),
        }
    }
}

impl Default for MockMealApi {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        message: format!("{} not found", what),
    }
}

#[async_trait]
impl MealApi for MockMealApi {
    async fn create_user(&self, user: &NewUser) -> Result<UserRecord, ApiError> {
        self.enter(MockOp::CreateUser).await?;
        let mut state = self.state();
        if state.users.values().any(|e| e.as_deref() == Some(user.email.as_str())) {
            return Err(ApiError::Status {
                status: 400,
                message: "User already registered".to_string(),
            });
        }
        let id = state.next_user_id;
        state.next_user_id += 1;
        state.users.insert(UserKey::Numeric(id), Some(user.email.clone()));
        state.plans.insert(UserKey::Numeric(id), Vec::new());
        Ok(UserRecord {
            id,
            full_name: Some(user.full_name.clone()),
            email: Some(user.email.clone()),
        })
    }

    async fn fetch_plan(&self, user: &UserKey) -> Result<Vec<PlannedMeal>, ApiError> {
        self.enter(MockOp::FetchPlan).await?;
        let state = self.state();
        // Plans are a plain filter by user; unknown users simply have none
        Ok(state.plans.get(user).cloned().unwrap_or_default())
    }

    async fn recommend(&self, _user: &UserKey, criteria: SelectionCriteria) -> Result<Recommendation, ApiError> {
        self.enter(MockOp::Recommend).await?;
        let state = self.state();
        if let Some(rec) = &state.recommendation {
            return Ok(rec.clone());
        }
        let time = criteria.time_of_day.as_str();
        let meal = state
            .catalog
            .iter()
            .find(|m| m.mood_tag.as_deref() == Some(criteria.mood.as_str()) && m.suitable_time.as_deref() == Some(time))
            .or_else(|| state.catalog.first())
            .ok_or_else(|| ApiError::Unavailable("empty catalog".to_string()))?;
        Ok(Recommendation {
            name: meal.name.clone(),
            reason: format!("A good fit for {} at {}.", criteria.mood, criteria.time_of_day),
            meal_id: None,
        })
    }

    async fn add_to_plan(&self, user: &UserKey, entry: &NewPlanEntry) -> Result<(), ApiError> {
        self.enter(MockOp::AddToPlan).await?;
        let mut state = self.state();
        let meal = state
            .catalog
            .iter()
            .find(|m| m.id == entry.meal_id)
            .cloned()
            .ok_or_else(|| not_found("Meal"))?;
        let date: NaiveDateTime = parse_backend_datetime(&entry.date)
            .ok_or_else(|| ApiError::InvalidResponse(format!("bad date {}", entry.date)))?;
        let id = state.next_entry_id;
        state.next_entry_id += 1;
        state.plans.entry(user.clone()).or_default().push(PlannedMeal {
            id,
            date,
            meal_type: entry.meal_type,
            meal: MealReference {
                name: meal.name,
                category: meal.category.unwrap_or_default(),
            },
        });
        Ok(())
    }

    async fn list_meals(&self, skip: u32, limit: u32) -> Result<Vec<CatalogMeal>, ApiError> {
        self.enter(MockOp::ListMeals).await?;
        let state = self.state();
        Ok(state
            .catalog
            .iter()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn health(&self) -> Result<String, ApiError> {
        self.enter(MockOp::Health).await?;
        Ok("Next Meal AI API is running!".to_string())
    }
}
