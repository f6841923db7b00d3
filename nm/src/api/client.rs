//! MealApi trait definition

use async_trait::async_trait;

use super::{ApiError, CatalogMeal, NewPlanEntry, NewUser, UserRecord};
use crate::domain::{PlannedMeal, Recommendation, SelectionCriteria, UserKey};

/// Stateless backend client - each call is an independent request
///
/// Implementations must not cache identity-scoped data: the orchestration
/// core decides what is current and discards anything stale.
#[async_trait]
pub trait MealApi: Send + Sync {
    /// `POST /users/` - create an identity; a duplicate email answers 400
    async fn create_user(&self, user: &NewUser) -> Result<UserRecord, ApiError>;

    /// `GET /users/{key}/plan/` - the full plan, in backend order
    async fn fetch_plan(&self, user: &UserKey) -> Result<Vec<PlannedMeal>, ApiError>;

    /// `POST /recommend/` - one suggestion for the given criteria
    async fn recommend(&self, user: &UserKey, criteria: SelectionCriteria) -> Result<Recommendation, ApiError>;

    /// `POST /users/{key}/plan/` - append one entry; the response body is not trusted
    async fn add_to_plan(&self, user: &UserKey, entry: &NewPlanEntry) -> Result<(), ApiError>;

    /// `GET /meals/` - one page of the meal catalog
    async fn list_meals(&self, skip: u32, limit: u32) -> Result<Vec<CatalogMeal>, ApiError>;

    /// `GET /` - liveness message
    async fn health(&self) -> Result<String, ApiError>;
}
