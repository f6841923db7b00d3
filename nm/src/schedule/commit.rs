//! Commit execution against the backend

use tracing::{debug, info};

use super::{CommitError, CommitRequest, MealTarget};
use crate::api::{MealApi, NewPlanEntry};
use crate::domain::UserKey;

/// Map a meal target to a backend meal id, scanning the catalog by name if needed
///
/// Names match case-insensitively after trimming.
pub async fn resolve_meal_id(api: &dyn MealApi, target: &MealTarget, page_size: u32) -> Result<i64, CommitError> {
    let name = match target {
        MealTarget::Id(id) => return Ok(*id),
        MealTarget::Name(name) => name,
    };
    debug!(%name, page_size, "resolve_meal_id: called");
    let wanted = name.trim().to_lowercase();
    let page_size = page_size.max(1);
    let mut skip = 0;
    loop {
        let page = api.list_meals(skip, page_size).await?;
        if let Some(meal) = page.iter().find(|m| m.name.trim().to_lowercase() == wanted) {
            debug!(%name, id = meal.id, "resolve_meal_id: matched catalog entry");
            return Ok(meal.id);
        }
        if page.len() < page_size as usize {
            return Err(CommitError::UnresolvedMeal(name.clone()));
        }
        skip += page_size;
    }
}

/// Resolve the meal and append the entry to `user`'s plan
pub async fn execute_commit(api: &dyn MealApi, user: &UserKey, request: &CommitRequest, page_size: u32) -> Result<(), CommitError> {
    debug!(%user, ticket = %request.ticket, "execute_commit: called");
    let meal_id = resolve_meal_id(api, &request.meal, page_size).await?;
    let entry = NewPlanEntry::new(request.date, request.slot, meal_id);
    api.add_to_plan(user, &entry).await?;
    info!(%user, meal_id, date = %request.date, slot = %request.slot, "execute_commit: saved");
    Ok(())
}
