//! Wire types for the backend REST surface
//!
//! DTOs mirror the JSON the backend speaks; conversion into domain types
//! happens here so the rest of the crate never sees raw payloads.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ApiError;
use crate::domain::{MealReference, MealSlot, PlannedMeal, Preferences, Recommendation};

/// Meal name the recommendation service uses to signal that inference failed
const UNAVAILABLE_SENTINEL: &str = "Error";

/// `POST /users/` body
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub dietary_preferences: String,
    pub regional_preferences: String,
}

impl NewUser {
    pub fn new(email: &str, full_name: &str, password: &str, preferences: Preferences) -> Self {
        Self {
            email: email.to_string(),
            full_name: full_name.to_string(),
            password: password.to_string(),
            dietary_preferences: preferences.dietary.as_str().to_string(),
            regional_preferences: preferences.regional.as_str().to_string(),
        }
    }
}

/// `POST /users/` success body
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// `POST /users/{id}/plan/` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPlanEntry {
    pub date: String,
    pub meal_type: MealSlot,
    pub meal_id: i64,
}

impl NewPlanEntry {
    pub fn new(date: NaiveDate, slot: MealSlot, meal_id: i64) -> Self {
        Self {
            date: format_plan_date(date),
            meal_type: slot,
            meal_id,
        }
    }
}

/// One entry of `GET /meals/`
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogMeal {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub suitable_time: Option<String>,
    #[serde(default)]
    pub mood_tag: Option<String>,
    #[serde(default)]
    pub regional_tag: Option<String>,
    #[serde(default)]
    pub calories: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RecommendationDto {
    pub recommended_meal_name: String,
    pub reason: String,
    #[serde(default)]
    pub meal_id: Option<i64>,
}

impl TryFrom<RecommendationDto> for Recommendation {
    type Error = ApiError;

    fn try_from(dto: RecommendationDto) -> Result<Self, Self::Error> {
        let name = dto.recommended_meal_name.trim();
        if name == UNAVAILABLE_SENTINEL {
            debug!(reason = %dto.reason, "recommendation: service reported inference failure");
            return Err(ApiError::Unavailable(dto.reason));
        }
        if name.is_empty() {
            return Err(ApiError::InvalidResponse("empty recommended_meal_name".to_string()));
        }
        Ok(Recommendation {
            name: name.to_string(),
            reason: dto.reason,
            meal_id: dto.meal_id,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlanMealDto {
    pub name: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlanEntryDto {
    pub id: i64,
    pub date: String,
    pub meal_type: String,
    pub meal: PlanMealDto,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HealthDto {
    pub message: String,
}

/// Convert the plan payload, preserving backend order
///
/// Entries whose slot this client does not model are skipped; an unparseable
/// date means the payload is broken and fails the whole fetch.
pub(crate) fn plan_from_wire(entries: Vec<PlanEntryDto>) -> Result<Vec<PlannedMeal>, ApiError> {
    debug!(count = entries.len(), "plan_from_wire: called");
    let mut plan = Vec::with_capacity(entries.len());
    for entry in entries {
        let Ok(slot) = entry.meal_type.parse::<MealSlot>() else {
            warn!(id = entry.id, meal_type = %entry.meal_type, "plan_from_wire: skipping entry with unknown slot");
            continue;
        };
        let date = parse_backend_datetime(&entry.date).ok_or_else(|| {
            ApiError::InvalidResponse(format!("plan entry {} has unparseable date '{}'", entry.id, entry.date))
        })?;
        plan.push(PlannedMeal {
            id: entry.id,
            date,
            meal_type: slot,
            meal: MealReference {
                name: entry.meal.name,
                category: entry.meal.category,
            },
        });
    }
    Ok(plan)
}

/// Parse an ISO-8601 timestamp as the backend sends it
///
/// Accepts RFC 3339 with an offset (converted to local time), naive
/// date-times with or without fractional seconds, and bare dates.
pub fn parse_backend_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Plan dates go out as local noon so no time zone can push them onto another day
pub fn format_plan_date(date: NaiveDate) -> String {
    format!("{}T12:00:00", date.format("%Y-%m-%d"))
}
