//! reqwest-backed implementation of [`MealApi`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::{HealthDto, PlanEntryDto, RecommendationDto, plan_from_wire};
use super::{ApiError, CatalogMeal, MealApi, NewPlanEntry, NewUser, UserRecord};
use crate::config::BackendConfig;
use crate::domain::{PlannedMeal, Recommendation, SelectionCriteria, UserKey};

/// HTTP client for the Next Meal backend
pub struct HttpMealApi {
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl HttpMealApi {
    /// Create a new client from configuration
    ///
    /// Every request is bounded by `timeout-ms`; a request that exceeds it
    /// fails with [`ApiError::Timeout`] instead of hanging.
    pub fn from_config(config: &BackendConfig) -> Result<Self, ApiError> {
        debug!(?config, "from_config: called");
        let timeout = config.timeout();
        let http = Client::builder().timeout(timeout).build().map_err(ApiError::Network)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a transport failure, folding reqwest timeouts into [`ApiError::Timeout`]
    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            debug!(error = %e, "transport_error: request timed out");
            ApiError::Timeout(self.timeout)
        } else {
            debug!(error = %e, "transport_error: network error");
            ApiError::Network(e)
        }
    }

    /// Turn a non-2xx response into [`ApiError::Status`]
    async fn check(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = error_detail(&body);
        warn!(status = status.as_u16(), %message, "check: backend returned error status");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        let response = self.check(response).await?;
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes).map_err(ApiError::Json)
    }
}

/// FastAPI puts the human-readable reason under `detail`
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| match v.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl MealApi for HttpMealApi {
    async fn create_user(&self, user: &NewUser) -> Result<UserRecord, ApiError> {
        debug!(email = %user.email, "create_user: called");
        let response = self
            .http
            .post(self.url("/users/"))
            .json(user)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.read_json(response).await
    }

    async fn fetch_plan(&self, user: &UserKey) -> Result<Vec<PlannedMeal>, ApiError> {
        debug!(%user, "fetch_plan: called");
        let response = self
            .http
            .get(self.url(&format!("/users/{}/plan/", user)))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let entries: Vec<PlanEntryDto> = self.read_json(response).await?;
        plan_from_wire(entries)
    }

    async fn recommend(&self, user: &UserKey, criteria: SelectionCriteria) -> Result<Recommendation, ApiError> {
        debug!(%user, mood = %criteria.mood, time = %criteria.time_of_day, "recommend: called");
        let user_id = user.to_string();
        let response = self
            .http
            .post(self.url("/recommend/"))
            .query(&[
                ("user_id", user_id.as_str()),
                ("mood", criteria.mood.as_str()),
                ("time_of_day", criteria.time_of_day.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let dto: RecommendationDto = self.read_json(response).await?;
        Recommendation::try_from(dto)
    }

    async fn add_to_plan(&self, user: &UserKey, entry: &NewPlanEntry) -> Result<(), ApiError> {
        debug!(%user, ?entry, "add_to_plan: called");
        let response = self
            .http
            .post(self.url(&format!("/users/{}/plan/", user)))
            .json(entry)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.check(response).await?;
        Ok(())
    }

    async fn list_meals(&self, skip: u32, limit: u32) -> Result<Vec<CatalogMeal>, ApiError> {
        debug!(skip, limit, "list_meals: called");
        let response = self
            .http
            .get(self.url("/meals/"))
            .query(&[("skip", skip), ("limit", limit)])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.read_json(response).await
    }

    async fn health(&self) -> Result<String, ApiError> {
        debug!("health: called");
        let response = self
            .http
            .get(self.url("/"))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let dto: HealthDto = self.read_json(response).await?;
        Ok(dto.message)
    }
}
