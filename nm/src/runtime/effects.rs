//! EffectRunner - performs effects against the backend and identity providers

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::api::{ApiError, MealApi};
use crate::app::{Completion, Effect};
use crate::config::{BackendConfig, ProviderKind};
use crate::schedule::{CommitError, execute_commit};
use crate::session::{AuthError, ProviderSet, SessionError};

/// Run `fut`, turning an overrun of `limit` into a timeout error
async fn bounded<T, E, F>(limit: Duration, fut: F) -> Result<T, E>
where
    E: From<ApiError>,
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout(limit).into()),
    }
}

#[derive(Clone)]
pub struct EffectRunner {
    api: Arc<dyn MealApi>,
    providers: ProviderSet,
    timeout: Duration,
    catalog_limit: u32,
}

impl EffectRunner {
    pub fn new(api: Arc<dyn MealApi>, providers: ProviderSet, backend: &BackendConfig) -> Self {
        Self {
            api,
            providers,
            timeout: backend.timeout(),
            catalog_limit: backend.catalog_limit,
        }
    }

    /// Perform one network effect; redirects have no completion
    pub async fn run(&self, effect: Effect) -> Option<Completion> {
        debug!(ticket = ?effect.ticket(), "run: called");
        let limit = self.timeout;
        let completion = match effect {
            Effect::Register { ticket, form } => {
                let result = match self.providers.get(ProviderKind::Local) {
                    Some(provider) => bounded(limit, provider.create_identity(&form)).await,
                    None => Err(SessionError::Unsupported(ProviderKind::Local)),
                };
                Completion::Registered { ticket, result }
            }
            Effect::ResolveIdentity {
                ticket,
                provider,
                credential,
            } => {
                let result = match self.providers.get(provider) {
                    Some(p) => bounded(limit, p.resolve_identity(&credential)).await,
                    None => Err(AuthError::Unsupported(provider)),
                };
                Completion::Resolved { ticket, result }
            }
            Effect::FetchSuggestion { ticket, user, criteria } => Completion::Suggestion {
                ticket,
                result: bounded(limit, self.api.recommend(&user, criteria)).await,
            },
            Effect::FetchPlan { ticket, user } => Completion::Plan {
                ticket,
                result: bounded(limit, self.api.fetch_plan(&user)).await,
            },
            Effect::CommitMeal { user, request } => {
                let result: Result<(), CommitError> = bounded(
                    limit,
                    execute_commit(self.api.as_ref(), &user, &request, self.catalog_limit),
                )
                .await;
                Completion::Committed {
                    ticket: request.ticket,
                    result,
                }
            }
            Effect::OpenFederatedRedirect { .. } => return None,
        };
        Some(completion)
    }
}
