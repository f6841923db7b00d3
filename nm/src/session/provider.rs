//! IdentityProvider capability and its Local, Guest and Federated variants

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info};

use super::{AuthError, SessionError};
use crate::api::{MealApi, NewUser};
use crate::config::{Config, FederatedConfig, IdentityConfig, ProviderKind};
use crate::domain::{FederatedSession, Identity, RegistrationForm, UserKey};

/// Something a user presents to be recognized as an existing identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// A backend user id the user already knows
    UserId(UserKey),
    /// Session handed back by the external provider
    Federated(FederatedSession),
    Guest,
}

/// Identity a credential resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub identity: Identity,
    /// False when the backend answered but could not show the account exists
    pub confirmed: bool,
}

impl ResolvedIdentity {
    pub fn confirmed(identity: Identity) -> Self {
        Self {
            identity,
            confirmed: true,
        }
    }

    pub fn unconfirmed(identity: Identity) -> Self {
        Self {
            identity,
            confirmed: false,
        }
    }
}

/// One way of acquiring an identity
///
/// Creation and resolution are separate operations: a provider that cannot
/// create identities says so instead of treating a conflict as a login.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Create a new identity on the backend
    async fn create_identity(&self, _form: &RegistrationForm) -> Result<Identity, SessionError> {
        Err(SessionError::Unsupported(self.kind()))
    }

    /// Map a credential to an existing identity
    async fn resolve_identity(&self, credential: &Credential) -> Result<ResolvedIdentity, AuthError>;

    /// Identity available without any round trip, if this provider has one
    fn immediate_identity(&self) -> Option<Identity> {
        None
    }

    /// Where to send the user to start an external sign-in
    fn sign_in_url(&self) -> Result<Option<String>, AuthError> {
        Ok(None)
    }
}

/// Trim and lower-case the email, fall back to `default_name` for an empty name
pub fn normalize_registration(form: &RegistrationForm, default_name: &str) -> Result<RegistrationForm, SessionError> {
    let email = form.email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((user, domain)) => {
            !user.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(SessionError::Invalid(format!("'{}' is not an email address", form.email.trim())));
    }

    let full_name = match form.full_name.trim() {
        "" => default_name.to_string(),
        name => name.to_string(),
    };

    Ok(RegistrationForm {
        full_name,
        email,
        preferences: form.preferences,
    })
}

/// Self-hosted identities backed by `/users/`
pub struct LocalProvider {
    api: Arc<dyn MealApi>,
    config: IdentityConfig,
}

impl LocalProvider {
    pub fn new(api: Arc<dyn MealApi>, config: IdentityConfig) -> Self {
        Self { api, config }
    }
}

#[async_trait]
impl IdentityProvider for LocalProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    async fn create_identity(&self, form: &RegistrationForm) -> Result<Identity, SessionError> {
        debug!(email = %form.email, "create_identity: called");
        let form = normalize_registration(form, &self.config.default_name)?;
        let user = NewUser::new(
            &form.email,
            &form.full_name,
            &self.config.placeholder_password,
            form.preferences,
        );

        match self.api.create_user(&user).await {
            Ok(record) => {
                info!(id = record.id, "create_identity: registered");
                let full_name = record
                    .full_name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or(form.full_name);
                Ok(Identity::Registered {
                    id: record.id,
                    full_name,
                })
            }
            Err(e) if matches!(e.status(), Some(400) | Some(409)) => {
                debug!(error = %e, "create_identity: email already registered");
                Err(SessionError::Conflict { email: form.email })
            }
            Err(e) => Err(SessionError::Network(e)),
        }
    }

    async fn resolve_identity(&self, credential: &Credential) -> Result<ResolvedIdentity, AuthError> {
        debug!(?credential, "resolve_identity: called");
        let Credential::UserId(key) = credential else {
            return Err(AuthError::Unsupported(self.kind()));
        };
        let UserKey::Numeric(id) = key else {
            return Err(AuthError::ProviderRejected(format!("'{}' is not a numeric user id", key)));
        };

        // No user lookup exists; an empty plan is all an unknown id gets back
        let identity = Identity::Registered {
            id: *id,
            full_name: self.config.default_name.clone(),
        };
        match self.api.fetch_plan(key).await {
            Ok(plan) if plan.is_empty() => {
                info!(id, "resolve_identity: id has no plan entries, cannot confirm it exists");
                Ok(ResolvedIdentity::unconfirmed(identity))
            }
            Ok(_) => Ok(ResolvedIdentity::confirmed(identity)),
            Err(e) if e.is_not_found() => Err(AuthError::UnknownIdentity(key.clone())),
            Err(e) => Err(AuthError::Network(e)),
        }
    }
}

/// The fixed, pre-provisioned guest account
pub struct GuestProvider {
    guest_id: i64,
}

impl GuestProvider {
    pub fn new(guest_id: i64) -> Self {
        Self { guest_id }
    }
}

#[async_trait]
impl IdentityProvider for GuestProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Guest
    }

    async fn resolve_identity(&self, credential: &Credential) -> Result<ResolvedIdentity, AuthError> {
        match credential {
            Credential::Guest => Ok(ResolvedIdentity::confirmed(Identity::Guest { id: self.guest_id })),
            _ => Err(AuthError::Unsupported(self.kind())),
        }
    }

    fn immediate_identity(&self) -> Option<Identity> {
        Some(Identity::Guest { id: self.guest_id })
    }
}

/// External OAuth redirect flow; only the redirect and the returned session are visible
pub struct FederatedProvider {
    config: FederatedConfig,
}

impl FederatedProvider {
    pub fn new(config: FederatedConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl IdentityProvider for FederatedProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Federated
    }

    async fn resolve_identity(&self, credential: &Credential) -> Result<ResolvedIdentity, AuthError> {
        let Credential::Federated(session) = credential else {
            return Err(AuthError::Unsupported(self.kind()));
        };
        debug!(subject = %session.subject, "resolve_identity: called");
        if session.access_token.trim().is_empty() {
            return Err(AuthError::ProviderRejected("session has no access token".to_string()));
        }
        let key = UserKey::parse(&session.subject)
            .ok_or_else(|| AuthError::ProviderRejected("session has no subject".to_string()))?;
        Ok(ResolvedIdentity::confirmed(Identity::Federated {
            session: session.clone(),
            key,
        }))
    }

    fn sign_in_url(&self) -> Result<Option<String>, AuthError> {
        let url = Url::parse_with_params(
            &self.config.authorize_url,
            &[("redirect_uri", self.config.return_url.as_str())],
        )
        .map_err(|e| AuthError::ProviderRejected(format!("bad authorize-url: {}", e)))?;
        Ok(Some(url.to_string()))
    }
}

/// The providers enabled by configuration
#[derive(Clone, Default)]
pub struct ProviderSet {
    providers: Vec<Arc<dyn IdentityProvider>>,
}

impl ProviderSet {
    pub fn from_config(config: &Config, api: Arc<dyn MealApi>) -> Self {
        debug!(providers = ?config.identity.providers, "from_config: called");
        let mut set = Self::default();
        for kind in &config.identity.providers {
            if set.get(*kind).is_some() {
                continue;
            }
            let provider: Arc<dyn IdentityProvider> = match kind {
                ProviderKind::Local => Arc::new(LocalProvider::new(api.clone(), config.identity.clone())),
                ProviderKind::Guest => Arc::new(GuestProvider::new(config.identity.guest_id)),
                ProviderKind::Federated => Arc::new(FederatedProvider::new(config.federated.clone())),
            };
            set.providers.push(provider);
        }
        set
    }

    pub fn with(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.providers.retain(|p| p.kind() != provider.kind());
        self.providers.push(provider);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn IdentityProvider>> {
        self.providers.iter().find(|p| p.kind() == kind).cloned()
    }

    pub fn kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSet").field("kinds", &self.kinds()).finish()
    }
}
