//! Session and authentication error types

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ProviderKind;
use crate::domain::UserKey;

/// Errors from creating an identity or driving the sign-in lifecycle
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend already has an identity with this email
    #[error("An account with email {email} already exists; use a different email or sign in with your id")]
    Conflict { email: String },

    #[error("Invalid registration: {0}")]
    Invalid(String),

    #[error("Sign-in with the {0} provider is not enabled")]
    Unsupported(ProviderKind),

    #[error(transparent)]
    Network(#[from] ApiError),
}

impl SessionError {
    /// Conflicts and invalid input need different input, not another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            SessionError::Network(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Typed outcome of resolving a credential into an identity
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No account with id {0}")]
    UnknownIdentity(UserKey),

    #[error("The {0} provider cannot resolve this credential")]
    Unsupported(ProviderKind),

    #[error("Identity provider rejected the sign-in: {0}")]
    ProviderRejected(String),

    #[error(transparent)]
    Network(#[from] ApiError),
}

impl AuthError {
    pub fn is_retryable(&self) -> bool {
        match self {
            AuthError::Network(e) => e.is_retryable(),
            _ => false,
        }
    }
}
