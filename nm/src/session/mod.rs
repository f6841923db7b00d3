//! Session Store and identity providers
//!
//! The store owns exactly one active [`Identity`](crate::domain::Identity) and
//! the epoch that stamps everything issued under it. Providers do the actual
//! work of creating or resolving identities; which ones exist is decided by
//! configuration.

mod error;
mod provider;
mod store;

pub use error::{AuthError, SessionError};
pub use provider::{
    Credential, FederatedProvider, GuestProvider, IdentityProvider, LocalProvider, ProviderSet, ResolvedIdentity,
    normalize_registration,
};
pub use store::{PendingAuth, SessionStore};
