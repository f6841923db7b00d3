//! Identity - who the client is acting as

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key used in backend-scoped paths (`/users/{key}/plan/`)
///
/// Self-hosted users have numeric ids; federated users are keyed by the
/// provider's subject string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserKey {
    Numeric(i64),
    Opaque(String),
}

impl UserKey {
    /// Parse user input: digits become a numeric key, anything else is opaque
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw.parse::<i64>() {
            Ok(id) => UserKey::Numeric(id),
            Err(_) => UserKey::Opaque(raw.to_string()),
        })
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserKey::Numeric(id) => write!(f, "{}", id),
            UserKey::Opaque(id) => f.write_str(id),
        }
    }
}

/// Session handed over by the external identity provider
#[derive(Clone, PartialEq, Eq)]
pub struct FederatedSession {
    pub access_token: String,
    pub subject: String,
    pub email: Option<String>,
}

impl fmt::Debug for FederatedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FederatedSession")
            .field("access_token", &"<redacted>")
            .field("subject", &self.subject)
            .field("email", &self.email)
            .finish()
    }
}

/// Discriminant of [`Identity`], used in logs and notices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    Anonymous,
    Guest,
    Registered,
    Federated,
}

/// The active user context; exactly one is active at a time
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    Guest {
        id: i64,
    },
    Registered {
        id: i64,
        full_name: String,
    },
    Federated {
        session: FederatedSession,
        key: UserKey,
    },
}

impl Identity {
    pub fn kind(&self) -> IdentityKind {
        match self {
            Identity::Anonymous => IdentityKind::Anonymous,
            Identity::Guest { .. } => IdentityKind::Guest,
            Identity::Registered { .. } => IdentityKind::Registered,
            Identity::Federated { .. } => IdentityKind::Federated,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    /// Backend key for this identity; `None` while anonymous
    pub fn user_key(&self) -> Option<UserKey> {
        match self {
            Identity::Anonymous => None,
            Identity::Guest { id } | Identity::Registered { id, .. } => Some(UserKey::Numeric(*id)),
            Identity::Federated { key, .. } => Some(key.clone()),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Identity::Anonymous => "anonymous".to_string(),
            Identity::Guest { .. } => "Guest".to_string(),
            Identity::Registered { full_name, .. } => full_name.clone(),
            Identity::Federated { session, .. } => session.email.clone().unwrap_or_else(|| session.subject.clone()),
        }
    }
}
