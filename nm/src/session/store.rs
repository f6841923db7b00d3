//! SessionStore - the single active identity and its epoch

use tracing::{debug, info, warn};

use super::{ProviderSet, SessionError, normalize_registration};
use crate::config::ProviderKind;
use crate::domain::{Epoch, Identity, RegistrationForm, Ticket};

/// An identity acquisition that has been started but not completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAuth {
    pub kind: ProviderKind,
    pub ticket: Ticket,
}

/// Owns the active identity, nothing derived from it
///
/// Every activation and sign-out bumps the epoch, which invalidates every
/// request stamped under the previous one.
#[derive(Debug)]
pub struct SessionStore {
    providers: ProviderSet,
    default_name: String,
    identity: Identity,
    epoch: Epoch,
    seq: u64,
    pending: Option<PendingAuth>,
}

impl SessionStore {
    pub fn new(providers: ProviderSet, default_name: impl Into<String>) -> Self {
        Self {
            providers,
            default_name: default_name.into(),
            identity: Identity::Anonymous,
            epoch: Epoch::default(),
            seq: 0,
            pending: None,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn is_current(&self, epoch: Epoch) -> bool {
        self.epoch == epoch
    }

    pub fn pending(&self) -> Option<PendingAuth> {
        self.pending
    }

    pub fn providers(&self) -> &ProviderSet {
        &self.providers
    }

    fn begin(&mut self, kind: ProviderKind) -> Result<Ticket, SessionError> {
        if self.providers.get(kind).is_none() {
            return Err(SessionError::Unsupported(kind));
        }
        self.seq += 1;
        let ticket = Ticket::new(self.epoch, self.seq);
        if let Some(previous) = self.pending.replace(PendingAuth { kind, ticket }) {
            debug!(previous = %previous.ticket, %ticket, "begin: superseding pending sign-in");
        }
        Ok(ticket)
    }

    /// Validate the form and start a registration with the local provider
    pub fn begin_registration(&mut self, form: &RegistrationForm) -> Result<(Ticket, RegistrationForm), SessionError> {
        debug!(email = %form.email, "begin_registration: called");
        if self.providers.get(ProviderKind::Local).is_none() {
            return Err(SessionError::Unsupported(ProviderKind::Local));
        }
        let form = normalize_registration(form, &self.default_name)?;
        let ticket = self.begin(ProviderKind::Local)?;
        Ok((ticket, form))
    }

    /// Start resolving a credential with the given provider
    pub fn begin_resolve(&mut self, kind: ProviderKind) -> Result<Ticket, SessionError> {
        debug!(%kind, "begin_resolve: called");
        self.begin(kind)
    }

    /// Start the federated redirect flow; returns the URL to send the user to
    pub fn begin_federated(&mut self) -> Result<(Ticket, String), SessionError> {
        debug!("begin_federated: called");
        let provider = self
            .providers
            .get(ProviderKind::Federated)
            .ok_or(SessionError::Unsupported(ProviderKind::Federated))?;
        let url = provider
            .sign_in_url()
            .map_err(|e| SessionError::Invalid(e.to_string()))?
            .ok_or(SessionError::Unsupported(ProviderKind::Federated))?;
        let ticket = self.begin(ProviderKind::Federated)?;
        Ok((ticket, url))
    }

    /// Activate the pre-provisioned guest without touching the network
    pub fn sign_in_guest(&mut self) -> Result<Identity, SessionError> {
        debug!("sign_in_guest: called");
        let identity = self
            .providers
            .get(ProviderKind::Guest)
            .and_then(|p| p.immediate_identity())
            .ok_or(SessionError::Unsupported(ProviderKind::Guest))?;
        self.activate(identity.clone());
        Ok(identity)
    }

    /// Apply the outcome of a pending acquisition
    ///
    /// Returns `None` when the ticket is no longer the pending one (superseded,
    /// cancelled, or issued before a sign-out); the outcome is then dropped.
    pub fn finish<E>(&mut self, ticket: Ticket, result: Result<Identity, E>) -> Option<Result<Identity, E>> {
        match self.pending {
            Some(p) if p.ticket == ticket && self.epoch == ticket.epoch => {}
            _ => {
                warn!(%ticket, current = %self.epoch, "finish: discarding stale identity completion");
                return None;
            }
        }
        self.pending = None;
        match result {
            Ok(identity) => {
                self.activate(identity.clone());
                Some(Ok(identity))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Drop any pending acquisition without changing the identity
    pub fn cancel_pending(&mut self) -> Option<PendingAuth> {
        self.pending.take()
    }

    fn activate(&mut self, identity: Identity) -> Epoch {
        self.identity = identity;
        self.epoch = self.epoch.next();
        self.pending = None;
        info!(kind = ?self.identity.kind(), epoch = %self.epoch, "activate: identity active");
        self.epoch
    }

    /// Revert to Anonymous; derived state is the caller's to clear
    pub fn sign_out(&mut self) -> Epoch {
        debug!("sign_out: called");
        self.identity = Identity::Anonymous;
        self.epoch = self.epoch.next();
        self.pending = None;
        info!(epoch = %self.epoch, "sign_out: signed out");
        self.epoch
    }
}
