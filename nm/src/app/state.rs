//! Phase, notices and the render snapshot

use crate::config::ProviderKind;
use crate::domain::{Epoch, Identity, PendingSchedule, Plan, Recommendation, SelectionCriteria};

/// Which half of the active screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    #[default]
    Suggest,
    Plan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unauthenticated,
    /// Waiting for a provider to hand back an identity
    Authenticating(ProviderKind),
    Active(UiMode),
}

impl Phase {
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Active(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A dismissible, user-visible message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    /// Trying the same action again may succeed
    pub retryable: bool,
}

/// Everything a front end needs to draw the current state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSnapshot {
    pub phase: Phase,
    pub identity: Identity,
    pub epoch: Epoch,
    pub criteria: SelectionCriteria,
    pub recommendation: Option<Recommendation>,
    pub suggestion_pending: bool,
    pub plan: Plan,
    pub plan_loading: bool,
    pub pending_schedule: Option<PendingSchedule>,
    pub committing: bool,
    pub notices: Vec<Notice>,
}
