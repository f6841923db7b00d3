//! Messages into and out of the state machine

use chrono::NaiveDate;

use super::UiMode;
use crate::api::ApiError;
use crate::config::ProviderKind;
use crate::domain::{
    FederatedSession, Identity, MealSlot, Mood, PlannedMeal, Recommendation, RegistrationForm, SelectionCriteria,
    Ticket, TimeOfDay, UserKey,
};
use crate::schedule::{CommitError, CommitRequest};
use crate::session::{AuthError, Credential, ResolvedIdentity, SessionError};

/// Something the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Register(RegistrationForm),
    SignInWithId(UserKey),
    SignInGuest,
    SignInFederated,
    /// The external provider reports a signed-in session
    FederatedSessionEstablished(FederatedSession),
    /// The external provider reports the session is gone
    FederatedSessionCleared,
    SignOut,
    SetMood(Mood),
    SetTimeOfDay(TimeOfDay),
    RequestSuggestion,
    SwitchMode(UiMode),
    RefreshPlan,
    OpenSchedule { today: NaiveDate },
    SetScheduleDate(NaiveDate),
    SetScheduleSlot(MealSlot),
    CancelSchedule,
    CommitSchedule,
    DismissNotice(u64),
}

/// Network work the state machine wants done
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Register {
        ticket: Ticket,
        form: RegistrationForm,
    },
    ResolveIdentity {
        ticket: Ticket,
        provider: ProviderKind,
        credential: Credential,
    },
    /// Send the user to the external provider; its answer arrives as an intent
    OpenFederatedRedirect { url: String },
    FetchSuggestion {
        ticket: Ticket,
        user: UserKey,
        criteria: SelectionCriteria,
    },
    FetchPlan {
        ticket: Ticket,
        user: UserKey,
    },
    CommitMeal {
        user: UserKey,
        request: CommitRequest,
    },
}

impl Effect {
    pub fn ticket(&self) -> Option<Ticket> {
        match self {
            Effect::Register { ticket, .. }
            | Effect::ResolveIdentity { ticket, .. }
            | Effect::FetchSuggestion { ticket, .. }
            | Effect::FetchPlan { ticket, .. } => Some(*ticket),
            Effect::CommitMeal { request, .. } => Some(request.ticket),
            Effect::OpenFederatedRedirect { .. } => None,
        }
    }

    /// Completion reporting that this effect never produced a result
    pub fn failed(&self, error: ApiError) -> Option<Completion> {
        let completion = match self {
            Effect::Register { ticket, .. } => Completion::Registered {
                ticket: *ticket,
                result: Err(error.into()),
            },
            Effect::ResolveIdentity { ticket, .. } => Completion::Resolved {
                ticket: *ticket,
                result: Err(error.into()),
            },
            Effect::FetchSuggestion { ticket, .. } => Completion::Suggestion {
                ticket: *ticket,
                result: Err(error),
            },
            Effect::FetchPlan { ticket, .. } => Completion::Plan {
                ticket: *ticket,
                result: Err(error),
            },
            Effect::CommitMeal { request, .. } => Completion::Committed {
                ticket: request.ticket,
                result: Err(error.into()),
            },
            Effect::OpenFederatedRedirect { .. } => return None,
        };
        Some(completion)
    }
}

/// Outcome of an executed effect, stamped with the effect's ticket
#[derive(Debug)]
pub enum Completion {
    Registered {
        ticket: Ticket,
        result: Result<Identity, SessionError>,
    },
    Resolved {
        ticket: Ticket,
        result: Result<ResolvedIdentity, AuthError>,
    },
    Suggestion {
        ticket: Ticket,
        result: Result<Recommendation, ApiError>,
    },
    Plan {
        ticket: Ticket,
        result: Result<Vec<PlannedMeal>, ApiError>,
    },
    Committed {
        ticket: Ticket,
        result: Result<(), CommitError>,
    },
}

impl Completion {
    pub fn ticket(&self) -> Ticket {
        match self {
            Completion::Registered { ticket, .. }
            | Completion::Resolved { ticket, .. }
            | Completion::Suggestion { ticket, .. }
            | Completion::Plan { ticket, .. }
            | Completion::Committed { ticket, .. } => *ticket,
        }
    }
}
