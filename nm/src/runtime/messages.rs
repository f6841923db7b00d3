//! Runtime messages
//!
//! Commands and events for the actor pattern.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::app::{AppSnapshot, Intent};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Channel error")]
    ChannelError,
}

pub type RuntimeResponse<T> = Result<T, RuntimeError>;

/// Commands sent to the runtime actor
#[derive(Debug)]
pub(crate) enum RuntimeCommand {
    Intent {
        intent: Intent,
        reply: oneshot::Sender<AppSnapshot>,
    },
    Snapshot {
        reply: oneshot::Sender<AppSnapshot>,
    },
    /// Reply once no effect is running
    WhenIdle {
        reply: oneshot::Sender<AppSnapshot>,
    },
    Shutdown,
}

/// Broadcast to front ends
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// State changed because an effect completed
    Updated(Box<AppSnapshot>),
    /// The user must be sent to the external identity provider
    RedirectRequested { url: String },
}
