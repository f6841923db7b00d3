//! Application State Machine
//!
//! [`App`] is pure: intents and completions go in, state changes, and the
//! network work still to be done comes back out as [`Effect`]s. The runtime
//! executes effects and feeds their outcomes back as [`Completion`]s.

mod machine;
mod messages;
mod state;

pub use machine::App;
pub use messages::{Completion, Effect, Intent};
pub use state::{AppSnapshot, Notice, NoticeLevel, Phase, UiMode};
