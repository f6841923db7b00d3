//! Runtime - actor that owns the App
//!
//! Intents arrive over a channel, effects run as spawned tasks bounded by the
//! backend timeout, and their completions are fed back into the same actor so
//! all state changes happen on one task.

mod actor;
mod effects;
mod messages;

pub use actor::AppHandle;
pub use effects::EffectRunner;
pub use messages::{RuntimeError, RuntimeEvent, RuntimeResponse};
