//! Interactive shell
//!
//! A line-oriented front end over the runtime: slash commands become intents,
//! and the state is rendered once the runtime has gone idle.

mod command;
mod render;
mod session;

pub use command::{ParseError, ShellCommand, parse_command};
pub use session::ShellSession;
