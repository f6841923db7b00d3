//! nextmeal - client core for mood-driven meal suggestions and a weekly plan
//!
//! The crate decides which identity is active, asks the recommendation
//! service for suggestions under it, and keeps a local view of the backend
//! plan consistent across asynchronous, fallible network calls.
//!
//! - [`session`] holds the single active identity and its epoch
//! - [`recommend`] issues one suggestion request at a time
//! - [`plan`] mirrors the backend plan with full-replace refreshes
//! - [`schedule`] turns a suggestion into a plan entry
//! - [`app`] composes them into a pure state machine
//! - [`runtime`] executes that machine's effects with bounded timeouts

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod plan;
pub mod recommend;
pub mod runtime;
pub mod schedule;
pub mod session;
pub mod shell;

pub use api::{ApiError, HttpMealApi, MealApi};
pub use app::{App, AppSnapshot, Intent, Phase, UiMode};
pub use config::Config;
pub use runtime::AppHandle;
