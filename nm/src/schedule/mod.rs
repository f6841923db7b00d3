//! Schedule Commit Controller
//!
//! A pending (date, slot) selection is built locally and committed to the
//! backend plan. Recommendations without a backend meal id are matched
//! against the catalog before the commit goes out.

mod commit;
mod controller;
mod error;

pub use commit::{execute_commit, resolve_meal_id};
pub use controller::{CommitRequest, MealTarget, ScheduleCommitController};
pub use error::CommitError;
