//! Backend API module for nextmeal
//!
//! The client reaches every remote collaborator (identity store,
//! recommendation engine, plan storage, meal catalog) through [`MealApi`].

mod client;
mod error;
mod http;
mod types;

#[cfg(test)]
pub mod mock;

pub use client::MealApi;
pub use error::ApiError;
pub use http::HttpMealApi;
pub use types::{CatalogMeal, NewPlanEntry, NewUser, UserRecord, format_plan_date, parse_backend_datetime};
