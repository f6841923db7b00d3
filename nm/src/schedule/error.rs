use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("Nothing is being scheduled")]
    NothingPending,

    #[error("There is no suggestion to schedule")]
    NoRecommendation,

    #[error("A commit is already in progress")]
    AlreadyCommitting,

    #[error("'{0}' is not in the meal catalog")]
    UnresolvedMeal(String),

    #[error("Could not save to your plan: {0}")]
    Backend(#[from] ApiError),
}

impl CommitError {
    pub fn is_retryable(&self) -> bool {
        match self {
            CommitError::Backend(e) => e.is_retryable(),
            CommitError::UnresolvedMeal(_) => true,
            _ => false,
        }
    }
}
