//! Domain types shared by every component
//!
//! Identity, preferences, selection criteria, recommendations, planned meals
//! and the generation tickets that stamp every asynchronous request.

mod criteria;
mod identity;
mod meal;
mod preferences;
mod ticket;

pub use criteria::{Mood, SelectionCriteria, TimeOfDay};
pub use identity::{FederatedSession, Identity, IdentityKind, UserKey};
pub use meal::{MealReference, MealSlot, PendingSchedule, Plan, PlannedMeal, Recommendation};
pub use preferences::{DietaryType, Preferences, RegionalCuisine, RegistrationForm};
pub use ticket::{Epoch, Ticket};

/// Error returned when a user-supplied label does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

/// Fold a label for lenient matching: "Healthy & Guilt-Free" -> "healthyguiltfree"
pub(crate) fn fold_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Look up a variant by its display label, ignoring case, spacing and punctuation
pub(crate) fn parse_label<T: Copy>(
    kind: &'static str,
    value: &str,
    variants: &[T],
    label: impl Fn(T) -> &'static str,
) -> Result<T, ParseLabelError> {
    let folded = fold_label(value);
    variants
        .iter()
        .copied()
        .find(|v| fold_label(label(*v)) == folded)
        .ok_or_else(|| ParseLabelError {
            kind,
            value: value.to_string(),
            expected: variants.iter().map(|v| label(*v)).collect::<Vec<_>>().join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_label_drops_punctuation_and_case() {
        assert_eq!(fold_label("Healthy & Guilt Free"), "healthyguiltfree");
        assert_eq!(fold_label("non-vegetarian"), "nonvegetarian");
    }

    #[test]
    fn test_parse_label_reports_expected_values() {
        let err = "Brunch".parse::<TimeOfDay>().unwrap_err();
        assert_eq!(err.kind, "time of day");
        assert!(err.expected.contains("Breakfast"));
        assert!(err.expected.contains("Snacking"));
    }
}
