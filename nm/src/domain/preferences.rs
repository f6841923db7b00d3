//! Dietary and regional preferences captured at registration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{ParseLabelError, parse_label};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DietaryType {
    Vegetarian,
    #[serde(rename = "Non-Vegetarian")]
    NonVegetarian,
    Vegan,
    Jain,
}

impl DietaryType {
    pub const ALL: [DietaryType; 4] = [
        DietaryType::Vegetarian,
        DietaryType::NonVegetarian,
        DietaryType::Vegan,
        DietaryType::Jain,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DietaryType::Vegetarian => "Vegetarian",
            DietaryType::NonVegetarian => "Non-Vegetarian",
            DietaryType::Vegan => "Vegan",
            DietaryType::Jain => "Jain",
        }
    }
}

impl fmt::Display for DietaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DietaryType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("dietary type", s, &DietaryType::ALL, DietaryType::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionalCuisine {
    #[serde(rename = "North Indian")]
    NorthIndian,
    #[serde(rename = "South Indian")]
    SouthIndian,
    Italian,
    Chinese,
}

impl RegionalCuisine {
    pub const ALL: [RegionalCuisine; 4] = [
        RegionalCuisine::NorthIndian,
        RegionalCuisine::SouthIndian,
        RegionalCuisine::Italian,
        RegionalCuisine::Chinese,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RegionalCuisine::NorthIndian => "North Indian",
            RegionalCuisine::SouthIndian => "South Indian",
            RegionalCuisine::Italian => "Italian",
            RegionalCuisine::Chinese => "Chinese",
        }
    }
}

impl fmt::Display for RegionalCuisine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionalCuisine {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("regional cuisine", s, &RegionalCuisine::ALL, RegionalCuisine::as_str)
    }
}

/// Preferences sent once with the registration request; the backend owns them afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub dietary: DietaryType,
    pub regional: RegionalCuisine,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dietary: DietaryType::Vegetarian,
            regional: RegionalCuisine::NorthIndian,
        }
    }
}

/// Registration form contents; lives only until the registration request resolves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub preferences: Preferences,
}

impl RegistrationForm {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>, preferences: Preferences) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            preferences,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dietary_type_labels() {
        assert_eq!("non vegetarian".parse::<DietaryType>().unwrap(), DietaryType::NonVegetarian);
        assert_eq!(DietaryType::NonVegetarian.to_string(), "Non-Vegetarian");
        assert!("pescatarian".parse::<DietaryType>().is_err());
    }

    #[test]
    fn test_regional_cuisine_labels() {
        assert_eq!("south-indian".parse::<RegionalCuisine>().unwrap(), RegionalCuisine::SouthIndian);
        assert_eq!(RegionalCuisine::NorthIndian.as_str(), "North Indian");
    }
}
