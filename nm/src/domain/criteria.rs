//! Mood and time-of-day criteria for recommendation requests

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{ParseLabelError, parse_label};

/// Named mood tags understood by the recommendation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "Comfort Craving")]
    ComfortCraving,
    #[serde(rename = "Spicy Kick")]
    SpicyKick,
    #[serde(rename = "Sweet Tooth")]
    SweetTooth,
    #[serde(rename = "Healthy & Guilt Free")]
    HealthyGuiltFree,
    #[serde(rename = "Warm & Cozy")]
    WarmCozy,
    #[serde(rename = "Quick & Easy")]
    QuickEasy,
    #[serde(rename = "Crispy & Savory")]
    CrispySavory,
    #[serde(rename = "Refreshing & Hydrating")]
    RefreshingHydrating,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::ComfortCraving,
        Mood::SpicyKick,
        Mood::SweetTooth,
        Mood::HealthyGuiltFree,
        Mood::WarmCozy,
        Mood::QuickEasy,
        Mood::CrispySavory,
        Mood::RefreshingHydrating,
    ];

    /// Wire label, as sent in the `mood` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::ComfortCraving => "Comfort Craving",
            Mood::SpicyKick => "Spicy Kick",
            Mood::SweetTooth => "Sweet Tooth",
            Mood::HealthyGuiltFree => "Healthy & Guilt Free",
            Mood::WarmCozy => "Warm & Cozy",
            Mood::QuickEasy => "Quick & Easy",
            Mood::CrispySavory => "Crispy & Savory",
            Mood::RefreshingHydrating => "Refreshing & Hydrating",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("mood", s, &Mood::ALL, Mood::as_str)
    }
}

/// Time of day a meal is wanted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    Breakfast,
    Lunch,
    Dinner,
    Snacking,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Breakfast,
        TimeOfDay::Lunch,
        TimeOfDay::Dinner,
        TimeOfDay::Snacking,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Breakfast => "Breakfast",
            TimeOfDay::Lunch => "Lunch",
            TimeOfDay::Dinner => "Dinner",
            TimeOfDay::Snacking => "Snacking",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("time of day", s, &TimeOfDay::ALL, TimeOfDay::as_str)
    }
}

/// Current mood/time selection; the parameters of the next suggestion request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionCriteria {
    pub mood: Mood,
    pub time_of_day: TimeOfDay,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            mood: Mood::ComfortCraving,
            time_of_day: TimeOfDay::Dinner,
        }
    }
}
