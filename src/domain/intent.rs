//! Intent taxonomy used to steer search phrasing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse category assigned to an incoming request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CulturalEvents,
    TechEvents,
    SportsEvents,
    BusinessEvents,
    GeneralEvents,
    UnsafeRequest,
}

impl Intent {
    /// Wire label (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CulturalEvents => "cultural_events",
            Self::TechEvents => "tech_events",
            Self::SportsEvents => "sports_events",
            Self::BusinessEvents => "business_events",
            Self::GeneralEvents => "general_events",
            Self::UnsafeRequest => "unsafe_request",
        }
    }

    /// Whether this intent was produced by the safety gate
    pub fn is_unsafe(&self) -> bool {
        matches!(self, Self::UnsafeRequest)
    }

    /// Search topic phrase for this intent in the given location
    pub fn search_topic(&self, location: &str) -> String {
        match self {
            Self::CulturalEvents => format!("cultural events in {location}"),
            Self::TechEvents => format!("tech meetups workshops in {location}"),
            Self::SportsEvents => format!("sports events tournaments in {location}"),
            Self::BusinessEvents => format!("expos trade fairs business events in {location}"),
            Self::GeneralEvents | Self::UnsafeRequest => format!("recent events in {location}"),
        }
    }
}

impl Default for Intent {
    fn default() -> Self {
        Self::GeneralEvents
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
