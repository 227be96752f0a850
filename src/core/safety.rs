//! Safety gate for incoming requests.
//!
//! A small literal marker list matched by case-folded substring. It runs
//! before intent classification and short-circuits it on any match.
//!
//! Substring matching over-triggers ("kill" matches "killing time") and
//! under-triggers on paraphrases. The list is a placeholder policy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_markers() -> Vec<String> {
    [
        "how to make a bomb",
        "buy drugs",
        "child sexual",
        "explicit sexual",
        "kill",
        "terrorist",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Marker-based refusal gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyGate {
    /// Lowercase markers matched as raw substrings
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,
}

impl Default for SafetyGate {
    fn default() -> Self {
        Self {
            markers: default_markers(),
        }
    }
}

impl SafetyGate {
    /// Check a request body against the marker list
    pub fn check(&self, body: &str) -> Result<(), SafetyViolation> {
        let folded = body.to_lowercase();
        match self.markers.iter().find(|m| folded.contains(m.as_str())) {
            Some(marker) => Err(SafetyViolation::UnsafeMarker {
                marker: marker.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Whether the body trips the gate
    pub fn is_unsafe(&self, body: &str) -> bool {
        self.check(body).is_err()
    }
}

/// Safety violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SafetyViolation {
    #[error("Request matches unsafe marker: {marker}")]
    UnsafeMarker { marker: String },
}
