//! Heuristic intent classification.
//!
//! Keyword tables are scanned in priority order and the first match wins:
//! cultural > tech > sports > business, with general as the default. The
//! safety gate runs first and overrides everything.

use tracing::debug;

use super::replies;
use super::safety::SafetyGate;
use crate::domain::Intent;

const CATEGORY_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::CulturalEvents,
        &[
            "festival",
            "garba",
            "navratri",
            "cultural",
            "music",
            "concert",
            "art",
            "exhibition",
        ],
    ),
    (
        Intent::TechEvents,
        &["tech", "startup", "hackathon", "conference", "meetup", "workshop"],
    ),
    (
        Intent::SportsEvents,
        &["sports", "marathon", "cricket", "football", "tournament"],
    ),
    (
        Intent::BusinessEvents,
        &["business", "expo", "trade fair", "summit", "industry"],
    ),
];

/// Result of classifying a request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub intent: Intent,
    /// Set only for unsafe requests
    pub refusal: Option<String>,
}

/// Safety gate plus keyword classifier
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    gate: SafetyGate,
    location: String,
}

impl IntentClassifier {
    pub fn new(gate: SafetyGate, location: impl Into<String>) -> Self {
        Self {
            gate,
            location: location.into(),
        }
    }

    /// Classify a body. Unsafe bodies get a refusal and skip keyword
    /// classification entirely.
    pub fn classify(&self, body: &str) -> Classification {
        if let Err(violation) = self.gate.check(body) {
            debug!(%violation, "Safety gate tripped");
            return Classification {
                intent: Intent::UnsafeRequest,
                refusal: Some(replies::refusal(&self.location)),
            };
        }

        Classification {
            intent: classify_keywords(body),
            refusal: None,
        }
    }
}

/// First-match keyword classification over the case-folded body
pub fn classify_keywords(body: &str) -> Intent {
    let folded = body.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| folded.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::GeneralEvents)
}
