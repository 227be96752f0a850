//! Cited sources backing a reply.

use serde::{Deserialize, Serialize};

/// A single cited link (title + URL)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Display title for the link
    pub title: String,

    /// Target URL
    pub url: String,
}

impl Source {
    /// Create a new source
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Build a source from a provider hit, falling back to the URL (or a
    /// generic label) when the provider gave no title.
    ///
    /// Returns `None` when the hit carries no URL.
    pub fn from_hit(title: Option<&str>, url: Option<&str>) -> Option<Self> {
        let url = url.map(str::trim).filter(|u| !u.is_empty())?;
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(url);
        let title = if title.is_empty() { "Source" } else { title };
        Some(Self::new(title, url))
    }

    /// Identity key used for deduplication: trimmed, case-folded URL.
    ///
    /// The title never participates in identity.
    pub fn dedup_key(&self) -> String {
        self.url.trim().to_lowercase()
    }
}
