//! Pipeline graph definition.
//!
//! Three nodes and one conditional edge:
//!
//! ```text
//! classify --(unsafe)--> synthesize
//!    |                       ^
//!    +------> search --------+
//! ```

use std::fmt;

use crate::domain::PipelineState;

/// Characters of the user's body blended into the search query
pub const QUERY_BODY_CHARS: usize = 280;

/// Sources handed to the generator never drop below this
pub const MIN_GENERATION_SOURCES: usize = 4;

/// A node in the reply pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Classify,
    Search,
    Synthesize,
}

impl Node {
    /// Entry point of every run
    pub const ENTRY: Node = Node::Classify;

    /// Node name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Classify => "classify",
            Self::Search => "search",
            Self::Synthesize => "synthesize",
        }
    }

    /// Next node after this one has run, or `None` when terminal
    pub fn next(&self, state: &PipelineState) -> Option<Node> {
        match self {
            Self::Classify => Some(route_after_classify(state)),
            Self::Search => Some(Self::Synthesize),
            Self::Synthesize => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unsafe requests skip search and go straight to synthesis
pub fn route_after_classify(state: &PipelineState) -> Node {
    if state.intent().is_unsafe() {
        Node::Synthesize
    } else {
        Node::Search
    }
}

/// Intent-specific topic blended with the head of the user's body
pub fn search_query(state: &PipelineState, location: &str) -> String {
    let head: String = state.body.chars().take(QUERY_BODY_CHARS).collect();
    format!("{}. User request: {}", state.intent().search_topic(location), head)
}

/// Number of sources passed to the generator
pub fn generation_source_limit(max_reply_items: usize) -> usize {
    max_reply_items.max(MIN_GENERATION_SOURCES)
}

/// Collapse runs of 3+ newlines into a single blank line and trim
pub fn normalize_whitespace(text: &str) -> String {
    use regex::Regex;
    use std::sync::LazyLock;

    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    MULTI_BLANK_RE.replace_all(text, "\n\n").trim().to_string()
}
