//! Core orchestration logic.
//!
//! This module contains:
//! - Safety: Refusal gate for unsafe requests
//! - Classifier: Keyword intent classification
//! - Pipeline: Node graph, routing and shaping helpers
//! - Replies: Canned texts for non-generative paths
//! - Orchestrator: Main execution engine

pub mod classifier;
pub mod orchestrator;
pub mod pipeline;
pub mod replies;
pub mod safety;

// Re-export commonly used types
pub use classifier::{classify_keywords, Classification, IntentClassifier};
pub use orchestrator::Orchestrator;
pub use pipeline::{route_after_classify, Node};
pub use safety::{SafetyGate, SafetyViolation};
