//! eventmail - Email-style replies about recent local events
//!
//! Answers an email-like question by running a three-node pipeline:
//! classify intent, search the web, synthesize a reply with citations.
//!
//! # Architecture
//!
//! The pipeline is a small state machine:
//! - Nodes return partial patches; the orchestrator merges them
//! - Unsafe requests skip search and get a canned refusal
//! - Search falls back from the keyed provider to the keyless one
//! - Synthesis degrades to a source listing when the generator is unset
//!
//! # Modules
//!
//! - `adapters`: External system integrations (Tavily, DuckDuckGo, OpenAI)
//! - `core`: Orchestration logic (Safety, Classifier, Pipeline, Orchestrator)
//! - `domain`: Data structures (Intent, Source, PipelineState)
//! - `search`: Provider fallback and deduplication
//! - `service`: Request validation and response rendering
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Answer a query
//! eventmail reply --body "Any tech meetups in Surat this week?"
//!
//! # Pipe the body through stdin
//! echo "Any garba nights?" | eventmail reply --subject "Navratri"
//!
//! # Inspect resolved settings
//! eventmail config
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod search;
pub mod service;

// Re-export main types at crate root for convenience
pub use config::Settings;
pub use core::Orchestrator;
pub use domain::{Intent, PipelineState, Source};
pub use search::{SearchError, SourceLookup};
pub use service::{ErrorResponse, ReplyRequest, ReplyResponse, ReplyService};
