//! Domain types for the reply pipeline.
//!
//! This module contains the core data structures:
//! - Intent: Request taxonomy
//! - Source: Cited links
//! - PipelineState: Request-scoped state and node patches

pub mod intent;
pub mod source;
pub mod state;

// Re-export commonly used types
pub use intent::Intent;
pub use source::Source;
pub use state::{PipelineState, StatePatch, NONE_BACKEND};
