//! Request handler module
//!
//! The static file middleware and the pipeline stages it is built from.

pub mod candidate;
pub mod directory;
pub mod gzip;
pub mod path;
pub mod send;
pub mod serve_static;

// Re-export main entry point
pub use serve_static::{Outcome, ServeStatic};
