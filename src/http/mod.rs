//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from file-system access.

pub mod body;
pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::ServeBody;
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{build_405_response, build_error_response, build_redirect_response};
