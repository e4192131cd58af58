//! Generic utility primitives with zero domain knowledge.
//!
//! - `arn` - ARN and S3 path parsing
//! - `io` - File I/O with consistent error handling
//! - `json` - JSON pointer edits and structural comparison
//! - `validation` - Input validation helpers

pub mod arn;
pub mod io;
pub mod json;
pub mod validation;
