// Public modules
pub mod athena;
pub mod aws;
pub mod emr;
pub mod error;
pub mod glue;
pub mod lakeformation;
pub mod output;
pub mod repo;
pub mod role;
pub mod s3;
pub mod s3tables;

// Internal modules - not part of public API
pub(crate) mod paths;

// Public modules for CLI access
pub mod defaults;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use output::{MigrationReport, ReportSummary, StepRecord, StepStatus};
