use thiserror::Error;

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in this crate.
///
/// Probe failures are never errors; they are `Fail` results inside a report.
#[derive(Debug, Error)]
pub enum Error {
    /// The selected mode resolved to zero checks. Aggregating nothing is a
    /// caller mistake, not an empty report.
    #[error("no checks selected for aggregation")]
    NoChecks,

    /// A single-check run named a check that does not exist.
    #[error("unknown check: {0}")]
    UnknownCheck(String),
}
