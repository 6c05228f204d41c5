use std::time::Duration;

use thiserror::Error;

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The wait was abandoned because shutdown was requested.
    #[error("cancelled while waiting for {0}")]
    Cancelled(String),

    /// The deadline elapsed without a successful connection.
    #[error("{display_name} not reachable after {waited:?}")]
    Timeout {
        /// Human-readable name of the dependency.
        display_name: String,

        /// Total time spent polling before giving up.
        waited: Duration,
    },
}
