use std::path::PathBuf;

use thiserror::Error;

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),

    /// The config file is missing and no default may be created.
    #[error("config file missing: {0:?}")]
    Missing(PathBuf),

    /// The document is not well-formed JSON.
    #[error("config does not parse: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but violates a cross-field rule.
    #[error("invalid config: {0}")]
    Invalid(String),

    /// A URL derived from the config could not be built.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}
