use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// TLS certificate is past its expiry.
    #[error("certificate has expired: {0}")]
    CertificateExpired(PathBuf),

    /// TLS certificate could not be parsed.
    #[error("certificate could not be parsed: {0}")]
    CertificateInvalid(PathBuf),

    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] vigil_config::Error),

    /// A startup dependency never became reachable.
    #[error(transparent)]
    Dependency(#[from] vigil_netwait::Error),

    /// Environment prerequisites are not satisfied.
    #[error(transparent)]
    Environment(#[from] vigil_environment::Error),

    /// Health aggregation failed before producing a report.
    #[error(transparent)]
    Health(#[from] vigil_health::Error),

    /// Service installation failed.
    #[error(transparent)]
    Installer(#[from] vigil_installer::Error),

    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),

    /// JSON serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The configured migration command exited nonzero.
    #[error("migration command unexpectedly exited with non-zero code: {0}")]
    MigrationFailed(ExitStatus),

    /// A TLS file named by the configuration does not exist.
    #[error("missing tls file: {0}")]
    MissingTlsFile(PathBuf),
}
