use std::process::ExitStatus;

use thiserror::Error;

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),

    /// An external tool exited nonzero.
    #[error("{0} unexpectedly exited with non-zero code: {1}")]
    NonZeroExit(&'static str, ExitStatus),

    /// Install and uninstall require elevated privilege.
    #[error("must be root")]
    NotRoot,

    /// A named system user or group could not be resolved after creation.
    #[error("unresolvable principal: {0}")]
    UnknownPrincipal(String),

    /// No supported service manager was detected on this host.
    #[error("unsupported platform: no systemd, launchd, or SysV init found")]
    Unsupported,
}
