use std::path::Path;

use crate::error::{Error, Result};

/// Service-manager platform, detected once at install time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux with systemd.
    Systemd,
    /// macOS launchd.
    Launchd,
    /// Legacy SysV init.
    SysV,
}

impl Platform {
    /// Detects the platform of the current host.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unsupported` when no known service manager is found.
    pub fn detect() -> Result<Self> {
        if cfg!(target_os = "macos") {
            return Ok(Self::Launchd);
        }

        // systemd hosts are recognized by the runtime directory it mounts,
        // not by the presence of a systemctl binary on PATH.
        if Path::new("/run/systemd/system").is_dir() {
            return Ok(Self::Systemd);
        }

        if Path::new("/etc/init.d").is_dir() {
            return Ok(Self::SysV);
        }

        Err(Error::Unsupported)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Systemd => "systemd",
            Self::Launchd => "launchd",
            Self::SysV => "sysv",
        };
        f.write_str(name)
    }
}
