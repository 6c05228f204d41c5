//! Pre-flight environment checks: variables, directories, resource headroom.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::{Error, Result};

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use sysinfo::{Disks, System};
use tracing::{debug, warn};

const BYTES_PER_MB: u64 = 1024 * 1024;
const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;

/// Standard directory layout under the service home.
///
/// Both the directories boot stage and the filesystem probe derive the
/// critical directory set from here so they can never disagree.
#[derive(Debug, Clone)]
pub struct HomeLayout {
    home: PathBuf,
}

impl HomeLayout {
    /// Creates a layout rooted at `home`.
    #[must_use]
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// The home directory itself.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Persistent service data.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.home.join("data")
    }

    /// Log files.
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.home.join("logs")
    }

    /// TLS certificates and keys.
    #[must_use]
    pub fn certs_dir(&self) -> PathBuf {
        self.home.join("certs")
    }

    /// Pid files and sockets.
    #[must_use]
    pub fn run_dir(&self) -> PathBuf {
        self.home.join("run")
    }

    /// Every directory the service must be able to write.
    #[must_use]
    pub fn critical_directories(&self) -> Vec<PathBuf> {
        vec![
            self.data_dir(),
            self.logs_dir(),
            self.certs_dir(),
            self.run_dir(),
        ]
    }
}

/// Minimum-headroom policy for [`resource_snapshot`]. Shortfalls are
/// warnings, never errors.
#[derive(Debug, Clone, Copy)]
pub struct ResourcePolicy {
    /// Free memory below this many megabytes draws a warning.
    pub min_free_memory_mb: u64,

    /// Free disk below this many gigabytes draws a warning.
    pub min_free_disk_gb: u64,
}

impl Default for ResourcePolicy {
    fn default() -> Self {
        Self {
            min_free_memory_mb: 512,
            min_free_disk_gb: 1,
        }
    }
}

/// Observed resource headroom plus any policy warnings.
#[derive(Debug, Clone)]
pub struct ResourceSnapshot {
    /// Free memory in megabytes.
    pub memory_mb: u64,

    /// Free disk in gigabytes on the volume holding `disk_path`.
    pub disk_gb: u64,

    /// Human-readable policy shortfalls.
    pub warnings: Vec<String>,
}

/// Verifies that every named environment variable is set and non-empty.
///
/// # Errors
///
/// Returns `Error::MissingVar` naming the first absent variable.
pub fn check_required_vars(names: &[&str]) -> Result<()> {
    missing_from(names, |name| std::env::var(name).ok())
}

/// Testable core of [`check_required_vars`].
fn missing_from<F>(names: &[&str], lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    for name in names {
        match lookup(name) {
            Some(value) if !value.is_empty() => {}
            _ => return Err(Error::MissingVar((*name).to_string())),
        }
    }

    Ok(())
}

/// Creates every listed directory (including parents) and applies `mode`.
/// Safe to call repeatedly.
///
/// # Errors
///
/// Returns an error if a directory cannot be created or its permissions
/// cannot be set.
pub fn ensure_directories(paths: &[PathBuf], mode: u32) -> Result<()> {
    for path in paths {
        std::fs::create_dir_all(path).map_err(|e| Error::Io("failed to create directory", e))?;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .map_err(|e| Error::Io("failed to set directory mode", e))?;
        debug!("directory ready: {} (mode {:o})", path.display(), mode);
    }

    Ok(())
}

/// Samples free memory and free disk on the volume holding `disk_path`,
/// recording a warning for each policy shortfall.
#[must_use]
pub fn resource_snapshot(disk_path: &Path, policy: &ResourcePolicy) -> ResourceSnapshot {
    let mut system = System::new();
    system.refresh_memory();
    let memory_mb = system.available_memory() / BYTES_PER_MB;

    let disk_gb = free_disk_bytes(disk_path).map_or(0, |bytes| bytes / BYTES_PER_GB);

    let mut warnings = Vec::new();
    if memory_mb < policy.min_free_memory_mb {
        warnings.push(format!(
            "low memory: {memory_mb}MB free, want at least {}MB",
            policy.min_free_memory_mb
        ));
    }
    if disk_gb < policy.min_free_disk_gb {
        warnings.push(format!(
            "low disk: {disk_gb}GB free on {}, want at least {}GB",
            disk_path.display(),
            policy.min_free_disk_gb
        ));
    }

    for warning in &warnings {
        warn!("{warning}");
    }

    ResourceSnapshot {
        memory_mb,
        disk_gb,
        warnings,
    }
}

/// Free space on the disk whose mount point is the longest prefix of `path`.
fn free_disk_bytes(path: &Path) -> Option<u64> {
    let disks = Disks::new_with_refreshed_list();

    disks
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(sysinfo::Disk::available_space)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_from_accepts_a_complete_set() {
        let lookup = |name: &str| match name {
            "VIGIL_HOME" => Some("/opt/vigil".to_string()),
            "VIGIL_CONFIG" => Some("/etc/vigil/config.json".to_string()),
            _ => None,
        };

        assert!(missing_from(&["VIGIL_HOME", "VIGIL_CONFIG"], lookup).is_ok());
    }

    #[test]
    fn missing_from_names_the_first_absent_variable() {
        let lookup = |name: &str| (name == "VIGIL_HOME").then(|| "/opt/vigil".to_string());

        let err = missing_from(&["VIGIL_HOME", "VIGIL_CONFIG"], lookup).unwrap_err();
        assert!(matches!(err, Error::MissingVar(name) if name == "VIGIL_CONFIG"));
    }

    #[test]
    fn empty_values_count_as_missing() {
        let lookup = |_: &str| Some(String::new());

        assert!(missing_from(&["VIGIL_HOME"], lookup).is_err());
    }

    #[test]
    fn ensure_directories_is_idempotent_and_sets_mode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("data/certs");

        ensure_directories(&[nested.clone()], 0o750).expect("first call");
        ensure_directories(&[nested.clone()], 0o750).expect("second call");

        let mode = std::fs::metadata(&nested).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[test]
    fn snapshot_never_errors_and_warns_only_on_shortfall() {
        let generous = ResourcePolicy {
            min_free_memory_mb: 0,
            min_free_disk_gb: 0,
        };
        let snapshot = resource_snapshot(Path::new("/"), &generous);
        assert!(snapshot.warnings.is_empty());

        let impossible = ResourcePolicy {
            min_free_memory_mb: u64::MAX,
            min_free_disk_gb: u64::MAX,
        };
        let snapshot = resource_snapshot(Path::new("/"), &impossible);
        assert_eq!(snapshot.warnings.len(), 2);
    }
}
