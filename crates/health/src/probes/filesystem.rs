use std::io::Write;
use std::path::Path;

use async_trait::async_trait;
use sysinfo::Disks;

use crate::types::{Check, CheckCategory, CheckResult, CheckStatus};
use crate::{Probe, ProbeContext};

/// Checks that every critical directory is writable and that the home
/// volume is not under disk pressure.
pub struct FilesystemProbe {
    check: Check,
}

impl FilesystemProbe {
    /// Creates the probe.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            check: Check::new("filesystem", CheckCategory::Filesystem),
        }
    }
}

impl Default for FilesystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Confirms the directory accepts a write by creating and dropping a scratch
/// file inside it.
fn is_writable(dir: &Path) -> bool {
    tempfile::tempfile_in(dir)
        .and_then(|mut f| f.write_all(b"probe"))
        .is_ok()
}

/// Used-space percentage of the disk holding `path`, if it can be read.
fn disk_usage_percent(path: &Path) -> Option<u8> {
    let disks = Disks::new_with_refreshed_list();
    let disk = disks
        .iter()
        .filter(|d| path.starts_with(d.mount_point()))
        .max_by_key(|d| d.mount_point().as_os_str().len())?;

    let total = disk.total_space();
    if total == 0 {
        return None;
    }
    let used = total.saturating_sub(disk.available_space());

    u8::try_from(used * 100 / total).ok()
}

#[async_trait]
impl Probe for FilesystemProbe {
    fn check(&self) -> &Check {
        &self.check
    }

    async fn run(&self, cx: &ProbeContext) -> CheckResult {
        for dir in cx.layout.critical_directories() {
            if !dir.is_dir() {
                return CheckResult::new(
                    &self.check,
                    CheckStatus::Fail,
                    format!("missing directory: {}", dir.display()),
                );
            }
            if !is_writable(&dir) {
                return CheckResult::new(
                    &self.check,
                    CheckStatus::Fail,
                    format!("directory not writable: {}", dir.display()),
                );
            }
        }

        match disk_usage_percent(cx.layout.home()) {
            Some(usage) if usage > cx.policy.disk_fail_percent => CheckResult::new(
                &self.check,
                CheckStatus::Fail,
                format!("disk {usage}% used"),
            ),
            Some(usage) if usage >= cx.policy.disk_warn_percent => CheckResult::new(
                &self.check,
                CheckStatus::Warn,
                format!("disk {usage}% used"),
            ),
            Some(usage) => CheckResult::new(
                &self.check,
                CheckStatus::Pass,
                format!("directories writable, disk {usage}% used"),
            ),
            None => CheckResult::new(
                &self.check,
                CheckStatus::Pass,
                "directories writable, disk usage unavailable",
            ),
        }
    }
}
