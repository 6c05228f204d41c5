use std::path::Path;

use async_trait::async_trait;
use vigil_config::DatabaseEngine;

use crate::types::{Check, CheckCategory, CheckResult, CheckStatus};
use crate::{Probe, ProbeContext};

/// Checks reachability of the configured database.
///
/// Network engines get a TCP readiness probe; sqlite gets a file
/// accessibility check. A dependency timeout here is a failed check, never a
/// process failure.
pub struct DatabaseProbe {
    check: Check,
}

impl DatabaseProbe {
    /// Creates the probe.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            check: Check::new("database", CheckCategory::Database),
        }
    }

    fn probe_sqlite(&self, name: &str) -> CheckResult {
        // An in-memory database has nothing on disk to verify.
        if name == ":memory:" {
            return CheckResult::new(
                &self.check,
                CheckStatus::Pass,
                "in-memory database, nothing to check",
            );
        }

        let path = Path::new(name);
        if path.exists() {
            return CheckResult::new(&self.check, CheckStatus::Pass, "database file present");
        }

        // Before first use the file may legitimately not exist yet; an
        // existing parent directory is enough. A bare file name has an
        // empty parent, which resolves against the current directory.
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        if parent.is_dir() {
            CheckResult::new(&self.check, CheckStatus::Pass, "database not yet created")
        } else {
            CheckResult::new(
                &self.check,
                CheckStatus::Fail,
                format!("database path unusable: {name}"),
            )
        }
    }
}

impl Default for DatabaseProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for DatabaseProbe {
    fn check(&self) -> &Check {
        &self.check
    }

    async fn run(&self, cx: &ProbeContext) -> CheckResult {
        let Some(config) = cx.config.as_ref() else {
            return CheckResult::new(&self.check, CheckStatus::Fail, "no configuration loaded");
        };

        if config.database.engine == DatabaseEngine::Sqlite {
            return self.probe_sqlite(&config.database.name);
        }

        let Some(target) = config.database_target(self.check.timeout.as_secs()) else {
            return CheckResult::new(
                &self.check,
                CheckStatus::Fail,
                "network database configured without a host",
            );
        };

        match vigil_netwait::wait(&target, &cx.cancellation).await {
            Ok(ready) => CheckResult::new(
                &self.check,
                CheckStatus::Pass,
                format!(
                    "{} reachable in {}ms",
                    target.display_name,
                    ready.elapsed.as_millis()
                ),
            ),
            Err(e) => CheckResult::new(&self.check, CheckStatus::Fail, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_database_passes_without_touching_disk() {
        let result = DatabaseProbe::new().probe_sqlite(":memory:");
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[test]
    fn bare_file_name_resolves_against_the_current_directory() {
        let result = DatabaseProbe::new().probe_sqlite("not-created-yet.db");
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[test]
    fn uncreated_file_in_an_existing_directory_passes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("vigil.db");

        let result = DatabaseProbe::new().probe_sqlite(&path.display().to_string());
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[test]
    fn missing_parent_directory_fails() {
        let result = DatabaseProbe::new().probe_sqlite("/no/such/dir/vigil.db");
        assert_eq!(result.status, CheckStatus::Fail);
    }
}
