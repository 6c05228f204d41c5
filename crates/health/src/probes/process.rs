use std::ffi::OsStr;

use async_trait::async_trait;
use sysinfo::{ProcessRefreshKind, RefreshKind, System};

use crate::types::{Check, CheckCategory, CheckResult, CheckStatus};
use crate::{Probe, ProbeContext};

/// Liveness check by process-name pattern match.
pub struct ProcessProbe {
    check: Check,
}

impl ProcessProbe {
    /// Creates the probe.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            check: Check::new("process", CheckCategory::Process),
        }
    }
}

impl Default for ProcessProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for ProcessProbe {
    fn check(&self) -> &Check {
        &self.check
    }

    async fn run(&self, cx: &ProbeContext) -> CheckResult {
        let system = System::new_with_specifics(
            RefreshKind::new().with_processes(ProcessRefreshKind::new()),
        );

        let matches = system
            .processes_by_name(OsStr::new(&cx.process_pattern))
            .count();

        if matches > 0 {
            CheckResult::new(
                &self.check,
                CheckStatus::Pass,
                format!("{matches} process(es) matching {:?}", cx.process_pattern),
            )
        } else {
            CheckResult::new(
                &self.check,
                CheckStatus::Fail,
                format!("no process matching {:?}", cx.process_pattern),
            )
        }
    }
}
