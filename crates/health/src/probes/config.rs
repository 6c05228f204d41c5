use async_trait::async_trait;

use crate::types::{Check, CheckCategory, CheckResult, CheckStatus};
use crate::{Probe, ProbeContext};

/// Checks that the configuration file exists and parses.
pub struct ConfigProbe {
    check: Check,
}

impl ConfigProbe {
    /// Creates the probe.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            check: Check::new("config", CheckCategory::Config),
        }
    }
}

impl Default for ConfigProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for ConfigProbe {
    fn check(&self) -> &Check {
        &self.check
    }

    async fn run(&self, cx: &ProbeContext) -> CheckResult {
        match vigil_config::load_existing(&cx.config_path) {
            Ok(_) => CheckResult::new(&self.check, CheckStatus::Pass, "configuration valid"),
            Err(e) => CheckResult::new(&self.check, CheckStatus::Fail, e.to_string()),
        }
    }
}
