use async_trait::async_trait;
use sysinfo::System;

use crate::policy::HealthPolicy;
use crate::types::{Check, CheckCategory, CheckResult, CheckStatus};
use crate::{Probe, ProbeContext};

/// Checks memory pressure against the policy thresholds.
///
/// An unreadable memory stat is a warning, not a failure; it must not block
/// health reporting.
pub struct MemoryProbe {
    check: Check,
}

impl MemoryProbe {
    /// Creates the probe.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            check: Check::new("memory", CheckCategory::Memory),
        }
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifies a used-memory percentage.
fn classify(usage: u8, policy: &HealthPolicy) -> (CheckStatus, String) {
    if usage > policy.memory_fail_percent {
        (CheckStatus::Fail, format!("memory {usage}% used"))
    } else if usage >= policy.memory_warn_percent {
        (CheckStatus::Warn, format!("memory {usage}% used"))
    } else {
        (CheckStatus::Pass, format!("memory {usage}% used"))
    }
}

#[async_trait]
impl Probe for MemoryProbe {
    fn check(&self) -> &Check {
        &self.check
    }

    async fn run(&self, cx: &ProbeContext) -> CheckResult {
        let mut system = System::new();
        system.refresh_memory();

        let total = system.total_memory();
        if total == 0 {
            return CheckResult::new(
                &self.check,
                CheckStatus::Warn,
                "could not read memory statistics",
            );
        }

        let usage = u8::try_from(system.used_memory() * 100 / total).unwrap_or(100);
        let (status, message) = classify(usage, &cx.policy);

        CheckResult::new(&self.check, status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_the_policy_bands() {
        let policy = HealthPolicy::default();

        assert_eq!(classify(50, &policy).0, CheckStatus::Pass);
        assert_eq!(classify(84, &policy).0, CheckStatus::Pass);
        assert_eq!(classify(85, &policy).0, CheckStatus::Warn);
        assert_eq!(classify(95, &policy).0, CheckStatus::Warn);
        assert_eq!(classify(96, &policy).0, CheckStatus::Fail);
    }
}
