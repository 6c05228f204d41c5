use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::policy::HealthPolicy;

/// Kind of system state a check inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckCategory {
    /// Configuration file validity.
    Config,
    /// Directory writability and disk pressure.
    Filesystem,
    /// Memory pressure.
    Memory,
    /// Database reachability.
    Database,
    /// TLS certificate expiry.
    Certificate,
    /// Process liveness.
    Process,
    /// HTTP endpoint reachability.
    Http,
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Config => "config",
            Self::Filesystem => "filesystem",
            Self::Memory => "memory",
            Self::Database => "database",
            Self::Certificate => "certificate",
            Self::Process => "process",
            Self::Http => "http",
        };
        f.write_str(name)
    }
}

/// Immutable definition of a probe, instantiated once per probe type.
#[derive(Debug, Clone)]
pub struct Check {
    /// Stable name used for selection and reporting.
    pub name: &'static str,

    /// Category of system state inspected.
    pub category: CheckCategory,

    /// Relative weight in the pass ratio.
    pub weight: u32,

    /// Bound on any single blocking operation inside the probe.
    pub timeout: Duration,

    /// Additional attempts after the first.
    pub retries: u32,
}

impl Check {
    /// Creates a check with weight 1, a five-second timeout, and no retries.
    #[must_use]
    pub const fn new(name: &'static str, category: CheckCategory) -> Self {
        Self {
            name,
            category,
            weight: 1,
            timeout: Duration::from_secs(5),
            retries: 0,
        }
    }

    /// Overrides the retry count.
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Overrides the per-operation timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Outcome of one probe execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// The check is satisfied.
    Pass,
    /// The check is satisfied but wants operator attention.
    Warn,
    /// The check is not satisfied.
    Fail,
}

impl CheckStatus {
    /// Warnings affect visibility, not the score.
    #[must_use]
    pub const fn counts_as_passed(self) -> bool {
        !matches!(self, Self::Fail)
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        };
        f.write_str(name)
    }
}

/// A single executed check. Created fresh on every probe run and consumed
/// immediately by the aggregator; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Name of the originating check.
    pub name: &'static str,

    /// Category of the originating check.
    pub category: CheckCategory,

    /// Weight of the originating check.
    pub weight: u32,

    /// Pass, warn, or fail.
    pub status: CheckStatus,

    /// Human-readable detail.
    pub message: String,

    /// When the probe ran.
    pub observed_at: DateTime<Utc>,
}

impl CheckResult {
    /// Creates a result for `check` observed now.
    #[must_use]
    pub fn new(check: &Check, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: check.name,
            category: check.category,
            weight: check.weight,
            status,
            message: message.into(),
            observed_at: Utc::now(),
        }
    }
}

/// Three-valued health classification derived from the pass ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Every check passed.
    Healthy,
    /// Most checks passed; route traffic but surface the report.
    Degraded,
    /// Too many checks failed; signal failure to the caller.
    Unhealthy,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        };
        f.write_str(name)
    }
}

/// Aggregated outcome of one health run.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Results in execution order.
    pub results: Vec<CheckResult>,

    /// Weighted sum of passing (pass or warn) checks.
    pub checks_passed: u32,

    /// Weighted sum of all checks.
    pub total_checks: u32,

    /// `floor(100 * checks_passed / total_checks)`.
    pub percentage: u8,

    /// Tier derived from `percentage`.
    pub tier: Tier,
}

impl HealthReport {
    /// Builds a report from executed results.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoChecks` when `results` is empty.
    pub fn from_results(results: Vec<CheckResult>, policy: &HealthPolicy) -> Result<Self> {
        if results.is_empty() {
            return Err(Error::NoChecks);
        }

        let total_checks: u32 = results.iter().map(|r| r.weight).sum();
        if total_checks == 0 {
            return Err(Error::NoChecks);
        }
        let checks_passed: u32 = results
            .iter()
            .filter(|r| r.status.counts_as_passed())
            .map(|r| r.weight)
            .sum();

        let percentage =
            u8::try_from(u64::from(checks_passed) * 100 / u64::from(total_checks)).unwrap_or(100);
        let tier = policy.tier_for(percentage);

        Ok(Self {
            results,
            checks_passed,
            total_checks,
            percentage,
            tier,
        })
    }

    /// Whether this report maps to exit code 0. Degraded still reports
    /// success to orchestrators; it is not a restart signal.
    #[must_use]
    pub const fn is_passing(&self) -> bool {
        !matches!(self.tier, Tier::Unhealthy)
    }

    /// Warn-status results, for operator visibility.
    #[must_use]
    pub fn warnings(&self) -> Vec<&CheckResult> {
        self.results
            .iter()
            .filter(|r| r.status == CheckStatus::Warn)
            .collect()
    }
}
