use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::probes::{
    CertificateProbe, ConfigProbe, DatabaseProbe, FilesystemProbe, HttpProbe, MemoryProbe,
    ProcessProbe,
};
use crate::types::{CheckCategory, CheckStatus, HealthReport};
use crate::{Probe, ProbeContext};

/// Which checks one aggregation run executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationMode {
    /// Only the HTTP probe against the primary health endpoint.
    Quick,

    /// The full probe set. With `standalone` set the process and HTTP
    /// probes are suppressed, for when the aggregator runs inside the very
    /// process it would otherwise probe over the network.
    Comprehensive {
        /// Suppress self-referential probes.
        standalone: bool,
    },

    /// A single check selected by name (`ssl` selects the certificate
    /// check).
    Single(String),
}

/// Runs a selected subset of probes strictly sequentially, in a fixed
/// order, and folds the results into a [`HealthReport`].
///
/// The aggregator never raises for a failing probe; failure is expressed
/// only through the report's tier.
pub struct Aggregator {
    probes: Vec<Box<dyn Probe>>,
}

impl Aggregator {
    /// Creates the aggregator with the standard probe set in its canonical
    /// execution order.
    #[must_use]
    pub fn new() -> Self {
        Self {
            probes: vec![
                Box::new(ConfigProbe::new()),
                Box::new(FilesystemProbe::new()),
                Box::new(MemoryProbe::new()),
                Box::new(DatabaseProbe::new()),
                Box::new(CertificateProbe::new()),
                Box::new(ProcessProbe::new()),
                Box::new(HttpProbe::new()),
            ],
        }
    }

    /// Creates an aggregator over an explicit probe set. Execution order is
    /// the order given.
    #[must_use]
    pub fn with_probes(probes: Vec<Box<dyn Probe>>) -> Self {
        Self { probes }
    }

    /// Executes the probes selected by `mode` and builds the report.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownCheck` for an unrecognized single-check name
    /// and `Error::NoChecks` when the selection is empty.
    pub async fn run(&self, mode: &AggregationMode, cx: &ProbeContext) -> Result<HealthReport> {
        let selected = self.select(mode)?;

        let mut results = Vec::with_capacity(selected.len());
        for probe in selected {
            let result = probe.run(cx).await;
            match result.status {
                CheckStatus::Fail => warn!("[{}] fail: {}", result.name, result.message),
                CheckStatus::Warn => warn!("[{}] warn: {}", result.name, result.message),
                CheckStatus::Pass => info!("[{}] pass: {}", result.name, result.message),
            }
            results.push(result);
        }

        HealthReport::from_results(results, &cx.policy)
    }

    fn select(&self, mode: &AggregationMode) -> Result<Vec<&dyn Probe>> {
        let selected: Vec<&dyn Probe> = match mode {
            AggregationMode::Quick => self
                .probes
                .iter()
                .filter(|p| p.check().category == CheckCategory::Http)
                .map(|p| p.as_ref())
                .collect(),
            AggregationMode::Comprehensive { standalone } => self
                .probes
                .iter()
                .filter(|p| {
                    let category = p.check().category;
                    !(*standalone
                        && matches!(category, CheckCategory::Process | CheckCategory::Http))
                })
                .map(|p| p.as_ref())
                .collect(),
            AggregationMode::Single(name) => {
                let wanted = if name == "ssl" { "certificate" } else { name.as_str() };
                let probe = self
                    .probes
                    .iter()
                    .find(|p| p.check().name == wanted)
                    .ok_or_else(|| Error::UnknownCheck(name.clone()))?;
                vec![probe.as_ref()]
            }
        };

        if selected.is_empty() {
            return Err(Error::NoChecks);
        }

        Ok(selected)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use vigil_environment::HomeLayout;

    use super::*;
    use crate::types::{Check, CheckResult, CheckStatus, Tier};

    struct StubProbe {
        check: Check,
        status: CheckStatus,
    }

    impl StubProbe {
        fn boxed(name: &'static str, status: CheckStatus) -> Box<dyn Probe> {
            Box::new(Self {
                check: Check::new(name, CheckCategory::Config),
                status,
            })
        }
    }

    #[async_trait]
    impl Probe for StubProbe {
        fn check(&self) -> &Check {
            &self.check
        }

        async fn run(&self, _cx: &ProbeContext) -> CheckResult {
            CheckResult::new(&self.check, self.status, "stubbed")
        }
    }

    fn context() -> ProbeContext {
        ProbeContext::new(HomeLayout::new("/tmp/vigil-test"), "/tmp/none.json".into(), None)
    }

    fn stubs(statuses: &[CheckStatus]) -> Vec<Box<dyn Probe>> {
        static NAMES: &[&str] = &["s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7"];
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| StubProbe::boxed(NAMES[i], *status))
            .collect()
    }

    #[tokio::test]
    async fn six_of_eight_is_unhealthy() {
        let mut statuses = vec![CheckStatus::Pass; 6];
        statuses.extend([CheckStatus::Fail, CheckStatus::Fail]);

        let aggregator = Aggregator::with_probes(stubs(&statuses));
        let report = aggregator
            .run(&AggregationMode::Comprehensive { standalone: false }, &context())
            .await
            .expect("report");

        assert_eq!(report.percentage, 75);
        assert_eq!(report.tier, Tier::Unhealthy);
        assert!(!report.is_passing());
    }

    #[tokio::test]
    async fn seven_of_eight_is_degraded() {
        let mut statuses = vec![CheckStatus::Pass; 7];
        statuses.push(CheckStatus::Fail);

        let aggregator = Aggregator::with_probes(stubs(&statuses));
        let report = aggregator
            .run(&AggregationMode::Comprehensive { standalone: false }, &context())
            .await
            .expect("report");

        assert_eq!(report.percentage, 87);
        assert_eq!(report.tier, Tier::Degraded);
        assert!(report.is_passing());
    }

    #[tokio::test]
    async fn warnings_score_as_passed_but_stay_visible() {
        let statuses = vec![
            CheckStatus::Pass,
            CheckStatus::Warn,
            CheckStatus::Pass,
            CheckStatus::Pass,
        ];

        let aggregator = Aggregator::with_probes(stubs(&statuses));
        let report = aggregator
            .run(&AggregationMode::Comprehensive { standalone: false }, &context())
            .await
            .expect("report");

        assert_eq!(report.percentage, 100);
        assert_eq!(report.tier, Tier::Healthy);
        assert_eq!(report.warnings().len(), 1);
    }

    #[tokio::test]
    async fn empty_selection_is_a_caller_error() {
        let aggregator = Aggregator::with_probes(Vec::new());
        let err = aggregator
            .run(&AggregationMode::Comprehensive { standalone: false }, &context())
            .await
            .expect_err("zero checks must not produce a report");

        assert!(matches!(err, Error::NoChecks));
    }

    #[tokio::test]
    async fn unknown_single_check_is_rejected() {
        let aggregator = Aggregator::new();
        let err = aggregator
            .run(&AggregationMode::Single("quantum".into()), &context())
            .await
            .expect_err("unknown name must be rejected");

        assert!(matches!(err, Error::UnknownCheck(name) if name == "quantum"));
    }

    #[tokio::test]
    async fn ssl_selects_the_certificate_check() {
        let aggregator = Aggregator::new();
        let report = aggregator
            .run(&AggregationMode::Single("ssl".into()), &context())
            .await
            .expect("report");

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].name, "certificate");
        // No certificate provisioned in the test context: warn, not fail.
        assert_eq!(report.results[0].status, CheckStatus::Warn);
        assert_eq!(report.tier, Tier::Healthy);
    }

    #[tokio::test]
    async fn standalone_comprehensive_suppresses_self_probes() {
        let aggregator = Aggregator::new();
        let selected = aggregator
            .select(&AggregationMode::Comprehensive { standalone: true })
            .expect("selection");

        assert_eq!(selected.len(), 5);
        assert!(selected.iter().all(|p| {
            !matches!(
                p.check().category,
                CheckCategory::Process | CheckCategory::Http
            )
        }));
    }

    #[tokio::test]
    async fn quick_runs_only_the_http_probe() {
        let aggregator = Aggregator::new();
        let selected = aggregator.select(&AggregationMode::Quick).expect("selection");

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].check().category, CheckCategory::Http);
    }
}
