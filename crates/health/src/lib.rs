//! Health probes and the aggregator that folds them into a single tier.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod aggregator;
mod error;
mod policy;
mod probes;
mod types;

pub use aggregator::{AggregationMode, Aggregator};
pub use error::{Error, Result};
pub use policy::HealthPolicy;
pub use probes::{
    CertificateProbe, ConfigProbe, DatabaseProbe, FilesystemProbe, HttpProbe, MemoryProbe,
    ProcessProbe,
};
pub use types::{Check, CheckCategory, CheckResult, CheckStatus, HealthReport, Tier};

use std::path::PathBuf;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use vigil_config::ServiceConfig;
use vigil_environment::HomeLayout;

/// Shared read-only state handed to every probe.
pub struct ProbeContext {
    /// Directory layout under the service home.
    pub layout: HomeLayout,

    /// Path of the configuration file.
    pub config_path: PathBuf,

    /// The loaded configuration, if it loaded at all. The config probe
    /// reports its absence; other probes degrade gracefully without it.
    pub config: Option<ServiceConfig>,

    /// Threshold policy.
    pub policy: HealthPolicy,

    /// Process-name pattern for the liveness probe.
    pub process_pattern: String,

    /// Cancellation context; probes abandon in-flight retries when it fires.
    pub cancellation: CancellationToken,
}

impl ProbeContext {
    /// Creates a context. The policy comes from the config's `thresholds`
    /// section when a config is present.
    #[must_use]
    pub fn new(layout: HomeLayout, config_path: PathBuf, config: Option<ServiceConfig>) -> Self {
        let policy = config
            .as_ref()
            .map_or_else(HealthPolicy::default, |c| HealthPolicy::from(&c.thresholds));

        Self {
            layout,
            config_path,
            config,
            policy,
            process_pattern: "vigil".to_string(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Overrides the liveness pattern.
    #[must_use]
    pub fn with_process_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.process_pattern = pattern.into();
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

/// A single named health check producing pass/warn/fail.
///
/// Probes read system state and return a result; they never raise and never
/// share mutable state.
#[async_trait]
pub trait Probe: Send + Sync {
    /// The immutable definition of this probe.
    fn check(&self) -> &Check;

    /// Executes the probe once.
    async fn run(&self, cx: &ProbeContext) -> CheckResult;
}
