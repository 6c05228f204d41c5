use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::types::{Check, CheckCategory, CheckResult, CheckStatus};
use crate::{Probe, ProbeContext};

/// Pause between attempts.
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Probes an HTTP endpoint for an expected status code, with bounded retries.
pub struct HttpProbe {
    check: Check,
    expected_status: u16,
    endpoint: Option<Url>,
}

impl HttpProbe {
    /// Creates the probe against the config's own health endpoint, expecting
    /// status 200, with three attempts total.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            check: Check::new("http", CheckCategory::Http).with_retries(2),
            expected_status: 200,
            endpoint: None,
        }
    }

    /// Probes an explicit endpoint instead of the configured one.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Overrides the expected status code.
    #[must_use]
    pub const fn with_expected_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    fn resolve_endpoint(&self, cx: &ProbeContext) -> Option<Url> {
        if let Some(endpoint) = &self.endpoint {
            return Some(endpoint.clone());
        }
        cx.config.as_ref()?.health_endpoint().ok()
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Probe for HttpProbe {
    fn check(&self) -> &Check {
        &self.check
    }

    async fn run(&self, cx: &ProbeContext) -> CheckResult {
        let Some(endpoint) = self.resolve_endpoint(cx) else {
            return CheckResult::new(
                &self.check,
                CheckStatus::Fail,
                "no health endpoint available",
            );
        };

        let client = match reqwest::Client::builder().timeout(self.check.timeout).build() {
            Ok(client) => client,
            Err(e) => {
                return CheckResult::new(
                    &self.check,
                    CheckStatus::Fail,
                    format!("http client unavailable: {e}"),
                );
            }
        };

        let attempts = self.check.retries + 1;
        let mut last_outcome = String::new();

        for attempt in 1..=attempts {
            match client.get(endpoint.clone()).send().await {
                Ok(response) if response.status().as_u16() == self.expected_status => {
                    return CheckResult::new(
                        &self.check,
                        CheckStatus::Pass,
                        format!("{endpoint} returned {}", response.status()),
                    );
                }
                Ok(response) => {
                    last_outcome = format!("unexpected status {}", response.status());
                }
                Err(e) => {
                    last_outcome = e.to_string();
                }
            }

            debug!("http attempt {attempt}/{attempts} failed: {last_outcome}");

            if attempt < attempts {
                tokio::select! {
                    () = cx.cancellation.cancelled() => {
                        last_outcome = "cancelled".to_string();
                        break;
                    }
                    () = tokio::time::sleep(RETRY_DELAY) => {}
                }
            }
        }

        CheckResult::new(
            &self.check,
            CheckStatus::Fail,
            format!("{endpoint} unreachable: {last_outcome}"),
        )
    }
}
