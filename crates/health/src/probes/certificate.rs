use std::path::PathBuf;

use async_trait::async_trait;
use x509_parser::pem::parse_x509_pem;

use crate::types::{Check, CheckCategory, CheckResult, CheckStatus};
use crate::{Probe, ProbeContext};

const SECONDS_PER_DAY: i64 = 86_400;

/// Checks TLS certificate expiry.
///
/// An absent certificate is a warning, not a failure; before first
/// provisioning that state is expected.
pub struct CertificateProbe {
    check: Check,
}

impl CertificateProbe {
    /// Creates the probe.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            check: Check::new("certificate", CheckCategory::Certificate),
        }
    }
}

impl Default for CertificateProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifies a certificate by its remaining validity.
fn classify_expiry(not_after_unix: i64, now_unix: i64, warn_days: i64) -> (CheckStatus, String) {
    let remaining = not_after_unix - now_unix;
    let days_left = remaining / SECONDS_PER_DAY;

    if remaining <= 0 {
        (CheckStatus::Fail, "certificate expired".to_string())
    } else if days_left < warn_days {
        (
            CheckStatus::Warn,
            format!("certificate expires in {days_left} days"),
        )
    } else {
        (
            CheckStatus::Pass,
            format!("certificate valid for {days_left} days"),
        )
    }
}

/// Resolves the certificate path: configured location first, else the
/// conventional file under the certs directory.
fn cert_path(cx: &ProbeContext) -> PathBuf {
    cx.config
        .as_ref()
        .filter(|c| !c.server.ssl.cert_file.as_os_str().is_empty())
        .map_or_else(
            || cx.layout.certs_dir().join("server.crt"),
            |c| c.server.ssl.cert_file.clone(),
        )
}

#[async_trait]
impl Probe for CertificateProbe {
    fn check(&self) -> &Check {
        &self.check
    }

    async fn run(&self, cx: &ProbeContext) -> CheckResult {
        let path = cert_path(cx);

        if !path.exists() {
            return CheckResult::new(
                &self.check,
                CheckStatus::Warn,
                format!("no certificate at {}", path.display()),
            );
        }

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                return CheckResult::new(
                    &self.check,
                    CheckStatus::Fail,
                    format!("unreadable certificate: {e}"),
                );
            }
        };

        let not_after = parse_x509_pem(&bytes)
            .ok()
            .and_then(|(_, pem)| pem.parse_x509().ok().map(|c| c.validity().not_after.timestamp()));

        match not_after {
            Some(not_after) => {
                let now = chrono::Utc::now().timestamp();
                let (status, message) = classify_expiry(not_after, now, cx.policy.cert_warn_days);
                CheckResult::new(&self.check, status, message)
            }
            None => CheckResult::new(
                &self.check,
                CheckStatus::Fail,
                format!("certificate does not parse: {}", path.display()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = SECONDS_PER_DAY;

    #[test]
    fn expired_certificate_fails() {
        let (status, _) = classify_expiry(1_000, 2_000, 30);
        assert_eq!(status, CheckStatus::Fail);
    }

    #[test]
    fn ten_days_remaining_warns() {
        let now = 1_700_000_000;
        let (status, message) = classify_expiry(now + 10 * DAY, now, 30);
        assert_eq!(status, CheckStatus::Warn);
        assert!(message.contains("10 days"));
    }

    #[test]
    fn comfortable_validity_passes() {
        let now = 1_700_000_000;
        let (status, _) = classify_expiry(now + 90 * DAY, now, 30);
        assert_eq!(status, CheckStatus::Pass);
    }

    #[test]
    fn warn_window_honors_the_policy() {
        let now = 1_700_000_000;
        let (status, _) = classify_expiry(now + 10 * DAY, now, 7);
        assert_eq!(status, CheckStatus::Pass);
    }
}
