//! Polls network dependencies until reachable or a deadline elapses.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{Instant, sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Fixed interval between connection attempts. Startup dependency waits are
/// short-lived, so there is no backoff or jitter.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A network endpoint that startup must wait on before proceeding.
#[derive(Debug, Clone)]
pub struct DependencyTarget {
    /// Hostname or IP address to connect to.
    pub host: String,

    /// TCP port to connect to.
    pub port: u16,

    /// Human-readable name used in logs and errors.
    pub display_name: String,

    /// Total time to keep polling before giving up.
    pub timeout_seconds: u64,
}

impl DependencyTarget {
    /// Creates a new `DependencyTarget`.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        display_name: impl Into<String>,
        timeout_seconds: u64,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            display_name: display_name.into(),
            timeout_seconds,
        }
    }

    /// Returns the `host:port` address string.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Outcome of a successful wait.
#[derive(Debug, Clone, Copy)]
pub struct Ready {
    /// Observed latency until the first successful connection.
    pub elapsed: Duration,
}

/// Polls the target at a fixed one-second interval until a TCP connection
/// succeeds, the deadline elapses, or shutdown is requested.
///
/// # Errors
///
/// Returns `Error::Timeout` if the deadline elapses without a successful
/// connection, or `Error::Cancelled` if the cancellation token fires first.
pub async fn wait(target: &DependencyTarget, cancellation: &CancellationToken) -> Result<Ready> {
    let started = Instant::now();
    let deadline = started + Duration::from_secs(target.timeout_seconds);

    debug!(
        "waiting up to {}s for {} at {}",
        target.timeout_seconds,
        target.display_name,
        target.addr()
    );

    loop {
        if cancellation.is_cancelled() {
            return Err(Error::Cancelled(target.display_name.clone()));
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(Error::Timeout {
                display_name: target.display_name.clone(),
                waited: started.elapsed(),
            });
        }

        let attempt_started = Instant::now();
        let attempt_budget = POLL_INTERVAL.min(deadline - now);

        match timeout(attempt_budget, TcpStream::connect(target.addr())).await {
            Ok(Ok(_stream)) => {
                let elapsed = started.elapsed();
                info!(
                    "{} reachable at {} after {:.1}s",
                    target.display_name,
                    target.addr(),
                    elapsed.as_secs_f64()
                );
                return Ok(Ready { elapsed });
            }
            Ok(Err(e)) => {
                debug!("{} not reachable yet: {}", target.display_name, e);
            }
            Err(_) => {
                debug!("{} connect attempt timed out", target.display_name);
            }
        }

        // A refused connection returns almost immediately. Pad the attempt
        // out to the poll interval so the deadline math stays bounded.
        let attempt_elapsed = attempt_started.elapsed();
        let pause = POLL_INTERVAL
            .saturating_sub(attempt_elapsed)
            .min(deadline.saturating_duration_since(Instant::now()));

        tokio::select! {
            () = cancellation.cancelled() => {
                return Err(Error::Cancelled(target.display_name.clone()));
            }
            () = sleep(pause) => {}
        }
    }
}
