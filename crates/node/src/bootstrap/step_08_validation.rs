//! Bootstrap step 8: advisory validation.
//!
//! The only soft gate in the sequence. Resource shortfalls and dubious
//! configuration are worth an operator's attention but not worth refusing
//! to start over.

use super::Bootstrap;

use tracing::{info, warn};
use vigil_environment::ResourcePolicy;

const MIN_SESSION_TIMEOUT_SECONDS: u64 = 300;

pub async fn execute(bootstrap: &mut Bootstrap) {
    let snapshot =
        vigil_environment::resource_snapshot(bootstrap.layout.home(), &ResourcePolicy::default());
    for warning in &snapshot.warnings {
        warn!("{warning}");
    }
    info!(
        "{} MB memory free, {} GB disk free",
        snapshot.memory_mb, snapshot.disk_gb
    );

    let config = bootstrap.config();
    if config.security.session_timeout < MIN_SESSION_TIMEOUT_SECONDS {
        warn!(
            "session timeout of {}s is unusually short",
            config.security.session_timeout
        );
    }
    if !config.monitoring.enabled {
        warn!("monitoring is disabled; the http health probe will report failure");
    }
}
