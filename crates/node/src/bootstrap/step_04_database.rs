//! Bootstrap step 4: wait for the network database to accept connections.
//!
//! Only runs when a network engine is configured; sqlite needs no socket.

use super::Bootstrap;
use crate::error::Result;

use tracing::info;

/// How long to keep polling before declaring the database unreachable.
const DATABASE_WAIT_SECONDS: u64 = 60;

pub async fn execute(bootstrap: &mut Bootstrap) -> Result<()> {
    let Some(target) = bootstrap.config().database_target(DATABASE_WAIT_SECONDS) else {
        info!("no network database configured, skipping dependency wait");
        return Ok(());
    };

    let ready = vigil_netwait::wait(&target, &bootstrap.shutdown_token).await?;

    info!(
        "{} reachable at {} after {:?}",
        target.display_name,
        target.addr(),
        ready.elapsed
    );
    Ok(())
}
