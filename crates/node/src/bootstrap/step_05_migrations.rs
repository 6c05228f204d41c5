//! Bootstrap step 5: schema migrations.
//!
//! Runs the operator-configured migration command, if any. A nonzero exit
//! is fatal: serving against a half-migrated schema is worse than not
//! starting.

use super::Bootstrap;
use crate::error::{Error, Result};

use tokio::process::Command;
use tracing::info;

pub async fn execute(bootstrap: &mut Bootstrap) -> Result<()> {
    let Some(command) = bootstrap.config().database.migrate_command.clone() else {
        info!("no migration command configured, skipping");
        return Ok(());
    };

    info!("running migration command");
    let status = Command::new("sh")
        .args(["-c", &command])
        .status()
        .await
        .map_err(|e| Error::Io("failed to spawn migration command", e))?;

    if status.success() {
        info!("migrations complete");
        Ok(())
    } else {
        Err(Error::MigrationFailed(status))
    }
}
