//! Bootstrap step 3: configuration loading and validation.
//!
//! A missing document is not an error; a default one is written and loaded
//! so a fresh install boots without manual editing. A present but invalid
//! document is fatal.

use super::Bootstrap;
use crate::error::Result;

use tracing::info;

pub async fn execute(bootstrap: &mut Bootstrap) -> Result<()> {
    let config = vigil_config::load(&bootstrap.config_path)?;

    info!(
        "configuration loaded: {} on {}:{}",
        config.database.engine.display_name(),
        config.server.host,
        config.server.port
    );

    bootstrap.config = Some(config);
    Ok(())
}
