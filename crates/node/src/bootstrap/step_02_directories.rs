//! Bootstrap step 2: critical directory layout.

use super::Bootstrap;
use crate::error::Result;

use tracing::info;

const DIRECTORY_MODE: u32 = 0o750;

pub async fn execute(bootstrap: &mut Bootstrap) -> Result<()> {
    let directories = bootstrap.layout.critical_directories();
    vigil_environment::ensure_directories(&directories, DIRECTORY_MODE)?;

    info!("{} critical directories ready", directories.len());
    Ok(())
}
