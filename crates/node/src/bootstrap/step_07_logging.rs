//! Bootstrap step 7: log destination readiness.

use super::Bootstrap;
use crate::error::{Error, Result};

use tracing::info;

const LOG_DIRECTORY_MODE: u32 = 0o750;

pub async fn execute(bootstrap: &mut Bootstrap) -> Result<()> {
    let logging = bootstrap.config().logging.clone();

    if let Some(directory) = logging.file.parent() {
        vigil_environment::ensure_directories(&[directory.to_path_buf()], LOG_DIRECTORY_MODE)?;

        // Probe writability now rather than discovering it at the first
        // rotation.
        tempfile::tempfile_in(directory)
            .map_err(|e| Error::Io("log directory is not writable", e))?;
    }

    info!(
        "logging at level {} to {} (rotate at {}, keep {})",
        logging.level,
        logging.file.display(),
        logging.max_size,
        logging.backup_count
    );
    Ok(())
}
