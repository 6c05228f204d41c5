//! Bootstrap step 1: required environment variables.

use super::Bootstrap;
use crate::error::Result;

use tracing::info;

/// Variables the service cannot run without. Empty values count as unset.
pub const REQUIRED_VARS: &[&str] = &["VIGIL_HOME", "VIGIL_CONFIG"];

pub async fn execute(_bootstrap: &mut Bootstrap) -> Result<()> {
    vigil_environment::check_required_vars(REQUIRED_VARS)?;

    info!("required environment variables present");
    Ok(())
}
