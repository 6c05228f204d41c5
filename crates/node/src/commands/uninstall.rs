use crate::UninstallArgs;
use crate::error::{Error, Result};

use tracing::info;
use vigil_installer::{Installer, ServiceDescriptor};

pub async fn uninstall(args: UninstallArgs) -> Result<()> {
    let exec_path = std::env::current_exe()
        .map_err(|e| Error::Io("failed to resolve current executable", e))?;
    let descriptor = ServiceDescriptor::new("vigil", exec_path);

    let installer = Installer::detect()?;
    installer.uninstall(&descriptor, args.purge_data).await?;

    if !args.purge_data {
        info!("data and configuration were kept; rerun with --purge-data to remove them");
    }
    Ok(())
}
