use crate::InstallArgs;
use crate::error::{Error, Result};

use tracing::info;
use vigil_installer::{Installer, LogrotatePolicy, ServiceDescriptor};

pub async fn install(args: InstallArgs) -> Result<()> {
    let exec_path = std::env::current_exe()
        .map_err(|e| Error::Io("failed to resolve current executable", e))?;
    let descriptor = ServiceDescriptor::new("vigil", exec_path);

    let installer = Installer::detect()?.with_logrotate(LogrotatePolicy {
        retention: args.log_retention,
        compress: !args.no_compress,
    });

    installer.install(&descriptor).await?;

    info!(
        "installed; start with the {} service manager or reboot",
        installer.platform()
    );
    Ok(())
}
