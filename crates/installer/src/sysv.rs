use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::descriptor::ServiceDescriptor;
use crate::error::{Error, Result};
use crate::manager::{ServiceManager, ServiceStatus};
use crate::platform::Platform;
use crate::users::run_checked;

static INIT_TEMPLATE: &str = include_str!("../templates/vigil-init.sh");

/// SysV fallback strategy: executable init script under `/etc/init.d`,
/// runlevel registration via `update-rc.d` (or `chkconfig` where that is
/// what the distribution ships).
pub struct SysVManager;

impl SysVManager {
    fn init_dependencies(dependencies: &[String]) -> String {
        dependencies
            .iter()
            .map(|d| format!(" ${d}"))
            .collect::<String>()
    }

    fn has_update_rc_d() -> bool {
        std::path::Path::new("/usr/sbin/update-rc.d").exists()
    }
}

#[async_trait]
impl ServiceManager for SysVManager {
    fn platform(&self) -> Platform {
        Platform::SysV
    }

    fn descriptor_path(&self, name: &str) -> PathBuf {
        PathBuf::from("/etc/init.d").join(name)
    }

    // Init scripts must be runnable.
    fn descriptor_mode(&self) -> u32 {
        0o755
    }

    fn render(&self, descriptor: &ServiceDescriptor) -> String {
        INIT_TEMPLATE
            .replace("{name}", &descriptor.name)
            .replace("{description}", &descriptor.description)
            .replace(
                "{dependencies}",
                &Self::init_dependencies(&descriptor.dependencies),
            )
            .replace("{exec_path}", &descriptor.exec_path.display().to_string())
            .replace("{user}", &descriptor.user)
            .replace("{working_dir}", &descriptor.working_dir.display().to_string())
            .replace("{config_path}", &descriptor.config_path.display().to_string())
    }

    async fn register(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        if Self::has_update_rc_d() {
            run_checked(
                "update-rc.d",
                Command::new("update-rc.d")
                    .arg(&descriptor.name)
                    .arg("defaults"),
            )
            .await?;
        } else {
            run_checked(
                "chkconfig",
                Command::new("chkconfig").arg("--add").arg(&descriptor.name),
            )
            .await?;
        }

        info!("registered {} init script", descriptor.name);
        Ok(())
    }

    async fn unregister(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        if Self::has_update_rc_d() {
            run_checked(
                "update-rc.d",
                Command::new("update-rc.d")
                    .args(["-f", &descriptor.name, "remove"]),
            )
            .await
        } else {
            run_checked(
                "chkconfig",
                Command::new("chkconfig").arg("--del").arg(&descriptor.name),
            )
            .await
        }
    }

    async fn stop(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        run_checked(
            "init script",
            Command::new(self.descriptor_path(&descriptor.name)).arg("stop"),
        )
        .await
    }

    async fn status(&self, descriptor: &ServiceDescriptor) -> Result<ServiceStatus> {
        let status = Command::new(self.descriptor_path(&descriptor.name))
            .arg("status")
            .status()
            .await
            .map_err(|e| Error::Io("failed to run init script", e))?;

        if status.success() {
            Ok(ServiceStatus::Active)
        } else {
            Ok(ServiceStatus::Inactive)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_script_carries_the_descriptor_fields() {
        let mut descriptor = ServiceDescriptor::new("vigil", "/usr/local/bin/vigil");
        descriptor.dependencies = vec!["postgresql".into()];

        let script = SysVManager.render(&descriptor);

        assert!(script.starts_with("#!/bin/sh"));
        assert!(script.contains("Provides:          vigil"));
        assert!(script.contains("$network $local_fs $postgresql"));
        assert!(script.contains("DAEMON=\"/usr/local/bin/vigil\""));
        assert!(script.contains("export VIGIL_CONFIG="));
        assert!(!script.contains("{name}"));
        assert!(!script.contains("{exec_path}"));
    }

    #[test]
    fn usage_line_survives_rendering() {
        let descriptor = ServiceDescriptor::new("vigil", "/usr/local/bin/vigil");
        let script = SysVManager.render(&descriptor);

        // The shell usage hint uses braces of its own; substitution must
        // leave it intact.
        assert!(script.contains("{start|stop|restart|status}"));
    }

    #[test]
    fn init_scripts_are_executable() {
        assert_eq!(SysVManager.descriptor_mode(), 0o755);
    }
}
