use std::path::PathBuf;

use async_trait::async_trait;
use systemctl::SystemCtl;
use tokio::process::Command;
use tracing::info;

use crate::descriptor::ServiceDescriptor;
use crate::error::{Error, Result};
use crate::manager::{ServiceManager, ServiceStatus};
use crate::platform::Platform;
use crate::users::run_checked;

static UNIT_TEMPLATE: &str = include_str!("../templates/vigil.service");

/// systemd strategy: unit file under `/etc/systemd/system`, registration via
/// `daemon-reload` + `enable`.
pub struct SystemdManager;

impl SystemdManager {
    fn unit_name(name: &str) -> String {
        format!("{name}.service")
    }
}

#[async_trait]
impl ServiceManager for SystemdManager {
    fn platform(&self) -> Platform {
        Platform::Systemd
    }

    fn descriptor_path(&self, name: &str) -> PathBuf {
        PathBuf::from("/etc/systemd/system").join(Self::unit_name(name))
    }

    fn render(&self, descriptor: &ServiceDescriptor) -> String {
        let dependencies: String = descriptor
            .dependencies
            .iter()
            .map(|dep| format!(" {dep}"))
            .collect();
        let memory_clause = descriptor
            .limits
            .max_memory_mb
            .map(|mb| format!("MemoryMax={mb}M\n"))
            .unwrap_or_default();

        UNIT_TEMPLATE
            .replace("{description}", &descriptor.description)
            .replace("{dependencies}", &dependencies)
            .replace("{user}", &descriptor.user)
            .replace("{group}", &descriptor.group)
            .replace("{working_dir}", &descriptor.working_dir.display().to_string())
            .replace("{config_path}", &descriptor.config_path.display().to_string())
            .replace("{exec_path}", &descriptor.exec_path.display().to_string())
            .replace("{restart_policy}", descriptor.restart_policy.systemd_value())
            .replace("{limit_nofile}", &descriptor.limits.open_files.to_string())
            .replace("{memory_clause}", &memory_clause)
    }

    async fn register(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        run_checked(
            "systemctl daemon-reload",
            Command::new("systemctl").arg("daemon-reload"),
        )
        .await?;
        run_checked(
            "systemctl enable",
            Command::new("systemctl")
                .arg("enable")
                .arg(Self::unit_name(&descriptor.name)),
        )
        .await?;

        info!("registered {} with systemd", descriptor.name);
        Ok(())
    }

    async fn unregister(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        run_checked(
            "systemctl disable",
            Command::new("systemctl")
                .arg("disable")
                .arg(Self::unit_name(&descriptor.name)),
        )
        .await
    }

    async fn stop(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        let _ = SystemCtl::default()
            .stop(&Self::unit_name(&descriptor.name))
            .map_err(|e| Error::Io("failed to stop service", e))?;

        Ok(())
    }

    async fn status(&self, descriptor: &ServiceDescriptor) -> Result<ServiceStatus> {
        let output = Command::new("systemctl")
            .arg("is-active")
            .arg(Self::unit_name(&descriptor.name))
            .output()
            .await
            .map_err(|e| Error::Io("failed to query systemctl", e))?;

        if String::from_utf8_lossy(&output.stdout).trim() == "active" {
            Ok(ServiceStatus::Active)
        } else {
            Ok(ServiceStatus::Inactive)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::RestartPolicy;

    fn descriptor() -> ServiceDescriptor {
        let mut d = ServiceDescriptor::new("vigil", "/usr/local/bin/vigil");
        d.dependencies = vec!["postgresql.service".to_string()];
        d.limits.max_memory_mb = Some(1024);
        d
    }

    #[test]
    fn unit_file_carries_the_descriptor_fields() {
        let unit = SystemdManager.render(&descriptor());

        assert!(unit.contains("User=vigil"));
        assert!(unit.contains("Group=vigil"));
        assert!(unit.contains("ExecStart=/usr/local/bin/vigil start"));
        assert!(unit.contains("After=network-online.target postgresql.service"));
        assert!(unit.contains("Restart=on-failure"));
        assert!(unit.contains("MemoryMax=1024M"));
        assert!(unit.contains("Environment=VIGIL_HOME=/var/lib/vigil"));
        assert!(!unit.contains('{'), "unreplaced placeholder in:\n{unit}");
    }

    #[test]
    fn memory_clause_is_omitted_without_a_cap() {
        let mut d = descriptor();
        d.limits.max_memory_mb = None;
        d.restart_policy = RestartPolicy::Always;

        let unit = SystemdManager.render(&d);
        assert!(!unit.contains("MemoryMax"));
        assert!(unit.contains("Restart=always"));
    }

    #[test]
    fn descriptor_path_is_the_system_unit_dir() {
        assert_eq!(
            SystemdManager.descriptor_path("vigil"),
            PathBuf::from("/etc/systemd/system/vigil.service")
        );
    }
}
