use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::descriptor::ServiceDescriptor;
use crate::error::{Error, Result};
use crate::manager::{ServiceManager, ServiceStatus};
use crate::platform::Platform;
use crate::users::run_checked;

static PLIST_TEMPLATE: &str = include_str!("../templates/vigil.plist");

/// launchd strategy: property list under `/Library/LaunchDaemons`,
/// registration via `launchctl load -w`.
pub struct LaunchdManager;

impl LaunchdManager {
    fn label(name: &str) -> String {
        format!("com.{name}.daemon")
    }
}

#[async_trait]
impl ServiceManager for LaunchdManager {
    fn platform(&self) -> Platform {
        Platform::Launchd
    }

    fn descriptor_path(&self, name: &str) -> PathBuf {
        PathBuf::from("/Library/LaunchDaemons").join(format!("{}.plist", Self::label(name)))
    }

    fn render(&self, descriptor: &ServiceDescriptor) -> String {
        PLIST_TEMPLATE
            .replace("{label}", &Self::label(&descriptor.name))
            .replace("{exec_path}", &descriptor.exec_path.display().to_string())
            .replace("{working_dir}", &descriptor.working_dir.display().to_string())
            .replace("{config_path}", &descriptor.config_path.display().to_string())
            .replace("{user}", &descriptor.user)
            .replace("{group}", &descriptor.group)
            .replace("{keep_alive}", descriptor.restart_policy.launchd_value())
            .replace("{limit_nofile}", &descriptor.limits.open_files.to_string())
    }

    async fn register(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        run_checked(
            "launchctl load",
            Command::new("launchctl")
                .args(["load", "-w"])
                .arg(self.descriptor_path(&descriptor.name)),
        )
        .await?;

        info!("registered {} with launchd", descriptor.name);
        Ok(())
    }

    async fn unregister(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        run_checked(
            "launchctl unload",
            Command::new("launchctl")
                .args(["unload", "-w"])
                .arg(self.descriptor_path(&descriptor.name)),
        )
        .await
    }

    async fn stop(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        run_checked(
            "launchctl stop",
            Command::new("launchctl")
                .arg("stop")
                .arg(Self::label(&descriptor.name)),
        )
        .await
    }

    async fn status(&self, descriptor: &ServiceDescriptor) -> Result<ServiceStatus> {
        let status = Command::new("launchctl")
            .arg("list")
            .arg(Self::label(&descriptor.name))
            .status()
            .await
            .map_err(|e| Error::Io("failed to query launchctl", e))?;

        if status.success() {
            Ok(ServiceStatus::Active)
        } else {
            Ok(ServiceStatus::Inactive)
        }
    }

    // macOS has no useradd/groupadd; principals go through the directory
    // services tooling instead.
    async fn create_group(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        run_checked(
            "dseditgroup",
            Command::new("dseditgroup").args(["-o", "create", &descriptor.group]),
        )
        .await
    }

    async fn create_user(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        run_checked(
            "sysadminctl",
            Command::new("sysadminctl").args([
                "-addUser",
                &descriptor.user,
                "-shell",
                "/usr/bin/false",
                "-home",
                &descriptor.working_dir.display().to_string(),
            ]),
        )
        .await
    }

    async fn remove_user(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        run_checked(
            "sysadminctl",
            Command::new("sysadminctl").args(["-deleteUser", &descriptor.user]),
        )
        .await
    }

    async fn remove_group(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        run_checked(
            "dseditgroup",
            Command::new("dseditgroup").args(["-o", "delete", &descriptor.group]),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plist_carries_the_descriptor_fields() {
        let descriptor = ServiceDescriptor::new("vigil", "/usr/local/bin/vigil");
        let plist = LaunchdManager.render(&descriptor);

        assert!(plist.contains("<string>com.vigil.daemon</string>"));
        assert!(plist.contains("<string>/usr/local/bin/vigil</string>"));
        assert!(plist.contains("<string>vigil</string>"));
        assert!(plist.contains("<true/>"));
        assert!(!plist.contains('{'), "unreplaced placeholder in:\n{plist}");
    }

    #[test]
    fn keep_alive_follows_the_restart_policy() {
        let mut descriptor = ServiceDescriptor::new("vigil", "/usr/local/bin/vigil");
        descriptor.restart_policy = crate::descriptor::RestartPolicy::Never;

        let plist = LaunchdManager.render(&descriptor);
        assert!(plist.contains("<false/>"));
    }
}
