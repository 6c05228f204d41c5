//! OS-native service installation for vigil.
//!
//! Detects the host's service manager (systemd, launchd, or SysV init) and
//! installs vigil as a supervised system service: dedicated non-login
//! user/group, owned directory layout, rendered service descriptor,
//! log-rotation policy, and boot-time registration. Uninstall reverses all
//! of it, leaving data and config in place unless purging is requested.
//!
//! Every run first observes the host, then computes an ordered action plan
//! from that observation, then executes it. Reruns converge instead of
//! failing on already-present principals or artifacts.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod descriptor;
mod error;
mod launchd;
mod logrotate;
mod manager;
mod plan;
mod platform;
mod systemd;
mod sysv;
mod users;

use std::io::Write as _;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

pub use descriptor::{ResourceLimits, RestartPolicy, ServiceDescriptor};
pub use error::{Error, Result};
pub use launchd::LaunchdManager;
pub use logrotate::LogrotatePolicy;
pub use manager::{ServiceManager, ServiceStatus};
pub use plan::{install_actions, uninstall_actions, Action, SystemState};
pub use platform::Platform;
pub use systemd::SystemdManager;
pub use sysv::SysVManager;

/// Installs and uninstalls the service using the detected platform strategy.
pub struct Installer {
    manager: Box<dyn ServiceManager>,
    logrotate: LogrotatePolicy,
}

impl Installer {
    /// Creates an installer for the detected platform.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unsupported` if no known service manager is present.
    pub fn detect() -> Result<Self> {
        let manager: Box<dyn ServiceManager> = match Platform::detect()? {
            Platform::Systemd => Box::new(SystemdManager),
            Platform::Launchd => Box::new(LaunchdManager),
            Platform::SysV => Box::new(SysVManager),
        };

        info!("using {} service manager", manager.platform());
        Ok(Self::new(manager))
    }

    /// Creates an installer with an explicit strategy.
    #[must_use]
    pub fn new(manager: Box<dyn ServiceManager>) -> Self {
        Self {
            manager,
            logrotate: LogrotatePolicy::default(),
        }
    }

    /// Overrides the default log-rotation policy.
    #[must_use]
    pub const fn with_logrotate(mut self, logrotate: LogrotatePolicy) -> Self {
        self.logrotate = logrotate;
        self
    }

    /// The active platform.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.manager.platform()
    }

    /// Installs the service described by `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns an error when not running as root, when an external tool
    /// fails, or when an artifact cannot be written.
    pub async fn install(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        require_root()?;

        let state = self.observe(descriptor).await;
        let actions = install_actions(
            descriptor,
            state,
            self.manager.descriptor_path(&descriptor.name),
            LogrotatePolicy::artifact_path(&descriptor.name),
        );

        for action in actions {
            self.apply(descriptor, action).await?;
        }

        info!("{} installed as a {} service", descriptor.name, self.platform());
        Ok(())
    }

    /// Uninstalls the service. Data and config directories survive unless
    /// `purge_data` is set.
    ///
    /// # Errors
    ///
    /// Returns an error when not running as root or when an external tool
    /// fails.
    pub async fn uninstall(&self, descriptor: &ServiceDescriptor, purge_data: bool) -> Result<()> {
        require_root()?;

        let state = self.observe(descriptor).await;
        let actions = uninstall_actions(
            descriptor,
            state,
            self.manager.descriptor_path(&descriptor.name),
            LogrotatePolicy::artifact_path(&descriptor.name),
            purge_data,
        );

        if actions.is_empty() {
            info!("{} is not installed, nothing to do", descriptor.name);
            return Ok(());
        }

        for action in actions {
            self.apply(descriptor, action).await?;
        }

        info!("{} uninstalled", descriptor.name);
        Ok(())
    }

    /// Queries whether the installed service is currently running.
    ///
    /// # Errors
    ///
    /// Returns an error if the service manager cannot be queried.
    pub async fn status(&self, descriptor: &ServiceDescriptor) -> Result<ServiceStatus> {
        self.manager.status(descriptor).await
    }

    /// Observes the host state the planner works from.
    async fn observe(&self, descriptor: &ServiceDescriptor) -> SystemState {
        let descriptor_exists = self.manager.descriptor_path(&descriptor.name).exists();
        let service_active = descriptor_exists
            && matches!(
                self.manager.status(descriptor).await,
                Ok(ServiceStatus::Active)
            );

        SystemState {
            group_exists: users::group_exists(&descriptor.group),
            user_exists: users::user_exists(&descriptor.user),
            descriptor_exists,
            logrotate_exists: logrotate::artifact_exists(&descriptor.name),
            service_active,
        }
    }

    async fn apply(&self, descriptor: &ServiceDescriptor, action: Action) -> Result<()> {
        debug!(?action, "applying");

        match action {
            Action::CreateGroup(_) => self.manager.create_group(descriptor).await,
            Action::CreateUser(_) => self.manager.create_user(descriptor).await,
            Action::CreateDirectory { path, owner, mode } => {
                create_owned_directory(&path, &owner, mode)
            }
            Action::WriteDescriptor(path) => {
                let rendered = self.manager.render(descriptor);
                write_atomically(&path, &rendered, self.manager.descriptor_mode())
            }
            Action::WriteLogrotate(path) => {
                let rendered = self.logrotate.render(descriptor);
                write_atomically(&path, &rendered, 0o644)
            }
            Action::Register(_) => self.manager.register(descriptor).await,
            Action::StopService(_) => self.manager.stop(descriptor).await,
            Action::Unregister(_) => self.manager.unregister(descriptor).await,
            Action::RemoveDescriptor(path) | Action::RemoveLogrotate(path) => {
                std::fs::remove_file(&path)
                    .map_err(|e| Error::Io("failed to remove artifact", e))
            }
            Action::RemoveUser(_) => self.manager.remove_user(descriptor).await,
            Action::RemoveGroup(_) => self.manager.remove_group(descriptor).await,
            Action::RemoveTree(path) => {
                if path.exists() {
                    std::fs::remove_dir_all(&path)
                        .map_err(|e| Error::Io("failed to remove directory tree", e))
                } else {
                    Ok(())
                }
            }
        }
    }
}

fn require_root() -> Result<()> {
    if nix::unistd::Uid::effective().is_root() {
        Ok(())
    } else {
        Err(Error::NotRoot)
    }
}

fn create_owned_directory(path: &Path, owner: &str, mode: u32) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::Io("failed to create directory", e))?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(|e| Error::Io("failed to set directory mode", e))?;

    let (uid, gid) = users::resolve_ids(owner)?;
    std::os::unix::fs::chown(path, Some(uid), Some(gid))
        .map_err(|e| Error::Io("failed to set directory owner", e))
}

/// Writes `contents` through a temp file in the target's directory so the
/// artifact is never observable half-written.
fn write_atomically(path: &Path, contents: &str, mode: u32) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Io("artifact path has no parent", std::io::Error::other(path.display().to_string())))?;

    let mut file =
        NamedTempFile::new_in(parent).map_err(|e| Error::Io("failed to create temp file", e))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| Error::Io("failed to write artifact", e))?;
    file.as_file()
        .set_permissions(std::fs::Permissions::from_mode(mode))
        .map_err(|e| Error::Io("failed to set artifact mode", e))?;
    file.persist(path)
        .map_err(|e| Error::Io("failed to persist artifact", e.error))?;

    Ok(())
}
