use std::path::PathBuf;

use async_trait::async_trait;

use crate::descriptor::ServiceDescriptor;
use crate::error::Result;
use crate::platform::Platform;
use crate::users;

/// Observed run state of an installed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    /// The service manager reports the service running.
    Active,
    /// Installed but not running.
    Inactive,
}

/// One platform's strategy for registering and driving the service.
///
/// Rendering and path computation are pure; only `register`, `unregister`,
/// `stop`, and `status` touch the service manager.
#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// The platform this strategy serves.
    fn platform(&self) -> Platform;

    /// Where the descriptor artifact lives for `name`.
    fn descriptor_path(&self, name: &str) -> PathBuf;

    /// Permission bits for the written descriptor.
    fn descriptor_mode(&self) -> u32 {
        0o644
    }

    /// Renders the platform-native descriptor text.
    fn render(&self, descriptor: &ServiceDescriptor) -> String;

    /// Registers the written descriptor with the service manager.
    async fn register(&self, descriptor: &ServiceDescriptor) -> Result<()>;

    /// Deregisters the service.
    async fn unregister(&self, descriptor: &ServiceDescriptor) -> Result<()>;

    /// Stops the running service.
    async fn stop(&self, descriptor: &ServiceDescriptor) -> Result<()>;

    /// Queries whether the service is running.
    async fn status(&self, descriptor: &ServiceDescriptor) -> Result<ServiceStatus>;

    /// Creates the dedicated system group. POSIX default; macOS overrides.
    async fn create_group(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        users::create_system_group(&descriptor.group).await
    }

    /// Creates the dedicated system user.
    async fn create_user(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        users::create_system_user(&descriptor.user, &descriptor.group, &descriptor.working_dir)
            .await
    }

    /// Removes the system user.
    async fn remove_user(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        users::remove_system_user(&descriptor.user).await
    }

    /// Removes the system group.
    async fn remove_group(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        users::remove_system_group(&descriptor.group).await
    }
}
