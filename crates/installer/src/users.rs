use std::path::Path;

use tokio::process::Command;
use tracing::info;

use crate::error::{Error, Result};

/// Whether a named group exists in the system database.
#[must_use]
pub fn group_exists(name: &str) -> bool {
    matches!(nix::unistd::Group::from_name(name), Ok(Some(_)))
}

/// Whether a named user exists in the system database.
#[must_use]
pub fn user_exists(name: &str) -> bool {
    matches!(nix::unistd::User::from_name(name), Ok(Some(_)))
}

/// Creates a system group via `groupadd`. Callers check existence first.
///
/// # Errors
///
/// Returns an error if `groupadd` cannot be spawned or exits nonzero.
pub async fn create_system_group(name: &str) -> Result<()> {
    info!("creating system group {name}");
    run_checked("groupadd", Command::new("groupadd").args(["--system", name])).await
}

/// Creates a non-login system user via `useradd`.
///
/// # Errors
///
/// Returns an error if `useradd` cannot be spawned or exits nonzero.
pub async fn create_system_user(name: &str, group: &str, home: &Path) -> Result<()> {
    info!("creating system user {name}");
    run_checked(
        "useradd",
        Command::new("useradd").args([
            "--system",
            "--gid",
            group,
            "--home-dir",
            &home.display().to_string(),
            "--no-create-home",
            "--shell",
            "/usr/sbin/nologin",
            name,
        ]),
    )
    .await
}

/// Removes a system user via `userdel`.
///
/// # Errors
///
/// Returns an error if `userdel` cannot be spawned or exits nonzero.
pub async fn remove_system_user(name: &str) -> Result<()> {
    info!("removing system user {name}");
    run_checked("userdel", Command::new("userdel").arg(name)).await
}

/// Removes a system group via `groupdel`.
///
/// # Errors
///
/// Returns an error if `groupdel` cannot be spawned or exits nonzero.
pub async fn remove_system_group(name: &str) -> Result<()> {
    info!("removing system group {name}");
    run_checked("groupdel", Command::new("groupdel").arg(name)).await
}

/// Resolves a user's uid and primary gid.
///
/// # Errors
///
/// Returns `Error::UnknownPrincipal` if the user cannot be resolved.
pub fn resolve_ids(user: &str) -> Result<(u32, u32)> {
    let entry = nix::unistd::User::from_name(user)
        .ok()
        .flatten()
        .ok_or_else(|| Error::UnknownPrincipal(user.to_string()))?;

    Ok((entry.uid.as_raw(), entry.gid.as_raw()))
}

/// Runs an external tool, mapping spawn failures and nonzero exits.
pub(crate) async fn run_checked(tool: &'static str, command: &mut Command) -> Result<()> {
    let status = command
        .status()
        .await
        .map_err(|e| Error::Io("failed to spawn external tool", e))?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::NonZeroExit(tool, status))
    }
}
