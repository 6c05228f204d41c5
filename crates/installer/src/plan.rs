use std::path::PathBuf;

use crate::descriptor::ServiceDescriptor;

/// One side effect of an install or uninstall run.
///
/// Plans are computed from observed state before anything is mutated, which
/// is what makes install idempotent and uninstall its inverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create the dedicated system group.
    CreateGroup(String),
    /// Create the dedicated system user.
    CreateUser(String),
    /// Create a directory with an owner and mode. Inherently idempotent.
    CreateDirectory {
        /// Directory to create.
        path: PathBuf,
        /// Owning user (`root` for the config root).
        owner: String,
        /// Permission bits.
        mode: u32,
    },
    /// Render and atomically write the platform descriptor.
    WriteDescriptor(PathBuf),
    /// Render and atomically write the log-rotation policy artifact.
    WriteLogrotate(PathBuf),
    /// Register the descriptor with the service manager.
    Register(String),
    /// Stop the running service.
    StopService(String),
    /// Deregister from the service manager.
    Unregister(String),
    /// Delete the descriptor file.
    RemoveDescriptor(PathBuf),
    /// Delete the log-rotation artifact.
    RemoveLogrotate(PathBuf),
    /// Delete the system user.
    RemoveUser(String),
    /// Delete the system group.
    RemoveGroup(String),
    /// Delete a data or config directory. Only planned when explicitly
    /// requested.
    RemoveTree(PathBuf),
}

/// Observed state of the host before planning.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemState {
    /// The service group already exists.
    pub group_exists: bool,
    /// The service user already exists.
    pub user_exists: bool,
    /// A descriptor file is already present.
    pub descriptor_exists: bool,
    /// A log-rotation artifact is already present.
    pub logrotate_exists: bool,
    /// The service is currently running.
    pub service_active: bool,
}

/// Mode bits for service data directories: writable only by the service
/// user, listable by its group.
pub const DATA_DIR_MODE: u32 = 0o750;

/// Mode bits for the config root: owned by root, world-readable.
pub const CONFIG_DIR_MODE: u32 = 0o755;

/// Computes the ordered install side effects for `descriptor` given `state`.
/// Already-satisfied principal creation is skipped; descriptor and artifact
/// writes always run because they replace atomically.
#[must_use]
pub fn install_actions(
    descriptor: &ServiceDescriptor,
    state: SystemState,
    descriptor_path: PathBuf,
    logrotate_path: PathBuf,
) -> Vec<Action> {
    let mut actions = Vec::new();

    if !state.group_exists {
        actions.push(Action::CreateGroup(descriptor.group.clone()));
    }
    if !state.user_exists {
        actions.push(Action::CreateUser(descriptor.user.clone()));
    }

    actions.push(Action::CreateDirectory {
        path: descriptor.working_dir.clone(),
        owner: descriptor.user.clone(),
        mode: DATA_DIR_MODE,
    });
    for sub in ["data", "logs", "certs", "run"] {
        actions.push(Action::CreateDirectory {
            path: descriptor.working_dir.join(sub),
            owner: descriptor.user.clone(),
            mode: DATA_DIR_MODE,
        });
    }
    if let Some(config_root) = descriptor.config_path.parent() {
        actions.push(Action::CreateDirectory {
            path: config_root.to_path_buf(),
            owner: "root".to_string(),
            mode: CONFIG_DIR_MODE,
        });
    }

    actions.push(Action::WriteDescriptor(descriptor_path));
    actions.push(Action::WriteLogrotate(logrotate_path));
    actions.push(Action::Register(descriptor.name.clone()));

    actions
}

/// Computes the ordered uninstall side effects: stop, deregister, remove
/// artifacts, remove principals, and only with `purge_data` remove the data
/// and config trees.
#[must_use]
pub fn uninstall_actions(
    descriptor: &ServiceDescriptor,
    state: SystemState,
    descriptor_path: PathBuf,
    logrotate_path: PathBuf,
    purge_data: bool,
) -> Vec<Action> {
    let mut actions = Vec::new();

    if state.service_active {
        actions.push(Action::StopService(descriptor.name.clone()));
    }
    if state.descriptor_exists {
        actions.push(Action::Unregister(descriptor.name.clone()));
        actions.push(Action::RemoveDescriptor(descriptor_path));
    }
    if state.logrotate_exists {
        actions.push(Action::RemoveLogrotate(logrotate_path));
    }
    if state.user_exists {
        actions.push(Action::RemoveUser(descriptor.user.clone()));
    }
    if state.group_exists {
        actions.push(Action::RemoveGroup(descriptor.group.clone()));
    }

    if purge_data {
        actions.push(Action::RemoveTree(descriptor.working_dir.clone()));
        if let Some(config_root) = descriptor.config_path.parent() {
            actions.push(Action::RemoveTree(config_root.to_path_buf()));
        }
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor::new("vigil", "/usr/local/bin/vigil")
    }

    fn paths() -> (PathBuf, PathBuf) {
        (
            PathBuf::from("/etc/systemd/system/vigil.service"),
            PathBuf::from("/etc/logrotate.d/vigil"),
        )
    }

    #[test]
    fn fresh_install_creates_exactly_one_user_and_group() {
        let (unit, rotate) = paths();
        let actions = install_actions(&descriptor(), SystemState::default(), unit, rotate);

        let users = actions
            .iter()
            .filter(|a| matches!(a, Action::CreateUser(_)))
            .count();
        let groups = actions
            .iter()
            .filter(|a| matches!(a, Action::CreateGroup(_)))
            .count();
        assert_eq!(users, 1);
        assert_eq!(groups, 1);
    }

    #[test]
    fn second_install_skips_already_satisfied_steps() {
        let satisfied = SystemState {
            group_exists: true,
            user_exists: true,
            descriptor_exists: true,
            logrotate_exists: true,
            service_active: false,
        };
        let (unit, rotate) = paths();
        let actions = install_actions(&descriptor(), satisfied, unit, rotate);

        assert!(!actions
            .iter()
            .any(|a| matches!(a, Action::CreateUser(_) | Action::CreateGroup(_))));
        // Descriptor and artifact writes replace atomically, so they rerun.
        assert!(actions.iter().any(|a| matches!(a, Action::WriteDescriptor(_))));
    }

    #[test]
    fn group_precedes_user_and_writes_precede_registration() {
        let (unit, rotate) = paths();
        let actions = install_actions(&descriptor(), SystemState::default(), unit, rotate);

        let pos = |pred: fn(&Action) -> bool| actions.iter().position(pred).expect("present");
        assert!(pos(|a| matches!(a, Action::CreateGroup(_))) < pos(|a| matches!(a, Action::CreateUser(_))));
        assert!(pos(|a| matches!(a, Action::WriteDescriptor(_))) < pos(|a| matches!(a, Action::Register(_))));
    }

    #[test]
    fn data_dirs_belong_to_the_service_user_and_config_root_to_root() {
        let (unit, rotate) = paths();
        let actions = install_actions(&descriptor(), SystemState::default(), unit, rotate);

        for action in &actions {
            if let Action::CreateDirectory { path, owner, mode } = action {
                if path.starts_with("/etc") {
                    assert_eq!(owner, "root");
                    assert_eq!(*mode, CONFIG_DIR_MODE);
                } else {
                    assert_eq!(owner, "vigil");
                    assert_eq!(*mode, DATA_DIR_MODE);
                }
            }
        }
    }

    #[test]
    fn uninstall_reverses_every_install_side_effect() {
        let installed = SystemState {
            group_exists: true,
            user_exists: true,
            descriptor_exists: true,
            logrotate_exists: true,
            service_active: true,
        };
        let (unit, rotate) = paths();
        let actions =
            uninstall_actions(&descriptor(), installed, unit.clone(), rotate.clone(), false);

        assert_eq!(
            actions,
            vec![
                Action::StopService("vigil".into()),
                Action::Unregister("vigil".into()),
                Action::RemoveDescriptor(unit),
                Action::RemoveLogrotate(rotate),
                Action::RemoveUser("vigil".into()),
                Action::RemoveGroup("vigil".into()),
            ]
        );
    }

    #[test]
    fn data_removal_is_opt_in() {
        let installed = SystemState {
            group_exists: true,
            user_exists: true,
            descriptor_exists: true,
            logrotate_exists: true,
            service_active: false,
        };
        let (unit, rotate) = paths();

        let keep = uninstall_actions(&descriptor(), installed, unit.clone(), rotate.clone(), false);
        assert!(!keep.iter().any(|a| matches!(a, Action::RemoveTree(_))));

        let purge = uninstall_actions(&descriptor(), installed, unit, rotate, true);
        let trees: Vec<_> = purge
            .iter()
            .filter(|a| matches!(a, Action::RemoveTree(_)))
            .collect();
        assert_eq!(trees.len(), 2);
    }

    #[test]
    fn uninstalling_a_clean_host_plans_nothing() {
        let (unit, rotate) = paths();
        let actions =
            uninstall_actions(&descriptor(), SystemState::default(), unit, rotate, false);
        assert!(actions.is_empty());
    }
}
