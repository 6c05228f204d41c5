use std::path::PathBuf;

/// How the service manager reacts to the service exiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Restart regardless of exit status.
    Always,
    /// Restart only on nonzero exit.
    OnFailure,
    /// Never restart automatically.
    Never,
}

impl RestartPolicy {
    /// The systemd `Restart=` value.
    #[must_use]
    pub const fn systemd_value(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::OnFailure => "on-failure",
            Self::Never => "no",
        }
    }

    /// The launchd `KeepAlive` element name.
    #[must_use]
    pub const fn launchd_value(self) -> &'static str {
        match self {
            Self::Always | Self::OnFailure => "true",
            Self::Never => "false",
        }
    }
}

/// Resource limits applied by the rendered descriptor.
#[derive(Debug, Clone, Copy)]
pub struct ResourceLimits {
    /// Open file descriptor cap.
    pub open_files: u64,

    /// Hard memory cap in megabytes, if any.
    pub max_memory_mb: Option<u64>,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            open_files: 65536,
            max_memory_mb: None,
        }
    }
}

/// Platform-independent description of the service registration, persisted
/// into the OS service registry by the active strategy.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// Service name; also the unit/script file stem.
    pub name: String,

    /// One-line description shown by the service manager.
    pub description: String,

    /// Absolute path of the service binary.
    pub exec_path: PathBuf,

    /// Dedicated system user the service runs as.
    pub user: String,

    /// Dedicated system group the service runs as.
    pub group: String,

    /// Service home; also exported as `VIGIL_HOME`.
    pub working_dir: PathBuf,

    /// Path exported as `VIGIL_CONFIG`.
    pub config_path: PathBuf,

    /// Restart behavior.
    pub restart_policy: RestartPolicy,

    /// Names of units/services that must start first.
    pub dependencies: Vec<String>,

    /// Resource limits.
    pub limits: ResourceLimits,
}

impl ServiceDescriptor {
    /// Creates a descriptor with conventional defaults for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, exec_path: impl Into<PathBuf>) -> Self {
        let name = name.into();
        Self {
            description: format!("{name} service supervisor"),
            exec_path: exec_path.into(),
            user: name.clone(),
            group: name.clone(),
            working_dir: PathBuf::from(format!("/var/lib/{name}")),
            config_path: PathBuf::from(format!("/etc/{name}/config.json")),
            restart_policy: RestartPolicy::OnFailure,
            dependencies: Vec::new(),
            limits: ResourceLimits::default(),
            name,
        }
    }
}
