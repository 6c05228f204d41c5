use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level service configuration document.
///
/// All five sections are required; `thresholds` is optional and carries the
/// health/resource policy constants with their observed defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Security and session settings.
    pub security: SecurityConfig,

    /// Database engine and connection settings.
    pub database: DatabaseConfig,

    /// Health/metrics reporting settings.
    pub monitoring: MonitoringConfig,

    /// Log file and rotation settings.
    pub logging: LoggingConfig,

    /// Health and resource policy thresholds.
    #[serde(default)]
    pub thresholds: Thresholds,
}

/// The `server` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the service binds to.
    pub host: String,

    /// Port the service binds to.
    pub port: u16,

    /// TLS settings.
    pub ssl: SslConfig,
}

/// The `server.ssl` subsection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SslConfig {
    /// Whether TLS is enabled.
    pub enabled: bool,

    /// Path to the PEM certificate file.
    #[serde(default)]
    pub cert_file: PathBuf,

    /// Path to the PEM private key file.
    #[serde(default)]
    pub key_file: PathBuf,
}

/// The `security` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Key used for at-rest encryption of secrets.
    pub encryption_key: String,

    /// Session lifetime in seconds.
    #[serde(default = "default_session_timeout")]
    pub session_timeout: u64,

    /// Failed logins tolerated before lockout.
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,

    /// Lockout duration in seconds.
    #[serde(default = "default_lockout_duration")]
    pub lockout_duration: u64,
}

/// Supported database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    /// Embedded file-backed database. No network dependency.
    Sqlite,

    /// PostgreSQL over TCP.
    Postgresql,

    /// MySQL over TCP.
    Mysql,
}

impl DatabaseEngine {
    /// Conventional port for the engine.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Sqlite => 0,
            Self::Postgresql => 5432,
            Self::Mysql => 3306,
        }
    }

    /// Display name used in logs and wait messages.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Sqlite => "SQLite",
            Self::Postgresql => "PostgreSQL",
            Self::Mysql => "MySQL",
        }
    }

    /// Whether the engine is reached over the network.
    #[must_use]
    pub const fn is_network(self) -> bool {
        !matches!(self, Self::Sqlite)
    }
}

/// The `database` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Configured engine.
    #[serde(rename = "type")]
    pub engine: DatabaseEngine,

    /// Host for network engines.
    #[serde(default)]
    pub host: Option<String>,

    /// Port for network engines. Defaults to the engine's conventional port.
    #[serde(default)]
    pub port: Option<u16>,

    /// Database name, or file path for sqlite.
    pub name: String,

    /// Username for network engines.
    #[serde(default)]
    pub user: Option<String>,

    /// Password for network engines.
    #[serde(default)]
    pub password: Option<String>,

    /// Operator-supplied command run by the migrations stage.
    #[serde(default)]
    pub migrate_command: Option<String>,
}

/// The `monitoring` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Whether periodic health reporting is enabled.
    pub enabled: bool,

    /// Port the metrics endpoint listens on.
    pub metrics_port: u16,

    /// Seconds between health aggregations in monitor mode.
    pub health_check_interval: u64,
}

/// The `logging` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level emitted (trace, debug, info, warn, error).
    pub level: String,

    /// Path of the log file.
    pub file: PathBuf,

    /// Size at which the file is rotated, e.g. "100MB".
    pub max_size: String,

    /// Rotated files retained.
    pub backup_count: u32,
}

/// The optional `thresholds` section.
///
/// These are policy constants, not derived values. Defaults match the
/// long-observed operational settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    /// Pass percentage at or above which a non-perfect report is degraded
    /// rather than unhealthy.
    #[serde(default = "default_degraded_percent")]
    pub degraded_percent: u8,

    /// Memory usage percent at which the memory probe warns.
    #[serde(default = "default_memory_warn_percent")]
    pub memory_warn_percent: u8,

    /// Memory usage percent at which the memory probe fails.
    #[serde(default = "default_memory_fail_percent")]
    pub memory_fail_percent: u8,

    /// Disk usage percent at which the filesystem probe warns.
    #[serde(default = "default_disk_warn_percent")]
    pub disk_warn_percent: u8,

    /// Disk usage percent at which the filesystem probe fails.
    #[serde(default = "default_disk_fail_percent")]
    pub disk_fail_percent: u8,

    /// Days of remaining certificate validity below which the probe warns.
    #[serde(default = "default_cert_warn_days")]
    pub cert_warn_days: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            degraded_percent: default_degraded_percent(),
            memory_warn_percent: default_memory_warn_percent(),
            memory_fail_percent: default_memory_fail_percent(),
            disk_warn_percent: default_disk_warn_percent(),
            disk_fail_percent: default_disk_fail_percent(),
            cert_warn_days: default_cert_warn_days(),
        }
    }
}

const fn default_session_timeout() -> u64 {
    3600
}

const fn default_max_login_attempts() -> u32 {
    5
}

const fn default_lockout_duration() -> u64 {
    900
}

const fn default_degraded_percent() -> u8 {
    80
}

const fn default_memory_warn_percent() -> u8 {
    85
}

const fn default_memory_fail_percent() -> u8 {
    95
}

const fn default_disk_warn_percent() -> u8 {
    80
}

const fn default_disk_fail_percent() -> u8 {
    90
}

const fn default_cert_warn_days() -> i64 {
    30
}
