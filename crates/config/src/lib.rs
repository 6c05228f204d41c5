//! Typed service configuration: loading, first-boot defaults, validation.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
    DatabaseConfig, DatabaseEngine, LoggingConfig, MonitoringConfig, SecurityConfig, ServerConfig,
    ServiceConfig, SslConfig, Thresholds,
};

use std::io::Write;
use std::path::Path;

use rand::Rng;
use rand::distributions::Alphanumeric;
use tempfile::NamedTempFile;
use tracing::info;
use url::Url;
use vigil_netwait::DependencyTarget;

/// Bundled default configuration, written on first boot.
static DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../templates/default.json");

/// Levels accepted by the `logging.level` field.
static LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Loads the config at `path`, materializing the bundled default first if the
/// file does not exist. The default is written atomically and validated
/// exactly once; there is no retry loop.
///
/// # Errors
///
/// Returns an error if the file cannot be created or read, does not parse as
/// JSON, or violates a cross-field rule.
pub fn load(path: &Path) -> Result<ServiceConfig> {
    if !path.exists() {
        write_default(path)?;
        info!("created default configuration at {}", path.display());
    }

    load_existing(path)
}

/// Loads the config at `path` without any default fallback.
///
/// # Errors
///
/// Returns `Error::Missing` if the file does not exist, and otherwise the
/// same errors as [`load`].
pub fn load_existing(path: &Path) -> Result<ServiceConfig> {
    if !path.exists() {
        return Err(Error::Missing(path.to_path_buf()));
    }

    let raw = std::fs::read_to_string(path).map_err(|e| Error::Io("failed to read config", e))?;
    let config: ServiceConfig = serde_json::from_str(&raw)?;
    config.validate()?;

    Ok(config)
}

/// Renders the bundled template with a fresh encryption key and writes it
/// into place via write-then-rename, so a crash never leaves a partial file.
fn write_default(path: &Path) -> Result<()> {
    let key: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    let rendered = DEFAULT_CONFIG_TEMPLATE.replace("{encryption_key}", &key);

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| Error::Io("failed to create config dir", e))?;

    let mut tmp =
        NamedTempFile::new_in(parent).map_err(|e| Error::Io("failed to create temp file", e))?;
    tmp.write_all(rendered.as_bytes())
        .map_err(|e| Error::Io("failed to write default config", e))?;
    tmp.persist(path)
        .map_err(|e| Error::Io("failed to move default config into place", e.error))?;

    Ok(())
}

impl ServiceConfig {
    /// Checks cross-field rules the serde model cannot express.
    ///
    /// # Errors
    ///
    /// Returns `Error::Invalid` naming the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Invalid("server.port must be nonzero".into()));
        }

        if self.server.ssl.enabled {
            if self.server.ssl.cert_file.as_os_str().is_empty() {
                return Err(Error::Invalid(
                    "server.ssl.cert_file required when ssl is enabled".into(),
                ));
            }
            if self.server.ssl.key_file.as_os_str().is_empty() {
                return Err(Error::Invalid(
                    "server.ssl.key_file required when ssl is enabled".into(),
                ));
            }
        }

        if self.security.encryption_key.len() < 32 {
            return Err(Error::Invalid(
                "security.encryption_key must be at least 32 characters".into(),
            ));
        }

        if self.database.engine.is_network()
            && self
                .database
                .host
                .as_deref()
                .is_none_or(|host| host.is_empty())
        {
            return Err(Error::Invalid(format!(
                "database.host required for {}",
                self.database.engine.display_name()
            )));
        }

        if self.monitoring.metrics_port == 0 {
            return Err(Error::Invalid("monitoring.metrics_port must be nonzero".into()));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(Error::Invalid(format!(
                "logging.level must be one of {LOG_LEVELS:?}, got {:?}",
                self.logging.level
            )));
        }

        if self.logging.backup_count == 0 {
            return Err(Error::Invalid("logging.backup_count must be nonzero".into()));
        }

        Ok(())
    }

    /// Returns the network dependency startup must wait on, or `None` when
    /// the configured engine is embedded.
    #[must_use]
    pub fn database_target(&self, timeout_seconds: u64) -> Option<DependencyTarget> {
        if !self.database.engine.is_network() {
            return None;
        }

        let host = self.database.host.clone()?;
        let port = self
            .database
            .port
            .unwrap_or_else(|| self.database.engine.default_port());

        Some(DependencyTarget::new(
            host,
            port,
            self.database.engine.display_name(),
            timeout_seconds,
        ))
    }

    /// Returns the URL of the service's own health endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured host does not form a valid URL.
    pub fn health_endpoint(&self) -> Result<Url> {
        // A wildcard bind address is not a connectable host.
        let host = if self.server.host == "0.0.0.0" || self.server.host.is_empty() {
            "127.0.0.1"
        } else {
            self.server.host.as_str()
        };

        let scheme = if self.server.ssl.enabled { "https" } else { "http" };

        Ok(Url::parse(&format!(
            "{scheme}://{host}:{}/health",
            self.server.port
        ))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> ServiceConfig {
        serde_json::from_str(
            &DEFAULT_CONFIG_TEMPLATE.replace("{encryption_key}", &"k".repeat(64)),
        )
        .expect("template must parse")
    }

    #[test]
    fn default_template_parses_and_validates() {
        let config = minimal_config();
        config.validate().expect("template must validate");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.engine, DatabaseEngine::Sqlite);
        assert_eq!(config.thresholds.degraded_percent, 80);
    }

    #[test]
    fn load_creates_default_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("conf/config.json");

        let config = load(&path).expect("load must create the default");
        assert!(path.exists());
        assert_eq!(config.security.encryption_key.len(), 64);

        // A second load reads the same file rather than regenerating it.
        let again = load(&path).expect("load must reuse the file");
        assert_eq!(again.security.encryption_key, config.security.encryption_key);
    }

    #[test]
    fn load_existing_rejects_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_existing(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Missing(_)));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").expect("write");

        let err = load_existing(&path).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn missing_section_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"server": {"host": "a", "port": 1, "ssl": {"enabled": false}}}"#)
            .expect("write");

        let err = load_existing(&path).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn network_database_requires_a_host() {
        let mut config = minimal_config();
        config.database.engine = DatabaseEngine::Postgresql;
        config.database.host = None;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));
    }

    #[test]
    fn ssl_requires_cert_and_key_paths() {
        let mut config = minimal_config();
        config.server.ssl.enabled = true;
        config.server.ssl.cert_file = std::path::PathBuf::new();

        assert!(config.validate().is_err());
    }

    #[test]
    fn database_target_only_exists_for_network_engines() {
        let mut config = minimal_config();
        assert!(config.database_target(5).is_none());

        config.database.engine = DatabaseEngine::Postgresql;
        config.database.host = Some("db.internal".into());
        let target = config.database_target(5).expect("target");
        assert_eq!(target.port, 5432);
        assert_eq!(target.display_name, "PostgreSQL");
        assert_eq!(target.timeout_seconds, 5);
    }

    #[test]
    fn health_endpoint_rewrites_the_wildcard_bind() {
        let config = minimal_config();
        let url = config.health_endpoint().expect("url");
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/health");
    }
}
