use std::path::{Path, PathBuf};

use crate::descriptor::ServiceDescriptor;

static LOGROTATE_TEMPLATE: &str = include_str!("../templates/vigil.logrotate");

/// Rotation settings for the service's log directory.
#[derive(Debug, Clone, Copy)]
pub struct LogrotatePolicy {
    /// Number of rotated files to keep.
    pub retention: u32,

    /// Gzip rotated files (with `delaycompress` so the most recent
    /// rotation stays readable).
    pub compress: bool,
}

impl Default for LogrotatePolicy {
    fn default() -> Self {
        Self {
            retention: 7,
            compress: true,
        }
    }
}

impl LogrotatePolicy {
    /// Where the rendered policy is installed.
    #[must_use]
    pub fn artifact_path(name: &str) -> PathBuf {
        PathBuf::from("/etc/logrotate.d").join(name)
    }

    /// Renders the logrotate stanza for `descriptor`'s log directory.
    #[must_use]
    pub fn render(&self, descriptor: &ServiceDescriptor) -> String {
        let log_glob = descriptor.working_dir.join("logs").join("*.log");
        let compress_clause = if self.compress {
            "    compress\n    delaycompress\n"
        } else {
            ""
        };

        LOGROTATE_TEMPLATE
            .replace("{log_glob}", &log_glob.display().to_string())
            .replace("{retention}", &self.retention.to_string())
            .replace("{compress_clause}", compress_clause)
            .replace("{user}", &descriptor.user)
            .replace("{group}", &descriptor.group)
    }
}

/// True when a policy file for `name` is already installed.
#[must_use]
pub fn artifact_exists(name: &str) -> bool {
    Path::new(&LogrotatePolicy::artifact_path(name)).exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_compresses_and_keeps_a_week() {
        let descriptor = ServiceDescriptor::new("vigil", "/usr/local/bin/vigil");
        let rendered = LogrotatePolicy::default().render(&descriptor);

        assert!(rendered.starts_with("/var/lib/vigil/logs/*.log {"));
        assert!(rendered.contains("rotate 7"));
        assert!(rendered.contains("compress"));
        assert!(rendered.contains("delaycompress"));
        assert!(rendered.contains("create 0640 vigil vigil"));
    }

    #[test]
    fn compression_can_be_disabled() {
        let descriptor = ServiceDescriptor::new("vigil", "/usr/local/bin/vigil");
        let policy = LogrotatePolicy {
            retention: 30,
            compress: false,
        };
        let rendered = policy.render(&descriptor);

        assert!(rendered.contains("rotate 30"));
        assert!(!rendered.contains("compress"));
    }

    #[test]
    fn artifact_lands_in_logrotate_d() {
        assert_eq!(
            LogrotatePolicy::artifact_path("vigil"),
            PathBuf::from("/etc/logrotate.d/vigil")
        );
    }
}
