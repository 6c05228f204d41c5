use tracing::warn;

/// Long-running mode entered after the startup sequence completes.
///
/// Mode strings come from operators (unit files, init scripts, muscle
/// memory), so unknown values degrade to the default loop instead of
/// refusing to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// The default application loop.
    Default,
    /// Periodic comprehensive health aggregation.
    Monitor,
    /// One-shot backup of the configuration and local database.
    Backup,
    /// Live terminal status display.
    Dashboard,
    /// Re-checks readiness until healthy, then runs the default loop.
    Bootloader,
}

impl RunMode {
    /// Parses an operator-supplied mode string, falling back to `Default`
    /// with a warning on anything unrecognized.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "default" => Self::Default,
            "monitor" => Self::Monitor,
            "backup" => Self::Backup,
            "dashboard" => Self::Dashboard,
            "bootloader" => Self::Bootloader,
            other => {
                warn!("unknown run mode {other:?}, falling back to default");
                Self::Default
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_modes_parse() {
        assert_eq!(RunMode::parse("default"), RunMode::Default);
        assert_eq!(RunMode::parse("monitor"), RunMode::Monitor);
        assert_eq!(RunMode::parse("backup"), RunMode::Backup);
        assert_eq!(RunMode::parse("dashboard"), RunMode::Dashboard);
        assert_eq!(RunMode::parse("bootloader"), RunMode::Bootloader);
    }

    #[test]
    fn unknown_modes_fall_back_to_default() {
        assert_eq!(RunMode::parse("montior"), RunMode::Default);
        assert_eq!(RunMode::parse(""), RunMode::Default);
        assert_eq!(RunMode::parse("MONITOR"), RunMode::Default);
    }
}
