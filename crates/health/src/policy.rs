use vigil_config::Thresholds;

use crate::types::Tier;

/// Policy constants for tier mapping and probe thresholds.
///
/// Values come from the optional `thresholds` config section; the defaults
/// are the long-observed operational settings.
#[derive(Debug, Clone, Copy)]
pub struct HealthPolicy {
    /// Non-perfect pass percentages at or above this are degraded.
    pub degraded_percent: u8,

    /// Memory usage percent at which the memory probe warns.
    pub memory_warn_percent: u8,

    /// Memory usage percent above which the memory probe fails.
    pub memory_fail_percent: u8,

    /// Disk usage percent at which the filesystem probe warns.
    pub disk_warn_percent: u8,

    /// Disk usage percent above which the filesystem probe fails.
    pub disk_fail_percent: u8,

    /// Remaining certificate validity in days below which the probe warns.
    pub cert_warn_days: i64,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self::from(&Thresholds::default())
    }
}

impl From<&Thresholds> for HealthPolicy {
    fn from(t: &Thresholds) -> Self {
        Self {
            degraded_percent: t.degraded_percent,
            memory_warn_percent: t.memory_warn_percent,
            memory_fail_percent: t.memory_fail_percent,
            disk_warn_percent: t.disk_warn_percent,
            disk_fail_percent: t.disk_fail_percent,
            cert_warn_days: t.cert_warn_days,
        }
    }
}

impl HealthPolicy {
    /// Maps a pass percentage to a tier. Exhaustive and non-overlapping:
    /// 100 is healthy, `degraded_percent..100` is degraded, the rest is
    /// unhealthy.
    #[must_use]
    pub const fn tier_for(&self, percentage: u8) -> Tier {
        if percentage >= 100 {
            Tier::Healthy
        } else if percentage >= self.degraded_percent {
            Tier::Degraded
        } else {
            Tier::Unhealthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_mapping_is_exhaustive_and_non_overlapping() {
        let policy = HealthPolicy::default();

        for percentage in 0..=100u8 {
            let tier = policy.tier_for(percentage);
            match percentage {
                100 => assert_eq!(tier, Tier::Healthy),
                80..=99 => assert_eq!(tier, Tier::Degraded),
                _ => assert_eq!(tier, Tier::Unhealthy),
            }
        }
    }

    #[test]
    fn degraded_threshold_is_configurable() {
        let mut thresholds = Thresholds::default();
        thresholds.degraded_percent = 50;
        let policy = HealthPolicy::from(&thresholds);

        assert_eq!(policy.tier_for(50), Tier::Degraded);
        assert_eq!(policy.tier_for(49), Tier::Unhealthy);
    }
}
