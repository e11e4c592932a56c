//! Communications scheduler configuration.

use serde::{Deserialize, Serialize};

const fn default_interval_secs() -> u64 {
    60
}

const fn default_reminder_window_hours() -> i64 {
    24
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Seconds between scheduler passes in `gearbox scheduler start`.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// How far ahead lesson reminders are generated.
    #[serde(default = "default_reminder_window_hours")]
    pub reminder_window_hours: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            reminder_window_hours: default_reminder_window_hours(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_every_minute() {
        let config = SchedulerConfig::default();
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.reminder_window_hours, 24);
    }
}
