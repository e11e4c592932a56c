//! # gear-config
//!
//! Layered configuration loading for Gearbox using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`GEARBOX_*` prefix, `__` as separator)
//! 2. Project-level `.gearbox/config.toml`
//! 3. User-level `~/.config/gearbox/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `GEARBOX_SMTP__HOST` -> `smtp.host`, `GEARBOX_STRIPE__WEBHOOK_SECRET`
//! -> `stripe.webhook_secret`, etc. The `__` (double underscore) separates nested
//! config sections.
//!
//! # Usage
//!
//! ```no_run
//! use gear_config::GearConfig;
//!
//! let config = GearConfig::load_with_dotenv().expect("config");
//!
//! if config.smtp.is_configured() {
//!     println!("Sending mail via {}", config.smtp.host);
//! }
//! ```

mod calendar;
mod database;
mod error;
mod general;
mod scheduler;
mod server;
mod site;
mod sms;
mod smtp;
mod stripe;

pub use calendar::CalendarConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use scheduler::SchedulerConfig;
pub use server::ServerConfig;
pub use site::SiteConfig;
pub use sms::SmsConfig;
pub use smtp::SmtpConfig;
pub use stripe::StripeConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding project-local state and config.
pub const PROJECT_DIR: &str = ".gearbox";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GearConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub sms: SmsConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl GearConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`GearConfig::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Load configuration rooted at a project directory instead of the current one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed.
    pub fn load_for_project(root: &Path) -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::figment_for_project(root)
            .extract()
            .map_err(ConfigError::from)
    }

    /// Build the figment provider chain for the current directory.
    ///
    /// Public so tests can inspect the figment directly or layer extra providers.
    pub fn figment() -> Figment {
        Self::figment_for_project(Path::new("."))
    }

    /// Build the figment provider chain for a project root.
    pub fn figment_for_project(root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = root.join(PROJECT_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("GEARBOX_").split("__"))
    }

    /// Fail unless outgoing email is configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` for the `smtp` section.
    pub fn require_smtp(&self) -> Result<&SmtpConfig, ConfigError> {
        if self.smtp.is_configured() {
            Ok(&self.smtp)
        } else {
            Err(ConfigError::NotConfigured {
                section: "smtp".into(),
            })
        }
    }

    /// Check cross-field constraints figment cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp.use_tls && self.smtp.use_ssl {
            return Err(ConfigError::InvalidValue {
                field: "smtp.use_tls".into(),
                reason: "use_tls and use_ssl are mutually exclusive".into(),
            });
        }
        if self.scheduler.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.interval_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.scheduler.reminder_window_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.reminder_window_hours".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.stripe.tolerance_secs < 0 {
            return Err(ConfigError::InvalidValue {
                field: "stripe.tolerance_secs".into(),
                reason: "must not be negative".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gearbox").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or uses the current dir.
    /// Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = GearConfig::default();
        assert!(!config.smtp.is_configured());
        assert!(!config.sms.is_configured());
        assert!(!config.stripe.can_verify_webhooks());
        assert_eq!(config.general.default_limit, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn require_smtp_reports_section() {
        let err = GearConfig::default().require_smtp().unwrap_err();
        assert!(err.to_string().contains("'smtp'"));
    }

    #[test]
    fn tls_and_ssl_conflict() {
        let mut config = GearConfig::default();
        config.smtp.use_tls = true;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "smtp.use_tls"));
    }

    #[test]
    fn zero_interval_is_invalid() {
        let mut config = GearConfig::default();
        config.scheduler.interval_secs = 0;
        assert!(config.validate().is_err());
    }
}
