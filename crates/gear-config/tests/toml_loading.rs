//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use gear_config::GearConfig;

#[test]
fn loads_smtp_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[smtp]
host = "smtp.example.com"
port = 587
username = "mailer"
password = "secret"
use_tls = true
use_ssl = false
from_email = "office@example.com"
"#,
        )?;

        let config: GearConfig = Figment::from(Serialized::defaults(GearConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.smtp.host, "smtp.example.com");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.smtp.username, "mailer");
        assert!(config.smtp.use_tls);
        assert!(!config.smtp.use_ssl);
        assert!(config.smtp.is_configured());
        assert!(config.validate().is_ok());
        Ok(())
    });
}

#[test]
fn loads_scheduler_and_site_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[scheduler]
interval_secs = 300

[site]
notification_email = "office@example.com"
calendar_uid_domain = "example-driving"
"#,
        )?;

        let config: GearConfig = Figment::from(Serialized::defaults(GearConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.scheduler.interval_secs, 300);
        assert_eq!(config.scheduler.reminder_window_hours, 24);
        assert_eq!(config.site.notification_email(), Some("office@example.com"));
        assert_eq!(config.site.calendar_uid_domain, "example-driving");
        assert_eq!(config.site.calendar_product_id, "-//Gearbox//CRM//EN");
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[sms]
webhook_url = "https://sms.example.com/from-toml"
"#,
        )?;
        jail.set_env("GEARBOX_SMS__WEBHOOK_URL", "https://sms.example.com/from-env");
        jail.set_env("GEARBOX_SMS__TIMEOUT_SECS", "5");

        let config: GearConfig = Figment::from(Serialized::defaults(GearConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("GEARBOX_").split("__"))
            .extract()?;

        assert_eq!(config.sms.webhook_url, "https://sms.example.com/from-env");
        assert_eq!(config.sms.timeout_secs, 5);
        Ok(())
    });
}

#[test]
fn project_config_is_found_under_dot_gearbox() {
    Jail::expect_with(|jail| {
        jail.create_dir(".gearbox")?;
        jail.create_file(
            ".gearbox/config.toml",
            r#"
[server]
port = 9100

[database]
path = ":memory:"
"#,
        )?;

        let config: GearConfig = GearConfig::figment_for_project(jail.directory()).extract()?;
        assert_eq!(config.server.port, 9100);
        assert!(config.database.is_in_memory());
        Ok(())
    });
}
