use figment::Jail;
use gear_config::GearConfig;

#[test]
fn env_fills_stripe_secret() {
    Jail::expect_with(|jail| {
        jail.set_env("GEARBOX_STRIPE__WEBHOOK_SECRET", "whsec_from_env");
        jail.set_env("GEARBOX_STRIPE__TOLERANCE_SECS", "60");

        let config: GearConfig = GearConfig::figment().extract()?;
        assert_eq!(config.stripe.webhook_secret, "whsec_from_env");
        assert_eq!(config.stripe.tolerance_secs, 60);
        assert!(config.stripe.can_verify_webhooks());
        Ok(())
    });
}

#[test]
fn env_sets_calendar_embed() {
    Jail::expect_with(|jail| {
        jail.set_env("GEARBOX_CALENDAR__GOOGLE_CALENDAR_ID", "office@example.com");

        let config: GearConfig = GearConfig::figment().extract()?;
        assert_eq!(
            config.calendar.embed_url().as_deref(),
            Some("https://calendar.google.com/calendar/embed?src=office%40example.com")
        );
        Ok(())
    });
}
