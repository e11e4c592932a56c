use gear_config::GearConfig;

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &GearConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &GearConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if !config.smtp.is_configured() && has_env_prefix(&env_keys, "GEARBOX_SMTP") {
        warnings.push(
            "SMTP config appears default while GEARBOX_SMTP* env vars exist. Use double underscores (example: GEARBOX_SMTP__HOST)."
                .to_string(),
        );
    }

    if !config.sms.is_configured() && has_env_prefix(&env_keys, "GEARBOX_SMS") {
        warnings.push(
            "SMS config appears default while GEARBOX_SMS* env vars exist. Use double underscores (example: GEARBOX_SMS__WEBHOOK_URL)."
                .to_string(),
        );
    }

    if !config.stripe.can_verify_webhooks() && has_env_prefix(&env_keys, "GEARBOX_STRIPE") {
        warnings.push(
            "Stripe webhook secret is empty while GEARBOX_STRIPE* env vars exist. Use double underscores (example: GEARBOX_STRIPE__WEBHOOK_SECRET)."
                .to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}
