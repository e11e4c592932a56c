use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A TOML file or `GEARBOX_*` variable could not be read into `GearConfig`.
    #[error("failed to load gearbox configuration: {0}")]
    Figment(#[from] figment::Error),

    #[error("[{section}] is required here but is not configured")]
    NotConfigured { section: String },

    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
