use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use gear_comms::Dispatcher;
use gear_config::GearConfig;
use gear_db::service::{GearService, ServiceSettings};

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: Arc<GearService>,
    pub config: GearConfig,
    pub project_root: PathBuf,
}

impl AppContext {
    /// Open the project database and document store.
    ///
    /// Relative paths in `[database]` are resolved against the project root so
    /// commands behave the same from any subdirectory.
    pub async fn init(project_root: PathBuf, config: GearConfig) -> anyhow::Result<Self> {
        let db_path = if config.database.is_in_memory() {
            config.database.path.clone()
        } else {
            anchor(&project_root, &config.database.path)
                .to_string_lossy()
                .into_owned()
        };
        let documents_dir = anchor(&project_root, &config.database.documents_dir);

        tracing::debug!(db = %db_path, documents = %documents_dir.display(), "opening store");
        let service = GearService::new_local(
            &db_path,
            Some(documents_dir),
            ServiceSettings::from_config(&config),
        )
        .await
        .context("failed to initialize gear-db service")?;

        Ok(Self {
            service: Arc::new(service),
            config,
            project_root,
        })
    }

    /// Build a dispatcher over the configured SMTP and SMS transports.
    pub fn dispatcher(&self) -> anyhow::Result<Dispatcher> {
        Dispatcher::from_config(Arc::clone(&self.service), &self.config)
            .context("failed to configure delivery transports")
    }

    /// Default page size from configuration.
    pub const fn default_limit(&self) -> u32 {
        self.config.general.default_limit
    }
}

fn anchor(root: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
