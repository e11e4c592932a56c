use std::path::{Path, PathBuf};

use anyhow::Context;
use gear_config::{GearConfig, PROJECT_DIR};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct InitReport {
    pub project_root: PathBuf,
    pub config_path: PathBuf,
    pub config_written: bool,
}

/// Handle `gearbox init`.
pub fn handle(args: &InitArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let root = match flags.project.as_deref() {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let report = init_project(&root, args.force)?;
    output(&report, flags.format)
}

/// Create `.gearbox/` and a default `config.toml` unless one exists.
pub fn init_project(root: &Path, force: bool) -> anyhow::Result<InitReport> {
    let dir = root.join(PROJECT_DIR);
    std::fs::create_dir_all(dir.join("documents"))
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = dir.join("config.toml");
    let config_written = force || !config_path.exists();
    if config_written {
        let rendered = toml::to_string_pretty(&GearConfig::default())
            .context("failed to render default configuration")?;
        std::fs::write(&config_path, rendered)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
    }

    Ok(InitReport {
        project_root: root.to_path_buf(),
        config_path,
        config_written,
    })
}
