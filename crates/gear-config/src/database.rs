//! Local libSQL database and document storage paths.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    ".gearbox/gearbox.db".to_string()
}

fn default_documents_dir() -> String {
    ".gearbox/documents".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file, or `:memory:`.
    #[serde(default = "default_path")]
    pub path: String,

    /// Root directory for generated certificates and ministry reports.
    #[serde(default = "default_documents_dir")]
    pub documents_dir: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            documents_dir: default_documents_dir(),
        }
    }
}

impl DatabaseConfig {
    /// Whether the database lives only in memory.
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}
