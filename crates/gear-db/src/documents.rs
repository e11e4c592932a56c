//! Filesystem store for generated documents (certificates, ministry reports).
//!
//! Files live under `{root}/certificates/` and `{root}/ministry/`. Stored paths
//! are relative to the root so the database stays portable.

use std::path::{Path, PathBuf};

use crate::error::DatabaseError;

/// Sub-directory holding certificate PDFs.
pub const CERTIFICATES_DIR: &str = "certificates";

/// Sub-directory holding ministry CSV reports.
pub const MINISTRY_DIR: &str = "ministry";

pub struct DocumentStore {
    root: PathBuf,
    enabled: bool,
}

impl DocumentStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Io` if the directory cannot be created.
    pub fn new(root: PathBuf) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            enabled: true,
        })
    }

    /// A store that refuses writes.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            root: PathBuf::new(),
            enabled: false,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` to `{subdir}/{file_name}` and return the relative path.
    ///
    /// Existing files are overwritten.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` when the store is disabled, or
    /// `DatabaseError::Io` when the write fails.
    pub fn save(&self, subdir: &str, file_name: &str, bytes: &[u8]) -> Result<String, DatabaseError> {
        if !self.enabled {
            return Err(DatabaseError::InvalidState(
                "document store is disabled".into(),
            ));
        }
        let dir = self.root.join(subdir);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(file_name), bytes)?;
        tracing::debug!(subdir, file_name, bytes = bytes.len(), "document stored");
        Ok(format!("{subdir}/{file_name}"))
    }

    /// Absolute path of a stored document.
    #[must_use]
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Whether a stored document still exists on disk.
    #[must_use]
    pub fn exists(&self, relative: &str) -> bool {
        self.enabled && self.resolve(relative).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_writes_under_subdir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(tmp.path().join("docs")).unwrap();
        let rel = store.save(CERTIFICATES_DIR, "certificate-enr-1.pdf", b"%PDF").unwrap();
        assert_eq!(rel, "certificates/certificate-enr-1.pdf");
        assert!(store.exists(&rel));
        assert_eq!(std::fs::read(store.resolve(&rel)).unwrap(), b"%PDF");
    }

    #[test]
    fn disabled_store_rejects_writes() {
        let store = DocumentStore::disabled();
        let err = store.save(MINISTRY_DIR, "x.csv", b"a").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
        assert!(!store.exists("ministry/x.csv"));
    }
}
