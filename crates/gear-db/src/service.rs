//! Service layer orchestrating database mutations with audit and documents.
//!
//! `GearService` wraps `GearDb` (raw database access), `DocumentStore`
//! (generated files) and the settings the business rules read. All repo
//! methods are implemented as `impl GearService`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use gear_config::GearConfig;
use gear_core::entities::AuditEntry;
use gear_core::enums::{AuditAction, EntityType};
use gear_core::ids::PREFIX_AUDIT;
use gear_core::render::ics::FeedIdentity;

use crate::GearDb;
use crate::documents::DocumentStore;
use crate::error::DatabaseError;

/// Default reminder look-ahead.
pub const DEFAULT_REMINDER_WINDOW_HOURS: i64 = 24;

/// Values from configuration that the store-side rules need.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Staff inbox for new-lead and request alerts.
    pub notification_email: Option<String>,
    pub feed_identity: FeedIdentity,
    pub calendar_embed_url: Option<String>,
    /// Currency for new invoices.
    pub currency: String,
    pub reminder_window_hours: i64,
    /// Actor recorded on audit entries.
    pub actor: Option<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            notification_email: None,
            feed_identity: FeedIdentity {
                product_id: "-//Gearbox//CRM//EN".into(),
                uid_domain: "gearbox".into(),
            },
            calendar_embed_url: None,
            currency: "cad".into(),
            reminder_window_hours: DEFAULT_REMINDER_WINDOW_HOURS,
            actor: None,
        }
    }
}

impl ServiceSettings {
    #[must_use]
    pub fn from_config(config: &GearConfig) -> Self {
        Self {
            notification_email: config.site.notification_email().map(String::from),
            feed_identity: FeedIdentity {
                product_id: config.site.calendar_product_id.clone(),
                uid_domain: config.site.calendar_uid_domain.clone(),
            },
            calendar_embed_url: config.calendar.embed_url(),
            currency: config.stripe.currency.clone(),
            reminder_window_hours: config.scheduler.reminder_window_hours,
            actor: Some(config.general.actor.clone()).filter(|a| !a.is_empty()),
        }
    }
}

/// Orchestrates database mutations with the audit trail.
///
/// Every mutation method follows this protocol:
/// 1. Validate input and business rules
/// 2. Execute SQL
/// 3. Append audit entry
pub struct GearService {
    db: GearDb,
    documents: DocumentStore,
    settings: ServiceSettings,
}

impl GearService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    /// * `documents_dir` - Root for generated documents. Pass `None` to disable
    ///   document writing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or the
    /// documents directory cannot be created.
    pub async fn new_local(
        db_path: &str,
        documents_dir: Option<PathBuf>,
        settings: ServiceSettings,
    ) -> Result<Self, DatabaseError> {
        let db = GearDb::open_local(db_path).await?;
        let documents = match documents_dir {
            Some(dir) => DocumentStore::new(dir)?,
            None => DocumentStore::disabled(),
        };
        Ok(Self {
            db,
            documents,
            settings,
        })
    }

    /// Open the database and document store named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn from_config(config: &GearConfig) -> Result<Self, DatabaseError> {
        let documents_dir = PathBuf::from(&config.database.documents_dir);
        Self::new_local(
            &config.database.path,
            Some(documents_dir),
            ServiceSettings::from_config(config),
        )
        .await
    }

    /// Create from an existing `GearDb` (for testing).
    #[must_use]
    pub fn from_db(db: GearDb, documents: DocumentStore) -> Self {
        Self {
            db,
            documents,
            settings: ServiceSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &GearDb {
        &self.db
    }

    #[must_use]
    pub const fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    #[must_use]
    pub const fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Record a mutation on the audit trail.
    pub(crate) async fn audit(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let id = self.db.generate_id(PREFIX_AUDIT).await?;
        self.append_audit(&AuditEntry {
            id,
            entity_type,
            entity_id: entity_id.to_string(),
            action,
            detail,
            actor: self.settings.actor.clone(),
            created_at: at,
        })
        .await
    }
}
