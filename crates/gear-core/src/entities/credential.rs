use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{CertificateStatus, SubmissionStatus};

/// Completion certificate; one per enrollment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Certificate {
    pub id: String,
    pub enrollment_id: String,
    pub number: String,
    pub status: CertificateStatus,
    /// Path relative to the document store root.
    pub file_path: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Completion report filed with the licensing ministry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MinistrySubmission {
    pub id: String,
    pub enrollment_id: String,
    pub status: SubmissionStatus,
    pub file_path: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub external_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}
