//! Public intake forms (contact, enrollment request, lesson request).
//!
//! Forms arrive as JSON from the website or as CLI flags. `validate()` checks
//! the required fields; normalization fills the defaults the pricing page relies on.

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Lead source recorded for contact-form submissions.
pub const CONTACT_FORM_SOURCE: &str = "Website Contact Form";

const DEFAULT_VISITOR_NAME: &str = "Website Visitor";
const DEFAULT_ENROLLMENT_NOTES: &str = "Auto-captured from pricing Apply Now.";

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ContactForm {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` when the name is blank or the email is malformed.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_name(&self.name)?;
        require_email(&self.email)
    }

    /// Multi-line summary sent to the staff notification address.
    #[must_use]
    pub fn summary(&self) -> String {
        let lines = [
            "New website lead received.".to_string(),
            format!("Name: {}", self.name.trim()),
            format!("Email: {}", self.email.trim()),
            format!("Phone: {}", self.phone.as_deref().unwrap_or_default()),
            format!("Subject: {}", self.subject.as_deref().unwrap_or_default()),
            String::new(),
            "Message:".to_string(),
            self.message.clone().unwrap_or_default(),
        ];
        lines.join("\n").trim().to_string()
    }
}

/// "Apply now" form. Every field may be blank; blanks get defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EnrollmentRequestForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub preferred_location: Option<String>,
    #[serde(default)]
    pub preferred_schedule: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl EnrollmentRequestForm {
    /// Trim every field and fill blank name, email, and notes.
    #[must_use]
    pub fn normalized(self, now: DateTime<Utc>) -> Self {
        let name = non_blank(self.name).unwrap_or_else(|| DEFAULT_VISITOR_NAME.to_string());
        let email = non_blank(self.email)
            .unwrap_or_else(|| format!("visitor+{}@example.com", now.format("%Y%m%d%H%M%S")));
        let notes = non_blank(self.notes).unwrap_or_else(|| DEFAULT_ENROLLMENT_NOTES.to_string());
        Self {
            name: Some(name),
            email: Some(email),
            phone: non_blank(self.phone),
            package: non_blank(self.package),
            preferred_location: non_blank(self.preferred_location),
            preferred_schedule: non_blank(self.preferred_schedule),
            notes: Some(notes),
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` when a supplied email is malformed.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => require_email(email),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LessonRequestForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub preferred_date: Option<NaiveDate>,
    #[serde(default)]
    pub preferred_time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl LessonRequestForm {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` when the name is blank or the email is malformed.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_name(&self.name)?;
        require_email(&self.email)
    }
}

/// Split a full name into first name and the rest.
#[must_use]
pub fn split_name(full: &str) -> (String, String) {
    let mut parts = full.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, rest)
}

/// Trim a value, mapping blank strings to `None`.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Loose address check: one `@`, non-empty local part, dotted domain.
#[must_use]
pub fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.contains(char::is_whitespace)
}

fn require_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("name is required".into()));
    }
    Ok(())
}

fn require_email(email: &str) -> Result<(), CoreError> {
    if !looks_like_email(email) {
        return Err(CoreError::Validation(format!(
            "'{}' is not a valid email address",
            email.trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_name_keeps_rest_together() {
        assert_eq!(
            split_name("  Ana Maria  de Souza "),
            ("Ana".to_string(), "Maria de Souza".to_string())
        );
        assert_eq!(split_name("Cher"), ("Cher".to_string(), String::new()));
        assert_eq!(split_name(""), (String::new(), String::new()));
    }

    #[test]
    fn email_check() {
        assert!(looks_like_email("sam@example.com"));
        assert!(!looks_like_email("sam@example"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("sam example@x.com"));
        assert!(!looks_like_email("a@b@c.com"));
    }

    #[test]
    fn blank_enrollment_request_gets_defaults() {
        let now = Utc.with_ymd_and_hms(2026, 5, 4, 13, 7, 9).unwrap();
        let form = EnrollmentRequestForm {
            name: Some("   ".into()),
            package: Some(" Premium ".into()),
            ..Default::default()
        }
        .normalized(now);
        assert_eq!(form.name.as_deref(), Some("Website Visitor"));
        assert_eq!(
            form.email.as_deref(),
            Some("visitor+20260504130709@example.com")
        );
        assert_eq!(
            form.notes.as_deref(),
            Some("Auto-captured from pricing Apply Now.")
        );
        assert_eq!(form.package.as_deref(), Some("Premium"));
        assert_eq!(form.phone, None);
    }

    #[test]
    fn contact_form_requires_name_and_email() {
        let mut form = ContactForm {
            name: "Jo Driver".into(),
            email: "jo@example.com".into(),
            ..Default::default()
        };
        assert!(form.validate().is_ok());
        form.email = "nope".into();
        assert!(form.validate().is_err());
        form.email = "jo@example.com".into();
        form.name = " ".into();
        assert!(form.validate().is_err());
    }

    #[test]
    fn contact_summary_lists_fields() {
        let form = ContactForm {
            name: "Jo Driver".into(),
            email: "jo@example.com".into(),
            phone: Some("555-0101".into()),
            subject: Some("G2 lessons".into()),
            message: Some("Weekends please".into()),
        };
        let summary = form.summary();
        assert!(summary.starts_with("New website lead received.\nName: Jo Driver"));
        assert!(summary.contains("Phone: 555-0101"));
        assert!(summary.ends_with("Message:\nWeekends please"));
    }
}
