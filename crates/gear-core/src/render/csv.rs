//! Ministry submission CSV report.

use chrono::{DateTime, Utc};

/// Header row of the ministry report.
pub const MINISTRY_HEADER: &str = "enrollment_id,student,course,submitted_at";

/// Quote a field when it contains a delimiter, quote, or line break.
#[must_use]
pub fn field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render the one-row report for an enrollment.
#[must_use]
pub fn render_ministry_submission(
    enrollment_id: &str,
    student_name: &str,
    course_name: &str,
    submitted_at: DateTime<Utc>,
) -> String {
    format!(
        "{MINISTRY_HEADER}\n{},{},{},{}\n",
        field(enrollment_id),
        field(student_name),
        field(course_name),
        submitted_at.to_rfc3339()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_header_and_row() {
        let at = Utc.with_ymd_and_hms(2026, 6, 1, 9, 30, 0).unwrap();
        let csv = render_ministry_submission("enr-1", "Jo Driver", "BDE, Full", at);
        assert_eq!(
            csv,
            "enrollment_id,student,course,submitted_at\nenr-1,Jo Driver,\"BDE, Full\",2026-06-01T09:30:00+00:00\n"
        );
    }

    #[test]
    fn doubles_embedded_quotes() {
        assert_eq!(field("the \"best\""), "\"the \"\"best\"\"\"");
        assert_eq!(field("plain"), "plain");
    }
}
