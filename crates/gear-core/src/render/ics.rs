//! iCalendar (RFC 5545) feed rendering for lesson subscriptions.

use chrono::{DateTime, Utc};

use crate::entities::Lesson;

/// Product identifier and UID domain stamped on a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedIdentity {
    pub product_id: String,
    pub uid_domain: String,
}

fn stamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Render lessons as a `VCALENDAR` with CRLF line endings.
///
/// Lessons are emitted in the order given.
#[must_use]
pub fn render_feed(lessons: &[Lesson], identity: &FeedIdentity, now: DateTime<Utc>) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", identity.product_id),
        "CALSCALE:GREGORIAN".to_string(),
    ];
    let dtstamp = stamp(now);
    for lesson in lessons {
        lines.extend([
            "BEGIN:VEVENT".to_string(),
            format!("UID:lesson-{}@{}", lesson.id, identity.uid_domain),
            format!("DTSTAMP:{dtstamp}"),
            format!("DTSTART:{}", stamp(lesson.start_time)),
            format!("DTEND:{}", stamp(lesson.end_time)),
            format!("SUMMARY:{} Lesson", lesson.lesson_type.label()),
            "END:VEVENT".to_string(),
        ]);
    }
    lines.push("END:VCALENDAR".to_string());
    lines.join("\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{LessonStatus, LessonType};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn lesson(id: &str, hour: u32, lesson_type: LessonType) -> Lesson {
        let start = Utc.with_ymd_and_hms(2026, 7, 3, hour, 0, 0).unwrap();
        Lesson {
            id: id.into(),
            student_id: "stu-1".into(),
            enrollment_id: None,
            instructor_id: None,
            vehicle_id: None,
            classroom_id: None,
            lesson_type,
            start_time: start,
            end_time: start + chrono::Duration::hours(1),
            status: LessonStatus::Scheduled,
            notes: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn renders_events_with_crlf() {
        let identity = FeedIdentity {
            product_id: "-//Gearbox//CRM//EN".into(),
            uid_domain: "gearbox".into(),
        };
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 8, 0, 0).unwrap();
        let ics = render_feed(
            &[lesson("lsn-a", 14, LessonType::Driving), lesson("lsn-b", 16, LessonType::Theory)],
            &identity,
            now,
        );

        let lines: Vec<&str> = ics.split("\r\n").collect();
        assert_eq!(&lines[..4], &[
            "BEGIN:VCALENDAR",
            "VERSION:2.0",
            "PRODID:-//Gearbox//CRM//EN",
            "CALSCALE:GREGORIAN",
        ]);
        assert_eq!(&lines[4..11], &[
            "BEGIN:VEVENT",
            "UID:lesson-lsn-a@gearbox",
            "DTSTAMP:20260701T080000Z",
            "DTSTART:20260703T140000Z",
            "DTEND:20260703T150000Z",
            "SUMMARY:Driving Lesson",
            "END:VEVENT",
        ]);
        assert!(ics.contains("SUMMARY:Theory Lesson"));
        assert_eq!(lines.last(), Some(&"END:VCALENDAR"));
        assert!(!ics.ends_with("\r\n"));
    }

    #[test]
    fn empty_feed_is_valid_calendar() {
        let identity = FeedIdentity {
            product_id: "-//X//Y//EN".into(),
            uid_domain: "x".into(),
        };
        let ics = render_feed(&[], &identity, Utc::now());
        assert_eq!(ics.split("\r\n").count(), 5);
    }
}
