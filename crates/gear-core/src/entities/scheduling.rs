use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AttendanceStatus, ConflictKind, LessonStatus, LessonType};
use crate::time_slot::TimeSlot;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Instructor {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    pub plate_number: Option<String>,
    pub transmission: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Classroom {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub capacity: Option<u32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// A booked lesson occupying `[start_time, end_time)` on its resources.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Lesson {
    pub id: String,
    pub student_id: String,
    pub enrollment_id: Option<String>,
    pub instructor_id: Option<String>,
    pub vehicle_id: Option<String>,
    pub classroom_id: Option<String>,
    pub lesson_type: LessonType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: LessonStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    #[must_use]
    pub const fn slot(&self) -> TimeSlot {
        TimeSlot {
            start: self.start_time,
            end: self.end_time,
        }
    }

    /// The resource of the given kind assigned to this lesson, if any.
    #[must_use]
    pub fn resource(&self, kind: ConflictKind) -> Option<&str> {
        match kind {
            ConflictKind::Instructor => self.instructor_id.as_deref(),
            ConflictKind::Vehicle => self.vehicle_id.as_deref(),
            ConflictKind::Classroom => self.classroom_id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LessonAttendance {
    pub id: String,
    pub lesson_id: String,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Two lessons found sharing a resource over overlapping time.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConflictDetection {
    pub id: String,
    pub lesson_id: String,
    pub kind: ConflictKind,
    pub conflicting_lesson_id: String,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub detected_at: DateTime<Utc>,
}
