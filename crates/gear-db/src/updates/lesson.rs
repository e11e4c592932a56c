//! Lesson update builder.
//!
//! Changes to time or resources re-run the conflict check before writing.

use chrono::{DateTime, Utc};
use gear_core::enums::LessonType;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct LessonUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classroom_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_type: Option<LessonType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl LessonUpdate {
    /// Whether applying this update can create a double booking.
    #[must_use]
    pub const fn touches_schedule(&self) -> bool {
        self.start_time.is_some()
            || self.end_time.is_some()
            || self.instructor_id.is_some()
            || self.vehicle_id.is_some()
            || self.classroom_id.is_some()
    }
}

pub struct LessonUpdateBuilder(LessonUpdate);

impl LessonUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(LessonUpdate::default())
    }

    #[must_use]
    pub fn start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.0.start_time = Some(start_time);
        self
    }

    #[must_use]
    pub fn end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.0.end_time = Some(end_time);
        self
    }

    #[must_use]
    pub fn instructor_id(mut self, instructor_id: Option<String>) -> Self {
        self.0.instructor_id = Some(instructor_id);
        self
    }

    #[must_use]
    pub fn vehicle_id(mut self, vehicle_id: Option<String>) -> Self {
        self.0.vehicle_id = Some(vehicle_id);
        self
    }

    #[must_use]
    pub fn classroom_id(mut self, classroom_id: Option<String>) -> Self {
        self.0.classroom_id = Some(classroom_id);
        self
    }

    #[must_use]
    pub fn lesson_type(mut self, lesson_type: LessonType) -> Self {
        self.0.lesson_type = Some(lesson_type);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.0.notes = Some(notes);
        self
    }

    #[must_use]
    pub fn build(self) -> LessonUpdate {
        self.0
    }
}

impl Default for LessonUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
