//! Half-open lesson time windows and the overlap rule used for double-booking.

use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Length of a lesson booked without an explicit end time.
pub const DEFAULT_LESSON_LENGTH_MINUTES: i64 = 60;

/// A `[start, end)` window. Touching windows do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    /// Build a slot, rejecting windows whose end is not after the start.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` when `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, CoreError> {
        if start >= end {
            return Err(CoreError::Validation(
                "End time must be after start time.".into(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Build a slot whose end defaults to one hour after the start.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` when an explicit `end` is not after `start`.
    pub fn with_default_end(
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, CoreError> {
        let end = end.unwrap_or_else(|| start + Duration::minutes(DEFAULT_LESSON_LENGTH_MINUTES));
        Self::new(start, end)
    }

    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
