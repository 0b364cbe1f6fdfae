use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A booking window on a single calendar day, treated as the half-open
/// interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self { date, start, end }
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start)
    }

    /// Touching windows (`end == other.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.date == other.date && !(self.end <= other.start || self.start >= other.end)
    }
}

/// Daily opening window of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}
