use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::database::models::{OperatingHours, TimeSlot};
use crate::services::error::{BookingError, BookingResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

pub fn parse_date(value: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| BookingError::InvalidDate)
}

pub fn parse_time(value: &str, field: &'static str) -> BookingResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| BookingError::InvalidTime { field })
}

pub fn parse_slot(date: &str, start: &str, end: &str) -> BookingResult<TimeSlot> {
    Ok(TimeSlot::new(
        parse_date(date)?,
        parse_time(start, "Start time")?,
        parse_time(end, "End time")?,
    ))
}

pub fn validate_operating_hours(hours: OperatingHours) -> BookingResult<()> {
    if hours.end <= hours.start {
        return Err(BookingError::InvalidOperatingHours);
    }
    Ok(())
}

/// Checks a requested slot against the clock and the branch's opening hours.
/// Rules are applied in a fixed order and the first failure wins.
pub fn validate_booking_window(
    slot: &TimeSlot,
    hours: OperatingHours,
    now: NaiveDateTime,
) -> BookingResult<()> {
    if slot.end <= slot.start {
        return Err(BookingError::InvalidTimeRange);
    }

    if slot.starts_at() < now {
        return Err(BookingError::BookingInPast);
    }

    if slot.start < hours.start || slot.end > hours.end {
        return Err(BookingError::OutsideOperatingHours {
            start: hours.start.format(TIME_FORMAT).to_string(),
            end: hours.end.format(TIME_FORMAT).to_string(),
        });
    }

    Ok(())
}
