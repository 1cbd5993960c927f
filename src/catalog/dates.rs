//! Calendar date ranges and the timestamp convention of the transparency service
//!
//! Every date the service accepts is a local date-time with a fixed `+03:00`
//! offset. A range covers whole days: the start is anchored at midnight and the
//! end at the last hourly period (`23:00`) of the end date.

use chrono::{Days, NaiveDate};

use super::RequestError;

/// Fixed UTC offset the service expects on every timestamp
pub const SERVICE_OFFSET: &str = "+03:00";

const START_OF_DAY: &str = "T00:00:00";
const LAST_HOUR_OF_DAY: &str = "T23:00:00";

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RequestError> {
        if start > end {
            return Err(RequestError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range covering exactly one day
    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// The `days` full days before `today`, ending yesterday
    pub fn trailing_days(today: NaiveDate, days: u64) -> Result<Self, RequestError> {
        let days = days.max(1);
        let start = today.checked_sub_days(Days::new(days));
        let end = today.checked_sub_days(Days::new(1));
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end),
            _ => Err(RequestError::InvalidDateRange {
                start: today,
                end: today,
            }),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// `startDate` value: start day at local midnight
    pub fn start_timestamp(&self) -> String {
        start_of_day(self.start)
    }

    /// `endDate` value: end day at its last hour
    pub fn end_timestamp(&self) -> String {
        format!("{}{}{}", self.end.format("%Y-%m-%d"), LAST_HOUR_OF_DAY, SERVICE_OFFSET)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A single day anchored at local midnight, e.g. `2024-05-01T00:00:00+03:00`
pub fn start_of_day(day: NaiveDate) -> String {
    format!("{}{}{}", day.format("%Y-%m-%d"), START_OF_DAY, SERVICE_OFFSET)
}
