use std::fmt;
use chrono::{Local, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";
const MAX_RANGE_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateError {
    InvalidFormat,
    FutureDate,
    RangeInverted,
    RangeTooLarge,
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DateError::InvalidFormat => write!(f, "Invalid date format. Use YYYY-MM-DD"),
            DateError::FutureDate => write!(f, "Date cannot be in the future"),
            DateError::RangeInverted => write!(f, "Start date must be before or equal to end date"),
            DateError::RangeTooLarge => write!(f, "Date range cannot exceed {} days", MAX_RANGE_DAYS),
        }
    }
}

/// Parses a `YYYY-MM-DD` date that must not be later than today (local clock)
///
/// # Arguments
///
/// * 'date' - the date string
pub fn validate_date(date: &str) -> Result<NaiveDate, DateError> {
    validate_date_at(date, Local::now().date_naive())
}

/// Validates a date range, see `validate_date` for the rules on each end.
///
/// Start is checked before end, and the range may span at most 30 days.
///
/// # Arguments
///
/// * 'start' - start date string
/// * 'end' - end date string
pub fn validate_date_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), DateError> {
    validate_date_range_at(start, end, Local::now().date_naive())
}

fn validate_date_at(date: &str, today: NaiveDate) -> Result<NaiveDate, DateError> {
    // chrono accepts unpadded fields, the stored format does not
    if date.len() != 10 {
        return Err(DateError::InvalidFormat);
    }
    let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| DateError::InvalidFormat)?;

    if parsed > today {
        Err(DateError::FutureDate)
    } else {
        Ok(parsed)
    }
}

fn validate_date_range_at(start: &str, end: &str, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), DateError> {
    let start = validate_date_at(start, today)?;
    let end = validate_date_at(end, today)?;

    if start > end {
        return Err(DateError::RangeInverted);
    }
    if (end - start).num_days() > MAX_RANGE_DAYS {
        return Err(DateError::RangeTooLarge);
    }

    Ok((start, end))
}
