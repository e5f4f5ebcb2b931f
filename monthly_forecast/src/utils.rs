//! Calendar utilities for month-end period arithmetic

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};

/// Lenient parsing of date-like strings
pub mod date_parser {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};

    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

    const DATETIME_FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    /// Parse a date-like string, returning `None` when no format matches
    pub fn parse_date(input: &str) -> Option<NaiveDate> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }

        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return Some(date);
            }
        }
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt.date());
            }
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.date_naive());
        }

        // Month-only forms: 2023-04, 2023/04, Apr 2023, April 2023
        for (candidate, fmt) in [
            (format!("{}-01", s), "%Y-%m-%d"),
            (format!("{}/01", s), "%Y/%m/%d"),
            (format!("01 {}", s), "%d %B %Y"),
        ] {
            if let Ok(date) = NaiveDate::parse_from_str(&candidate, fmt) {
                return Some(date);
            }
        }

        None
    }
}

/// Last day of the given calendar month
pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Month-end of the month containing `date`
pub fn month_end_of(date: NaiveDate) -> Result<NaiveDate> {
    month_end(date.year(), date.month()).ok_or_else(|| {
        ForecastError::DataError(format!("Date {} is outside the supported range", date))
    })
}

/// Month-end of the month following the one containing `date`
pub fn next_month_end(date: NaiveDate) -> Result<NaiveDate> {
    let end = month_end_of(date)?;
    let first_of_next = end.succ_opt().ok_or_else(|| {
        ForecastError::DataError(format!("No month after {}", date))
    })?;
    month_end_of(first_of_next)
}

/// The `horizon` consecutive month-ends after `last_period`
pub fn future_month_ends(last_period: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    let mut periods = Vec::with_capacity(horizon);
    let mut current = last_period;

    for _ in 0..horizon {
        current = next_month_end(current)?;
        periods.push(current);
    }

    Ok(periods)
}

/// Months elapsed since year 0, used to measure gaps between periods
pub fn month_ordinal(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}
