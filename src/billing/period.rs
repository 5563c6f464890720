//! Reporting Period
//!
//! The half-open interval `[start, end)` a rollup run covers. UTC is the
//! fixed reference timezone for every period boundary.

use chrono::{DateTime, Datelike, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Half-open reporting interval `[start, end)` over which spend is
/// computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BillingPeriod {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The calendar month containing `now`: first nanosecond of the
    /// month through the first nanosecond of the following month.
    pub fn month_of(now: DateTime<Utc>) -> Self {
        let start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .expect("first day of a month is a valid timestamp");
        let end = start
            .checked_add_months(Months::new(1))
            .expect("following month is in range");
        Self { start, end }
    }

    /// Default period when the caller supplies none.
    pub fn current_month() -> Self {
        Self::month_of(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_of_spans_the_calendar_month() {
        let now = Utc.with_ymd_and_hms(2020, 1, 17, 13, 45, 12).unwrap();
        let period = BillingPeriod::month_of(now);
        assert_eq!(period.start, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(period.end, Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_month_of_rolls_over_the_year() {
        let now = Utc.with_ymd_and_hms(2020, 12, 31, 23, 59, 59).unwrap();
        let period = BillingPeriod::month_of(now);
        assert_eq!(period.start, Utc.with_ymd_and_hms(2020, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(period.end, Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap());
    }
}
