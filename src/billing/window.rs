//! Lease Window Clamping
//!
//! Computes the portion of a lease's lifetime that falls inside a
//! reporting period, and the billable hours of that portion.

use chrono::{DateTime, Duration, Utc};

use crate::billing::models::Lease;
use crate::billing::period::BillingPeriod;

const NANOS_PER_HOUR: f64 = 3_600_000_000_000.0;

/// A lease's effective active interval inside one reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ActiveWindow {
    /// Clamp a lease's recorded lifetime to the reporting period.
    ///
    /// The window starts at the later of the lease creation time and the
    /// period start. A lease that ended strictly inside the period keeps
    /// its own end; an open-ended lease, or one still active at the
    /// period boundary, is treated as active through the last nanosecond
    /// strictly inside the period; the exclusive upper bound itself is
    /// never reached.
    pub fn clamp(lease: &Lease, period: &BillingPeriod) -> Self {
        let start = if lease.create_time > period.start {
            lease.create_time
        } else {
            period.start
        };
        let end = match lease.end_time {
            Some(end) if end < period.end => end,
            _ => period.end - Duration::nanoseconds(1),
        };
        Self { start, end }
    }

    /// Active duration in hours, as the float handed to decimal
    /// conversion. An empty or inverted window bills zero hours.
    pub fn billable_hours(&self) -> f64 {
        if self.end <= self.start {
            return 0.0;
        }
        match (self.end - self.start).num_nanoseconds() {
            Some(nanos) => nanos as f64 / NANOS_PER_HOUR,
            // longer than i64 nanoseconds; unbillable, rejected downstream
            None => f64::INFINITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn lease_at(create_time: DateTime<Utc>, end_time: Option<DateTime<Utc>>) -> Lease {
        Lease {
            id: "lease-1".to_string(),
            order_id: "order-1".to_string(),
            create_time,
            end_time,
            price_hr: 100.0,
        }
    }

    fn january() -> BillingPeriod {
        BillingPeriod::new(
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2020, 1, 30, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_lease_fully_inside_period_keeps_its_own_bounds() {
        let period = january();
        let lease = lease_at(
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            Some(Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap()),
        );
        let window = ActiveWindow::clamp(&lease, &period);
        assert_eq!(window.start, lease.create_time);
        assert_eq!(window.end, lease.end_time.unwrap());
        assert_eq!(window.billable_hours(), 24.0);
    }

    #[test]
    fn test_open_ended_lease_stops_short_of_the_period_bound() {
        let period = january();
        let lease = lease_at(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(), None);
        let window = ActiveWindow::clamp(&lease, &period);
        assert_eq!(window.end, period.end - Duration::nanoseconds(1));
        // 29 days minus one nanosecond, not 29 days exactly
        assert!(window.billable_hours() < 29.0 * 24.0);
        assert!(window.billable_hours() > 29.0 * 24.0 - 1e-9);
    }

    #[test]
    fn test_lease_overrunning_the_period_is_clamped_to_its_end() {
        let period = january();
        let lease = lease_at(
            Utc.with_ymd_and_hms(2020, 1, 29, 0, 0, 0).unwrap(),
            Some(Utc.with_ymd_and_hms(2020, 2, 2, 0, 0, 0).unwrap()),
        );
        let window = ActiveWindow::clamp(&lease, &period);
        assert_eq!(window.start, lease.create_time);
        assert_eq!(window.end, period.end - Duration::nanoseconds(1));
    }

    #[test]
    fn test_lease_ending_exactly_at_period_end_is_clamped() {
        let period = january();
        let lease = lease_at(
            Utc.with_ymd_and_hms(2020, 1, 29, 0, 0, 0).unwrap(),
            Some(period.end),
        );
        let window = ActiveWindow::clamp(&lease, &period);
        assert_eq!(window.end, period.end - Duration::nanoseconds(1));
    }

    #[test]
    fn test_lease_starting_before_period_is_clamped_to_period_start() {
        let period = january();
        let lease = lease_at(
            Utc.with_ymd_and_hms(2019, 12, 15, 0, 0, 0).unwrap(),
            Some(Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap()),
        );
        let window = ActiveWindow::clamp(&lease, &period);
        assert_eq!(window.start, period.start);
    }

    #[test]
    fn test_empty_window_bills_zero_hours() {
        let period = january();
        // created in the period's final nanosecond: clamped start equals
        // clamped end
        let boundary = lease_at(period.end - Duration::nanoseconds(1), None);
        let window = ActiveWindow::clamp(&boundary, &period);
        assert_eq!(window.billable_hours(), 0.0);

        // created after the period entirely
        let late = lease_at(Utc.with_ymd_and_hms(2020, 2, 10, 0, 0, 0).unwrap(), None);
        let window = ActiveWindow::clamp(&late, &period);
        assert_eq!(window.billable_hours(), 0.0);
    }
}
