//! Trailing rolling return rate over the daily aggregate.
//!
//! The window counts populated dates, not calendar days: a date with no
//! orders does not occupy a slot. Entries with an incomplete window (the
//! first `window - 1` dates) and windows whose order total is zero report a
//! rate of exactly 0. Known limitation: the zero-fill understates the trend
//! at the start of the series and wherever activity is sparse, but it is what
//! the trend display contract requires, so it is preserved rather than fixed.

use crate::domain::{DailyCount, RollingPoint};

/// Compute the trailing rolling return rate for each populated date.
///
/// `daily` must be sorted ascending by date (as produced by
/// `stats::aggregate::daily_aggregate`). Empty input yields an empty
/// sequence; the caller renders a "no data" fallback.
pub fn rolling_rate(daily: &[DailyCount], window: usize) -> Vec<RollingPoint> {
    if window == 0 {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(daily.len());
    let mut total_sum = 0u64;
    let mut return_sum = 0u64;

    for (i, day) in daily.iter().enumerate() {
        total_sum += day.total;
        return_sum += day.returns;
        if i >= window {
            let leaving = &daily[i - window];
            total_sum -= leaving.total;
            return_sum -= leaving.returns;
        }

        let rate = if i + 1 < window || total_sum == 0 {
            0.0
        } else {
            return_sum as f64 / total_sum as f64
        };
        out.push(RollingPoint {
            date: day.date,
            rate,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(offset: u64, total: u64, returns: u64) -> DailyCount {
        DailyCount {
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Days::new(offset),
            total,
            returns,
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(rolling_rate(&[], 30).is_empty());
    }

    /// Spec scenario: 29 identical days are all zero-filled; the 30th day
    /// completes the window and reports the true rate.
    #[test]
    fn first_twenty_nine_entries_are_zero_filled() {
        let daily: Vec<DailyCount> = (0..30).map(|i| day(i, 10, 5)).collect();
        let series = rolling_rate(&daily, 30);

        assert_eq!(series.len(), 30);
        for point in &series[..29] {
            assert_eq!(point.rate, 0.0);
        }
        assert!((series[29].rate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn window_counts_entries_not_calendar_days() {
        // Dates far apart still occupy one slot each.
        let daily: Vec<DailyCount> = (0..3).map(|i| day(i * 40, 10, 10)).collect();
        let series = rolling_rate(&daily, 3);
        assert_eq!(series[0].rate, 0.0);
        assert_eq!(series[1].rate, 0.0);
        assert!((series[2].rate - 1.0).abs() < 1e-12);
    }

    #[test]
    fn window_slides_past_old_entries() {
        let mut daily: Vec<DailyCount> = (0..3).map(|i| day(i, 10, 10)).collect();
        daily.extend((3..6).map(|i| day(i, 10, 0)));

        let series = rolling_rate(&daily, 3);
        // Entry 2: all-return window. Entry 5: no-return window.
        assert!((series[2].rate - 1.0).abs() < 1e-12);
        assert!((series[3].rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((series[4].rate - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(series[5].rate, 0.0);
    }

    #[test]
    fn zero_denominator_window_reports_zero() {
        let daily: Vec<DailyCount> = (0..4).map(|i| day(i, 0, 0)).collect();
        let series = rolling_rate(&daily, 2);
        assert!(series.iter().all(|p| p.rate == 0.0));
    }

    #[test]
    fn rolling_matches_naive_window_sum() {
        let daily: Vec<DailyCount> = (0..50)
            .map(|i| day(i, 5 + i % 7, (i % 3).min(5 + i % 7)))
            .collect();
        let window = 30;
        let series = rolling_rate(&daily, window);

        for (i, point) in series.iter().enumerate() {
            let lo = i.saturating_sub(window - 1);
            let totals: u64 = daily[lo..=i].iter().map(|d| d.total).sum();
            let returns: u64 = daily[lo..=i].iter().map(|d| d.returns).sum();
            let expected = if i + 1 < window || totals == 0 {
                0.0
            } else {
                returns as f64 / totals as f64
            };
            assert!((point.rate - expected).abs() < 1e-12, "index {i}");
        }
    }
}
