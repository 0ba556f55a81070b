//! Calendar intervals for time scales
//!
//! Time domains are held as epoch milliseconds. Nicing and tick generation
//! pick an interval (15 minutes, 1 day, 3 months, ...) from the span of the
//! domain and align to it in either UTC or the local time zone.

use chrono::{
    DateTime, Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, TimeZone, Timelike,
    Utc,
};

use super::breaks::tick_step;

const SECOND: f64 = 1_000.0;
const MINUTE: f64 = SECOND * 60.0;
const HOUR: f64 = MINUTE * 60.0;
const DAY: f64 = HOUR * 24.0;
const WEEK: f64 = DAY * 7.0;
const MONTH: f64 = DAY * 30.0;
const YEAR: f64 = DAY * 365.0;

/// Calendar unit an interval counts in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// Every `step` units, aligned to multiples of `step` within the parent unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub unit: TimeUnit,
    pub step: i64,
}

const TICK_INTERVALS: [(TimeUnit, i64, f64); 18] = [
    (TimeUnit::Second, 1, SECOND),
    (TimeUnit::Second, 5, 5.0 * SECOND),
    (TimeUnit::Second, 15, 15.0 * SECOND),
    (TimeUnit::Second, 30, 30.0 * SECOND),
    (TimeUnit::Minute, 1, MINUTE),
    (TimeUnit::Minute, 5, 5.0 * MINUTE),
    (TimeUnit::Minute, 15, 15.0 * MINUTE),
    (TimeUnit::Minute, 30, 30.0 * MINUTE),
    (TimeUnit::Hour, 1, HOUR),
    (TimeUnit::Hour, 3, 3.0 * HOUR),
    (TimeUnit::Hour, 6, 6.0 * HOUR),
    (TimeUnit::Hour, 12, 12.0 * HOUR),
    (TimeUnit::Day, 1, DAY),
    (TimeUnit::Day, 2, 2.0 * DAY),
    (TimeUnit::Week, 1, WEEK),
    (TimeUnit::Month, 1, MONTH),
    (TimeUnit::Month, 3, 3.0 * MONTH),
    (TimeUnit::Year, 1, YEAR),
];

impl TimeInterval {
    pub fn new(unit: TimeUnit, step: i64) -> Self {
        Self {
            unit,
            step: step.max(1),
        }
    }

    /// The interval whose ticks come closest to `count` across `[start, stop]`
    pub fn for_span(start: f64, stop: f64, count: usize) -> Self {
        let target = (stop - start).abs() / count.max(1) as f64;
        let i = TICK_INTERVALS.partition_point(|(_, _, duration)| *duration <= target);
        if i == TICK_INTERVALS.len() {
            let years = tick_step(start / YEAR, stop / YEAR, count).abs();
            return Self::new(TimeUnit::Year, years.round() as i64);
        }
        if i == 0 {
            let ms = tick_step(start, stop, count).abs().max(1.0);
            return Self::new(TimeUnit::Millisecond, ms.round() as i64);
        }
        let (before, after) = (TICK_INTERVALS[i - 1], TICK_INTERVALS[i]);
        let (unit, step, _) = if target / before.2 < after.2 / target {
            before
        } else {
            after
        };
        Self::new(unit, step)
    }

    /// Latest boundary at or before `ms`
    pub fn floor(&self, ms: f64, local: bool) -> f64 {
        if self.unit == TimeUnit::Millisecond {
            let step = self.step as f64;
            return (ms / step).floor() * step;
        }
        if local {
            self.floor_in(&Local, ms)
        } else {
            self.floor_in(&Utc, ms)
        }
    }

    /// Earliest boundary at or after `ms`
    pub fn ceil(&self, ms: f64, local: bool) -> f64 {
        let floored = self.floor(ms - 1.0, local);
        self.floor(self.offset(floored, local), local)
    }

    /// Boundaries within `[start, stop]`, ascending
    pub fn range(&self, start: f64, stop: f64, local: bool) -> Vec<f64> {
        let mut ticks = Vec::new();
        let mut current = self.ceil(start, local);
        while current <= stop && ticks.len() < 10_000 {
            ticks.push(current);
            let next = self.floor(self.offset(current, local), local);
            if next <= current {
                break;
            }
            current = next;
        }
        ticks
    }

    fn offset(&self, ms: f64, local: bool) -> f64 {
        match self.unit {
            TimeUnit::Millisecond => ms + self.step as f64,
            _ if local => self.offset_in(&Local, ms),
            _ => self.offset_in(&Utc, ms),
        }
    }

    fn floor_in<Tz: TimeZone>(&self, tz: &Tz, ms: f64) -> f64 {
        let Some(naive) = to_naive(tz, ms) else {
            return ms;
        };
        let step = self.step as u32;
        let aligned = |value: u32| value - value % step;
        let date = naive.date();
        let floored = match self.unit {
            TimeUnit::Millisecond => return ms,
            TimeUnit::Second => date.and_hms_opt(
                naive.hour(),
                naive.minute(),
                aligned(naive.second()),
            ),
            TimeUnit::Minute => date.and_hms_opt(naive.hour(), aligned(naive.minute()), 0),
            TimeUnit::Hour => date.and_hms_opt(aligned(naive.hour()), 0, 0),
            TimeUnit::Day => date
                .with_day(aligned(date.day0()) + 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            TimeUnit::Week => {
                let back = date.weekday().num_days_from_sunday() as i64;
                (date - Duration::days(back)).and_hms_opt(0, 0, 0)
            }
            TimeUnit::Month => NaiveDate::from_ymd_opt(date.year(), aligned(date.month0()) + 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            TimeUnit::Year => {
                let year = date.year() - date.year().rem_euclid(self.step as i32);
                NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
            }
        };
        floored.and_then(|n| from_naive(tz, &n)).unwrap_or(ms)
    }

    fn offset_in<Tz: TimeZone>(&self, tz: &Tz, ms: f64) -> f64 {
        let Some(naive) = to_naive(tz, ms) else {
            return ms;
        };
        let step = self.step;
        let shifted = match self.unit {
            TimeUnit::Millisecond => Some(naive + Duration::milliseconds(step)),
            TimeUnit::Second => Some(naive + Duration::seconds(step)),
            TimeUnit::Minute => Some(naive + Duration::minutes(step)),
            TimeUnit::Hour => Some(naive + Duration::hours(step)),
            TimeUnit::Day => Some(naive + Duration::days(step)),
            TimeUnit::Week => Some(naive + Duration::weeks(step)),
            TimeUnit::Month => naive.checked_add_months(Months::new(step as u32)),
            TimeUnit::Year => naive.checked_add_months(Months::new(step as u32 * 12)),
        };
        shifted.and_then(|n| from_naive(tz, &n)).unwrap_or(ms)
    }
}

fn to_naive<Tz: TimeZone>(tz: &Tz, ms: f64) -> Option<NaiveDateTime> {
    if !ms.is_finite() {
        return None;
    }
    tz.timestamp_millis_opt(ms as i64)
        .single()
        .map(|dt| dt.naive_local())
}

fn from_naive<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> Option<f64> {
    tz.from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.timestamp_millis() as f64)
}

/// Extend `[start, stop]` outward to interval boundaries, preserving orientation
pub fn time_nice(start: f64, stop: f64, count: usize, local: bool) -> (f64, f64) {
    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
    if !lo.is_finite() || !hi.is_finite() || lo == hi {
        return (start, stop);
    }
    let interval = TimeInterval::for_span(lo, hi, count);
    let (lo, hi) = (interval.floor(lo, local), interval.ceil(hi, local));
    if reverse {
        (hi, lo)
    } else {
        (lo, hi)
    }
}

/// Calendar-aligned ticks within `[start, stop]`, following its orientation
pub fn time_ticks(start: f64, stop: f64, count: usize, local: bool) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
    let mut ticks = TimeInterval::for_span(lo, hi, count).range(lo, hi, local);
    if reverse {
        ticks.reverse();
    }
    ticks
}

pub fn millis_to_datetime(ms: f64) -> Option<DateTime<Utc>> {
    if ms.is_finite() {
        DateTime::from_timestamp_millis(ms as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(s: &str) -> f64 {
        DateTime::parse_from_rfc3339(s).unwrap().timestamp_millis() as f64
    }

    #[test]
    fn test_interval_selection() {
        let start = ms("2020-01-01T00:00:00Z");
        assert_eq!(
            TimeInterval::for_span(start, ms("2020-01-31T00:00:00Z"), 10),
            TimeInterval::new(TimeUnit::Day, 2)
        );
        assert_eq!(
            TimeInterval::for_span(start, ms("2020-01-01T01:00:00Z"), 10),
            TimeInterval::new(TimeUnit::Minute, 5)
        );
        assert_eq!(
            TimeInterval::for_span(start, ms("2030-01-01T00:00:00Z"), 10),
            TimeInterval::new(TimeUnit::Year, 1)
        );
        assert_eq!(
            TimeInterval::for_span(start, start + 100.0, 10),
            TimeInterval::new(TimeUnit::Millisecond, 10)
        );
    }

    #[test]
    fn test_floor_and_ceil() {
        let quarter = TimeInterval::new(TimeUnit::Minute, 15);
        let t = ms("2020-03-05T10:37:12Z");
        assert_eq!(quarter.floor(t, false), ms("2020-03-05T10:30:00Z"));
        assert_eq!(quarter.ceil(t, false), ms("2020-03-05T10:45:00Z"));
        let boundary = ms("2020-03-05T10:45:00Z");
        assert_eq!(quarter.ceil(boundary, false), boundary);

        let months = TimeInterval::new(TimeUnit::Month, 3);
        assert_eq!(months.floor(t, false), ms("2020-01-01T00:00:00Z"));
        assert_eq!(months.ceil(t, false), ms("2020-04-01T00:00:00Z"));

        let week = TimeInterval::new(TimeUnit::Week, 1);
        // 2020-03-05 is a Thursday
        assert_eq!(week.floor(t, false), ms("2020-03-01T00:00:00Z"));
    }

    #[test]
    fn test_nice_extends_to_boundaries() {
        let (lo, hi) = time_nice(ms("2020-01-03T05:00:00Z"), ms("2020-12-20T00:00:00Z"), 10, false);
        assert_eq!(lo, ms("2020-01-01T00:00:00Z"));
        assert_eq!(hi, ms("2021-01-01T00:00:00Z"));
    }

    #[test]
    fn test_nice_keeps_aligned_domain() {
        let start = ms("2020-01-01T00:00:00Z");
        let stop = ms("2020-01-31T00:00:00Z");
        assert_eq!(time_nice(start, stop, 10, false), (start, stop));
    }

    #[test]
    fn test_nice_single_instant() {
        let at = ms("2020-06-15T12:34:56Z");
        assert_eq!(time_nice(at, at, 10, false), (at, at));
    }

    #[test]
    fn test_ticks() {
        let ticks = time_ticks(ms("2020-01-01T00:00:00Z"), ms("2020-01-01T01:00:00Z"), 4, false);
        assert_eq!(
            ticks,
            vec![
                ms("2020-01-01T00:00:00Z"),
                ms("2020-01-01T00:15:00Z"),
                ms("2020-01-01T00:30:00Z"),
                ms("2020-01-01T00:45:00Z"),
                ms("2020-01-01T01:00:00Z"),
            ]
        );

        let reversed = time_ticks(ms("2020-01-01T01:00:00Z"), ms("2020-01-01T00:00:00Z"), 4, false);
        assert_eq!(reversed.first(), Some(&ms("2020-01-01T01:00:00Z")));
    }

    #[test]
    fn test_day_ticks_restart_each_month() {
        let days = TimeInterval::new(TimeUnit::Day, 2);
        let ticks = days.range(ms("2020-01-28T00:00:00Z"), ms("2020-02-04T00:00:00Z"), false);
        assert_eq!(
            ticks,
            vec![
                ms("2020-01-29T00:00:00Z"),
                ms("2020-01-31T00:00:00Z"),
                ms("2020-02-01T00:00:00Z"),
                ms("2020-02-03T00:00:00Z"),
            ]
        );
    }
}
