//! Scheduled-time resolution: the theoretical available time for an
//! analyzed period, always `days_in_period × 24h`.

use chrono::{Duration, NaiveDate};

use crate::filter::PeriodFilter;
use crate::record::StoppageRecord;

/// Floor applied to the observed-span fallback so short or degenerate spans
/// never produce a near-zero schedule.
const MIN_OBSERVED_DAYS: i64 = 30;

/// Resolves the scheduled time for a record set under the given period
/// selection.
///
/// Resolution order: an explicit date range uses its inclusive day count; a
/// specific month uses that month's calendar days; otherwise the observed
/// span of the records applies, floored at 30 days (and 30 days flat for an
/// empty set).
pub fn scheduled_time(records: &[StoppageRecord], period: &PeriodFilter) -> Duration {
    let days = match period {
        PeriodFilter::Range(range) => (range.end().date() - range.start().date()).num_days() + 1,
        PeriodFilter::Month(key) => {
            days_in_month(key).unwrap_or_else(|| observed_days(records))
        }
        PeriodFilter::All => observed_days(records),
    };

    Duration::hours(days * 24)
}

fn observed_days(records: &[StoppageRecord]) -> i64 {
    let Some(min) = records.iter().map(|r| r.start).min() else {
        return MIN_OBSERVED_DAYS;
    };
    let max = records.iter().map(|r| r.start).max().unwrap();

    ((max - min).num_days() + 1).max(MIN_OBSERVED_DAYS)
}

/// Calendar day count of a `YYYY-MM` key, or `None` for a malformed key.
pub fn days_in_month(key: &str) -> Option<i64> {
    let (year, month) = key.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;

    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    Some((next - first).num_days())
}

/// Scales a per-machine schedule by the distinct machine count of the record
/// set; each machine has its own independent schedule.
pub fn scale_by_machines(records: &[StoppageRecord], scheduled: Duration) -> Duration {
    let machines = distinct_machines(records);
    scheduled * machines.max(1) as i32
}

/// Number of distinct machines present in the record set.
pub fn distinct_machines(records: &[StoppageRecord]) -> usize {
    let mut seen: Vec<&str> = Vec::new();
    for record in records {
        if !seen.contains(&record.machine.as_str()) {
            seen.push(&record.machine);
        }
    }
    seen.len()
}
