//! The metrics engine: pure aggregation functions over a normalized record
//! set plus one scheduled-time value.
//!
//! Canonical conventions (applied consistently everywhere):
//! - the schedule is always scaled by the distinct machine count;
//! - availability penalizes PCP-area downtime, efficiency penalizes
//!   operational/organizational downtime, both against the scaled schedule;
//! - MTBF/MTTR run over the entire given record set.

use chrono::Duration;
use std::collections::{BTreeMap, HashMap};

use crate::analysis::recommend;
use crate::analysis::schedule::scale_by_machines;
use crate::analysis::types::{MachineSummary, MetricsSnapshot};
use crate::analysis::utility::{duration_hours, pct};
use crate::record::{StoppageRecord, WEEKDAY_NAMES};

/// Default critical-stoppage threshold.
pub const DEFAULT_CRITICAL_LIMIT_HOURS: i64 = 1;

/// Fixed 8-hour shift windows, in reporting order. The night shift wraps
/// midnight.
pub const SHIFT_LABELS: [&str; 3] = ["06:00-14:00", "14:00-22:00", "22:00-06:00"];

/// Planning-control (administrative) downtime; excluded from availability's
/// uptime by construction.
fn is_pcp_area(area: &str) -> bool {
    area.to_lowercase().contains("pcp")
}

/// Operational/organizational downtime, the efficiency penalty set. Matched
/// as a substring, tolerating both accented and plain spellings.
fn is_operational_area(area: &str) -> bool {
    let area = area.to_lowercase();
    area.contains("operaç") || area.contains("operac") || area.contains("organizacional")
}

fn downtime_where<F: Fn(&StoppageRecord) -> bool>(records: &[StoppageRecord], pred: F) -> Duration {
    records
        .iter()
        .filter(|r| pred(r))
        .fold(Duration::zero(), |acc, r| acc + r.duration)
}

/// Total downtime across the record set.
pub fn total_downtime(records: &[StoppageRecord]) -> Duration {
    downtime_where(records, |_| true)
}

fn loss_ratio_metric<F: Fn(&StoppageRecord) -> bool>(
    records: &[StoppageRecord],
    scheduled: Duration,
    penalty: F,
) -> f64 {
    if records.is_empty() {
        return 0.0;
    }

    let scheduled_hours = duration_hours(scale_by_machines(records, scheduled));
    if scheduled_hours <= 0.0 {
        return 0.0;
    }

    let penalty_hours = duration_hours(downtime_where(records, penalty));
    (((scheduled_hours - penalty_hours) / scheduled_hours) * 100.0).clamp(0.0, 100.0)
}

/// Fraction of the scheduled time not lost to administrative (PCP) stoppages,
/// as a percentage in `[0, 100]`.
pub fn availability(records: &[StoppageRecord], scheduled: Duration) -> f64 {
    loss_ratio_metric(records, scheduled, |r| is_pcp_area(&r.responsible_area))
}

/// Fraction of the scheduled time not lost to operational/organizational
/// stoppages, as a percentage in `[0, 100]`.
pub fn efficiency(records: &[StoppageRecord], scheduled: Duration) -> f64 {
    loss_ratio_metric(records, scheduled, |r| {
        is_operational_area(&r.responsible_area)
    })
}

/// Mean time between failures and mean time to repair, in hours, over the
/// entire record set against the machine-scaled schedule.
///
/// MTBF is 0 for fewer than two stoppages (there is no "between" to
/// measure); MTTR is 0 for an empty set.
pub fn mtbf_mttr(records: &[StoppageRecord], scheduled: Duration) -> (f64, f64) {
    let n = records.len();
    if n == 0 {
        return (0.0, 0.0);
    }

    let scheduled_hours = duration_hours(scale_by_machines(records, scheduled));
    let downtime_hours = duration_hours(total_downtime(records));

    let mtbf = if n > 1 {
        ((scheduled_hours - downtime_hours) / n as f64).max(0.0)
    } else {
        0.0
    };
    let mttr = downtime_hours / n as f64;

    (mtbf, mttr)
}

/// Groups records by a key, summing durations, preserving first-appearance
/// order for ties in the later stable sort.
fn group_durations<F>(records: &[StoppageRecord], key: F) -> Vec<(String, Duration)>
where
    F: Fn(&StoppageRecord) -> &str,
{
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, Duration> = HashMap::new();

    for record in records {
        let k = key(record);
        if !totals.contains_key(k) {
            order.push(k.to_string());
        }
        let entry = totals.entry(k.to_string()).or_insert_with(Duration::zero);
        *entry = *entry + record.duration;
    }

    order.into_iter().map(|k| (k.clone(), totals[&k])).collect()
}

fn group_counts<F>(records: &[StoppageRecord], key: F) -> Vec<(String, usize)>
where
    F: Fn(&StoppageRecord) -> &str,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for record in records {
        let k = key(record);
        if !counts.contains_key(k) {
            order.push(k.to_string());
        }
        *counts.entry(k.to_string()).or_insert(0) += 1;
    }

    order.into_iter().map(|k| (k.clone(), counts[&k])).collect()
}

/// Top 10 stoppage causes by cumulative duration, descending. Ties keep
/// input order (stable sort).
pub fn pareto_causes(records: &[StoppageRecord]) -> Vec<(String, Duration)> {
    let mut ranked = group_durations(records, |r| &r.cause);
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(10);
    ranked
}

/// Top 10 stoppage causes by occurrence count, descending. Ties keep input
/// order (stable sort).
pub fn frequent_causes(records: &[StoppageRecord]) -> Vec<(String, usize)> {
    let mut ranked = group_counts(records, |r| &r.cause);
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(10);
    ranked
}

/// Percentage share of stoppage count per responsible area, normalized to
/// sum 100 for a non-empty set, descending.
pub fn area_percentages(records: &[StoppageRecord]) -> Vec<(String, f64)> {
    let mut counts = group_counts(records, |r| &r.responsible_area);
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let total = records.len();
    counts
        .into_iter()
        .map(|(area, count)| (area, pct(count, total)))
        .collect()
}

/// Total downtime per responsible area, descending.
pub fn area_downtime(records: &[StoppageRecord]) -> Vec<(String, Duration)> {
    let mut totals = group_durations(records, |r| &r.responsible_area);
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
}

/// Occurrence count per `YYYY-MM` key, chronologically ordered.
pub fn monthly_occurrences(records: &[StoppageRecord]) -> BTreeMap<String, usize> {
    let mut series = BTreeMap::new();
    for record in records {
        *series.entry(record.year_month.clone()).or_insert(0) += 1;
    }
    series
}

/// Total downtime per `YYYY-MM` key, chronologically ordered.
pub fn monthly_downtime(records: &[StoppageRecord]) -> BTreeMap<String, Duration> {
    let mut series: BTreeMap<String, Duration> = BTreeMap::new();
    for record in records {
        let entry = series
            .entry(record.year_month.clone())
            .or_insert_with(Duration::zero);
        *entry = *entry + record.duration;
    }
    series
}

/// Occurrences and downtime per weekday, Monday-first, zero-filled.
pub fn weekday_breakdown(records: &[StoppageRecord]) -> (Vec<(String, usize)>, Vec<(String, f64)>) {
    let mut counts = [0usize; 7];
    let mut hours = [0.0f64; 7];

    for record in records {
        let idx = record.weekday as usize % 7;
        counts[idx] += 1;
        hours[idx] += duration_hours(record.duration);
    }

    let occurrences = WEEKDAY_NAMES
        .iter()
        .zip(counts)
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    let downtime = WEEKDAY_NAMES
        .iter()
        .zip(hours)
        .map(|(name, h)| (name.to_string(), h))
        .collect();

    (occurrences, downtime)
}

/// Occurrence count per start hour of day. Hours with no stoppages are
/// omitted.
pub fn hourly_occurrences(records: &[StoppageRecord]) -> BTreeMap<u32, usize> {
    let mut series = BTreeMap::new();
    for record in records {
        *series.entry(record.hour).or_insert(0) += 1;
    }
    series
}

/// Classifies a start hour into its fixed shift window.
pub fn shift_label(hour: u32) -> &'static str {
    match hour {
        6..14 => SHIFT_LABELS[0],
        14..22 => SHIFT_LABELS[1],
        _ => SHIFT_LABELS[2],
    }
}

/// Stoppage count per shift window. All three windows are always reported,
/// zero-filled when empty.
pub fn shift_distribution(records: &[StoppageRecord]) -> Vec<(String, usize)> {
    let mut counts = [0usize; 3];
    for record in records {
        let idx = SHIFT_LABELS
            .iter()
            .position(|l| *l == shift_label(record.hour))
            .unwrap();
        counts[idx] += 1;
    }

    SHIFT_LABELS
        .iter()
        .zip(counts)
        .map(|(label, count)| (label.to_string(), count))
        .collect()
}

/// The critical subset (stoppages strictly longer than `limit`) and its
/// percentage of the whole set. An empty input yields `(empty, 0)`.
pub fn identify_critical(
    records: &[StoppageRecord],
    limit: Duration,
) -> (Vec<StoppageRecord>, f64) {
    let critical: Vec<StoppageRecord> = records
        .iter()
        .filter(|r| r.duration > limit)
        .cloned()
        .collect();
    let percentage = pct(critical.len(), records.len());

    (critical, percentage)
}

/// Per-machine stoppage count, total and average duration, sorted by
/// machine name.
pub fn machine_summary(records: &[StoppageRecord]) -> Vec<MachineSummary> {
    let mut durations = group_durations(records, |r| &r.machine);
    durations.sort_by(|a, b| a.0.cmp(&b.0));
    let counts: HashMap<String, usize> = group_counts(records, |r| &r.machine)
        .into_iter()
        .collect();

    durations
        .into_iter()
        .map(|(machine, total)| {
            let stoppages = counts[&machine];
            let total_hours = duration_hours(total);
            MachineSummary {
                avg_hours: total_hours / stoppages as f64,
                machine,
                stoppages,
                total_hours,
            }
        })
        .collect()
}

/// Runs the full metrics engine over one record set and one scheduled-time
/// value, producing an immutable snapshot.
pub fn compute_snapshot(
    records: &[StoppageRecord],
    scheduled: Duration,
    critical_limit: Duration,
) -> MetricsSnapshot {
    let availability = availability(records, scheduled);
    let efficiency = efficiency(records, scheduled);
    let (mtbf_hours, mttr_hours) = mtbf_mttr(records, scheduled);

    let total = total_downtime(records);
    let total_downtime_hours = duration_hours(total);
    let avg_downtime_hours = if records.is_empty() {
        0.0
    } else {
        total_downtime_hours / records.len() as f64
    };

    let pareto = pareto_causes(records)
        .into_iter()
        .map(|(cause, d)| (cause, duration_hours(d)))
        .collect();
    let area_pcts = area_percentages(records);
    let area_hours: Vec<(String, f64)> = area_downtime(records)
        .into_iter()
        .map(|(area, d)| (area, duration_hours(d)))
        .collect();

    let occurrences = monthly_occurrences(records);
    let monthly_hours = monthly_downtime(records)
        .into_iter()
        .map(|(k, d)| (k, duration_hours(d)))
        .collect();

    let (weekday_occurrences, weekday_downtime_hours) = weekday_breakdown(records);
    let (critical_stoppages, critical_percentage) = identify_critical(records, critical_limit);

    let recommendations = recommend::generate(
        availability,
        efficiency,
        critical_percentage,
        &area_pcts,
        &occurrences,
    );

    MetricsSnapshot {
        availability,
        efficiency,
        mtbf_hours,
        mttr_hours,
        total_stoppages: records.len(),
        total_downtime_hours,
        avg_downtime_hours,
        pareto_causes: pareto,
        frequent_causes: frequent_causes(records),
        area_percentages: area_pcts,
        area_downtime_hours: area_hours,
        monthly_occurrences: occurrences,
        monthly_downtime_hours: monthly_hours,
        weekday_occurrences,
        weekday_downtime_hours,
        hourly_occurrences: hourly_occurrences(records),
        shift_distribution: shift_distribution(records),
        machine_summary: machine_summary(records),
        critical_stoppages,
        critical_percentage,
        recommendations,
    }
}
