//! Result types produced by the metrics engine.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::record::StoppageRecord;

/// Per-machine summary line: count, total and average stoppage duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineSummary {
    pub machine: String,
    pub stoppages: usize,
    pub total_hours: f64,
    pub avg_hours: f64,
}

/// Immutable result of running the metrics engine over one record set and
/// one scheduled-time value. Plain structured data, ready for the export
/// and charting collaborators.
///
/// Ranked lists carry durations as fractional hours. Monthly series are
/// keyed by `YYYY-MM`, which sorts chronologically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub availability: f64,
    pub efficiency: f64,
    pub mtbf_hours: f64,
    pub mttr_hours: f64,
    pub total_stoppages: usize,
    pub total_downtime_hours: f64,
    pub avg_downtime_hours: f64,

    /// Top stoppage causes by cumulative duration (hours), descending.
    pub pareto_causes: Vec<(String, f64)>,
    /// Top stoppage causes by occurrence count, descending.
    pub frequent_causes: Vec<(String, usize)>,

    /// Percentage share of stoppage count per responsible area, summing to
    /// 100 for a non-empty set, descending.
    pub area_percentages: Vec<(String, f64)>,
    /// Total downtime hours per responsible area, descending.
    pub area_downtime_hours: Vec<(String, f64)>,

    pub monthly_occurrences: BTreeMap<String, usize>,
    pub monthly_downtime_hours: BTreeMap<String, f64>,

    /// Occurrences per weekday, Monday-first, zero-filled.
    pub weekday_occurrences: Vec<(String, usize)>,
    /// Downtime hours per weekday, Monday-first, zero-filled.
    pub weekday_downtime_hours: Vec<(String, f64)>,
    /// Occurrences per start hour of day, only hours that occur.
    pub hourly_occurrences: BTreeMap<u32, usize>,

    /// Occurrences per fixed 8-hour shift window, all three keys always
    /// present.
    pub shift_distribution: Vec<(String, usize)>,

    pub machine_summary: Vec<MachineSummary>,

    pub critical_stoppages: Vec<StoppageRecord>,
    pub critical_percentage: f64,

    pub recommendations: Vec<String>,
}
