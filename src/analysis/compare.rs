//! Period comparison: runs the metrics engine once per period and diffs the
//! two snapshots, with per-metric improvement polarity carried as explicit
//! metadata.

use chrono::Duration;
use serde::Serialize;

use crate::analysis::metrics::compute_snapshot;
use crate::analysis::schedule::scheduled_time;
use crate::analysis::types::MetricsSnapshot;
use crate::filter::PeriodFilter;
use crate::record::StoppageRecord;

/// The closed set of comparable metrics. Each variant knows whether a
/// positive delta is an improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Availability,
    Efficiency,
    Mtbf,
    Mttr,
    TotalStoppages,
    TotalDowntime,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Availability,
        Metric::Efficiency,
        Metric::Mtbf,
        Metric::Mttr,
        Metric::TotalStoppages,
        Metric::TotalDowntime,
    ];

    /// Improvement polarity: whether a larger value is better.
    pub fn higher_is_better(self) -> bool {
        matches!(self, Metric::Availability | Metric::Efficiency | Metric::Mtbf)
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Availability => "Availability (%)",
            Metric::Efficiency => "Efficiency (%)",
            Metric::Mtbf => "MTBF (hours)",
            Metric::Mttr => "MTTR (hours)",
            Metric::TotalStoppages => "Total stoppages",
            Metric::TotalDowntime => "Total downtime (hours)",
        }
    }

    fn value(self, snapshot: &MetricsSnapshot) -> f64 {
        match self {
            Metric::Availability => snapshot.availability,
            Metric::Efficiency => snapshot.efficiency,
            Metric::Mtbf => snapshot.mtbf_hours,
            Metric::Mttr => snapshot.mttr_hours,
            Metric::TotalStoppages => snapshot.total_stoppages as f64,
            Metric::TotalDowntime => snapshot.total_downtime_hours,
        }
    }
}

/// Percent change of a metric between periods. `Infinite` is the sanctioned
/// sentinel for a zero baseline, never a raw divide-by-zero artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentChange {
    Finite(f64),
    Infinite,
}

impl PercentChange {
    pub fn as_f64(self) -> Option<f64> {
        match self {
            PercentChange::Finite(v) => Some(v),
            PercentChange::Infinite => None,
        }
    }
}

/// How one metric moved between the two periods, given its polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Improved,
    Worsened,
    Unchanged,
}

/// The 4-tuple comparison of one metric across the two periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDelta {
    pub metric: Metric,
    pub value1: f64,
    pub value2: f64,
    pub delta: f64,
    pub percent_change: PercentChange,
}

impl MetricDelta {
    fn new(metric: Metric, snapshot1: &MetricsSnapshot, snapshot2: &MetricsSnapshot) -> Self {
        let value1 = metric.value(snapshot1);
        let value2 = metric.value(snapshot2);
        let delta = value2 - value1;
        let percent_change = if value1 > 0.0 {
            PercentChange::Finite(delta / value1 * 100.0)
        } else {
            PercentChange::Infinite
        };

        MetricDelta {
            metric,
            value1,
            value2,
            delta,
            percent_change,
        }
    }

    /// Classifies the move using the metric's polarity metadata, not the
    /// raw sign.
    pub fn direction(&self) -> Direction {
        if self.delta == 0.0 {
            Direction::Unchanged
        } else if (self.delta > 0.0) == self.metric.higher_is_better() {
            Direction::Improved
        } else {
            Direction::Worsened
        }
    }
}

/// Full comparison of two periods: both snapshots, per-metric deltas, and
/// an aggregate performance score.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub period1: MetricsSnapshot,
    pub period2: MetricsSnapshot,
    pub deltas: Vec<MetricDelta>,
    /// `(improved − worsened) / total × 100`.
    pub performance_score: f64,
    pub verdict: String,
}

/// Compares two record sets, computing scheduled time and a full snapshot
/// independently per period.
///
/// Returns `None` when either period is empty; a comparison against an
/// empty baseline is undefined, not zero.
pub fn compare_periods(
    records1: &[StoppageRecord],
    period1: &PeriodFilter,
    records2: &[StoppageRecord],
    period2: &PeriodFilter,
    critical_limit: Duration,
) -> Option<ComparisonResult> {
    if records1.is_empty() || records2.is_empty() {
        return None;
    }

    let scheduled1 = scheduled_time(records1, period1);
    let scheduled2 = scheduled_time(records2, period2);

    let snapshot1 = compute_snapshot(records1, scheduled1, critical_limit);
    let snapshot2 = compute_snapshot(records2, scheduled2, critical_limit);

    let deltas: Vec<MetricDelta> = Metric::ALL
        .iter()
        .map(|m| MetricDelta::new(*m, &snapshot1, &snapshot2))
        .collect();

    let improved = deltas
        .iter()
        .filter(|d| d.direction() == Direction::Improved)
        .count() as f64;
    let worsened = deltas
        .iter()
        .filter(|d| d.direction() == Direction::Worsened)
        .count() as f64;
    let performance_score = (improved - worsened) / deltas.len() as f64 * 100.0;

    let verdict = if performance_score > 0.0 {
        "Overall performance improved between the periods.".to_string()
    } else if performance_score < 0.0 {
        "Overall performance worsened between the periods.".to_string()
    } else {
        "Overall performance unchanged between the periods.".to_string()
    };

    Some(ComparisonResult {
        period1: snapshot1,
        period2: snapshot2,
        deltas,
        performance_score,
        verdict,
    })
}
