//! Record selection by machine, period, and optional predicates, plus the
//! pagination helper layered on top of filtering.

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::record::StoppageRecord;

/// Caller-input validation failures, surfaced as typed results so the
/// boundary layer can render them without exceptions-as-control-flow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("start {start} is after end {end}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// An inclusive timestamp range validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Machine selection: everything, or one exact machine name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineFilter {
    All,
    Name(String),
}

impl MachineFilter {
    fn matches(&self, record: &StoppageRecord) -> bool {
        match self {
            MachineFilter::All => true,
            MachineFilter::Name(name) => record.machine == *name,
        }
    }
}

/// Period selection. An explicit range takes precedence over a month key
/// when both could apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodFilter {
    All,
    /// Exact match against the derived `YYYY-MM` field.
    Month(String),
    Range(DateRange),
}

impl PeriodFilter {
    /// Builds a period filter from the caller's selection. An explicit range
    /// wins over a month key when both are supplied.
    pub fn from_selection(month: Option<&str>, range: Option<DateRange>) -> PeriodFilter {
        match (range, month) {
            (Some(range), _) => PeriodFilter::Range(range),
            (None, Some(key)) => PeriodFilter::Month(key.to_string()),
            (None, None) => PeriodFilter::All,
        }
    }

    fn matches(&self, record: &StoppageRecord) -> bool {
        match self {
            PeriodFilter::All => true,
            PeriodFilter::Month(key) => record.year_month == *key,
            PeriodFilter::Range(range) => range.contains(record.start),
        }
    }
}

/// Optional predicates ANDed with the base machine/period filters.
#[derive(Debug, Clone, Default)]
pub struct ExtraFilters {
    pub weekend_only: bool,
    pub night_shift_only: bool,
    /// Case-insensitive responsible-area match.
    pub area: Option<String>,
}

impl ExtraFilters {
    fn matches(&self, record: &StoppageRecord) -> bool {
        if self.weekend_only && record.weekday < 5 {
            return false;
        }
        if self.night_shift_only && !(record.hour >= 22 || record.hour < 6) {
            return false;
        }
        if let Some(area) = &self.area {
            if !record.responsible_area.eq_ignore_ascii_case(area) {
                return false;
            }
        }
        true
    }
}

/// Selects the subset of records matching the machine, period, and extra
/// predicates. Returns an empty vector (never an error) when nothing
/// matches.
pub fn filter(
    records: &[StoppageRecord],
    machine: &MachineFilter,
    period: &PeriodFilter,
    extra: &ExtraFilters,
) -> Vec<StoppageRecord> {
    records
        .iter()
        .filter(|r| machine.matches(r) && period.matches(r) && extra.matches(r))
        .cloned()
        .collect()
}

/// One page of records plus the totals needed to render pagination controls.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub items: Vec<StoppageRecord>,
    pub page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slices out one 1-indexed page. A page index past the last valid page
/// saturates to an empty slice rather than failing.
pub fn paginate(records: &[StoppageRecord], page: usize, page_size: usize) -> Page {
    let total_items = records.len();
    let total_pages = if page_size == 0 {
        0
    } else {
        total_items.div_ceil(page_size)
    };

    let start = page.saturating_sub(1).saturating_mul(page_size);
    let items = if page_size == 0 || start >= total_items {
        Vec::new()
    } else {
        records[start..(start + page_size).min(total_items)].to_vec()
    };

    Page {
        items,
        page,
        total_items,
        total_pages,
    }
}
