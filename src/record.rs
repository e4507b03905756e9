//! Raw stoppage rows and their normalization into canonical records.
//!
//! The normalizer is a pure transform: it canonicalizes machine codes,
//! parses timestamps and durations leniently, derives calendar fields from
//! the start timestamp, and drops rows that are incomplete after parsing.

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize, Serializer};

/// Rows are normalized in fixed-size batches for memory locality on large
/// tables. Batching preserves input order and per-row results.
pub const BATCH_SIZE: usize = 8192;

/// Known machine code → display name table. Codes outside this table pass
/// through as `"Machine {code}"`.
static MACHINE_CODES: &[(i64, &str)] = &[
    (78, "PET"),
    (79, "TETRA 1000"),
    (80, "TETRA 200"),
    (89, "SIG 1000"),
    (91, "SIG 200"),
];

/// A single row deserialized from a tabular source. Every field is optional;
/// unknown extra columns are ignored by the deserializer.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawStoppageRow {
    #[serde(default)]
    pub machine: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub cause: Option<String>,
    #[serde(default)]
    pub responsible_area: Option<String>,
}

/// A canonical downtime event. Dense on `machine`, `start`, `end`, and
/// `duration`; calendar fields are derived once from `start` and never
/// recomputed downstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoppageRecord {
    pub machine: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(serialize_with = "serialize_duration_hms")]
    pub duration: Duration,
    pub cause: String,
    pub responsible_area: String,

    // derived from `start`
    pub year: i32,
    pub month: u32,
    pub year_month: String,
    pub iso_week: u32,
    pub weekday: u32,
    pub weekday_name: String,
    pub hour: u32,
}

impl StoppageRecord {
    fn from_parts(
        machine: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
        duration: Duration,
        cause: String,
        responsible_area: String,
    ) -> Self {
        StoppageRecord {
            year: start.year(),
            month: start.month(),
            year_month: start.format("%Y-%m").to_string(),
            iso_week: start.iso_week().week(),
            weekday: start.weekday().num_days_from_monday(),
            weekday_name: weekday_name(start.weekday().num_days_from_monday()).to_string(),
            hour: start.hour(),
            machine,
            start,
            end,
            duration,
            cause,
            responsible_area,
        }
    }
}

/// Weekday display names indexed Monday-first, matching the derived
/// `weekday` field.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn weekday_name(index: u32) -> &'static str {
    WEEKDAY_NAMES[index as usize % 7]
}

/// Normalizes raw rows into canonical [`StoppageRecord`]s.
///
/// Rows missing `machine`, `start`, `end`, or `duration` after parsing are
/// dropped; there is no error path for unknown machine codes.
pub fn normalize(rows: &[RawStoppageRow]) -> Vec<StoppageRecord> {
    normalize_batched(rows, BATCH_SIZE)
}

pub(crate) fn normalize_batched(rows: &[RawStoppageRow], batch_size: usize) -> Vec<StoppageRecord> {
    let mut records = Vec::with_capacity(rows.len());

    for chunk in rows.chunks(batch_size.max(1)) {
        records.extend(chunk.iter().filter_map(normalize_row));
    }

    records
}

fn normalize_row(row: &RawStoppageRow) -> Option<StoppageRecord> {
    let machine = machine_name(row.machine.as_deref()?)?;
    let start = parse_timestamp(row.start.as_deref()?)?;
    let end = parse_timestamp(row.end.as_deref()?)?;
    let duration = parse_duration(row.duration.as_deref()?)?;

    let cause = row.cause.as_deref().unwrap_or("").trim().to_string();
    let area = row
        .responsible_area
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_string();

    Some(StoppageRecord::from_parts(
        machine, start, end, duration, cause, area,
    ))
}

/// Resolves a raw machine field to a display name.
///
/// Known numeric codes map through the fixed table; anything else passes
/// through as a synthetic `"Machine {value}"` label. Blank values resolve to
/// `None` and cause the row to be dropped.
pub fn machine_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(code) = trimmed.parse::<i64>() {
        let name = MACHINE_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| (*name).to_string())
            .unwrap_or_else(|| format!("Machine {}", code));
        return Some(name);
    }

    Some(format!("Machine {}", trimmed))
}

/// Parses a timestamp leniently, trying the common layouts seen in exported
/// tables. Unparseable values become `None` rather than an error.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    const LAYOUTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S"];
    for layout in LAYOUTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, layout) {
            return Some(ts);
        }
    }

    // bare dates parse to midnight
    const DATE_LAYOUTS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
    for layout in DATE_LAYOUTS {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, layout) {
            return Some(date.and_hms_opt(0, 0, 0).unwrap());
        }
    }

    None
}

/// Parses a duration field.
///
/// Tries the native-value path first (a plain decimal number, interpreted as
/// seconds), then falls back to `"HH:MM:SS"`. Any other shape yields `None`,
/// which propagates to row-drop.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(seconds) = trimmed.parse::<f64>() {
        if seconds.is_finite() && seconds >= 0.0 {
            return Some(Duration::milliseconds((seconds * 1000.0).round() as i64));
        }
        return None;
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours: i64 = parts[0].trim().parse().ok()?;
    let minutes: i64 = parts[1].trim().parse().ok()?;
    let seconds: i64 = parts[2].trim().parse().ok()?;
    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return None;
    }

    Some(Duration::seconds(hours * 3600 + minutes * 60 + seconds))
}

/// Formats a duration as zero-padded `HH:MM:SS` for display and export.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

fn serialize_duration_hms<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_duration(*d))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(machine: &str, start: &str, end: &str, duration: &str) -> RawStoppageRow {
        RawStoppageRow {
            machine: Some(machine.to_string()),
            start: Some(start.to_string()),
            end: Some(end.to_string()),
            duration: Some(duration.to_string()),
            cause: Some("Setup".to_string()),
            responsible_area: Some("PCP".to_string()),
        }
    }

    #[test]
    fn test_machine_code_mapping() {
        assert_eq!(machine_name("78").unwrap(), "PET");
        assert_eq!(machine_name("91").unwrap(), "SIG 200");
    }

    #[test]
    fn test_machine_unknown_code_gets_synthetic_label() {
        assert_eq!(machine_name("123").unwrap(), "Machine 123");
        assert_eq!(machine_name("EXTRUDER").unwrap(), "Machine EXTRUDER");
    }

    #[test]
    fn test_machine_blank_is_none() {
        assert_eq!(machine_name("   "), None);
    }

    #[test]
    fn test_parse_duration_hms() {
        assert_eq!(
            parse_duration("02:30:15").unwrap(),
            Duration::seconds(2 * 3600 + 30 * 60 + 15)
        );
    }

    #[test]
    fn test_parse_duration_numeric_seconds() {
        assert_eq!(parse_duration("7200").unwrap(), Duration::hours(2));
        assert_eq!(parse_duration("1.5").unwrap(), Duration::milliseconds(1500));
    }

    #[test]
    fn test_parse_duration_malformed_is_none() {
        assert_eq!(parse_duration("two hours"), None);
        assert_eq!(parse_duration("02:30"), None);
        assert_eq!(parse_duration("01:99:00"), None);
        assert_eq!(parse_duration("-3600"), None);
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        assert!(parse_timestamp("2024-03-01 08:00:00").is_some());
        assert!(parse_timestamp("2024-03-01T08:00:00").is_some());
        assert!(parse_timestamp("01/03/2024 08:00:00").is_some());
        let midnight = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(midnight.hour(), 0);
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn test_normalize_derives_calendar_fields() {
        let rows = vec![row("78", "2024-03-05 13:15:00", "2024-03-05 15:15:00", "02:00:00")];
        let records = normalize(&rows);

        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.machine, "PET");
        assert_eq!(rec.year, 2024);
        assert_eq!(rec.month, 3);
        assert_eq!(rec.year_month, "2024-03");
        assert_eq!(rec.weekday, 1); // Tuesday, Monday-first indexing
        assert_eq!(rec.weekday_name, "Tuesday");
        assert_eq!(rec.hour, 13);
        assert_eq!(rec.duration, Duration::hours(2));
    }

    #[test]
    fn test_normalize_drops_incomplete_rows() {
        let rows = vec![
            row("78", "2024-03-01 08:00:00", "2024-03-01 10:00:00", "02:00:00"),
            row("78", "garbage", "2024-03-01 10:00:00", "02:00:00"),
            row("78", "2024-03-01 08:00:00", "2024-03-01 10:00:00", "garbage"),
            row("  ", "2024-03-01 08:00:00", "2024-03-01 10:00:00", "02:00:00"),
            RawStoppageRow::default(),
        ];

        let records = normalize(&rows);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_normalize_batching_is_output_equivalent() {
        let rows: Vec<RawStoppageRow> = (0..25)
            .map(|i| {
                row(
                    "79",
                    &format!("2024-01-{:02} 06:00:00", i % 28 + 1),
                    &format!("2024-01-{:02} 07:00:00", i % 28 + 1),
                    "01:00:00",
                )
            })
            .collect();

        let chunked = normalize_batched(&rows, 3);
        let single_pass = normalize_batched(&rows, rows.len());
        assert_eq!(chunked, single_pass);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(3_661)), "01:01:01");
        assert_eq!(format_duration(Duration::zero()), "00:00:00");
        assert_eq!(format_duration(Duration::hours(100)), "100:00:00");
    }
}
