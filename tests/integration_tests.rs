use chrono::Duration;
use oee_rater::analysis::compare::{Direction, Metric, compare_periods};
use oee_rater::analysis::metrics::compute_snapshot;
use oee_rater::analysis::schedule::scheduled_time;
use oee_rater::filter::{DateRange, ExtraFilters, MachineFilter, PeriodFilter, filter};
use oee_rater::record::{RawStoppageRow, StoppageRecord, normalize, parse_timestamp};

fn load_fixture() -> Vec<StoppageRecord> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/stoppages.csv");
    let mut rdr = csv::Reader::from_path(path).expect("failed to open fixture");

    let rows: Vec<RawStoppageRow> = rdr
        .deserialize()
        .collect::<Result<_, _>>()
        .expect("failed to read fixture rows");

    normalize(&rows)
}

fn day_range(start: &str, end: &str) -> DateRange {
    DateRange::new(
        parse_timestamp(&format!("{} 00:00:00", start)).unwrap(),
        parse_timestamp(&format!("{} 23:59:59", end)).unwrap(),
    )
    .unwrap()
}

#[test]
fn test_normalization_drops_broken_rows_and_maps_machines() {
    let records = load_fixture();

    // 10 raw rows, one with an unparseable duration and missing end
    assert_eq!(records.len(), 9);
    assert!(records.iter().all(|r| r.machine != "Machine 78"));
    assert!(records.iter().any(|r| r.machine == "PET"));
    assert!(records.iter().any(|r| r.machine == "Machine 99"));
}

#[test]
fn test_march_snapshot_for_pet() {
    let records = load_fixture();

    let period = PeriodFilter::Range(day_range("2024-03-01", "2024-03-05"));
    let data = filter(
        &records,
        &MachineFilter::Name("PET".to_string()),
        &period,
        &ExtraFilters::default(),
    );
    assert_eq!(data.len(), 5);

    let scheduled = scheduled_time(&data, &period);
    assert_eq!(scheduled, Duration::hours(120));

    let snapshot = compute_snapshot(&data, scheduled, Duration::hours(1));

    // 10h of PCP downtime against a 120h schedule
    assert!((snapshot.availability - 91.666_666_666_666_67).abs() < 1e-9);
    assert_eq!(snapshot.efficiency, 100.0);
    assert!((snapshot.mtbf_hours - 22.0).abs() < 1e-9);
    assert!((snapshot.mttr_hours - 2.0).abs() < 1e-9);
    assert_eq!(snapshot.total_stoppages, 5);
    assert_eq!(snapshot.total_downtime_hours, 10.0);

    // every stoppage is 2h, all strictly over the 1h limit
    assert_eq!(snapshot.critical_stoppages.len(), 5);
    assert_eq!(snapshot.critical_percentage, 100.0);

    // all stoppages start at 08:00
    assert_eq!(snapshot.shift_distribution[0], ("06:00-14:00".to_string(), 5));
    assert_eq!(snapshot.shift_distribution[2], ("22:00-06:00".to_string(), 0));

    assert!(!snapshot.recommendations.is_empty());
}

#[test]
fn test_month_key_and_range_filters_agree() {
    let records = load_fixture();
    let machine = MachineFilter::All;

    let by_month = filter(
        &records,
        &machine,
        &PeriodFilter::Month("2024-03".to_string()),
        &ExtraFilters::default(),
    );
    let by_range = filter(
        &records,
        &machine,
        &PeriodFilter::Range(day_range("2024-03-01", "2024-03-31")),
        &ExtraFilters::default(),
    );

    assert_eq!(by_month, by_range);
}

#[test]
fn test_period_comparison_end_to_end() {
    let records = load_fixture();
    let machine = MachineFilter::Name("PET".to_string());

    let period1 = PeriodFilter::Range(day_range("2024-03-01", "2024-03-05"));
    let period2 = PeriodFilter::Range(day_range("2024-04-10", "2024-04-12"));

    let data1 = filter(&records, &machine, &period1, &ExtraFilters::default());
    let data2 = filter(&records, &machine, &period2, &ExtraFilters::default());
    assert_eq!(data1.len(), 5);
    assert_eq!(data2.len(), 3);

    let result =
        compare_periods(&data1, &period1, &data2, &period2, Duration::hours(1)).unwrap();

    // fewer stoppages and less downtime in period 2
    let stoppages = result
        .deltas
        .iter()
        .find(|d| d.metric == Metric::TotalStoppages)
        .unwrap();
    assert_eq!(stoppages.value1, 5.0);
    assert_eq!(stoppages.value2, 3.0);
    assert_eq!(stoppages.direction(), Direction::Improved);

    // period 2 has no PCP downtime at all
    let availability = result
        .deltas
        .iter()
        .find(|d| d.metric == Metric::Availability)
        .unwrap();
    assert_eq!(availability.value2, 100.0);
    assert_eq!(availability.direction(), Direction::Improved);

    assert!(result.performance_score > 0.0);
    assert!(result.verdict.contains("improved"));
}

#[test]
fn test_comparison_against_empty_period_is_none() {
    let records = load_fixture();
    let machine = MachineFilter::Name("PET".to_string());

    let period1 = PeriodFilter::Range(day_range("2024-03-01", "2024-03-05"));
    let period2 = PeriodFilter::Range(day_range("2025-01-01", "2025-01-31"));

    let data1 = filter(&records, &machine, &period1, &ExtraFilters::default());
    let data2 = filter(&records, &machine, &period2, &ExtraFilters::default());
    assert!(data2.is_empty());

    assert!(compare_periods(&data1, &period1, &data2, &period2, Duration::hours(1)).is_none());
}
