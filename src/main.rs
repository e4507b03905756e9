//! CLI entry point for the OEE rater tool.
//!
//! Provides subcommands for computing a metrics snapshot from a stoppage
//! table, comparing two periods, and paging through normalized records.

use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use oee_rater::analysis::compare::compare_periods;
use oee_rater::analysis::metrics::compute_snapshot;
use oee_rater::analysis::schedule::scheduled_time;
use oee_rater::filter::{DateRange, ExtraFilters, MachineFilter, PeriodFilter, filter, paginate};
use oee_rater::output::{print_json, write_json};
use oee_rater::record::{RawStoppageRow, StoppageRecord, normalize};
use serde::Serialize;
use std::ffi::OsStr;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "oee_rater")]
#[command(about = "A tool to analyze machine downtime event tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a metrics snapshot from a stoppage CSV
    Analyze {
        /// Path to the stoppage CSV table
        #[arg(value_name = "CSV")]
        source: String,

        /// Restrict the analysis to one machine (exact name)
        #[arg(short, long)]
        machine: Option<String>,

        /// Restrict the analysis to one month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,

        /// Start of an explicit date range (YYYY-MM-DD); overrides --month
        #[arg(long)]
        start: Option<String>,

        /// End of an explicit date range (YYYY-MM-DD), inclusive
        #[arg(long)]
        end: Option<String>,

        /// Critical-stoppage threshold in hours
        #[arg(long, default_value_t = 1.0)]
        critical_hours: f64,

        /// Only count stoppages that started on a weekend
        #[arg(long, default_value_t = false)]
        weekend_only: bool,

        /// Only count stoppages that started during the night shift
        #[arg(long, default_value_t = false)]
        night_shift_only: bool,

        /// Only count stoppages owned by this responsible area
        #[arg(long)]
        area: Option<String>,

        /// Write the snapshot JSON here instead of logging it
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Compare metrics across two date ranges of the same table
    Compare {
        /// Path to the stoppage CSV table
        #[arg(value_name = "CSV")]
        source: String,

        /// Restrict the comparison to one machine (exact name)
        #[arg(short, long)]
        machine: Option<String>,

        /// Period 1 start (YYYY-MM-DD)
        #[arg(long)]
        start1: String,

        /// Period 1 end (YYYY-MM-DD), inclusive
        #[arg(long)]
        end1: String,

        /// Period 2 start (YYYY-MM-DD)
        #[arg(long)]
        start2: String,

        /// Period 2 end (YYYY-MM-DD), inclusive
        #[arg(long)]
        end2: String,

        /// Critical-stoppage threshold in hours
        #[arg(long, default_value_t = 1.0)]
        critical_hours: f64,

        /// Write the comparison JSON here instead of logging it
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Page through normalized records
    View {
        /// Path to the stoppage CSV table
        #[arg(value_name = "CSV")]
        source: String,

        /// Restrict the listing to one machine (exact name)
        #[arg(short, long)]
        machine: Option<String>,

        /// Restrict the listing to one month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,

        /// 1-indexed page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Records per page
        #[arg(long, default_value_t = 50)]
        page_size: usize,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/oee_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("oee_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            source,
            machine,
            month,
            start,
            end,
            critical_hours,
            weekend_only,
            night_shift_only,
            area,
            output,
        } => {
            let records = load_records(&source)?;

            let range = parse_range(start.as_deref(), end.as_deref())?;
            let period = PeriodFilter::from_selection(month.as_deref(), range);
            let extra = ExtraFilters {
                weekend_only,
                night_shift_only,
                area,
            };

            let filtered = filter(&records, &machine_filter(machine), &period, &extra);
            info!(selected = filtered.len(), "Records selected for analysis");

            let scheduled = scheduled_time(&filtered, &period);
            let snapshot = compute_snapshot(&filtered, scheduled, critical_limit(critical_hours));

            emit(&snapshot, output.as_deref())?;
        }
        Commands::Compare {
            source,
            machine,
            start1,
            end1,
            start2,
            end2,
            critical_hours,
            output,
        } => {
            let records = load_records(&source)?;
            let machine = machine_filter(machine);

            let period1 = PeriodFilter::Range(parse_day_range(&start1, &end1)?);
            let period2 = PeriodFilter::Range(parse_day_range(&start2, &end2)?);

            let data1 = filter(&records, &machine, &period1, &ExtraFilters::default());
            let data2 = filter(&records, &machine, &period2, &ExtraFilters::default());
            info!(
                period1 = data1.len(),
                period2 = data2.len(),
                "Records selected for comparison"
            );

            match compare_periods(
                &data1,
                &period1,
                &data2,
                &period2,
                critical_limit(critical_hours),
            ) {
                Some(result) => emit(&result, output.as_deref())?,
                None => warn!("One of the periods has no records; nothing to compare"),
            }
        }
        Commands::View {
            source,
            machine,
            month,
            page,
            page_size,
        } => {
            let records = load_records(&source)?;

            let period = PeriodFilter::from_selection(month.as_deref(), None);
            let filtered = filter(
                &records,
                &machine_filter(machine),
                &period,
                &ExtraFilters::default(),
            );

            let page = paginate(&filtered, page, page_size);
            info!(
                page = page.page,
                total_pages = page.total_pages,
                total_items = page.total_items,
                "Page selected"
            );
            print_json(&page)?;
        }
    }

    Ok(())
}

/// Loads and normalizes a stoppage CSV table.
fn load_records(path: &str) -> Result<Vec<StoppageRecord>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path))?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut rows: Vec<RawStoppageRow> = Vec::new();
    for result in rdr.deserialize() {
        let row: RawStoppageRow = result?;
        rows.push(row);
    }

    let records = normalize(&rows);
    info!(
        raw = rows.len(),
        normalized = records.len(),
        dropped = rows.len() - records.len(),
        "Table normalized"
    );

    Ok(records)
}

fn machine_filter(machine: Option<String>) -> MachineFilter {
    match machine {
        Some(name) => MachineFilter::Name(name),
        None => MachineFilter::All,
    }
}

fn critical_limit(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0) as i64)
}

fn parse_range(start: Option<&str>, end: Option<&str>) -> Result<Option<DateRange>> {
    match (start, end) {
        (Some(start), Some(end)) => Ok(Some(parse_day_range(start, end)?)),
        (None, None) => Ok(None),
        _ => bail!("--start and --end must be provided together"),
    }
}

/// Parses an inclusive day range; the end day extends to its last second.
fn parse_day_range(start: &str, end: &str) -> Result<DateRange> {
    let start = parse_day(start)?.and_hms_opt(0, 0, 0).unwrap();
    let end = parse_day(end)?.and_hms_opt(23, 59, 59).unwrap();

    Ok(DateRange::new(start, end)?)
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date {:?}, expected YYYY-MM-DD", raw))
}

fn emit<T: Serialize>(value: &T, output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            write_json(path, value)?;
            info!(path, "Result written");
            Ok(())
        }
        None => print_json(value),
    }
}
