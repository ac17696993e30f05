//! uniclock CLI — event-pair analysis, calendar backtests and pair listings.
//!
//! Commands:
//! - `analyze` — select the governing pair for one price file (or every
//!   instrument of a run file) and print ranges, overlap and trade plans
//! - `backtest` — score every elapsed pair of a calendar against a price file
//! - `pairs` — list the calendar, or only the next few pairs
//!
//! Logs go to stderr; `--json` output on stdout stays machine-readable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use uniclock_core::{AnalysisConfig, EventPair, HorizonSignal, PairCalendar, PairOutcome, Range};
use uniclock_runner::{
    analyze_instrument, backtest_calendar, export_backtest_csv, export_backtest_json, export_json,
    export_run_json, load_prices, run_analysis, AnalysisRequest, BacktestSummary,
    InstrumentReport, RunConfig,
};

#[derive(Parser)]
#[command(
    name = "uniclock",
    version,
    about = "uniclock CLI — Universal Clock event-pair range analysis"
)]
struct Cli {
    /// Debug logging. RUST_LOG takes precedence when set.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    /// Treat this date (YYYY-MM-DD) as today. Defaults to the local date.
    #[arg(long, global = true)]
    today: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one price file, or every instrument of a run file.
    Analyze {
        /// Price CSV (date, open, high, low, close).
        #[arg(long, conflicts_with = "run")]
        prices: Option<PathBuf>,

        /// TOML run file listing several instruments.
        #[arg(long)]
        run: Option<PathBuf>,

        /// Instrument label. Defaults to the price file name.
        #[arg(long)]
        symbol: Option<String>,

        /// Calendar TOML. Defaults to the builtin table.
        #[arg(long)]
        calendar: Option<PathBuf>,

        /// Analysis settings TOML. Defaults to the builtin settings.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Reference date (YYYY-MM-DD). Defaults to today (Live mode).
        #[arg(long)]
        date: Option<String>,

        /// Current price. Defaults to the last close in the price file.
        #[arg(long)]
        price: Option<String>,

        /// Print JSON instead of the text report.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Score every elapsed pair of the calendar against a price file.
    Backtest {
        /// Price CSV (date, open, high, low, close).
        #[arg(long)]
        prices: PathBuf,

        /// Calendar TOML. Defaults to the builtin table.
        #[arg(long)]
        calendar: Option<PathBuf>,

        /// Analysis settings TOML. Defaults to the builtin settings.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Also write one row per pair to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print JSON instead of the text summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List calendar pairs.
    Pairs {
        /// Calendar TOML. Defaults to the builtin table.
        #[arg(long)]
        calendar: Option<PathBuf>,

        /// Only the next N pairs starting after today.
        #[arg(long)]
        upcoming: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let today = parse_date(cli.today.as_deref(), "--today")?
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    match cli.command {
        Commands::Analyze {
            prices,
            run,
            symbol,
            calendar,
            config,
            date,
            price,
            json,
        } => {
            let reference_date = parse_date(date.as_deref(), "--date")?;
            match (prices, run) {
                (Some(prices), None) => run_analyze(
                    &prices,
                    symbol,
                    calendar.as_deref(),
                    config.as_deref(),
                    reference_date,
                    price.as_deref(),
                    json,
                    today,
                ),
                (None, Some(run)) => {
                    if symbol.is_some() || calendar.is_some() || config.is_some() || price.is_some()
                    {
                        bail!("--run takes symbol, calendar, config and price from the run file");
                    }
                    run_analyze_batch(&run, reference_date, json, today)
                }
                _ => bail!("one of --prices or --run is required"),
            }
        }
        Commands::Backtest {
            prices,
            calendar,
            config,
            csv,
            json,
        } => run_backtest_cmd(
            &prices,
            calendar.as_deref(),
            config.as_deref(),
            csv.as_deref(),
            json,
        ),
        Commands::Pairs { calendar, upcoming } => {
            run_pairs(calendar.as_deref(), upcoming, today)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ─── Commands ───────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn run_analyze(
    prices: &Path,
    symbol: Option<String>,
    calendar: Option<&Path>,
    config: Option<&Path>,
    reference_date: Option<NaiveDate>,
    price: Option<&str>,
    json: bool,
    today: NaiveDate,
) -> Result<()> {
    let calendar = load_calendar(calendar)?;
    let config = load_config(config)?;
    let series = load_prices(prices)?;
    let symbol = symbol.unwrap_or_else(|| symbol_from_path(prices));

    let request = AnalysisRequest {
        today,
        reference_date,
        current_price: parse_price(price)?,
    };
    let report = analyze_instrument(&symbol, &series, &calendar, &request, &config)?;

    if json {
        println!("{}", export_json(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn run_analyze_batch(
    run: &Path,
    reference_date: Option<NaiveDate>,
    json: bool,
    today: NaiveDate,
) -> Result<()> {
    let mut config = RunConfig::from_file(run)?;
    if reference_date.is_some() {
        config.reference_date = reference_date;
    }
    let calendar = config.load_calendar()?;

    let summary = run_analysis(&config, &calendar, today);

    if json {
        println!("{}", export_run_json(&summary)?);
    } else {
        for report in &summary.reports {
            print_report(report);
        }
    }

    if !summary.all_succeeded() {
        for failure in &summary.failures {
            eprintln!("Error for {}: {}", failure.symbol, failure.error);
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run_backtest_cmd(
    prices: &Path,
    calendar: Option<&Path>,
    config: Option<&Path>,
    csv: Option<&Path>,
    json: bool,
) -> Result<()> {
    let calendar = load_calendar(calendar)?;
    let config = load_config(config)?;
    let series = load_prices(prices)?;

    let summary = backtest_calendar(&calendar, &series, &config);

    if json {
        println!("{}", export_backtest_json(&summary)?);
    } else {
        print_backtest(&symbol_from_path(prices), &summary);
    }

    if let Some(path) = csv {
        std::fs::write(path, export_backtest_csv(&summary)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), rows = summary.rows.len(), "backtest CSV written");
    }
    Ok(())
}

fn run_pairs(calendar: Option<&Path>, upcoming: Option<usize>, today: NaiveDate) -> Result<()> {
    let calendar = load_calendar(calendar)?;
    let pairs = match upcoming {
        Some(n) => calendar.upcoming(today, n),
        None => calendar.pairs().to_vec(),
    };

    if pairs.is_empty() {
        println!("No pairs start after {today}.");
        return Ok(());
    }

    println!(
        "{:<12} {:<12} {:>6}  {}",
        "Superior", "Inferior", "Days", "Status"
    );
    println!("{}", "-".repeat(42));
    for pair in &pairs {
        println!(
            "{:<12} {:<12} {:>6}  {}",
            pair.superior().to_string(),
            pair.inferior().to_string(),
            pair.interval_days(),
            pair_status(pair, today)
        );
    }
    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────

fn load_calendar(path: Option<&Path>) -> Result<PairCalendar> {
    match path {
        Some(p) => PairCalendar::from_file(p)
            .with_context(|| format!("failed to load calendar {}", p.display())),
        None => Ok(PairCalendar::builtin()),
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(p) => AnalysisConfig::from_file(p)
            .with_context(|| format!("failed to load analysis settings {}", p.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn parse_date(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .with_context(|| format!("{flag} must be YYYY-MM-DD"))
}

fn parse_price(value: Option<&str>) -> Result<Option<Decimal>> {
    let price = value
        .map(Decimal::from_str)
        .transpose()
        .context("--price must be a decimal number")?;
    if let Some(p) = price {
        if p.is_sign_negative() {
            bail!("--price must not be negative, got {p}");
        }
    }
    Ok(price)
}

fn symbol_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "?".into())
}

fn pair_status(pair: &EventPair, today: NaiveDate) -> &'static str {
    if today < pair.superior() {
        "upcoming"
    } else if today <= pair.inferior() {
        "active"
    } else {
        "elapsed"
    }
}

fn fmt_pct(pct: Option<Decimal>) -> String {
    pct.map(|p| format!("{:.1}%", p))
        .unwrap_or_else(|| "n/a".into())
}

fn fmt_range(range: Option<&Range>) -> String {
    match range {
        Some(r) => format!("{:.2} - {:.2} (bars of {})", r.low, r.high, r.source_date),
        None => "no price data".into(),
    }
}

fn fmt_signal(sig: &HorizonSignal) -> String {
    let plan = match sig.target {
        Some(t) => format!(
            "{:<4} -> {:.2} ({})",
            sig.action.to_string(),
            t,
            fmt_pct(sig.move_to_target_pct)
        ),
        None => "HOLD (inside range)".to_string(),
    };
    format!(
        "{:<28} sell > {:.2}, buy < {:.2}",
        plan, sig.sell_above, sig.buy_below
    )
}

fn print_report(report: &InstrumentReport) {
    let a = &report.analysis;
    let mode = if a.is_live() { "Live" } else { "Historical" };

    println!();
    println!("=== {} ({} mode) ===", report.symbol, mode);
    println!("Reference date: {}", report.reference_date);
    match report.last_bar_date {
        Some(last) => println!("Bars:           {} (last {})", report.bar_count, last),
        None => println!("Bars:           0"),
    }
    println!(
        "Pair:           {} ({} days)",
        a.pair,
        a.pair.interval_days()
    );
    println!("Current price:  {:.2}", a.current_price);
    println!();
    println!("--- Ranges ---");
    println!("Superior #1:    {}", fmt_range(a.range1.as_ref()));
    println!("Inferior #2:    {}", fmt_range(a.range2.as_ref()));
    match a.outcome() {
        PairOutcome::Confirmed => println!("Overlap:        yes ({})", fmt_pct(a.overlap_pct)),
        PairOutcome::Missed => println!("Overlap:        no"),
        PairOutcome::Pending => println!("Overlap:        pending"),
    }
    println!();
    println!("--- Trade plans ---");
    match &a.signals {
        Some(s) => {
            println!("Intraday:       {}", fmt_signal(&s.intraday));
            println!("Short-term:     {}", fmt_signal(&s.short_term));
            println!("Long-term:      {}", fmt_signal(&s.long_term));
        }
        None => println!("Superior date not in price history yet."),
    }
    if !report.upcoming.is_empty() {
        println!();
        println!("--- Upcoming pairs ---");
        for up in &report.upcoming {
            println!("{} ({} days)", up.pair, up.interval_days);
        }
    }
    println!();
}

fn print_backtest(symbol: &str, summary: &BacktestSummary) {
    println!();
    println!("=== Calendar backtest: {symbol} ===");
    println!(
        "{:<12} {:<12} {:>6}  {:<22} {:<22} {:>8}  {}",
        "Superior", "Inferior", "Days", "Range #1", "Range #2", "Overlap", "Outcome"
    );
    println!("{}", "-".repeat(98));
    for row in &summary.rows {
        let a = &row.analysis;
        println!(
            "{:<12} {:<12} {:>6}  {:<22} {:<22} {:>8}  {}",
            a.pair.superior().to_string(),
            a.pair.inferior().to_string(),
            a.pair.interval_days(),
            short_range(a.range1.as_ref()),
            short_range(a.range2.as_ref()),
            fmt_pct(a.overlap_pct),
            row.outcome
        );
    }
    println!();
    println!("Confirmed:      {}", summary.confirmed);
    println!("Missed:         {}", summary.missed);
    println!("Pending:        {}", summary.pending);
    println!("Hit rate:       {}", fmt_pct(summary.hit_rate_pct));
    println!("Mean overlap:   {}", fmt_pct(summary.mean_overlap_pct));
    println!();
}

fn short_range(range: Option<&Range>) -> String {
    range
        .map(|r| format!("{:.2}-{:.2}", r.low, r.high))
        .unwrap_or_else(|| "-".into())
}
