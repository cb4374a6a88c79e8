//! flux - Generate a cash-flow report from a ledger.
//!
//! # Usage
//!
//! ```bash
//! flux ledger.json
//! flux --layout averaged --partition per-contribution ledger.json
//! flux --divisor 12 -o yearly.csv ledger.json
//! ```
//!
//! Every transaction that moves money between an asset account (named by a
//! prefix in the asset list) and any other account is attributed to that
//! other account. The report has one row per account and one column per
//! closed period; the current period is left out.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use flux_core::Granularity;
use flux_engine::{
    generate, parse_rate, write_report, AssetList, AverageDivisor, Closure, Layout,
    PartitionMode, ReportOptions,
};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Output layout.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LayoutArg {
    /// Account name and one value per period
    Plain,
    /// Adds a numeric average column
    Averaged,
    /// Adds average, sparkline and percent formulas plus summary rows
    #[default]
    Spreadsheet,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Plain => Self::Plain,
            LayoutArg::Averaged => Self::Averaged,
            LayoutArg::Spreadsheet => Self::Spreadsheet,
        }
    }
}

/// Which periods are closed.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ClosureArg {
    /// Only periods before the current one
    #[default]
    Strict,
    /// The current period as well
    Inclusive,
}

impl From<ClosureArg> for Closure {
    fn from(arg: ClosureArg) -> Self {
        match arg {
            ClosureArg::Strict => Self::Strict,
            ClosureArg::Inclusive => Self::Inclusive,
        }
    }
}

/// How accounts are grouped.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum PartitionArg {
    /// Route every value by its own sign
    PerContribution,
    /// Group each account by the sign of its total
    #[default]
    NetTotal,
    /// A single block of accounts
    Undivided,
}

impl From<PartitionArg> for PartitionMode {
    fn from(arg: PartitionArg) -> Self {
        match arg {
            PartitionArg::PerContribution => Self::PerContribution,
            PartitionArg::NetTotal => Self::NetTotal,
            PartitionArg::Undivided => Self::Undivided,
        }
    }
}

/// Divisor of the average column.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum AveragingArg {
    /// Elapsed periods from first to last activity
    #[default]
    Span,
    /// Report columns from first to last activity
    Columns,
}

impl From<AveragingArg> for AverageDivisor {
    fn from(arg: AveragingArg) -> Self {
        match arg {
            AveragingArg::Span => Self::Span,
            AveragingArg::Columns => Self::Columns,
        }
    }
}

/// Width of a report column.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum GranularityArg {
    /// One column per month
    #[default]
    Month,
    /// One column per calendar quarter
    Quarter,
    /// One column per year
    Year,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Month => Self::Month,
            GranularityArg::Quarter => Self::Quarter,
            GranularityArg::Year => Self::Year,
        }
    }
}

/// Generate a cash-flow report from a ledger.
#[derive(Parser, Debug)]
#[command(name = "flux")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The ledger document (JSON, optionally gzip-compressed)
    #[arg(value_name = "LEDGER")]
    pub ledger: PathBuf,

    /// File listing asset account prefixes, one per line
    #[arg(long, value_name = "FILE", default_value = "assets.txt")]
    pub assets: PathBuf,

    /// Where to write the report (`-` for stdout)
    #[arg(short, long, value_name = "FILE", default_value = "flux.csv")]
    pub output: PathBuf,

    /// Output layout
    #[arg(long, value_enum, default_value_t)]
    pub layout: LayoutArg,

    /// Whether the current period is included
    #[arg(long, value_enum, default_value_t)]
    pub closure: ClosureArg,

    /// How accounts are grouped into positive and negative flows
    #[arg(long, value_enum, default_value_t)]
    pub partition: PartitionArg,

    /// Divisor of the average column
    #[arg(long, value_enum, default_value_t)]
    pub averaging: AveragingArg,

    /// Width of a report column
    #[arg(long, value_enum, default_value_t)]
    pub granularity: GranularityArg,

    /// Currency multiplier, e.g. `USD=5.22` (can be specified multiple times)
    #[arg(long = "rate", value_name = "CODE=RATE", value_parser = parse_rate_arg)]
    pub rates: Vec<(String, Decimal)>,

    /// Divide every value by this constant after conversion
    #[arg(long, value_name = "N")]
    pub divisor: Option<Decimal>,

    /// Date used to decide which period is still open (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log every classification decision
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Report options selected by the flags.
    pub fn report_options(&self) -> Result<ReportOptions> {
        let mut builder = ReportOptions::builder()
            .layout(self.layout.into())
            .closure(self.closure.into())
            .partition(self.partition.into())
            .averaging(self.averaging.into())
            .granularity(self.granularity.into())
            .divisor(self.divisor);
        for (code, rate) in &self.rates {
            builder = builder.rate(code.clone(), *rate);
        }
        builder.build().context("invalid report options")
    }
}

fn parse_rate_arg(s: &str) -> Result<(String, Decimal), String> {
    parse_rate(s).map_err(|e| e.to_string())
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = if args.verbose { "flux=debug" } else { "flux=info" };
    let filter = EnvFilter::from_default_env().add_directive(level.parse()?);

    match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Main entry point for the report command.
pub fn main() -> ExitCode {
    let args = Args::parse();

    match init_tracing(&args).and_then(|()| run(&args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let options = args.report_options()?;

    let assets = AssetList::load(&args.assets).context("failed to load asset list")?;
    info!(prefixes = assets.len(), path = %args.assets.display(), "loaded asset list");

    let book = flux_loader::load(&args.ledger)
        .with_context(|| format!("failed to load {}", args.ledger.display()))?;

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let report = generate(&book, &assets, &options, today)
        .with_context(|| format!("failed to build report for {}", args.ledger.display()))?;

    if args.output == Path::new("-") {
        let mut stdout = io::stdout().lock();
        stdout.write_all(report.as_bytes())?;
        stdout.flush()?;
    } else {
        write_report(&args.output, &report)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["flux", "ledger.json"]);
        assert_eq!(args.assets, PathBuf::from("assets.txt"));
        assert_eq!(args.output, PathBuf::from("flux.csv"));
        assert_eq!(args.report_options().unwrap(), ReportOptions::default());
    }

    #[test]
    fn test_flags_map_onto_options() {
        let args = Args::parse_from([
            "flux",
            "--layout",
            "plain",
            "--closure",
            "inclusive",
            "--partition",
            "per-contribution",
            "--averaging",
            "columns",
            "--granularity",
            "quarter",
            "--rate",
            "USD=1",
            "--rate",
            "GBP=7.5",
            "--divisor",
            "12",
            "ledger.json",
        ]);
        let options = args.report_options().unwrap();
        assert_eq!(options.layout, Layout::Plain);
        assert_eq!(options.closure, Closure::Inclusive);
        assert_eq!(options.partition, PartitionMode::PerContribution);
        assert_eq!(options.averaging, AverageDivisor::Columns);
        assert_eq!(options.granularity, Granularity::Quarter);
        assert_eq!(options.rates.multiplier("USD"), Decimal::ONE);
        assert_eq!(options.rates.multiplier("GBP"), Decimal::new(75, 1));
        assert_eq!(options.rates.multiplier("EUR"), Decimal::new(615, 2));
        assert_eq!(options.divisor, Some(Decimal::from(12)));
    }

    #[test]
    fn test_bad_rate_is_rejected() {
        assert!(Args::try_parse_from(["flux", "--rate", "USD", "ledger.json"]).is_err());
    }

    #[test]
    fn test_zero_divisor_is_rejected() {
        let args = Args::parse_from(["flux", "--divisor", "0", "ledger.json"]);
        assert!(args.report_options().is_err());
    }

    #[test]
    fn test_today_override() {
        let args = Args::parse_from(["flux", "--today", "2020-04-01", "ledger.json"]);
        assert_eq!(args.today, NaiveDate::from_ymd_opt(2020, 4, 1));
    }
}
