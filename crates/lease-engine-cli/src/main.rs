mod commands;
mod input;
mod output;
mod settings;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use lease_engine_core::LeaseEngineError;

use commands::rates::{
    BucketArgs, ConvertRateArgs, RateMatrixArgs, ResolveRateArgs, RollRateTableArgs,
};
use commands::register::FilterLeasesArgs;
use commands::schedule::{AmortizationArgs, PvScheduleArgs, ScheduleArgs};
use settings::{ConventionArg, Settings};

/// Lease discount rates and IFRS 16 / ASC 842 schedules
#[derive(Parser)]
#[command(
    name = "lease",
    version,
    about = "Lease discount-rate resolution and amortization schedules",
    long_about = "Resolves a lease's discount rate from versioned rate tables by lease-term \
                  bucket and payment frequency, then computes the present-value schedule \
                  and the monthly liability / right-of-use amortization with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Schedule configuration file (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Periodic-rate convention, overriding the configuration
    #[arg(long, global = true)]
    convention: Option<ConventionArg>,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a lease term onto its rate-table bucket
    Bucket(BucketArgs),
    /// Convert a yearly rate into per-payment-period rates
    ConvertRate(ConvertRateArgs),
    /// Resolve (or override) the discount rate for a lease
    ResolveRate(ResolveRateArgs),
    /// Per-frequency payment rates for every bucket of a rate table
    RateMatrix(RateMatrixArgs),
    /// Start a new current rate table carrying the previous rates forward
    RollRateTable(RollRateTableArgs),
    /// Present-value schedule for a lease with a known discount rate
    PvSchedule(PvScheduleArgs),
    /// Monthly liability and right-of-use amortization
    Amortization(AmortizationArgs),
    /// Resolve the rate if needed and produce both schedules with totals
    Schedule(ScheduleArgs),
    /// Filter a lease register
    FilterLeases(FilterLeasesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Diagnostics go to stderr so stdout stays machine-readable. `RUST_LOG`
/// picks the level; `LEASE_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let log_format = std::env::var("LEASE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref(), cli.convention) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Bucket(args) => commands::rates::run_bucket(args),
        Commands::ConvertRate(args) => commands::rates::run_convert_rate(args, &settings),
        Commands::ResolveRate(args) => commands::rates::run_resolve_rate(args, &settings),
        Commands::RateMatrix(args) => commands::rates::run_rate_matrix(args, &settings),
        Commands::RollRateTable(args) => commands::rates::run_roll_rate_table(args),
        Commands::PvSchedule(args) => commands::schedule::run_pv_schedule(args, &settings),
        Commands::Amortization(args) => commands::schedule::run_amortization(args, &settings),
        Commands::Schedule(args) => commands::schedule::run_schedule(args, &settings),
        Commands::FilterLeases(args) => commands::register::run_filter_leases(args),
        Commands::Version => {
            println!("lease {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            if let Some(engine_err) = e.downcast_ref::<LeaseEngineError>() {
                if engine_err.is_recoverable() {
                    eprintln!(
                        "{}: supply a manual rate with --discount-rate or resolve-rate --override-rate",
                        "hint".yellow().bold()
                    );
                }
            }
            process::exit(1);
        }
    }
}
