mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::bond::{PriceArgs, ScheduleArgs};
use commands::report::ReportArgs;

/// Bond trade pricing
#[derive(Parser)]
#[command(
    name = "bondpx",
    version,
    about = "Bond trade pricing: coupon schedules, buy/sell prices and pricing reports",
    long_about = "Prices a bond holding from its bond and trade terms. Builds the coupon \
                  schedule, discounts cashflows under the chosen discount method, applies \
                  client tax and trading fees, and writes spreadsheet-style reports."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine decisions to stderr (same as RUST_LOG=debug)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the coupon schedule for a bond
    Schedule(ScheduleArgs),
    /// Price a trade: buy/sell prices, coupon income, investment table
    Price(PriceArgs),
    /// Write the pricing report, one CSV file per sheet
    Report(ReportArgs),
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

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::bond::run_schedule(args),
        Commands::Price(args) => commands::bond::run_price(args),
        Commands::Report(args) => commands::report::run_report(args),
        Commands::Version => {
            println!("bondpx {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
