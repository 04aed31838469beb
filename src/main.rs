use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use household_ledger::{logging, parse, DashboardReport, LedgerDataset};

#[derive(Parser)]
#[command(
    name = "household-ledger",
    version,
    about = "Parse and total the currency strings of a household finance dashboard"
)]
struct Cli {
    /// Ledger dataset (JSON); the built-in sample household when omitted
    #[arg(short, long, global = true, env = "HOUSEHOLD_LEDGER")]
    ledger: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dashboard report (default)
    Report,

    /// Parse one or more amount strings
    Parse {
        /// Amounts such as "$1,800.00 (Monthly)"
        #[arg(required = true)]
        amounts: Vec<String>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    match cli.command.unwrap_or(Commands::Report) {
        Commands::Report => report(cli.ledger, cli.format),
        Commands::Parse { amounts } => parse_amounts(&amounts, cli.format),
    }
}

fn report(ledger: Option<PathBuf>, format: Format) -> Result<ExitCode> {
    let dataset = match ledger {
        Some(path) => LedgerDataset::load(&path)
            .with_context(|| format!("loading ledger {}", path.display()))?,
        None => LedgerDataset::sample().context("loading built-in sample ledger")?,
    };
    let report = DashboardReport::build(&dataset);

    match format {
        Format::Text => print!("{}", report),
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(ExitCode::SUCCESS)
}

fn parse_amounts(amounts: &[String], format: Format) -> Result<ExitCode> {
    let mut failed = false;
    for raw in amounts {
        match (parse(raw), format) {
            (Ok(amount), Format::Text) => {
                print!("{:?} -> {}", raw, amount.primary());
                if let Some(secondary) = amount.secondary() {
                    print!(", secondary {}", secondary);
                }
                if let Some(cadence) = amount.cadence() {
                    print!(", cadence {}", cadence);
                }
                println!();
            }
            (Ok(amount), Format::Json) => println!("{}", serde_json::to_string(&amount)?),
            (Err(err), _) => {
                failed = true;
                eprintln!("error: {}", err);
            }
        }
    }
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
