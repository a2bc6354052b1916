mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use commands::amortization::{AmortizationTableArgs, NextDueArgs, ProjectArgs};
use commands::ledger::{AppendArgs, RecomputeArgs, SummaryArgs};
use commands::lending::{CollectArgs, DisburseArgs, OriginateArgs, SettleArgs};
use commands::redirection::RedirectionStatusArgs;
use commands::treasury::ReconcileArgs;

/// Loan projection, ledger and treasury checks
#[derive(Parser)]
#[command(
    name = "lend",
    version,
    about = "Loan projection, ledger and treasury checks",
    long_about = "A CLI over the lending core: installment projections and \
                  amortization tables, payment schedules, ledger balance \
                  recomputation, redirection status and treasury reconciliation. \
                  Every command reads flags, a JSON file via --input, or JSON on stdin."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Lending defaults and limits (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log at debug level (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Project installment amount and total interest for a loan
    Project(ProjectArgs),
    /// Installment-by-installment amortization table
    AmortizationTable(AmortizationTableArgs),
    /// Next due date(s) after a given date
    NextDue(NextDueArgs),
    /// Append an event to a client's ledger chain
    Append(AppendArgs),
    /// Recompute (or verify) every balance in a client's chain
    Recompute(RecomputeArgs),
    /// Redirection state and remaining grace days for a client
    RedirectionStatus(RedirectionStatusArgs),
    /// Apply a ledger entry's cash effect to a treasury account
    Reconcile(ReconcileArgs),
    /// Portfolio totals and orphaned redirection legs
    Summary(SummaryArgs),
    /// Register a client and book their first loan
    Originate(OriginateArgs),
    /// Lend more to an existing client
    Disburse(DisburseArgs),
    /// Record a payment collection
    Collect(CollectArgs),
    /// Close a loan
    Settle(SettleArgs),
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

fn init_tracing(verbose: bool, log_json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // stdout carries command output; logs stay on stderr
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Project(args) => commands::amortization::run_project(args, &config),
        Commands::AmortizationTable(args) => {
            commands::amortization::run_amortization_table(args, &config)
        }
        Commands::NextDue(args) => commands::amortization::run_next_due(args),
        Commands::Append(args) => commands::ledger::run_append(args),
        Commands::Recompute(args) => commands::ledger::run_recompute(args),
        Commands::RedirectionStatus(args) => commands::redirection::run_redirection_status(args),
        Commands::Reconcile(args) => commands::treasury::run_reconcile(args),
        Commands::Summary(args) => commands::ledger::run_summary(args),
        Commands::Originate(args) => commands::lending::run_originate(args, &config),
        Commands::Disburse(args) => commands::lending::run_disburse(args, &config),
        Commands::Collect(args) => commands::lending::run_collect(args),
        Commands::Settle(args) => commands::lending::run_settle(args),
        Commands::Version => {
            println!("lend {}", env!("CARGO_PKG_VERSION"));
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
            process::exit(1);
        }
    }
}
