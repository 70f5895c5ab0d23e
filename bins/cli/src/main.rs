//! POS reporting command-line front end.
//!
//! Usage:
//!   posrecon ingest --kind merchant --date 2025-11-03 --file extract.csv
//!   posrecon rates set --vc 50 --mc 40 --cup 7
//!   posrecon export top-grand-total --format json
//!   posrecon missing-dates --kind branch
//!
//! Exits with status 2 when the request itself was rejected (bad input,
//! duplicate batch, stale rates) and 1 on any other failure.

mod commands;
mod tabular;

use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use posrecon_core::ledger::ReportKind;
use posrecon_shared::{AppConfig, AppError};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "posrecon")]
#[command(about = "Daily POS report ingestion, reconciliation and exports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a daily extract and write the merged report.
    Ingest {
        /// Extract layout.
        #[arg(long, value_enum)]
        kind: KindArg,
        /// Transaction date (YYYY-MM-DD).
        #[arg(long)]
        date: String,
        /// CSV extract to ingest.
        #[arg(long, short = 'f')]
        file: std::path::PathBuf,
    },
    /// Exchange rate maintenance.
    Rates {
        #[command(subcommand)]
        command: RatesCommand,
    },
    /// Export a report table as CSV or JSON.
    Export(ExportArgs),
    /// List days without an ingested report as JSON.
    MissingDates {
        /// Extract layout to check.
        #[arg(long, value_enum, default_value = "merchant")]
        kind: KindArg,
    },
}

#[derive(Subcommand)]
enum RatesCommand {
    /// Set all three rates at once.
    Set {
        /// Visa rate.
        #[arg(long)]
        vc: Decimal,
        /// Mastercard rate.
        #[arg(long)]
        mc: Decimal,
        /// UnionPay rate.
        #[arg(long)]
        cup: Decimal,
        /// Day the rates apply to; defaults to today (UTC).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Args)]
struct ExportArgs {
    /// Report to export.
    #[arg(value_enum)]
    report: ExportReport,
    /// Restrict history to one terminal.
    #[arg(long)]
    terminal: Option<String>,
    /// First day included.
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day included.
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Ledger partition for the top-by-transaction exports.
    #[arg(long, value_enum, default_value = "merchant")]
    kind: KindArg,
    /// Output file format.
    #[arg(long, value_enum, default_value = "csv")]
    format: tabular::TableFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Merchant,
    Branch,
}

impl From<KindArg> for ReportKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Merchant => Self::Merchant,
            KindArg::Branch => Self::Branch,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportReport {
    MerchantHistory,
    BranchHistory,
    TopGrandTotal,
    TopTxnCount,
    TopTxnAmount,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "posrecon=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_status(&err))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let db = posrecon_db::connect_with(&config.database).await?;
    let ctx = commands::Context::new(db, config.reporting);

    match cli.command {
        Command::Ingest { kind, date, file } => ctx.ingest(kind.into(), date, &file).await,
        Command::Rates {
            command: RatesCommand::Set { vc, mc, cup, date },
        } => ctx.set_rates(vc, mc, cup, date).await,
        Command::Export(args) => ctx.export(args).await,
        Command::MissingDates { kind } => ctx.missing_dates(kind.into()).await,
    }
}

fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<AppError>() {
        Some(app) if app.is_client_error() => 2,
        _ => 1,
    }
}
