use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use refund_recon::application::engine::RefundEngine;
use refund_recon::config::{AppConfig, load_fee_schedule};
use refund_recon::domain::ports::ExceptionRepository;
use refund_recon::domain::query::{RecordFilter, Selection, SortKey};
use refund_recon::domain::record::RefundOverrides;
use refund_recon::domain::refund::RefundRequest;
use refund_recon::domain::taxonomy::{ErrorCategory, ErrorStatus, RefundFailureReason};
use refund_recon::infrastructure::in_memory::InMemoryExceptionRepository;
use refund_recon::interfaces::csv::record_reader::RecordReader;
use refund_recon::interfaces::csv::record_writer::{RecordWriter, ReportWriter};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Exception records CSV file
    input: PathBuf,

    /// JSON fee schedule overriding the built-in gas and price tables
    #[arg(long)]
    fee_schedule: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List matching records with their refund figures
    Query {
        /// Matches transaction hash, sender or recipient address
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "")]
        order_id: String,
        #[arg(long, default_value = "all")]
        status: Selection<ErrorStatus>,
        #[arg(long, default_value = "all")]
        category: Selection<ErrorCategory>,
        /// recent, amount or status
        #[arg(long, default_value = "recent")]
        sort: SortKey,
    },
    /// Count records per status
    Stats,
    /// Net refund figures for one record
    Summary {
        #[arg(long)]
        id: String,
    },
    /// Submit a refund for a pending or failed record
    Refund {
        #[arg(long)]
        id: String,
        /// Confirm as an operator instead of the automatic route
        #[arg(long)]
        operator: bool,
        #[arg(long)]
        wallet_address: Option<String>,
        #[arg(long)]
        network: Option<String>,
        #[arg(long)]
        service_fee: Option<Decimal>,
        #[arg(long)]
        service_fee_currency: Option<String>,
    },
    /// Clear a refund block after its cause was remediated
    Unblock {
        #[arg(long)]
        id: String,
    },
    /// Mark a processing refund as settled on chain
    Settle {
        #[arg(long)]
        id: String,
    },
    /// Mark a processing refund as failed
    Fail {
        #[arg(long)]
        id: String,
        #[arg(long)]
        reason: RefundFailureReason,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let fees = match &cli.fee_schedule {
        Some(path) => load_fee_schedule(path),
        None => config.fee_schedule(),
    }
    .into_diagnostic()?;

    // Load records
    let repository = InMemoryExceptionRepository::new();
    let file = File::open(&cli.input).into_diagnostic()?;
    for record_result in RecordReader::new(file).records() {
        match record_result {
            Ok(record) => {
                if let Err(e) = repository.insert(record).await {
                    eprintln!("Error loading record: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading record: {}", e);
            }
        }
    }
    let engine = RefundEngine::new(Box::new(repository), fees);

    let stdout = io::stdout();
    match cli.command {
        Command::Query {
            search,
            order_id,
            status,
            category,
            sort,
        } => {
            let filter = RecordFilter {
                search,
                payment_order_id: order_id,
                status,
                category,
            };
            let records = engine.query_records(&filter, sort).await.into_diagnostic()?;
            ReportWriter::new(stdout.lock())
                .write_report(&records, engine.fees())
                .into_diagnostic()?;
            return Ok(());
        }
        Command::Stats => {
            let stats = engine.compute_stats().await.into_diagnostic()?;
            serde_json::to_writer_pretty(stdout.lock(), &stats).into_diagnostic()?;
            println!();
            return Ok(());
        }
        Command::Summary { id } => {
            let summary = engine.compute_refund_summary(&id).await.into_diagnostic()?;
            serde_json::to_writer_pretty(stdout.lock(), &summary).into_diagnostic()?;
            println!();
            return Ok(());
        }
        Command::Refund {
            id,
            operator,
            wallet_address,
            network,
            service_fee,
            service_fee_currency,
        } => {
            let overrides = RefundOverrides {
                wallet_address,
                network,
                service_fee_amount: service_fee,
                service_fee_currency,
            };
            let request = if operator || !overrides.is_empty() {
                RefundRequest::operator(Some(overrides))
            } else {
                RefundRequest::automatic()
            };
            engine.request_refund(&id, request).await.into_diagnostic()?;
        }
        Command::Unblock { id } => engine.resolve_block(&id).await.into_diagnostic()?,
        Command::Settle { id } => engine.confirm_settlement(&id).await.into_diagnostic()?,
        Command::Fail { id, reason } => {
            engine.report_failure(&id, reason).await.into_diagnostic()?
        }
    }

    // Output updated records
    let records = engine.into_records().await.into_diagnostic()?;
    let mut writer = RecordWriter::new(stdout.lock());
    writer.write_records(&records).into_diagnostic()?;

    Ok(())
}
