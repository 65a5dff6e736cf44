use clap::Parser;
use miette::{IntoDiagnostic, Result};
use paytrack::application::executor::AttestationExecutor;
use paytrack::config::EngineConfig;
use paytrack::domain::ports::PaymentStoreBox;
use paytrack::infrastructure::in_memory::InMemoryPaymentStore;
use paytrack::infrastructure::notifier::LogDispatcher;
use paytrack::interfaces::csv::command_reader::CommandReader;
use paytrack::interfaces::csv::payment_writer::PaymentWriter;
use paytrack::interfaces::replay::apply_command;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Transaction attempts before a conflicting transition is abandoned
    #[arg(long, default_value_t = 3)]
    max_attempts: u32,

    /// Largest expected amount accepted when creating a payment, in cents
    #[arg(long, default_value_t = 50_000)]
    amount_ceiling: i64,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<PaymentStoreBox> {
    use paytrack::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(db_path) => Ok(Box::new(RocksDBStore::open(db_path).into_diagnostic()?)),
        None => Ok(Box::new(InMemoryPaymentStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<PaymentStoreBox> {
    if db_path.is_some() {
        tracing::warn!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Box::new(InMemoryPaymentStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = EngineConfig::default()
        .with_max_attempts(cli.max_attempts)
        .with_amount_ceiling(cli.amount_ceiling);
    let store = open_store(cli.db_path)?;
    let executor = AttestationExecutor::new(store, Arc::new(LogDispatcher)).with_config(config);

    // Process commands
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Err(e) = apply_command(&executor, command).await {
                    tracing::error!("Error processing command: {e}");
                }
            }
            Err(e) => {
                tracing::error!("Error reading command: {e}");
            }
        }
    }

    executor.drain_notifications().await;

    let mut payments = executor.payments().await.into_diagnostic()?;
    payments.sort_by(|a, b| a.id.cmp(&b.id));

    // Output final state
    let stdout = io::stdout();
    let mut writer = PaymentWriter::new(stdout.lock());
    writer.write_payments(&payments).into_diagnostic()?;

    Ok(())
}
