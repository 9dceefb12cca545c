use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wallet_engine::application::processor::WalletService;
use wallet_engine::config::{EngineConfig, StrategyKind};
use wallet_engine::domain::operation::OperationRequest;
use wallet_engine::domain::ports::WalletStoreBox;
use wallet_engine::domain::wallet::WalletId;
use wallet_engine::infrastructure::in_memory::InMemoryWalletStore;
use wallet_engine::interfaces::csv::balance_writer::BalanceWriter;
use wallet_engine::interfaces::csv::operation_reader::OperationReader;
use wallet_engine::interfaces::csv::replay::replay;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true, env = "WALLET_DB_PATH")]
    db_path: Option<PathBuf>,

    /// JSON engine configuration; the flags below override it.
    #[arg(long, global = true, env = "WALLET_CONFIG")]
    config: Option<PathBuf>,

    /// Concurrency strategy for balance mutations.
    #[arg(long, global = true, value_enum, env = "WALLET_STRATEGY")]
    strategy: Option<StrategyKind>,

    /// Upper bound on waiting for a wallet lease, in milliseconds.
    #[arg(long, global = true, env = "WALLET_LEASE_TIMEOUT_MS")]
    lease_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a wallet and print it as `id,balance`
    Create,
    /// Print the balance of a wallet
    Balance { wallet_id: WalletId },
    /// Deposit into a wallet and print the new balance
    Deposit {
        wallet_id: WalletId,
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
    },
    /// Withdraw from a wallet and print the new balance
    Withdraw {
        wallet_id: WalletId,
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
    },
    /// Apply a CSV of operations (`type, wallet, amount`) and print final balances
    Replay { input: PathBuf },
}

impl Cli {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let file = File::open(path).into_diagnostic()?;
                serde_json::from_reader(file).into_diagnostic()?
            }
            None => EngineConfig::default(),
        };
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(ms) = self.lease_timeout_ms {
            config.lease_timeout = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

#[cfg(feature = "storage-rocksdb")]
fn persistent_store(path: &Path, config: &EngineConfig) -> Result<WalletStoreBox> {
    use wallet_engine::infrastructure::rocksdb::RocksDbWalletStore;

    let store = RocksDbWalletStore::open_with_lease_timeout(path, config.lease_timeout)?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn persistent_store(_path: &Path, config: &EngineConfig) -> Result<WalletStoreBox> {
    tracing::warn!(
        "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
    );
    Ok(Box::new(InMemoryWalletStore::with_lease_timeout(
        config.lease_timeout,
    )))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.engine_config()?;

    let store: WalletStoreBox = match &cli.db_path {
        Some(path) => persistent_store(path, &config)?,
        None => Box::new(InMemoryWalletStore::with_lease_timeout(
            config.lease_timeout,
        )),
    };
    tracing::info!(strategy = ?config.strategy, "Starting wallet engine");
    let service = WalletService::from_config(store, &config);

    match cli.command {
        Command::Create => {
            let wallet = service.create_wallet().await?;
            println!("{},{}", wallet.id, wallet.balance);
        }
        Command::Balance { wallet_id } => {
            println!("{}", service.get_balance(wallet_id).await?);
        }
        Command::Deposit { wallet_id, amount } => {
            service
                .process_operation(OperationRequest::deposit(wallet_id, amount))
                .await?;
            println!("{}", service.get_balance(wallet_id).await?);
        }
        Command::Withdraw { wallet_id, amount } => {
            service
                .process_operation(OperationRequest::withdraw(wallet_id, amount))
                .await?;
            println!("{}", service.get_balance(wallet_id).await?);
        }
        Command::Replay { input } => {
            let file = File::open(input).into_diagnostic()?;
            let rows = replay(&service, OperationReader::new(file)).await?;

            let stdout = io::stdout();
            let mut writer = BalanceWriter::new(stdout.lock());
            writer.write_balances(rows).into_diagnostic()?;
        }
    }

    Ok(())
}
