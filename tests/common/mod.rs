#![allow(dead_code)]

use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use wallet_engine::application::processor::WalletService;
use wallet_engine::config::StrategyKind;
use wallet_engine::infrastructure::in_memory::InMemoryWalletStore;

pub const STRATEGIES: [StrategyKind; 2] = [StrategyKind::Locking, StrategyKind::Atomic];

/// A fresh in-memory service per strategy.
pub fn services() -> Vec<(StrategyKind, Arc<WalletService>)> {
    STRATEGIES
        .into_iter()
        .map(|kind| (kind, Arc::new(service_over(InMemoryWalletStore::new(), kind))))
        .collect()
}

pub fn service_over(store: InMemoryWalletStore, kind: StrategyKind) -> WalletService {
    WalletService::with_strategy(Box::new(store), kind)
}

/// Turns a cent count into a two-decimal amount.
pub fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

/// Writes a replay file creating `wallets` wallets and depositing 1.00 into
/// each of them `rows` times in round-robin order.
pub fn generate_replay_csv(path: &Path, wallets: usize, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["type", "wallet", "amount"])?;
    for w in 0..wallets {
        wtr.write_record(["create", &format!("w{w:04}"), ""])?;
    }
    for i in 0..rows {
        wtr.write_record(["deposit", &format!("w{:04}", i % wallets), "1.00"])?;
    }

    wtr.flush()?;
    Ok(())
}
