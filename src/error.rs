use crate::domain::wallet::{Balance, WalletId};
use miette::Diagnostic;
use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

/// Outcomes of the wallet core that callers have to handle.
///
/// The first three variants are expected, terminal domain results. `Store`
/// carries infrastructure faults through untouched.
#[derive(Error, Diagnostic, Debug)]
pub enum WalletError {
    #[error("Amount must be positive with at most two decimal places: {0}")]
    #[diagnostic(code(wallet::invalid_amount))]
    InvalidAmount(Decimal),

    #[error("Wallet with id {0} not found")]
    #[diagnostic(code(wallet::not_found))]
    WalletNotFound(WalletId),

    #[error(
        "Insufficient funds in wallet with id {wallet_id}: requested {requested}, available {available}"
    )]
    #[diagnostic(code(wallet::insufficient_funds))]
    InsufficientFunds {
        wallet_id: WalletId,
        requested: Decimal,
        available: Balance,
    },

    #[error(transparent)]
    #[diagnostic(code(wallet::store))]
    Store(#[from] StoreError),
}

/// Failures of the storage layer itself.
#[derive(Error, Diagnostic, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Corrupt wallet record: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Timed out after {timeout:?} waiting for the lease on wallet {wallet_id}")]
    LeaseTimeout {
        wallet_id: WalletId,
        timeout: Duration,
    },

    #[error("Wallet with id {0} already exists")]
    AlreadyExists(WalletId),

    #[error("Column family {0} not found")]
    MissingColumnFamily(&'static str),

    #[error("Balance of wallet {0} would exceed the storable maximum")]
    NumericOverflow(WalletId),
}

pub type Result<T> = std::result::Result<T, WalletError>;
