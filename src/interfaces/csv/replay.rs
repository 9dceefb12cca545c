use super::balance_writer::BalanceRow;
use super::operation_reader::{OperationReader, OperationRecord, RecordKind};
use crate::application::processor::WalletService;
use crate::domain::operation::{OperationKind, OperationRequest};
use crate::domain::wallet::WalletId;
use crate::error::WalletError;
use std::collections::BTreeMap;
use std::io::Read;
use thiserror::Error;

/// Why a single replay row was skipped.
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Unknown wallet label: {0}")]
    UnknownWallet(String),
    #[error("Wallet label already bound: {0}")]
    DuplicateLabel(String),
    #[error("Missing amount for {0}")]
    MissingAmount(String),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Applies every row of `reader` in order and returns the final balance of
/// each wallet the file referred to, sorted by label.
///
/// Rows that cannot be parsed or processed are logged and skipped; only a
/// failure to read back the final balances aborts the replay.
pub async fn replay<R: Read>(
    service: &WalletService,
    reader: OperationReader<R>,
) -> Result<Vec<BalanceRow>, WalletError> {
    let mut wallets = BTreeMap::new();

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Error reading operation");
                continue;
            }
        };
        if let Err(e) = apply(service, &mut wallets, record).await {
            tracing::warn!(error = %e, "Error processing operation");
        }
    }

    let mut rows = Vec::with_capacity(wallets.len());
    for (wallet, id) in wallets {
        let balance = service.get_balance(id).await?;
        rows.push(BalanceRow {
            wallet,
            id,
            balance,
        });
    }
    Ok(rows)
}

async fn apply(
    service: &WalletService,
    wallets: &mut BTreeMap<String, WalletId>,
    record: OperationRecord,
) -> Result<(), ReplayError> {
    let kind = match record.r#type {
        RecordKind::Create => return create(service, wallets, record.wallet).await,
        RecordKind::Deposit => OperationKind::Deposit,
        RecordKind::Withdraw => OperationKind::Withdraw,
    };

    let wallet_id = match wallets.get(&record.wallet) {
        Some(id) => *id,
        None => {
            let id: WalletId = record
                .wallet
                .parse()
                .map_err(|_| ReplayError::UnknownWallet(record.wallet.clone()))?;
            // Only wallets the store knows are worth reporting back.
            if service.get_balance(id).await.is_ok() {
                wallets.insert(record.wallet.clone(), id);
            }
            id
        }
    };
    let amount = record
        .amount
        .ok_or_else(|| ReplayError::MissingAmount(record.wallet.clone()))?;

    service
        .process_operation(OperationRequest {
            wallet_id,
            kind,
            amount,
        })
        .await?;
    Ok(())
}

async fn create(
    service: &WalletService,
    wallets: &mut BTreeMap<String, WalletId>,
    label: String,
) -> Result<(), ReplayError> {
    if wallets.contains_key(&label) {
        return Err(ReplayError::DuplicateLabel(label));
    }
    let wallet = service.create_wallet().await?;
    wallets.insert(label, wallet.id);
    Ok(())
}
