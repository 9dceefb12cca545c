use super::wallet::{Balance, WalletId};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Deposit,
    Withdraw,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Deposit => f.write_str("deposit"),
            OperationKind::Withdraw => f.write_str("withdraw"),
        }
    }
}

/// A single balance mutation request, built per call and discarded afterwards.
///
/// `amount` is kept raw here; it only becomes an [`Amount`](super::wallet::Amount)
/// once the processor has validated it.
#[derive(Debug, PartialEq, Clone)]
pub struct OperationRequest {
    pub wallet_id: WalletId,
    pub kind: OperationKind,
    pub amount: Decimal,
}

impl OperationRequest {
    pub fn deposit(wallet_id: WalletId, amount: Decimal) -> Self {
        Self {
            wallet_id,
            kind: OperationKind::Deposit,
            amount,
        }
    }

    pub fn withdraw(wallet_id: WalletId, amount: Decimal) -> Self {
        Self {
            wallet_id,
            kind: OperationKind::Withdraw,
            amount,
        }
    }
}

/// What a [`BalanceMutator`](super::ports::BalanceMutator) observed while
/// applying a mutation.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum MutationOutcome {
    /// The mutation committed; carries the resulting balance.
    Applied(Balance),
    WalletMissing,
    /// The withdraw condition did not hold; carries the balance seen afterwards.
    Insufficient { available: Balance },
}
