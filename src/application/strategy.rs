use crate::config::StrategyKind;
use crate::domain::operation::MutationOutcome;
use crate::domain::ports::{
    BalanceMutator, BalanceMutatorBox, ConditionalUpdate, StoreResult, WalletStore,
};
use crate::domain::wallet::{Amount, WalletId};
use crate::error::StoreError;
use async_trait::async_trait;

impl StrategyKind {
    /// Builds the mutator implementing this strategy.
    pub fn mutator(self) -> BalanceMutatorBox {
        match self {
            StrategyKind::Locking => Box::new(PessimisticLocking),
            StrategyKind::Atomic => Box::new(AtomicConditional),
        }
    }
}

/// Lock-then-mutate.
///
/// Takes the wallet's lease, computes the new balance in-process and commits.
/// Every early return drops the lease uncommitted, which aborts it.
#[derive(Debug, Default, Clone, Copy)]
pub struct PessimisticLocking;

#[async_trait]
impl BalanceMutator for PessimisticLocking {
    async fn deposit(
        &self,
        store: &dyn WalletStore,
        id: WalletId,
        amount: Amount,
    ) -> StoreResult<MutationOutcome> {
        let Some(mut lease) = store.lock_for_update(id).await? else {
            return Ok(MutationOutcome::WalletMissing);
        };
        let balance = lease
            .balance()
            .checked_add(amount)
            .ok_or(StoreError::NumericOverflow(id))?;
        lease.stage(balance);
        lease.commit()?;
        Ok(MutationOutcome::Applied(balance))
    }

    async fn withdraw(
        &self,
        store: &dyn WalletStore,
        id: WalletId,
        amount: Amount,
    ) -> StoreResult<MutationOutcome> {
        let Some(mut lease) = store.lock_for_update(id).await? else {
            return Ok(MutationOutcome::WalletMissing);
        };
        let Some(balance) = lease.balance().checked_sub(amount) else {
            // Read under the lease, so this is exactly what blocked the withdraw.
            return Ok(MutationOutcome::Insufficient {
                available: lease.balance(),
            });
        };
        lease.stage(balance);
        lease.commit()?;
        Ok(MutationOutcome::Applied(balance))
    }
}

/// Atomic conditional update.
///
/// Each mutation is a single indivisible store primitive; nothing is held
/// between calls. A rejected withdraw is final for that call.
#[derive(Debug, Default, Clone, Copy)]
pub struct AtomicConditional;

#[async_trait]
impl BalanceMutator for AtomicConditional {
    async fn deposit(
        &self,
        store: &dyn WalletStore,
        id: WalletId,
        amount: Amount,
    ) -> StoreResult<MutationOutcome> {
        Ok(match store.add_balance(id, amount).await? {
            Some(balance) => MutationOutcome::Applied(balance),
            None => MutationOutcome::WalletMissing,
        })
    }

    async fn withdraw(
        &self,
        store: &dyn WalletStore,
        id: WalletId,
        amount: Amount,
    ) -> StoreResult<MutationOutcome> {
        match store.subtract_if_sufficient(id, amount).await? {
            ConditionalUpdate::Applied(balance) => Ok(MutationOutcome::Applied(balance)),
            ConditionalUpdate::WalletMissing => Ok(MutationOutcome::WalletMissing),
            ConditionalUpdate::Rejected => Ok(match store.find_by_id(id).await? {
                Some(wallet) => MutationOutcome::Insufficient {
                    available: wallet.balance,
                },
                None => MutationOutcome::WalletMissing,
            }),
        }
    }
}
