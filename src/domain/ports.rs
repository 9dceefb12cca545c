use super::operation::MutationOutcome;
use super::wallet::{Amount, Balance, Wallet, WalletId};
use crate::error::StoreError;
use async_trait::async_trait;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result of [`WalletStore::subtract_if_sufficient`].
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ConditionalUpdate {
    /// The condition held and the subtraction committed.
    Applied(Balance),
    /// The condition did not hold; nothing was written.
    Rejected,
    WalletMissing,
}

/// An exclusive lease on a single wallet record.
///
/// While a lease is alive no other lease on the same wallet can be acquired,
/// and the atomic primitives on that wallet wait for it. A staged balance
/// only becomes visible on [`commit`](WalletLease::commit). Dropping the lease
/// without committing aborts it.
pub trait WalletLease: Send {
    /// The committed balance as of lease acquisition, or the staged one.
    fn balance(&self) -> Balance;

    fn stage(&mut self, balance: Balance);

    fn commit(self: Box<Self>) -> StoreResult<()>;
}

pub type WalletLeaseBox<'a> = Box<dyn WalletLease + 'a>;

/// Durable owner of wallet records.
///
/// Exposes point reads plus two families of serializing mutation primitives:
/// the row lease used by lock-then-mutate, and the indivisible conditional
/// updates used by the atomic strategy. Wallets cannot be deleted through
/// this interface.
#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn create(&self, wallet: Wallet) -> StoreResult<Wallet>;

    async fn find_by_id(&self, id: WalletId) -> StoreResult<Option<Wallet>>;

    async fn exists_by_id(&self, id: WalletId) -> StoreResult<bool>;

    /// Acquires the exclusive lease on `id`, waiting for any current holder.
    ///
    /// Returns `None` when the wallet does not exist.
    async fn lock_for_update<'a>(
        &'a self,
        id: WalletId,
    ) -> StoreResult<Option<WalletLeaseBox<'a>>>;

    /// Adds `amount` in one indivisible step and returns the balance it
    /// committed, or `None` when the wallet does not exist.
    async fn add_balance(&self, id: WalletId, amount: Amount) -> StoreResult<Option<Balance>>;

    /// Subtracts `amount` in one indivisible step, only if the current balance
    /// covers it.
    async fn subtract_if_sufficient(
        &self,
        id: WalletId,
        amount: Amount,
    ) -> StoreResult<ConditionalUpdate>;
}

pub type WalletStoreBox = Box<dyn WalletStore>;

/// A concurrency strategy for read-modify-write balance changes.
#[async_trait]
pub trait BalanceMutator: Send + Sync {
    async fn deposit(
        &self,
        store: &dyn WalletStore,
        id: WalletId,
        amount: Amount,
    ) -> StoreResult<MutationOutcome>;

    async fn withdraw(
        &self,
        store: &dyn WalletStore,
        id: WalletId,
        amount: Amount,
    ) -> StoreResult<MutationOutcome>;
}

pub type BalanceMutatorBox = Box<dyn BalanceMutator>;
