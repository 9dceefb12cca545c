use crate::config::EngineConfig;
use crate::domain::ports::{ConditionalUpdate, StoreResult, WalletLease, WalletLeaseBox, WalletStore};
use crate::domain::wallet::{Amount, Balance, Wallet, WalletId};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Per-wallet state.
///
/// `lease` serializes writers; it is held for a whole lease or for the span
/// of one atomic primitive. `committed` is only ever locked for a plain
/// read or write, so readers never wait on a lease holder.
struct WalletCell {
    lease: Arc<Mutex<()>>,
    committed: parking_lot::Mutex<Balance>,
}

impl WalletCell {
    fn new(balance: Balance) -> Self {
        Self {
            lease: Arc::new(Mutex::new(())),
            committed: parking_lot::Mutex::new(balance),
        }
    }

    fn balance(&self) -> Balance {
        *self.committed.lock()
    }
}

/// A thread-safe in-memory wallet store.
///
/// Wallets live in an `Arc<RwLock<HashMap<..>>>`; the map lock is only taken
/// to look a wallet up or insert one, so operations on different wallets
/// never contend beyond that.
#[derive(Clone)]
pub struct InMemoryWalletStore {
    wallets: Arc<RwLock<HashMap<WalletId, Arc<WalletCell>>>>,
    lease_timeout: Duration,
}

impl Default for InMemoryWalletStore {
    fn default() -> Self {
        Self::with_lease_timeout(EngineConfig::DEFAULT_LEASE_TIMEOUT)
    }
}

impl InMemoryWalletStore {
    /// Creates a new, empty in-memory wallet store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lease_timeout(lease_timeout: Duration) -> Self {
        Self {
            wallets: Arc::new(RwLock::new(HashMap::new())),
            lease_timeout,
        }
    }

    async fn cell(&self, id: WalletId) -> Option<Arc<WalletCell>> {
        self.wallets.read().await.get(&id).cloned()
    }

    async fn acquire(&self, id: WalletId, cell: &WalletCell) -> StoreResult<OwnedMutexGuard<()>> {
        tokio::time::timeout(self.lease_timeout, cell.lease.clone().lock_owned())
            .await
            .map_err(|_| StoreError::LeaseTimeout {
                wallet_id: id,
                timeout: self.lease_timeout,
            })
    }
}

struct InMemoryLease {
    cell: Arc<WalletCell>,
    staged: Balance,
    _guard: OwnedMutexGuard<()>,
}

impl WalletLease for InMemoryLease {
    fn balance(&self) -> Balance {
        self.staged
    }

    fn stage(&mut self, balance: Balance) {
        self.staged = balance;
    }

    fn commit(self: Box<Self>) -> StoreResult<()> {
        *self.cell.committed.lock() = self.staged;
        Ok(())
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn create(&self, wallet: Wallet) -> StoreResult<Wallet> {
        let mut wallets = self.wallets.write().await;
        match wallets.entry(wallet.id) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(wallet.id)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(WalletCell::new(wallet.balance)));
                Ok(wallet)
            }
        }
    }

    async fn find_by_id(&self, id: WalletId) -> StoreResult<Option<Wallet>> {
        let wallets = self.wallets.read().await;
        Ok(wallets.get(&id).map(|cell| Wallet {
            id,
            balance: cell.balance(),
        }))
    }

    async fn exists_by_id(&self, id: WalletId) -> StoreResult<bool> {
        Ok(self.wallets.read().await.contains_key(&id))
    }

    async fn lock_for_update<'a>(
        &'a self,
        id: WalletId,
    ) -> StoreResult<Option<WalletLeaseBox<'a>>> {
        let Some(cell) = self.cell(id).await else {
            return Ok(None);
        };
        let guard = self.acquire(id, &cell).await?;
        let staged = cell.balance();
        Ok(Some(Box::new(InMemoryLease {
            cell,
            staged,
            _guard: guard,
        })))
    }

    async fn add_balance(&self, id: WalletId, amount: Amount) -> StoreResult<Option<Balance>> {
        let Some(cell) = self.cell(id).await else {
            return Ok(None);
        };
        let _guard = self.acquire(id, &cell).await?;
        let mut committed = cell.committed.lock();
        let balance = committed
            .checked_add(amount)
            .ok_or(StoreError::NumericOverflow(id))?;
        *committed = balance;
        Ok(Some(balance))
    }

    async fn subtract_if_sufficient(
        &self,
        id: WalletId,
        amount: Amount,
    ) -> StoreResult<ConditionalUpdate> {
        let Some(cell) = self.cell(id).await else {
            return Ok(ConditionalUpdate::WalletMissing);
        };
        let _guard = self.acquire(id, &cell).await?;
        let mut committed = cell.committed.lock();
        Ok(match committed.checked_sub(amount) {
            Some(balance) => {
                *committed = balance;
                ConditionalUpdate::Applied(balance)
            }
            None => ConditionalUpdate::Rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amount(value: rust_decimal::Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    async fn funded(store: &InMemoryWalletStore, value: rust_decimal::Decimal) -> WalletId {
        let wallet = store.create(Wallet::new()).await.unwrap();
        let balance = store.add_balance(wallet.id, amount(value)).await.unwrap();
        assert_eq!(balance.map(|b| b.value()), Some(value));
        wallet.id
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryWalletStore::new();
        let wallet = store.create(Wallet::new()).await.unwrap();

        let retrieved = store.find_by_id(wallet.id).await.unwrap().unwrap();
        assert_eq!(retrieved, wallet);
        assert!(store.exists_by_id(wallet.id).await.unwrap());

        let unknown = WalletId::new();
        assert!(store.find_by_id(unknown).await.unwrap().is_none());
        assert!(!store.exists_by_id(unknown).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let store = InMemoryWalletStore::new();
        let wallet = store.create(Wallet::new()).await.unwrap();

        let result = store.create(Wallet::with_id(wallet.id)).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists(id)) if id == wallet.id));
    }

    #[tokio::test]
    async fn test_subtract_if_sufficient() {
        let store = InMemoryWalletStore::new();
        let id = funded(&store, dec!(10.00)).await;

        let applied = store
            .subtract_if_sufficient(id, amount(dec!(4.00)))
            .await
            .unwrap();
        assert!(matches!(applied, ConditionalUpdate::Applied(b) if b.value() == dec!(6.00)));

        let rejected = store
            .subtract_if_sufficient(id, amount(dec!(6.01)))
            .await
            .unwrap();
        assert_eq!(rejected, ConditionalUpdate::Rejected);

        let balance = store.find_by_id(id).await.unwrap().unwrap().balance;
        assert_eq!(balance.value(), dec!(6.00));
    }

    #[tokio::test]
    async fn test_primitives_report_missing_wallet() {
        let store = InMemoryWalletStore::new();
        let unknown = WalletId::new();

        assert!(
            store
                .add_balance(unknown, amount(dec!(1.00)))
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(
            store
                .subtract_if_sufficient(unknown, amount(dec!(1.00)))
                .await
                .unwrap(),
            ConditionalUpdate::WalletMissing
        );
        assert!(store.lock_for_update(unknown).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_balance_overflow_leaves_balance_untouched() {
        let store = InMemoryWalletStore::new();
        let id = funded(&store, Balance::MAX.value()).await;

        let result = store.add_balance(id, amount(dec!(0.01))).await;
        assert!(matches!(result, Err(StoreError::NumericOverflow(_))));

        let balance = store.find_by_id(id).await.unwrap().unwrap().balance;
        assert_eq!(balance, Balance::MAX);
    }

    #[tokio::test]
    async fn test_lease_commit_is_visible() {
        let store = InMemoryWalletStore::new();
        let id = funded(&store, dec!(10.00)).await;

        let mut lease = store.lock_for_update(id).await.unwrap().unwrap();
        let next = lease.balance().checked_sub(amount(dec!(2.50))).unwrap();
        lease.stage(next);

        // Uncommitted changes are invisible to readers, who are not blocked.
        let seen = store.find_by_id(id).await.unwrap().unwrap().balance;
        assert_eq!(seen.value(), dec!(10.00));

        lease.commit().unwrap();
        let seen = store.find_by_id(id).await.unwrap().unwrap().balance;
        assert_eq!(seen.value(), dec!(7.50));
    }

    #[tokio::test]
    async fn test_dropped_lease_aborts() {
        let store = InMemoryWalletStore::new();
        let id = funded(&store, dec!(10.00)).await;

        {
            let mut lease = store.lock_for_update(id).await.unwrap().unwrap();
            lease.stage(Balance::ZERO);
        }

        let seen = store.find_by_id(id).await.unwrap().unwrap().balance;
        assert_eq!(seen.value(), dec!(10.00));
        // The lease was released with it.
        assert!(store.lock_for_update(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_lease_excludes_same_wallet_only() {
        let store = InMemoryWalletStore::with_lease_timeout(Duration::from_millis(50));
        let first = funded(&store, dec!(1.00)).await;
        let second = funded(&store, dec!(1.00)).await;

        let _held = store.lock_for_update(first).await.unwrap().unwrap();

        let blocked = store.lock_for_update(first).await;
        assert!(matches!(
            blocked,
            Err(StoreError::LeaseTimeout { wallet_id, .. }) if wallet_id == first
        ));

        let blocked = store.add_balance(first, amount(dec!(1.00))).await;
        assert!(matches!(blocked, Err(StoreError::LeaseTimeout { .. })));

        assert!(store.lock_for_update(second).await.unwrap().is_some());
    }
}
