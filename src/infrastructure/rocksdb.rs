use crate::config::EngineConfig;
use crate::domain::ports::{ConditionalUpdate, StoreResult, WalletLease, WalletLeaseBox, WalletStore};
use crate::domain::wallet::{Amount, Balance, Wallet, WalletId};
use crate::error::StoreError;
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, ErrorKind, Options, Transaction, TransactionDB,
    TransactionDBOptions,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Column Family for storing wallet records.
pub const CF_WALLETS: &str = "wallets";

impl From<rocksdb::Error> for StoreError {
    fn from(e: rocksdb::Error) -> Self {
        StoreError::Backend(Box::new(e))
    }
}

/// A persistent wallet store backed by a RocksDB `TransactionDB`.
///
/// Every mutation runs inside a RocksDB transaction that takes an exclusive
/// row lock with `get_for_update`, so leases and the atomic primitives
/// serialize per wallet while plain reads go straight to committed data.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<TransactionDB>`).
#[derive(Clone)]
pub struct RocksDbWalletStore {
    db: Arc<TransactionDB>,
    lease_timeout: Duration,
}

impl RocksDbWalletStore {
    /// Opens or creates a RocksDB instance at the specified path with the
    /// default lease timeout.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::open_with_lease_timeout(path, EngineConfig::DEFAULT_LEASE_TIMEOUT)
    }

    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// `lease_timeout` becomes the transaction lock timeout, bounding how long
    /// any mutation waits for a row held by another transaction.
    pub fn open_with_lease_timeout<P: AsRef<Path>>(
        path: P,
        lease_timeout: Duration,
    ) -> StoreResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let mut txn_opts = TransactionDBOptions::default();
        // A negative lock timeout means "wait forever" to RocksDB.
        let lock_timeout_ms = i64::try_from(lease_timeout.as_millis()).unwrap_or(i64::MAX);
        txn_opts.set_txn_lock_timeout(lock_timeout_ms);

        let cf_wallets = ColumnFamilyDescriptor::new(CF_WALLETS, Options::default());
        let db = TransactionDB::open_cf_descriptors(&opts, &txn_opts, path, vec![cf_wallets])?;

        tracing::info!("Opened RocksDB wallet store");
        Ok(Self {
            db: Arc::new(db),
            lease_timeout,
        })
    }

    fn wallets_cf(&self) -> StoreResult<&ColumnFamily> {
        self.db
            .cf_handle(CF_WALLETS)
            .ok_or(StoreError::MissingColumnFamily(CF_WALLETS))
    }

    fn lock_error(&self, id: WalletId, e: rocksdb::Error) -> StoreError {
        match e.kind() {
            ErrorKind::TimedOut | ErrorKind::Busy => StoreError::LeaseTimeout {
                wallet_id: id,
                timeout: self.lease_timeout,
            },
            _ => e.into(),
        }
    }

    /// Opens a transaction holding the exclusive row lock on `id`.
    fn locked(&self, id: WalletId) -> StoreResult<Option<RocksDbLease<'_>>> {
        let cf = self.wallets_cf()?;
        let txn = self.db.transaction();
        let bytes = txn
            .get_for_update_cf(cf, id.as_bytes(), true)
            .map_err(|e| self.lock_error(id, e))?;
        match bytes {
            Some(bytes) => Ok(Some(RocksDbLease {
                wallet: serde_json::from_slice(&bytes)?,
                txn,
                cf,
            })),
            None => Ok(None),
        }
    }
}

/// A row lease: an open RocksDB transaction holding the wallet's lock.
///
/// Dropping the transaction without committing rolls it back and releases
/// the lock.
struct RocksDbLease<'a> {
    wallet: Wallet,
    txn: Transaction<'a, TransactionDB>,
    cf: &'a ColumnFamily,
}

impl RocksDbLease<'_> {
    fn write_and_commit(self) -> StoreResult<()> {
        let value = serde_json::to_vec(&self.wallet)?;
        self.txn.put_cf(self.cf, self.wallet.id.as_bytes(), value)?;
        self.txn.commit()?;
        Ok(())
    }
}

impl WalletLease for RocksDbLease<'_> {
    fn balance(&self) -> Balance {
        self.wallet.balance
    }

    fn stage(&mut self, balance: Balance) {
        self.wallet.balance = balance;
    }

    fn commit(self: Box<Self>) -> StoreResult<()> {
        (*self).write_and_commit()
    }
}

#[async_trait]
impl WalletStore for RocksDbWalletStore {
    async fn create(&self, wallet: Wallet) -> StoreResult<Wallet> {
        let cf = self.wallets_cf()?;
        let txn = self.db.transaction();
        if txn
            .get_for_update_cf(cf, wallet.id.as_bytes(), true)
            .map_err(|e| self.lock_error(wallet.id, e))?
            .is_some()
        {
            return Err(StoreError::AlreadyExists(wallet.id));
        }
        txn.put_cf(cf, wallet.id.as_bytes(), serde_json::to_vec(&wallet)?)?;
        txn.commit()?;
        Ok(wallet)
    }

    async fn find_by_id(&self, id: WalletId) -> StoreResult<Option<Wallet>> {
        let cf = self.wallets_cf()?;
        match self.db.get_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn exists_by_id(&self, id: WalletId) -> StoreResult<bool> {
        let cf = self.wallets_cf()?;
        // Just check if the key exists without copying the value out
        Ok(self.db.get_pinned_cf(cf, id.as_bytes())?.is_some())
    }

    async fn lock_for_update<'a>(
        &'a self,
        id: WalletId,
    ) -> StoreResult<Option<WalletLeaseBox<'a>>> {
        Ok(self
            .locked(id)?
            .map(|lease| Box::new(lease) as WalletLeaseBox<'a>))
    }

    async fn add_balance(&self, id: WalletId, amount: Amount) -> StoreResult<Option<Balance>> {
        let Some(mut lease) = self.locked(id)? else {
            return Ok(None);
        };
        let balance = lease
            .wallet
            .balance
            .checked_add(amount)
            .ok_or(StoreError::NumericOverflow(id))?;
        lease.wallet.balance = balance;
        lease.write_and_commit()?;
        Ok(Some(balance))
    }

    async fn subtract_if_sufficient(
        &self,
        id: WalletId,
        amount: Amount,
    ) -> StoreResult<ConditionalUpdate> {
        let Some(mut lease) = self.locked(id)? else {
            return Ok(ConditionalUpdate::WalletMissing);
        };
        let Some(balance) = lease.wallet.balance.checked_sub(amount) else {
            return Ok(ConditionalUpdate::Rejected);
        };
        lease.wallet.balance = balance;
        lease.write_and_commit()?;
        Ok(ConditionalUpdate::Applied(balance))
    }
}
