use crate::config::{EngineConfig, StrategyKind};
use crate::domain::operation::{MutationOutcome, OperationKind, OperationRequest};
use crate::domain::ports::{BalanceMutatorBox, WalletStoreBox};
use crate::domain::wallet::{Amount, Balance, Wallet, WalletId};
use crate::error::{Result, WalletError};

/// The main entry point of the wallet core.
///
/// `WalletService` validates operation requests, applies them through its
/// configured [`BalanceMutator`](crate::domain::ports::BalanceMutator) and
/// turns store outcomes into domain results. It holds no balance state of its
/// own; the store owns every wallet record. Share it across tasks behind an
/// `Arc`.
pub struct WalletService {
    store: WalletStoreBox,
    mutator: BalanceMutatorBox,
}

impl WalletService {
    /// Creates a new `WalletService`.
    ///
    /// # Arguments
    ///
    /// * `store` - The store owning the wallet records.
    /// * `mutator` - The concurrency strategy for balance changes.
    pub fn new(store: WalletStoreBox, mutator: BalanceMutatorBox) -> Self {
        Self { store, mutator }
    }

    pub fn with_strategy(store: WalletStoreBox, strategy: StrategyKind) -> Self {
        Self::new(store, strategy.mutator())
    }

    pub fn from_config(store: WalletStoreBox, config: &EngineConfig) -> Self {
        Self::with_strategy(store, config.strategy)
    }

    /// Creates a wallet with a fresh id and a zero balance.
    pub async fn create_wallet(&self) -> Result<Wallet> {
        let wallet = self.store.create(Wallet::new()).await?;
        tracing::info!(wallet_id = %wallet.id, "Created wallet");
        Ok(wallet)
    }

    /// Applies a single deposit or withdraw.
    ///
    /// The amount is validated before the store is touched. A withdraw the
    /// balance cannot cover fails with [`WalletError::InsufficientFunds`] and
    /// is not retried.
    pub async fn process_operation(&self, request: OperationRequest) -> Result<()> {
        tracing::debug!(
            wallet_id = %request.wallet_id,
            kind = %request.kind,
            amount = %request.amount,
            "Processing operation"
        );
        let amount = Amount::new(request.amount)?;
        let id = request.wallet_id;

        // Fail fast on unknown wallets; both strategies re-validate existence
        // inside the mutation itself.
        if !self.store.exists_by_id(id).await? {
            return Err(WalletError::WalletNotFound(id));
        }

        let store = self.store.as_ref();
        let outcome = match request.kind {
            OperationKind::Deposit => self.mutator.deposit(store, id, amount).await?,
            OperationKind::Withdraw => self.mutator.withdraw(store, id, amount).await?,
        };

        match outcome {
            MutationOutcome::Applied(balance) => {
                tracing::debug!(wallet_id = %id, %balance, "Operation applied");
                Ok(())
            }
            MutationOutcome::WalletMissing => Err(WalletError::WalletNotFound(id)),
            MutationOutcome::Insufficient { available } => Err(WalletError::InsufficientFunds {
                wallet_id: id,
                requested: amount.value(),
                available,
            }),
        }
    }

    pub async fn get_balance(&self, id: WalletId) -> Result<Balance> {
        self.store
            .find_by_id(id)
            .await?
            .map(|wallet| wallet.balance)
            .ok_or(WalletError::WalletNotFound(id))
    }
}
