use crate::error::WalletError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Number of fractional digits every monetary value is kept at.
pub const MONEY_SCALE: u32 = 2;

/// Opaque, unique identifier of a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletId(Uuid);

impl WalletId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for WalletId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for WalletId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for WalletId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The monetary balance of a wallet.
///
/// Fixed-point with two decimal places. The upper bound mirrors a
/// `NUMERIC(15,2)` column; stores refuse to commit anything above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Balance(Decimal);

/// A decimal that cannot be held as a [`Balance`].
#[derive(Error, Debug, PartialEq)]
#[error("Balance out of range: {0}")]
pub struct BalanceOutOfRange(pub Decimal);

/// A validated, strictly positive operation amount with at most two
/// fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, WalletError> {
        if value <= Decimal::ZERO || value.normalize().scale() > MONEY_SCALE {
            return Err(WalletError::InvalidAmount(value));
        }
        let mut value = value;
        value.rescale(MONEY_SCALE);
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = WalletError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, MONEY_SCALE));
    /// 9_999_999_999_999.99
    pub const MAX: Self = Self(Decimal::from_parts(
        2_764_472_319,
        232_830,
        0,
        false,
        MONEY_SCALE,
    ));

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Adds `amount`, or `None` when the result would exceed [`Balance::MAX`].
    pub fn checked_add(self, amount: Amount) -> Option<Self> {
        let sum = self.0.checked_add(amount.0)?;
        (sum <= Self::MAX.0).then_some(Self(sum))
    }

    /// Subtracts `amount`, or `None` when that would overdraw the balance.
    pub fn checked_sub(self, amount: Amount) -> Option<Self> {
        (self.0 >= amount.0).then(|| Self(self.0 - amount.0))
    }

    pub fn covers(&self, amount: Amount) -> bool {
        self.0 >= amount.0
    }
}

impl TryFrom<Decimal> for Balance {
    type Error = BalanceOutOfRange;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value < Decimal::ZERO || value > Self::MAX.0 || value.normalize().scale() > MONEY_SCALE {
            return Err(BalanceOutOfRange(value));
        }
        let mut value = value;
        value.set_sign_positive(true);
        value.rescale(MONEY_SCALE);
        Ok(Self(value))
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A wallet record as owned by a [`WalletStore`](super::ports::WalletStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub balance: Balance,
}

impl Wallet {
    /// A fresh wallet with a random id and a zero balance.
    pub fn new() -> Self {
        Self::with_id(WalletId::new())
    }

    pub fn with_id(id: WalletId) -> Self {
        Self {
            id,
            balance: Balance::ZERO,
        }
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}
