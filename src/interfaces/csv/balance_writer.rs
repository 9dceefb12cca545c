use crate::domain::wallet::{Balance, WalletId};
use serde::Serialize;
use std::io::Write;

/// One output row: the label a wallet was replayed under, its id and its
/// final balance.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct BalanceRow {
    pub wallet: String,
    pub id: WalletId,
    pub balance: Balance,
}

/// Writes wallet balances as CSV with a `wallet,id,balance` header.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_balances<I>(&mut self, rows: I) -> Result<(), csv::Error>
    where
        I: IntoIterator<Item = BalanceRow>,
    {
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
