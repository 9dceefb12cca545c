use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Create,
    Deposit,
    Withdraw,
}

/// One row of a replay file: `type, wallet, amount`.
///
/// `wallet` is either a label bound by an earlier `create` row or a wallet
/// UUID. `amount` is empty for `create`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OperationRecord {
    pub r#type: RecordKind,
    pub wallet: String,
    pub amount: Option<Decimal>,
}

/// Reads operation records from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and accepting short rows so a
/// `create` line may omit its amount column entirely.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    /// Creates a new `OperationReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes records.
    pub fn records(self) -> impl Iterator<Item = Result<OperationRecord, csv::Error>> {
        self.reader.into_deserialize()
    }
}
