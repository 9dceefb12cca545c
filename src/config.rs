//! Engine configuration.

use serde::Deserialize;
use std::time::Duration;

/// Which concurrency strategy the processor applies balance mutations with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Lock the wallet record, mutate in-process, commit.
    Locking,
    /// Single indivisible add / conditional subtract; no lock held across calls.
    #[default]
    Atomic,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub strategy: StrategyKind,

    /// Upper bound on waiting for a wallet lease.
    #[serde(with = "millis")]
    pub lease_timeout: Duration,
}

impl EngineConfig {
    pub const DEFAULT_LEASE_TIMEOUT: Duration = Duration::from_secs(5);
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            lease_timeout: Self::DEFAULT_LEASE_TIMEOUT,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
