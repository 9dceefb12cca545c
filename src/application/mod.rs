//! Application layer containing the balance-mutation orchestration.
//!
//! `WalletService` is the entry point callers use. The two concurrency
//! strategies it can be configured with live in [`strategy`].

pub mod processor;
pub mod strategy;
