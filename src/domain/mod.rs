//! Domain model: wallets, balances, operation requests and the ports the
//! application layer drives.

pub mod operation;
pub mod ports;
pub mod wallet;
