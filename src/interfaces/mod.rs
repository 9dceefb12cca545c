//! Adapters between the wallet core and the outside world.

pub mod csv;
