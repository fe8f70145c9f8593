//! Shared domain models used across the resolver, synchronizer and orchestrator

pub mod decimal_amount;
pub mod network;
pub mod secret_string;

pub use decimal_amount::DecimalAmount;
pub use network::{ChainId, Network};
pub use secret_string::SecretString;
