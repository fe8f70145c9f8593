//! Mint Types
//!
//! Shared models and collaborator traits for the mint exchange.
//! Unit conversion, contract bindings, the wallet session, balance snapshots,
//! the transaction lifecycle and notifications all live here so that the
//! service and adapter crates agree on one vocabulary.

pub mod amount;
pub mod balances;
pub mod bindings;
pub mod chain;
pub mod errors;
pub mod events;
pub mod models;
pub mod notifications;
pub mod session;
pub mod transactions;
pub mod units;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export the primitive EVM types used throughout the public API
pub use alloy_primitives::{Address, B256, U256};
pub use chrono;

pub use amount::{AmountField, AmountInput};
pub use balances::BalanceSnapshot;
pub use bindings::{ContractBindings, ContractHandle, ContractKind, Deployment};
pub use chain::{
	ChainClient, ChainError, ChainResult, ContractCall, ContractMethod, PendingTx,
	SigningCapability, TxHash, TxReceipt, WalletProvider, WriteOptions,
};
pub use errors::{ExchangeError, ExchangeResult};
pub use events::{ExchangeEvent, TransactionEvent, TxStage};
pub use models::{ChainId, DecimalAmount, Network, SecretString};
pub use notifications::{Notification, NotificationCategory};
pub use session::Session;
pub use transactions::{
	FlowKind, TransactionHandle, TransitionError, TxFailure, TxFailureKind, TxState,
};
pub use units::{format_units, parse_units, to_base_units, to_decimal, UnitError, BASE_UNIT_DECIMALS};
