//! Chain collaborator surface: contract calls, pending transactions and the
//! traits the wallet provider and chain client implement

pub mod errors;
pub mod models;
pub mod traits;

pub use errors::{ChainError, ChainResult};
pub use models::{
	ContractCall, ContractMethod, PendingTx, SigningCapability, TxHash, TxReceipt, WriteOptions,
};
pub use traits::{ChainClient, WalletProvider};
