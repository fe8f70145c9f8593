//! Collaborator traits implemented outside the exchange core

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::fmt::Debug;

use super::{
	ChainResult, ContractCall, ContractMethod, PendingTx, SigningCapability, TxReceipt,
	WriteOptions,
};
use crate::bindings::ContractHandle;
use crate::models::ChainId;

/// Read/write access to chain state
///
/// Implementations wrap a node connection (see the JSON-RPC client in the
/// adapters crate) or an in-memory chain for tests. The exchange core never
/// imposes timeouts of its own; `wait` may take as long as the
/// implementation's pending-transaction semantics allow.
#[async_trait]
pub trait ChainClient: Send + Sync + Debug {
	/// Execute a view call returning a single `uint256`
	async fn read(&self, call: &ContractCall) -> ChainResult<U256>;

	/// Submit a state-changing call signed by `signer`
	///
	/// Returns once the provider has accepted the transaction for broadcast.
	async fn write(
		&self,
		signer: &SigningCapability,
		call: &ContractCall,
		options: WriteOptions,
	) -> ChainResult<PendingTx>;

	/// Wait until `tx` is included with at least `confirmations` blocks
	async fn wait(&self, tx: &PendingTx, confirmations: u64) -> ChainResult<TxReceipt>;

	/// Native asset balance of `address`, in base units
	async fn native_balance(&self, address: Address) -> ChainResult<U256>;

	/// Token balance of `owner` on the token behind `token`
	async fn token_balance(&self, token: &ContractHandle, owner: Address) -> ChainResult<U256> {
		self.read(&ContractCall::new(token, ContractMethod::BalanceOf { owner }))
			.await
	}

	/// Allowance granted by `owner` to `spender` on the token behind `token`
	async fn allowance(
		&self,
		token: &ContractHandle,
		owner: Address,
		spender: Address,
	) -> ChainResult<U256> {
		self.read(&ContractCall::new(
			token,
			ContractMethod::Allowance { owner, spender },
		))
		.await
	}
}

/// Wallet connection negotiated with the user's wallet
///
/// Account and network change notifications are delivered by the host
/// calling the exchange's `on_account_changed` / `on_network_changed`.
#[async_trait]
pub trait WalletProvider: Send + Sync {
	/// Ask the wallet to expose its accounts, prompting the user if needed
	async fn request_accounts(&self) -> ChainResult<Vec<Address>>;

	/// Signing capability for the currently selected account
	async fn get_signer(&self) -> ChainResult<SigningCapability>;

	/// Chain the wallet is currently connected to
	async fn get_network(&self) -> ChainResult<ChainId>;
}
