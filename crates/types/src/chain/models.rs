//! Contract call and transaction models

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::bindings::{ContractHandle, ContractKind};

/// Hash identifying a broadcast transaction
pub type TxHash = B256;

/// Opaque permission to sign transactions for one account
///
/// Produced by the wallet provider; the exchange only hands it back to the
/// chain client when writing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SigningCapability {
	account: Address,
}

impl SigningCapability {
	pub fn new(account: Address) -> Self {
		Self { account }
	}

	/// Account the capability signs for
	pub fn account(&self) -> Address {
		self.account
	}
}

/// Contract entry points used by the exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum ContractMethod {
	/// `balanceOf(address) returns (uint256)`
	BalanceOf { owner: Address },
	/// `allowance(address,address) returns (uint256)`
	Allowance { owner: Address, spender: Address },
	/// `approve(address,uint256) returns (bool)`
	Approve { spender: Address, amount: U256 },
	/// `mint(uint256)` on the mint issuer
	Mint { amount: U256 },
	/// `buyTokens(address) payable` on the minting fund
	BuyTokens { beneficiary: Address },
}

impl ContractMethod {
	/// Solidity function name
	pub fn name(&self) -> &'static str {
		match self {
			ContractMethod::BalanceOf { .. } => "balanceOf",
			ContractMethod::Allowance { .. } => "allowance",
			ContractMethod::Approve { .. } => "approve",
			ContractMethod::Mint { .. } => "mint",
			ContractMethod::BuyTokens { .. } => "buyTokens",
		}
	}

	/// Whether the method only reads chain state
	pub fn is_view(&self) -> bool {
		matches!(
			self,
			ContractMethod::BalanceOf { .. } | ContractMethod::Allowance { .. }
		)
	}
}

/// A method invocation against one bound contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
	pub contract: ContractKind,
	pub to: Address,
	pub method: ContractMethod,
}

impl ContractCall {
	pub fn new(handle: &ContractHandle, method: ContractMethod) -> Self {
		Self {
			contract: handle.kind,
			to: handle.address,
			method,
		}
	}
}

/// Options attached to a state-changing call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
	/// Native value transferred with the call, in base units
	pub value: U256,
}

impl WriteOptions {
	pub fn with_value(value: U256) -> Self {
		Self { value }
	}
}

/// Reference to a transaction accepted by the provider but not yet confirmed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTx {
	pub hash: TxHash,
	pub from: Address,
}

/// Inclusion result of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
	pub hash: TxHash,
	pub block_number: u64,
	/// `false` when the transaction was included but reverted
	pub success: bool,
}
