//! Blockchain network models

use serde::{Deserialize, Serialize};

/// Numeric EIP-155 chain identifier
pub type ChainId = u64;

/// Blockchain network the exchange can be bound to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Network {
	/// Chain ID (e.g., 1 for Ethereum mainnet, 42161 for Arbitrum One)
	pub chain_id: ChainId,
	/// Human-readable name (e.g., "Ethereum", "Arbitrum")
	pub name: Option<String>,
	/// Whether the network is a testnet
	pub is_testnet: Option<bool>,
}

impl Network {
	pub fn new(chain_id: ChainId, name: Option<String>, is_testnet: Option<bool>) -> Self {
		Self {
			chain_id,
			name,
			is_testnet,
		}
	}

	/// Whether the given chain id identifies this network
	pub fn matches(&self, chain_id: Option<ChainId>) -> bool {
		chain_id == Some(self.chain_id)
	}

	/// Name for logs and UI, falling back to the numeric id
	pub fn display_name(&self) -> String {
		self.name
			.clone()
			.unwrap_or_else(|| format!("chain {}", self.chain_id))
	}
}

/// Common network constants
impl Network {
	/// Ethereum mainnet
	pub fn ethereum() -> Self {
		Self::new(1, Some("Ethereum".to_string()), Some(false))
	}

	/// Arbitrum One, the network the exchange contracts are deployed on
	pub fn arbitrum_one() -> Self {
		Self::new(42161, Some("Arbitrum".to_string()), Some(false))
	}
}
