//! Contract handles bound to one network's deployment

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::ChainId;

/// The four contracts the exchange talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
	/// Exchangeable project token
	Token,
	/// Stable token deposited when minting
	Stable,
	/// Minting fund selling the project token for the native asset
	Fund,
	/// Mint issuer accepting stable-token deposits
	Issuer,
}

impl fmt::Display for ContractKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ContractKind::Token => "token",
			ContractKind::Stable => "stable",
			ContractKind::Fund => "fund",
			ContractKind::Issuer => "issuer",
		};
		f.write_str(name)
	}
}

/// Address of one deployed contract on one chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractHandle {
	pub kind: ContractKind,
	pub address: Address,
	pub chain_id: ChainId,
}

impl ContractHandle {
	pub fn new(kind: ContractKind, address: Address, chain_id: ChainId) -> Self {
		Self {
			kind,
			address,
			chain_id,
		}
	}
}

/// Static deployment: the supported chain and the four contract addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
	pub chain_id: ChainId,
	pub token: Address,
	pub stable: Address,
	pub fund: Address,
	pub issuer: Address,
}

/// Handles for all four contracts, valid only while the session stays on
/// `chain_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractBindings {
	pub chain_id: ChainId,
	pub token: ContractHandle,
	pub stable: ContractHandle,
	pub fund: ContractHandle,
	pub issuer: ContractHandle,
}

impl ContractBindings {
	pub fn from_deployment(deployment: &Deployment) -> Self {
		let chain_id = deployment.chain_id;
		Self {
			chain_id,
			token: ContractHandle::new(ContractKind::Token, deployment.token, chain_id),
			stable: ContractHandle::new(ContractKind::Stable, deployment.stable, chain_id),
			fund: ContractHandle::new(ContractKind::Fund, deployment.fund, chain_id),
			issuer: ContractHandle::new(ContractKind::Issuer, deployment.issuer, chain_id),
		}
	}

	pub fn handle(&self, kind: ContractKind) -> &ContractHandle {
		match kind {
			ContractKind::Token => &self.token,
			ContractKind::Stable => &self.stable,
			ContractKind::Fund => &self.fund,
			ContractKind::Issuer => &self.issuer,
		}
	}

	/// Whether these bindings may be used on `chain_id`
	pub fn is_valid_for(&self, chain_id: Option<ChainId>) -> bool {
		chain_id == Some(self.chain_id)
	}
}
