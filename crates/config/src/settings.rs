//! Configuration settings structures

use crate::configurable_value::{ConfigurableValue, ConfigurableValueError};
use alloy_primitives::Address;
use mint_types::{ContractKind, Deployment, Network, NotificationCategory, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Main exchange settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
	pub network: NetworkSettings,
	pub contracts: ContractSettings,
	pub transactions: TransactionSettings,
	pub notifications: NotificationSettings,
	pub rpc: RpcSettings,
	pub logging: LoggingSettings,
}

/// The single network the exchange operates on
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct NetworkSettings {
	pub chain_id: u64,
	pub name: String,
}

impl Default for NetworkSettings {
	fn default() -> Self {
		Self {
			chain_id: 42161,
			name: "Arbitrum".to_string(),
		}
	}
}

/// Hex addresses of the deployed contracts
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ContractSettings {
	/// Exchangeable project token
	pub token: String,
	/// Stable token deposited when minting
	pub stable: String,
	/// Minting fund selling the project token for the native asset
	pub fund: String,
	/// Mint issuer accepting stable-token deposits
	pub issuer: String,
}

impl ContractSettings {
	fn entries(&self) -> [(ContractKind, &str); 4] {
		[
			(ContractKind::Token, self.token.as_str()),
			(ContractKind::Stable, self.stable.as_str()),
			(ContractKind::Fund, self.fund.as_str()),
			(ContractKind::Issuer, self.issuer.as_str()),
		]
	}
}

/// Confirmation and resync behaviour of the transaction flows
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TransactionSettings {
	/// Confirmation depth required for purchase and mint transactions
	pub confirmations: u64,
	/// Confirmation depth awaited for the approval before minting.
	/// `0` submits the mint as soon as the approval is accepted.
	pub approval_confirmations: u64,
	/// Delay between a confirmation and the balance resync it triggers
	pub resync_delay_ms: u64,
	/// Skip the approval when the existing allowance already covers the amount
	pub reuse_existing_allowance: bool,
}

impl Default for TransactionSettings {
	fn default() -> Self {
		Self {
			confirmations: 1,
			approval_confirmations: 0,
			resync_delay_ms: 5000,
			reuse_existing_allowance: false,
		}
	}
}

impl TransactionSettings {
	pub fn resync_delay(&self) -> Duration {
		Duration::from_millis(self.resync_delay_ms)
	}
}

/// One entry of the notification classification table
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NotificationRule {
	/// Case-insensitive substring looked up in the provider's error text
	pub pattern: String,
	pub category: NotificationCategory,
	/// Text shown instead of the raw message; the raw message when absent
	#[serde(default)]
	pub display_text: Option<String>,
}

impl NotificationRule {
	pub fn new(pattern: &str, category: NotificationCategory, display_text: Option<&str>) -> Self {
		Self {
			pattern: pattern.to_string(),
			category,
			display_text: display_text.map(str::to_string),
		}
	}
}

/// Ordered classification table; the first matching rule wins
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct NotificationSettings {
	pub rules: Vec<NotificationRule>,
}

impl Default for NotificationSettings {
	fn default() -> Self {
		Self {
			rules: default_notification_rules(),
		}
	}
}

/// Rules for the provider messages seen in practice
pub fn default_notification_rules() -> Vec<NotificationRule> {
	vec![
		NotificationRule::new(
			"transfer amount exceeds balance",
			NotificationCategory::InsufficientLiquidity,
			Some("Not enough tokens in the contract!"),
		),
		NotificationRule::new(
			"user rejected",
			NotificationCategory::UserRejected,
			Some("Transaction rejected in wallet"),
		),
		NotificationRule::new(
			"user denied",
			NotificationCategory::UserRejected,
			Some("Transaction rejected in wallet"),
		),
		NotificationRule::new(
			"insufficient funds",
			NotificationCategory::InsufficientFunds,
			Some("Not enough funds to pay for this transaction"),
		),
	]
}

/// JSON-RPC node connection
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RpcSettings {
	/// Node URL; may embed a provider key, so prefer `{ type = "env", ... }`
	pub endpoint: ConfigurableValue,
	/// Per-request HTTP timeout
	pub timeout_ms: u64,
	/// Receipt polling interval while waiting for confirmations
	pub poll_interval_ms: u64,
}

impl Default for RpcSettings {
	fn default() -> Self {
		Self {
			endpoint: ConfigurableValue::from_env("MINT_RPC_URL"),
			timeout_ms: 30_000,
			poll_interval_ms: 1_000,
		}
	}
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
			structured: false,
		}
	}
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

/// Settings that load but cannot drive the exchange
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
	#[error("network.chain_id must be non-zero")]
	InvalidChainId,

	#[error("contracts.{contract} is not configured")]
	MissingContract { contract: ContractKind },

	#[error("contracts.{contract} is not a valid address: '{value}'")]
	InvalidContractAddress { contract: ContractKind, value: String },

	#[error("contracts.{first} and contracts.{second} share address {address}")]
	DuplicateContractAddress {
		first: ContractKind,
		second: ContractKind,
		address: Address,
	},

	#[error("transactions.confirmations must be at least 1")]
	InvalidConfirmations,

	#[error("notifications.rules[{index}] has an empty pattern")]
	EmptyNotificationPattern { index: usize },

	#[error("rpc.endpoint is empty")]
	EmptyRpcEndpoint,
}

impl Settings {
	/// Check everything the exchange relies on at startup
	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		if self.network.chain_id == 0 {
			return Err(ConfigValidationError::InvalidChainId);
		}
		self.deployment()?;
		if self.transactions.confirmations == 0 {
			return Err(ConfigValidationError::InvalidConfirmations);
		}
		if let Some(index) = self
			.notifications
			.rules
			.iter()
			.position(|rule| rule.pattern.trim().is_empty())
		{
			return Err(ConfigValidationError::EmptyNotificationPattern { index });
		}
		if self.rpc.endpoint.is_blank() {
			return Err(ConfigValidationError::EmptyRpcEndpoint);
		}
		Ok(())
	}

	/// Typed deployment for the configured network
	pub fn deployment(&self) -> Result<Deployment, ConfigValidationError> {
		let mut parsed: Vec<(ContractKind, Address)> = Vec::with_capacity(4);
		for (contract, value) in self.contracts.entries() {
			let value = value.trim();
			if value.is_empty() {
				return Err(ConfigValidationError::MissingContract { contract });
			}
			let address = value.parse::<Address>().map_err(|_| {
				ConfigValidationError::InvalidContractAddress {
					contract,
					value: value.to_string(),
				}
			})?;
			if let Some((first, _)) = parsed.iter().find(|(_, seen)| *seen == address) {
				return Err(ConfigValidationError::DuplicateContractAddress {
					first: *first,
					second: contract,
					address,
				});
			}
			parsed.push((contract, address));
		}

		Ok(Deployment {
			chain_id: self.network.chain_id,
			token: parsed[0].1,
			stable: parsed[1].1,
			fund: parsed[2].1,
			issuer: parsed[3].1,
		})
	}

	pub fn network(&self) -> Network {
		Network::new(
			self.network.chain_id,
			Some(self.network.name.clone()),
			None,
		)
	}

	/// Resolve the RPC endpoint for secure handling
	pub fn rpc_endpoint(&self) -> Result<SecretString, ConfigurableValueError> {
		self.rpc.endpoint.resolve()
	}
}
