//! Mint Exchange Library
//!
//! Client-side orchestrator for a token exchange deployed on a single
//! network: buy tokens directly from the minting fund, or approve and mint
//! against stable tokens, with balances kept in sync with the wallet session.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

// Core domain types - the most commonly used types
pub use mint_types::{
	chrono,
	// Primitives
	Address,
	// Inputs and snapshots
	AmountInput,
	BalanceSnapshot,
	// Collaborator traits
	ChainClient,
	ChainError,
	ChainId,
	ContractBindings,
	DecimalAmount,
	Deployment,
	// Error types
	ExchangeError,
	// Events
	ExchangeEvent,
	ExchangeResult,
	Notification,
	NotificationCategory,
	SecretString,
	Session,
	SigningCapability,
	TransactionEvent,
	// Transaction lifecycle
	TransactionHandle,
	TxFailureKind,
	TxState,
	UnitError,
	WalletProvider,
	U256,
};

// Service layer
pub use mint_service::{
	Exchange, ExchangeConfig, NotificationClassifier, ResyncScheduler, SyncTrigger,
	TransactionPolicy, TriggerSender,
};

// Adapters
pub use mint_adapters::{JsonRpcChainClient, RpcError};

// Config
pub use mint_config::{
	init_tracing, load_config, load_config_from, log_exchange_ready, log_service_info,
	ConfigLoadError, ConfigValidationError, ConfigurableValueError, Settings,
};

pub mod models {
	pub use mint_types::*;
}

pub mod config {
	pub use mint_config::*;
}

pub mod adapters {
	pub use mint_adapters::*;
}

pub mod service {
	pub use mint_service::*;
}

// Re-exported for hosts implementing the collaborator traits
pub use async_trait;

/// Failures while assembling an exchange
#[derive(Error, Debug)]
pub enum BuildError {
	#[error("Invalid configuration: {0}")]
	Config(#[from] ConfigValidationError),

	#[error("RPC endpoint unavailable: {0}")]
	Endpoint(#[from] ConfigurableValueError),

	#[error("Failed to create JSON-RPC client: {0}")]
	Rpc(#[from] RpcError),

	#[error("No chain client configured and no settings to create one from")]
	MissingClient,
}

/// JSON-RPC client for the endpoint configured in `settings`
///
/// The same client doubles as the wallet provider passed to
/// [`Exchange::connect`].
pub fn json_rpc_client(settings: &Settings) -> Result<Arc<JsonRpcChainClient>, BuildError> {
	let endpoint = settings.rpc_endpoint()?;
	let client = JsonRpcChainClient::new(
		endpoint,
		Duration::from_millis(settings.rpc.timeout_ms),
		Duration::from_millis(settings.rpc.poll_interval_ms),
	)?;
	Ok(Arc::new(client))
}

type SchedulerFactory = Box<dyn FnOnce(TriggerSender) -> Arc<dyn ResyncScheduler>>;

/// Builder for wiring an [`Exchange`] from settings or explicit parts
pub struct ExchangeBuilder {
	settings: Option<Settings>,
	config: ExchangeConfig,
	client: Option<Arc<dyn ChainClient>>,
	scheduler: Option<SchedulerFactory>,
	tracing: bool,
}

impl ExchangeBuilder {
	/// Builder for an explicit deployment with default policy and rules
	pub fn new(deployment: Deployment) -> Self {
		Self {
			settings: None,
			config: ExchangeConfig::new(deployment),
			client: None,
			scheduler: None,
			tracing: false,
		}
	}

	/// Builder from validated settings; tracing is initialised on build
	pub fn from_settings(settings: Settings) -> Result<Self, BuildError> {
		settings.validate()?;
		let config = ExchangeConfig::from_settings(&settings)?;
		Ok(Self {
			settings: Some(settings),
			config,
			client: None,
			scheduler: None,
			tracing: true,
		})
	}

	/// Use `client` instead of a JSON-RPC client from the settings
	pub fn with_client(mut self, client: Arc<dyn ChainClient>) -> Self {
		self.client = Some(client);
		self
	}

	/// Replace the tokio timer used for post-confirmation resyncs
	///
	/// `make_scheduler` is handed the exchange's trigger queue on build.
	pub fn with_scheduler<F>(mut self, make_scheduler: F) -> Self
	where
		F: FnOnce(TriggerSender) -> Arc<dyn ResyncScheduler> + 'static,
	{
		self.scheduler = Some(Box::new(make_scheduler));
		self
	}

	pub fn with_policy(mut self, policy: TransactionPolicy) -> Self {
		self.config.policy = policy;
		self
	}

	pub fn with_tracing(mut self, enabled: bool) -> Self {
		self.tracing = enabled;
		self
	}

	pub fn config(&self) -> &ExchangeConfig {
		&self.config
	}

	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	pub fn build(self) -> Result<Exchange, BuildError> {
		if let Some(settings) = &self.settings {
			if self.tracing && init_tracing(&settings.logging) {
				log_service_info();
			}
			log_exchange_ready(settings);
		}

		let client: Arc<dyn ChainClient> = match (self.client, &self.settings) {
			(Some(client), _) => client,
			(None, Some(settings)) => json_rpc_client(settings)?,
			(None, None) => return Err(BuildError::MissingClient),
		};

		info!(
			chain_id = self.config.deployment.chain_id,
			resync_delay_ms = self.config.policy.resync_delay.as_millis() as u64,
			"Exchange assembled"
		);

		Ok(match self.scheduler {
			Some(make_scheduler) => Exchange::with_scheduler(client, self.config, make_scheduler),
			None => Exchange::new(client, self.config),
		})
	}
}
