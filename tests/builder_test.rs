//! Tests for assembling the exchange from settings

mod mocks;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mint_exchange::async_trait::async_trait;
use mint_exchange::config::ConfigurableValue;
use mint_exchange::models::ContractKind;
use mint_exchange::{
	BuildError, ConfigValidationError, ExchangeBuilder, NotificationCategory, ResyncScheduler,
	SyncTrigger, TransactionPolicy, TriggerSender,
};
use mocks::*;

#[test]
fn test_from_settings_carries_transaction_policy() {
	let mut settings = test_settings();
	settings.transactions.resync_delay_ms = 2500;
	settings.transactions.approval_confirmations = 2;

	let builder = ExchangeBuilder::from_settings(settings).unwrap();
	let config = builder.config();
	assert_eq!(config.deployment, test_deployment());
	assert_eq!(config.policy.resync_delay, Duration::from_millis(2500));
	assert_eq!(config.policy.approval_confirmations, 2);
	assert_eq!(config.policy.confirmations, 1);
	assert!(!config.policy.reuse_existing_allowance);
	assert!(config
		.notification_rules
		.iter()
		.any(|rule| rule.category == NotificationCategory::InsufficientLiquidity));
}

#[test]
fn test_from_settings_rejects_invalid_deployment() {
	let mut settings = test_settings();
	settings.contracts.issuer = settings.contracts.stable.clone();
	let error = ExchangeBuilder::from_settings(settings).err().unwrap();
	assert!(matches!(
		error,
		BuildError::Config(ConfigValidationError::DuplicateContractAddress {
			first: ContractKind::Stable,
			second: ContractKind::Issuer,
			..
		})
	));

	let mut settings = test_settings();
	settings.contracts.fund = "not-an-address".to_string();
	assert!(matches!(
		ExchangeBuilder::from_settings(settings),
		Err(BuildError::Config(
			ConfigValidationError::InvalidContractAddress { .. }
		))
	));
}

#[tokio::test]
async fn test_build_with_injected_client() {
	let chain = InMemoryChain::seeded();
	let mut exchange = ExchangeBuilder::from_settings(test_settings())
		.unwrap()
		.with_tracing(false)
		.with_client(Arc::new(chain.clone()))
		.build()
		.unwrap();

	exchange
		.connect(&InMemoryWallet::connected())
		.await
		.unwrap();
	exchange.process_pending_triggers().await;
	assert_eq!(exchange.snapshot().user_stable_balance.as_str(), "100");
}

/// Resyncs straight away and counts how often it was asked to
struct CountingScheduler {
	triggers: TriggerSender,
	scheduled: Arc<AtomicUsize>,
}

#[async_trait]
impl ResyncScheduler for CountingScheduler {
	async fn schedule_resync(&self, _delay: Duration) {
		self.scheduled.fetch_add(1, Ordering::SeqCst);
		let _ = self.triggers.send(SyncTrigger::PostConfirmation);
	}
}

#[tokio::test]
async fn test_build_with_custom_scheduler() {
	let chain = InMemoryChain::seeded();
	let scheduled = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&scheduled);
	let mut exchange = ExchangeBuilder::from_settings(test_settings())
		.unwrap()
		.with_tracing(false)
		.with_client(Arc::new(chain.clone()))
		.with_scheduler(move |triggers| {
			Arc::new(CountingScheduler {
				triggers,
				scheduled: counter,
			})
		})
		.build()
		.unwrap();

	exchange
		.connect(&InMemoryWallet::connected())
		.await
		.unwrap();
	exchange.process_pending_triggers().await;

	exchange.buy_tokens("0.5").await.unwrap();
	assert_eq!(scheduled.load(Ordering::SeqCst), 1);
	assert_eq!(exchange.process_pending_triggers().await, 1);
	assert_eq!(exchange.snapshot().user_native_balance.as_str(), "1.5");
}

#[tokio::test]
async fn test_build_creates_json_rpc_client_from_settings() {
	let exchange = ExchangeBuilder::from_settings(test_settings())
		.unwrap()
		.with_tracing(false)
		.build()
		.unwrap();
	assert!(!exchange.is_ready());
}

#[test]
fn test_build_without_endpoint_or_client() {
	let mut settings = test_settings();
	settings.rpc.endpoint = ConfigurableValue::from_env("MINT_TEST_ENDPOINT_THAT_IS_NEVER_SET");
	let error = ExchangeBuilder::from_settings(settings)
		.unwrap()
		.with_tracing(false)
		.build()
		.err()
		.unwrap();
	assert!(matches!(error, BuildError::Endpoint(_)));

	let error = ExchangeBuilder::new(test_deployment())
		.build()
		.err()
		.unwrap();
	assert!(matches!(error, BuildError::MissingClient));
}

#[test]
fn test_explicit_policy_overrides_defaults() {
	let policy = TransactionPolicy {
		confirmations: 3,
		approval_confirmations: 2,
		resync_delay: Duration::from_secs(1),
		reuse_existing_allowance: true,
	};
	let builder = ExchangeBuilder::new(test_deployment()).with_policy(policy.clone());
	assert_eq!(builder.config().policy, policy);
	assert!(builder.settings().is_none());
}

#[test]
fn test_shipped_config_builds() {
	let settings = mint_exchange::load_config_from("config/config.toml").unwrap();
	assert_eq!(settings.network.chain_id, TEST_CHAIN_ID);
	assert_eq!(settings.notifications.rules.len(), 4);

	let builder = ExchangeBuilder::from_settings(settings).unwrap();
	assert_eq!(builder.config().deployment, test_deployment());
	assert_eq!(
		builder.config().policy.resync_delay,
		Duration::from_millis(5000)
	);
	assert_eq!(builder.config().policy.approval_confirmations, 0);
}
