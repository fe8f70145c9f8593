//! Shared fixtures for the exchange integration tests

#![allow(dead_code)]

use std::sync::Arc;

pub use mint_types::test_utils::{
	test_account, test_deployment, units, InMemoryChain, InMemoryWallet, RecordedCall,
	TEST_CHAIN_ID,
};

use mint_exchange::config::{ConfigurableValue, ContractSettings, LogFormat};
use mint_exchange::{
	Exchange, ExchangeBuilder, ExchangeConfig, ExchangeEvent, Settings, TransactionEvent,
};
use tokio::sync::broadcast;

/// Settings matching [`test_deployment`], with tracing kept quiet
pub fn test_settings() -> Settings {
	let deployment = test_deployment();
	let mut settings = Settings::default();
	settings.network.chain_id = deployment.chain_id;
	settings.contracts = ContractSettings {
		token: deployment.token.to_string(),
		stable: deployment.stable.to_string(),
		fund: deployment.fund.to_string(),
		issuer: deployment.issuer.to_string(),
	};
	settings.rpc.endpoint = ConfigurableValue::from_plain("http://127.0.0.1:8545");
	settings.logging.level = "warn".to_string();
	settings.logging.format = LogFormat::Compact;
	settings
}

/// Exchange over `chain` using the tokio timer for resyncs
pub fn exchange_on(chain: &InMemoryChain) -> Exchange {
	Exchange::new(
		Arc::new(chain.clone()),
		ExchangeConfig::new(chain.deployment().clone()),
	)
}

/// Built through the facade, as a host application would
pub fn built_exchange(chain: &InMemoryChain) -> Exchange {
	ExchangeBuilder::from_settings(test_settings())
		.expect("valid test settings")
		.with_tracing(false)
		.with_client(Arc::new(chain.clone()))
		.build()
		.expect("exchange builds")
}

/// Connected to [`InMemoryWallet::connected`] with the initial sync applied
pub async fn ready_exchange(chain: &InMemoryChain) -> Exchange {
	let mut exchange = built_exchange(chain);
	exchange
		.connect(&InMemoryWallet::connected())
		.await
		.expect("wallet connects");
	exchange.process_pending_triggers().await;
	exchange
}

/// Everything currently buffered on `events`
pub fn drain(events: &mut broadcast::Receiver<ExchangeEvent>) -> Vec<ExchangeEvent> {
	let mut seen = Vec::new();
	while let Ok(event) = events.try_recv() {
		seen.push(event);
	}
	seen
}

pub fn transaction_events(events: &[ExchangeEvent]) -> Vec<&TransactionEvent> {
	events
		.iter()
		.filter_map(|event| match event {
			ExchangeEvent::Transaction(tx) => Some(tx),
			_ => None,
		})
		.collect()
}
