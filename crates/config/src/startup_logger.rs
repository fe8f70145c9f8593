//! Startup logging for the mint exchange
//!
//! Prints the service version, platform and the configured deployment. The
//! RPC endpoint is only ever logged as a scheme/host hint.

use std::env;
use tracing::{info, warn};

use crate::Settings;

/// Logs service information at startup
pub fn log_service_info() {
	// Root package name, not this crate's
	let service_name = "mint-exchange";
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== Mint Exchange Starting ===");
	info!("🚀 Service: {} v{}", service_name, service_version);
	info!("💻 Platform: {}", env::consts::OS);
	info!("🏗️ Architecture: {}", env::consts::ARCH);

	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level: {}", rust_log);
	}

	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs the deployment the exchange is about to bind to
pub fn log_exchange_ready(settings: &Settings) {
	info!(
		"⛓️ Network: {} (chain {})",
		settings.network.name, settings.network.chain_id
	);
	info!(
		token = %settings.contracts.token,
		stable = %settings.contracts.stable,
		fund = %settings.contracts.fund,
		issuer = %settings.contracts.issuer,
		"📜 Contracts"
	);

	match settings.rpc_endpoint() {
		Ok(endpoint) => info!("📡 RPC: {}", endpoint.host_hint()),
		Err(e) => warn!(
			"📡 RPC endpoint unavailable ({}): {}",
			settings.rpc.endpoint.description(),
			e
		),
	}

	info!(
		confirmations = settings.transactions.confirmations,
		approval_confirmations = settings.transactions.approval_confirmations,
		resync_delay_ms = settings.transactions.resync_delay_ms,
		"⏱️ Transaction policy"
	);
	info!("✅ Mint exchange ready");
}

/// Logs service shutdown information
pub fn log_service_shutdown() {
	info!("🛑 Mint Exchange Shutting Down");
}
