//! Balance synchronization
//!
//! A sync is split into three steps so the owner of the balance snapshot
//! never has to hold its state across chain calls:
//!
//! 1. [`BalanceSynchronizer::prepare`] checks the preconditions and captures
//!    the bindings, account and session epoch into a [`SyncRequest`].
//! 2. [`SyncRequest::run`] performs the three reads concurrently. Each read
//!    is caught on its own, so one failure never suppresses the others.
//! 3. [`SyncReport::merge_into`] builds the next snapshot. The exchange only
//!    commits it if the session still matches the captured epoch and chain.

use alloy_primitives::{Address, U256};
use chrono::Utc;
use std::sync::Arc;

use mint_types::{
	to_decimal, BalanceSnapshot, ChainClient, ChainError, ChainId, ChainResult, ContractBindings,
	DecimalAmount, Session,
};

const TRACING_TARGET: &str = "mint_exchange::sync";

/// Reads the fund's token stock and the user's stable and native balances
#[derive(Debug, Clone)]
pub struct BalanceSynchronizer {
	client: Arc<dyn ChainClient>,
}

impl BalanceSynchronizer {
	pub fn new(client: Arc<dyn ChainClient>) -> Self {
		Self { client }
	}

	/// Capture a sync for the current session, or `None` when it must not run
	///
	/// A sync runs only with bindings present, an account selected and the
	/// session on the bindings' network.
	pub fn prepare(
		&self,
		bindings: Option<&ContractBindings>,
		session: &Session,
	) -> Option<SyncRequest> {
		let Some(bindings) = bindings else {
			tracing::debug!(target: TRACING_TARGET, "No bindings, skipping sync");
			return None;
		};
		let Some(account) = session.account() else {
			tracing::debug!(target: TRACING_TARGET, "No account, skipping sync");
			return None;
		};
		if !bindings.is_valid_for(session.network()) {
			tracing::debug!(
				target: TRACING_TARGET,
				network = ?session.network(),
				bindings_chain_id = bindings.chain_id,
				"Bindings do not match session network, skipping sync"
			);
			return None;
		}

		Some(SyncRequest {
			client: Arc::clone(&self.client),
			bindings: bindings.clone(),
			account,
			epoch: session.epoch(),
		})
	}

	/// Run a sync and merge it over `previous`; `None` when it did not run
	pub async fn sync(
		&self,
		bindings: Option<&ContractBindings>,
		session: &Session,
		previous: &BalanceSnapshot,
	) -> Option<BalanceSnapshot> {
		let report = self.prepare(bindings, session)?.run().await;
		Some(report.merge_into(previous))
	}
}

/// A sync captured against one session epoch
#[derive(Debug, Clone)]
pub struct SyncRequest {
	client: Arc<dyn ChainClient>,
	bindings: ContractBindings,
	account: Address,
	epoch: u64,
}

impl SyncRequest {
	pub fn account(&self) -> Address {
		self.account
	}

	pub fn epoch(&self) -> u64 {
		self.epoch
	}

	pub async fn run(self) -> SyncReport {
		let bindings = &self.bindings;
		let (fund, stable, native) = tokio::join!(
			self.client
				.token_balance(&bindings.token, bindings.fund.address),
			self.client.token_balance(&bindings.stable, self.account),
			self.client.native_balance(self.account),
		);

		// The fund figure is best-effort; it may stay stale on transient errors
		if let Err(e) = &fund {
			tracing::warn!(
				target: TRACING_TARGET,
				fund = %bindings.fund.address,
				error = %e,
				"Failed to read fund token balance"
			);
		}
		if let Err(e) = &stable {
			tracing::warn!(
				target: TRACING_TARGET,
				account = %self.account,
				error = %e,
				"Failed to read stable token balance"
			);
		}
		if let Err(e) = &native {
			tracing::warn!(
				target: TRACING_TARGET,
				account = %self.account,
				error = %e,
				"Failed to read native balance"
			);
		}

		SyncReport {
			chain_id: bindings.chain_id,
			account: self.account,
			epoch: self.epoch,
			fund_token_balance: fund,
			user_stable_balance: stable,
			user_native_balance: native,
		}
	}
}

/// Raw outcome of the three reads of one sync
#[derive(Debug, Clone)]
pub struct SyncReport {
	pub chain_id: ChainId,
	pub account: Address,
	pub epoch: u64,
	pub fund_token_balance: ChainResult<U256>,
	pub user_stable_balance: ChainResult<U256>,
	pub user_native_balance: ChainResult<U256>,
}

impl SyncReport {
	/// Reads that failed
	pub fn failures(&self) -> Vec<&ChainError> {
		[
			&self.fund_token_balance,
			&self.user_stable_balance,
			&self.user_native_balance,
		]
		.into_iter()
		.filter_map(|result| result.as_ref().err())
		.collect()
	}

	/// Build a whole new snapshot from this report
	///
	/// A failed read keeps the previous figure, but only when `previous`
	/// describes the same chain (and, for user balances, the same account).
	/// Otherwise it falls back to zero rather than showing another
	/// account's balance.
	pub fn merge_into(&self, previous: &BalanceSnapshot) -> BalanceSnapshot {
		let same_chain = previous.chain_id == Some(self.chain_id);
		let same_account = same_chain && previous.account == Some(self.account);

		BalanceSnapshot {
			fund_token_balance: pick(
				&self.fund_token_balance,
				same_chain.then_some(&previous.fund_token_balance),
			),
			user_stable_balance: pick(
				&self.user_stable_balance,
				same_account.then_some(&previous.user_stable_balance),
			),
			user_native_balance: pick(
				&self.user_native_balance,
				same_account.then_some(&previous.user_native_balance),
			),
			chain_id: Some(self.chain_id),
			account: Some(self.account),
			synced_at: Some(Utc::now()),
		}
	}
}

fn pick(read: &ChainResult<U256>, fallback: Option<&DecimalAmount>) -> DecimalAmount {
	match read {
		Ok(value) => to_decimal(*value),
		Err(_) => fallback.cloned().unwrap_or_default(),
	}
}
