//! The exchange actor
//!
//! [`Exchange`] is the single owner of the session, the contract bindings
//! and the balance snapshot. Wallet callbacks mutate the session through
//! named transitions; balance syncs run only on queued [`SyncTrigger`]s and
//! are committed only while the session still matches the one they were
//! captured under.

use alloy_primitives::Address;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

use mint_config::{ConfigValidationError, NotificationRule, Settings};
use mint_types::{
	AmountInput, BalanceSnapshot, ChainClient, ChainId, ContractBindings, Deployment,
	ExchangeError, ExchangeEvent, ExchangeResult, SigningCapability, Session, TransactionHandle,
	WalletProvider,
};

use crate::balance::{BalanceSynchronizer, SyncReport, SyncRequest};
use crate::bindings::BindingResolver;
use crate::notification::NotificationClassifier;
use crate::orchestrator::{TransactionOrchestrator, TransactionPolicy};
use crate::resync::{ResyncScheduler, SyncTrigger, TokioResyncScheduler, TriggerSender};

const TRACING_TARGET: &str = "mint_exchange::exchange";

/// Capacity of the event broadcast channel
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Everything the exchange needs besides its collaborators
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
	pub deployment: Deployment,
	pub policy: TransactionPolicy,
	pub notification_rules: Vec<NotificationRule>,
	pub event_capacity: usize,
}

impl ExchangeConfig {
	pub fn new(deployment: Deployment) -> Self {
		Self {
			deployment,
			policy: TransactionPolicy::default(),
			notification_rules: mint_config::default_notification_rules(),
			event_capacity: DEFAULT_EVENT_CAPACITY,
		}
	}

	pub fn from_settings(settings: &Settings) -> Result<Self, ConfigValidationError> {
		Ok(Self {
			deployment: settings.deployment()?,
			policy: TransactionPolicy::from(&settings.transactions),
			notification_rules: settings.notifications.rules.clone(),
			event_capacity: DEFAULT_EVENT_CAPACITY,
		})
	}
}

pub struct Exchange {
	resolver: BindingResolver,
	synchronizer: BalanceSynchronizer,
	orchestrator: TransactionOrchestrator,
	session: Session,
	bindings: Option<ContractBindings>,
	snapshot: BalanceSnapshot,
	triggers_tx: mpsc::UnboundedSender<SyncTrigger>,
	triggers_rx: mpsc::UnboundedReceiver<SyncTrigger>,
	events: broadcast::Sender<ExchangeEvent>,
}

impl Exchange {
	/// Exchange whose post-confirmation resyncs run on the tokio timer
	pub fn new(client: Arc<dyn ChainClient>, config: ExchangeConfig) -> Self {
		Self::with_scheduler(client, config, |triggers| {
			Arc::new(TokioResyncScheduler::new(triggers))
		})
	}

	/// Exchange with a custom resync scheduler
	///
	/// `make_scheduler` receives the exchange's trigger queue, into which the
	/// scheduler posts [`SyncTrigger::PostConfirmation`] once its delay expires.
	pub fn with_scheduler<F>(
		client: Arc<dyn ChainClient>,
		config: ExchangeConfig,
		make_scheduler: F,
	) -> Self
	where
		F: FnOnce(TriggerSender) -> Arc<dyn ResyncScheduler>,
	{
		let (triggers_tx, triggers_rx) = mpsc::unbounded_channel();
		let scheduler = make_scheduler(triggers_tx.clone());
		Self::assemble(client, config, scheduler, triggers_tx, triggers_rx)
	}

	fn assemble(
		client: Arc<dyn ChainClient>,
		config: ExchangeConfig,
		scheduler: Arc<dyn ResyncScheduler>,
		triggers_tx: mpsc::UnboundedSender<SyncTrigger>,
		triggers_rx: mpsc::UnboundedReceiver<SyncTrigger>,
	) -> Self {
		let (events, _) = broadcast::channel(config.event_capacity.max(1));
		let orchestrator = TransactionOrchestrator::new(
			Arc::clone(&client),
			scheduler,
			NotificationClassifier::new(config.notification_rules),
			config.policy,
			events.clone(),
		);
		Self {
			resolver: BindingResolver::new(config.deployment),
			synchronizer: BalanceSynchronizer::new(client),
			orchestrator,
			session: Session::new(),
			bindings: None,
			snapshot: BalanceSnapshot::default(),
			triggers_tx,
			triggers_rx,
			events,
		}
	}

	// ---- wallet session ----

	/// Negotiate a session with the wallet, then bind and queue a sync
	pub async fn connect(&mut self, wallet: &dyn WalletProvider) -> ExchangeResult<()> {
		let accounts = wallet
			.request_accounts()
			.await
			.map_err(ExchangeError::Wallet)?;
		if accounts.is_empty() {
			return Err(ExchangeError::NotConnected);
		}
		let signer = wallet.get_signer().await.map_err(ExchangeError::Wallet)?;
		let network = wallet.get_network().await.map_err(ExchangeError::Wallet)?;

		self.session.connect(&accounts, signer, network);
		tracing::info!(
			target: TRACING_TARGET,
			account = ?self.session.account(),
			chain_id = network,
			"Wallet connected"
		);

		self.rebind();
		self.enqueue(SyncTrigger::AccountChanged);
		Ok(())
	}

	/// Drop the session, the bindings and the account's balances
	pub fn disconnect(&mut self) {
		self.session.disconnect();
		self.clear_after_disconnect();
	}

	/// Wallet account-change callback; an empty list means disconnected
	pub fn on_account_changed(&mut self, accounts: &[Address]) {
		if !self.session.on_account_changed(accounts) {
			return;
		}
		if self.session.account().is_none() {
			self.clear_after_disconnect();
			return;
		}
		tracing::info!(
			target: TRACING_TARGET,
			account = ?self.session.account(),
			"Account changed"
		);
		self.enqueue(SyncTrigger::AccountChanged);
	}

	/// Wallet network-change callback
	pub fn on_network_changed(&mut self, chain_id: ChainId) {
		if !self.session.on_network_changed(chain_id) {
			return;
		}
		tracing::info!(
			target: TRACING_TARGET,
			chain_id,
			"Network changed"
		);
		self.rebind();
	}

	/// Replace the bindings with whatever the current network resolves to
	fn rebind(&mut self) {
		// Old bindings are unusable from this point on, whatever resolve returns
		self.bindings = None;
		self.bindings = self.resolver.resolve(self.session.network());

		let supported = self.bindings.is_some();
		if !supported {
			tracing::warn!(
				target: TRACING_TARGET,
				network = ?self.session.network(),
				expected = self.resolver.supported_chain_id(),
				"Unsupported network, chain operations disabled"
			);
		}
		self.emit(ExchangeEvent::NetworkChanged {
			chain_id: self.session.network(),
			supported,
		});
		if supported {
			self.enqueue(SyncTrigger::BindingsChanged);
		}
	}

	fn clear_after_disconnect(&mut self) {
		self.bindings = None;
		self.snapshot = BalanceSnapshot::default();
		tracing::info!(target: TRACING_TARGET, "Wallet disconnected");
		self.emit(ExchangeEvent::Disconnected);
	}

	// ---- balance sync ----

	/// Handle to post triggers from outside the actor
	pub fn trigger_sender(&self) -> mpsc::UnboundedSender<SyncTrigger> {
		self.triggers_tx.clone()
	}

	pub fn enqueue(&self, trigger: SyncTrigger) {
		// The receiver lives in self, so the queue is never closed here
		let _ = self.triggers_tx.send(trigger);
	}

	/// Wait for the next queued trigger
	pub async fn next_trigger(&mut self) -> Option<SyncTrigger> {
		self.triggers_rx.recv().await
	}

	/// Run the sync a trigger asks for; returns whether a snapshot was committed
	pub async fn handle_trigger(&mut self, trigger: SyncTrigger) -> bool {
		tracing::debug!(target: TRACING_TARGET, trigger = ?trigger, "Handling sync trigger");
		self.sync().await
	}

	/// Drain the trigger queue and run at most one sync for all of it
	///
	/// Returns the number of triggers consumed.
	pub async fn process_pending_triggers(&mut self) -> usize {
		let mut drained = Vec::new();
		while let Ok(trigger) = self.triggers_rx.try_recv() {
			drained.push(trigger);
		}
		if let Some(last) = drained.last().copied() {
			if drained.len() > 1 {
				tracing::debug!(
					target: TRACING_TARGET,
					coalesced = drained.len(),
					"Coalescing sync triggers"
				);
			}
			self.handle_trigger(last).await;
		}
		drained.len()
	}

	/// Capture a sync against the current session, if one may run
	pub fn sync_request(&self) -> Option<SyncRequest> {
		self.synchronizer
			.prepare(self.bindings.as_ref(), &self.session)
	}

	/// Commit a finished sync unless the session moved on meanwhile
	pub fn apply_sync(&mut self, report: SyncReport) -> bool {
		let current = self.session.epoch() == report.epoch
			&& self.session.account() == Some(report.account)
			&& self.session.is_on(report.chain_id)
			&& self
				.bindings
				.as_ref()
				.is_some_and(|bindings| bindings.chain_id == report.chain_id);
		if !current {
			tracing::debug!(
				target: TRACING_TARGET,
				report_epoch = report.epoch,
				session_epoch = self.session.epoch(),
				report_chain_id = report.chain_id,
				"Discarding stale sync result"
			);
			return false;
		}

		self.snapshot = report.merge_into(&self.snapshot);
		tracing::debug!(
			target: TRACING_TARGET,
			fund = %self.snapshot.fund_token_balance,
			stable = %self.snapshot.user_stable_balance,
			native = %self.snapshot.user_native_balance,
			"Balances updated"
		);
		self.emit(ExchangeEvent::BalancesUpdated(self.snapshot.clone()));
		true
	}

	/// Sync now; a no-op returning `false` when preconditions do not hold
	pub async fn sync(&mut self) -> bool {
		let Some(request) = self.sync_request() else {
			return false;
		};
		let report = request.run().await;
		self.apply_sync(report)
	}

	// ---- transactions ----

	/// Direct purchase: pay `amount` of native asset into the minting fund
	pub async fn buy_tokens(&self, amount: &str) -> ExchangeResult<TransactionHandle> {
		let (bindings, signer) = self.ready_context()?;
		self.orchestrator
			.purchase(bindings, signer, &AmountInput::native(amount))
			.await
	}

	/// Approve-then-mint with `amount` stable tokens
	pub async fn mint_stable(&self, amount: &str) -> ExchangeResult<TransactionHandle> {
		let (bindings, signer) = self.ready_context()?;
		self.orchestrator
			.approve_and_mint(bindings, signer, &AmountInput::stable(amount))
			.await
	}

	fn ready_context(&self) -> ExchangeResult<(&ContractBindings, &SigningCapability)> {
		let signer = match (self.session.account(), self.session.signer()) {
			(Some(_), Some(signer)) => signer,
			_ => return Err(ExchangeError::NotConnected),
		};
		match &self.bindings {
			Some(bindings) if bindings.is_valid_for(self.session.network()) => {
				Ok((bindings, signer))
			},
			_ => Err(ExchangeError::UnsupportedNetwork {
				actual: self.session.network(),
				expected: self.resolver.supported_chain_id(),
			}),
		}
	}

	// ---- views ----

	pub fn snapshot(&self) -> &BalanceSnapshot {
		&self.snapshot
	}

	pub fn session(&self) -> &Session {
		&self.session
	}

	pub fn bindings(&self) -> Option<&ContractBindings> {
		self.bindings.as_ref()
	}

	pub fn policy(&self) -> &TransactionPolicy {
		self.orchestrator.policy()
	}

	/// Connected and on the supported network, so the send forms may be enabled
	pub fn is_ready(&self) -> bool {
		self.ready_context().is_ok()
	}

	pub fn subscribe(&self) -> broadcast::Receiver<ExchangeEvent> {
		self.events.subscribe()
	}

	fn emit(&self, event: ExchangeEvent) {
		let _ = self.events.send(event);
	}
}
