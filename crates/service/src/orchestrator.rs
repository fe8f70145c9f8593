//! Transaction orchestration
//!
//! Drives the direct-purchase and approve-then-mint flows through the
//! `Submitted -> Confirming -> Confirmed | Failed` lifecycle. Every
//! transition is published as an [`ExchangeEvent::Transaction`]; a
//! confirmation schedules exactly one deferred balance resync, a failure
//! schedules none.

use std::sync::Arc;
use std::time::Duration;

use mint_config::TransactionSettings;
use mint_types::{
	AmountInput, ChainClient, ChainError, ContractBindings, ContractCall, ContractMethod,
	ExchangeEvent, ExchangeResult, FlowKind, Notification, PendingTx, SigningCapability,
	TransactionEvent, TransactionHandle, TxFailure, TxFailureKind, TxStage, WriteOptions, U256,
};
use tokio::sync::broadcast;

use crate::notification::NotificationClassifier;
use crate::resync::ResyncScheduler;

const TRACING_TARGET: &str = "mint_exchange::orchestrator";

/// Confirmation depths and resync timing of the flows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionPolicy {
	pub confirmations: u64,
	/// `0` submits the mint as soon as the approval is accepted
	pub approval_confirmations: u64,
	pub resync_delay: Duration,
	pub reuse_existing_allowance: bool,
}

impl Default for TransactionPolicy {
	fn default() -> Self {
		Self::from(&TransactionSettings::default())
	}
}

impl From<&TransactionSettings> for TransactionPolicy {
	fn from(settings: &TransactionSettings) -> Self {
		Self {
			confirmations: settings.confirmations.max(1),
			approval_confirmations: settings.approval_confirmations,
			resync_delay: settings.resync_delay(),
			reuse_existing_allowance: settings.reuse_existing_allowance,
		}
	}
}

/// Submits flows and follows them to a final state
pub struct TransactionOrchestrator {
	client: Arc<dyn ChainClient>,
	scheduler: Arc<dyn ResyncScheduler>,
	classifier: NotificationClassifier,
	policy: TransactionPolicy,
	events: broadcast::Sender<ExchangeEvent>,
}

impl TransactionOrchestrator {
	pub fn new(
		client: Arc<dyn ChainClient>,
		scheduler: Arc<dyn ResyncScheduler>,
		classifier: NotificationClassifier,
		policy: TransactionPolicy,
		events: broadcast::Sender<ExchangeEvent>,
	) -> Self {
		Self {
			client,
			scheduler,
			classifier,
			policy,
			events,
		}
	}

	pub fn policy(&self) -> &TransactionPolicy {
		&self.policy
	}

	/// Pay native asset into the minting fund for project tokens
	///
	/// Returns `Err` only for pre-flight failures (malformed amount, handle
	/// misuse). A rejected submission or failed confirmation is reported
	/// through the returned handle in the `Failed` state.
	pub async fn purchase(
		&self,
		bindings: &ContractBindings,
		signer: &SigningCapability,
		amount: &AmountInput,
	) -> ExchangeResult<TransactionHandle> {
		let value = amount.to_base_units()?;
		let mut handle = TransactionHandle::new(FlowKind::DirectPurchase, value);
		tracing::info!(
			target: TRACING_TARGET,
			id = %handle.id,
			account = %signer.account(),
			value = %value,
			"Submitting direct purchase"
		);
		self.publish(&handle, TxStage::Purchase, None);

		let call = ContractCall::new(
			&bindings.fund,
			ContractMethod::BuyTokens {
				beneficiary: signer.account(),
			},
		);
		match self
			.client
			.write(signer, &call, WriteOptions::with_value(value))
			.await
		{
			Ok(pending) => self.confirm(&mut handle, pending, TxStage::Purchase).await?,
			Err(e) => self.fail(
				&mut handle,
				TxFailureKind::SubmissionRejected,
				&e,
				TxStage::Purchase,
			)?,
		}
		Ok(handle)
	}

	/// Approve the issuer for exactly `amount` stable tokens, then mint
	///
	/// The mint is submitted only after the approval was accepted (and, with
	/// a non-zero `approval_confirmations`, confirmed). A failed mint leaves
	/// the approval in place.
	pub async fn approve_and_mint(
		&self,
		bindings: &ContractBindings,
		signer: &SigningCapability,
		amount: &AmountInput,
	) -> ExchangeResult<TransactionHandle> {
		let value = amount.to_base_units()?;
		let mut handle = TransactionHandle::new(FlowKind::ApproveThenMint, value);
		tracing::info!(
			target: TRACING_TARGET,
			id = %handle.id,
			account = %signer.account(),
			value = %value,
			"Submitting approve-then-mint"
		);
		self.publish(&handle, TxStage::Approval, None);

		if self.needs_approval(bindings, signer, value).await
			&& !self.approve(&mut handle, bindings, signer, value).await?
		{
			return Ok(handle);
		}

		let call = ContractCall::new(&bindings.issuer, ContractMethod::Mint { amount: value });
		match self
			.client
			.write(signer, &call, WriteOptions::default())
			.await
		{
			Ok(pending) => self.confirm(&mut handle, pending, TxStage::Mint).await?,
			Err(e) => {
				if handle.approval_hash.is_some() {
					tracing::warn!(
						target: TRACING_TARGET,
						id = %handle.id,
						spender = %bindings.issuer.address,
						amount = %value,
						"Mint rejected after approval; allowance remains granted"
					);
				}
				self.fail(
					&mut handle,
					TxFailureKind::SubmissionRejected,
					&e,
					TxStage::Mint,
				)?;
			},
		}
		Ok(handle)
	}

	async fn needs_approval(
		&self,
		bindings: &ContractBindings,
		signer: &SigningCapability,
		value: U256,
	) -> bool {
		if !self.policy.reuse_existing_allowance {
			return true;
		}
		match self
			.client
			.allowance(&bindings.stable, signer.account(), bindings.issuer.address)
			.await
		{
			Ok(allowance) if allowance >= value => {
				tracing::debug!(
					target: TRACING_TARGET,
					allowance = %allowance,
					amount = %value,
					"Existing allowance covers amount, skipping approval"
				);
				false
			},
			Ok(_) => true,
			Err(e) => {
				tracing::warn!(
					target: TRACING_TARGET,
					error = %e,
					"Failed to read allowance, approving"
				);
				true
			},
		}
	}

	/// Returns whether the flow may continue with the mint
	async fn approve(
		&self,
		handle: &mut TransactionHandle,
		bindings: &ContractBindings,
		signer: &SigningCapability,
		value: U256,
	) -> ExchangeResult<bool> {
		let call = ContractCall::new(
			&bindings.stable,
			ContractMethod::Approve {
				spender: bindings.issuer.address,
				amount: value,
			},
		);
		let pending = match self
			.client
			.write(signer, &call, WriteOptions::default())
			.await
		{
			Ok(pending) => pending,
			Err(e) => {
				self.fail(handle, TxFailureKind::SubmissionRejected, &e, TxStage::Approval)?;
				return Ok(false);
			},
		};

		handle.record_approval(pending.hash);
		tracing::debug!(
			target: TRACING_TARGET,
			id = %handle.id,
			tx_hash = %pending.hash,
			"Approval accepted"
		);
		self.publish(handle, TxStage::Approval, Some(Notification::pending()));

		if self.policy.approval_confirmations == 0 {
			return Ok(true);
		}
		let failure = match self
			.client
			.wait(&pending, self.policy.approval_confirmations)
			.await
		{
			Ok(receipt) if receipt.success => return Ok(true),
			Ok(receipt) => ChainError::Reverted {
				tx_hash: receipt.hash,
				message: "approval reverted".to_string(),
			},
			Err(e) => e,
		};
		self.fail(
			handle,
			TxFailureKind::ConfirmationFailed,
			&failure,
			TxStage::Approval,
		)?;
		Ok(false)
	}

	/// Follow an accepted transaction to its final state
	async fn confirm(
		&self,
		handle: &mut TransactionHandle,
		pending: PendingTx,
		stage: TxStage,
	) -> ExchangeResult<()> {
		handle.mark_confirming(pending.hash)?;
		tracing::debug!(
			target: TRACING_TARGET,
			id = %handle.id,
			tx_hash = %pending.hash,
			"Transaction confirming"
		);
		self.publish(handle, stage, Some(Notification::pending()));

		let receipt = match self.client.wait(&pending, self.policy.confirmations).await {
			Ok(receipt) if receipt.success => receipt,
			Ok(receipt) => {
				let error = ChainError::Reverted {
					tx_hash: receipt.hash,
					message: "transaction reverted".to_string(),
				};
				return self.fail(handle, TxFailureKind::ConfirmationFailed, &error, stage);
			},
			Err(e) => {
				return self.fail(handle, TxFailureKind::ConfirmationFailed, &e, stage);
			},
		};

		let notification = Notification::confirmed(&receipt.hash);
		tracing::info!(
			target: TRACING_TARGET,
			id = %handle.id,
			tx_hash = %receipt.hash,
			block_number = receipt.block_number,
			"Transaction confirmed"
		);
		handle.mark_confirmed(receipt)?;
		self.publish(handle, stage, Some(notification));

		self.scheduler
			.schedule_resync(self.policy.resync_delay)
			.await;
		Ok(())
	}

	fn fail(
		&self,
		handle: &mut TransactionHandle,
		kind: TxFailureKind,
		error: &ChainError,
		stage: TxStage,
	) -> ExchangeResult<()> {
		let notification = self.classifier.classify_error(error);
		tracing::warn!(
			target: TRACING_TARGET,
			id = %handle.id,
			stage = ?stage,
			kind = ?kind,
			category = %notification.category,
			error = %error,
			"Transaction failed"
		);
		handle.mark_failed(TxFailure {
			kind,
			message: error.raw_message().to_string(),
			notification: notification.clone(),
		})?;
		self.publish(handle, stage, Some(notification));
		Ok(())
	}

	fn publish(
		&self,
		handle: &TransactionHandle,
		stage: TxStage,
		notification: Option<Notification>,
	) {
		let event = TransactionEvent::from_handle(handle, stage, notification);
		// No subscribers is fine
		let _ = self.events.send(ExchangeEvent::Transaction(event));
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::resync::MockResyncScheduler;
	use mint_types::test_utils::{test_account, units, InMemoryChain, RecordedCall};
	use mint_types::{to_base_units, NotificationCategory, TxState};
	use mockall::predicate::eq;

	struct Harness {
		chain: InMemoryChain,
		bindings: ContractBindings,
		signer: SigningCapability,
		events: broadcast::Receiver<ExchangeEvent>,
		orchestrator: TransactionOrchestrator,
	}

	fn harness(policy: TransactionPolicy, resyncs: usize) -> Harness {
		let chain = InMemoryChain::seeded();
		let bindings = ContractBindings::from_deployment(chain.deployment());

		let mut scheduler = MockResyncScheduler::new();
		scheduler
			.expect_schedule_resync()
			.with(eq(policy.resync_delay))
			.times(resyncs)
			.returning(|_| Box::pin(async {}));

		let (events, receiver) = broadcast::channel(64);
		let orchestrator = TransactionOrchestrator::new(
			Arc::new(chain.clone()),
			Arc::new(scheduler),
			NotificationClassifier::default(),
			policy,
			events,
		);
		Harness {
			chain,
			bindings,
			signer: SigningCapability::new(test_account()),
			events: receiver,
			orchestrator,
		}
	}

	fn drain(events: &mut broadcast::Receiver<ExchangeEvent>) -> Vec<TransactionEvent> {
		let mut out = Vec::new();
		while let Ok(event) = events.try_recv() {
			if let ExchangeEvent::Transaction(event) = event {
				out.push(event);
			}
		}
		out
	}

	#[tokio::test]
	async fn test_purchase_sends_value_to_fund() {
		let mut h = harness(TransactionPolicy::default(), 1);

		let handle = h
			.orchestrator
			.purchase(&h.bindings, &h.signer, &AmountInput::native("0.5"))
			.await
			.unwrap();

		assert_eq!(handle.state(), TxState::Confirmed);
		let writes = h.chain.writes();
		assert_eq!(writes.len(), 1);
		let (from, call, value) = &writes[0];
		assert_eq!(*from, test_account());
		assert_eq!(call.to, h.bindings.fund.address);
		assert_eq!(
			call.method,
			ContractMethod::BuyTokens {
				beneficiary: test_account()
			}
		);
		assert_eq!(*value, to_base_units("0.5").unwrap());

		let states: Vec<_> = drain(&mut h.events).iter().map(|e| e.state).collect();
		assert_eq!(
			states,
			vec![TxState::Submitted, TxState::Confirming, TxState::Confirmed]
		);
	}

	#[tokio::test]
	async fn test_approve_then_mint_uses_same_amount() {
		let mut h = harness(TransactionPolicy::default(), 1);

		let handle = h
			.orchestrator
			.approve_and_mint(&h.bindings, &h.signer, &AmountInput::stable("40"))
			.await
			.unwrap();

		assert_eq!(handle.state(), TxState::Confirmed);
		assert!(handle.approval_hash.is_some());
		let expected = to_base_units("40").unwrap();
		let methods: Vec<_> = h.chain.writes().into_iter().map(|(_, call, _)| call.method).collect();
		assert_eq!(
			methods,
			vec![
				ContractMethod::Approve {
					spender: h.bindings.issuer.address,
					amount: expected
				},
				ContractMethod::Mint { amount: expected },
			]
		);
		assert_eq!(
			h.chain
				.token_balance_of(h.bindings.stable.address, test_account()),
			units(60)
		);

		let confirmed = drain(&mut h.events).pop().unwrap();
		assert_eq!(confirmed.stage, TxStage::Mint);
		assert_eq!(
			confirmed.notification.unwrap().display_text,
			format!("Tx: {}", handle.tx_hash.unwrap())
		);
	}

	fn waiting_for_approval() -> TransactionPolicy {
		TransactionPolicy {
			approval_confirmations: 1,
			..TransactionPolicy::default()
		}
	}

	#[tokio::test]
	async fn test_mint_waits_for_approval_when_configured() {
		let h = harness(waiting_for_approval(), 1);
		h.orchestrator
			.approve_and_mint(&h.bindings, &h.signer, &AmountInput::stable("1"))
			.await
			.unwrap();

		let calls = h.chain.calls();
		let approve_at = calls
			.iter()
			.position(|c| matches!(c, RecordedCall::Write { call, .. } if call.method.name() == "approve"))
			.unwrap();
		let approval_wait_at = calls
			.iter()
			.position(|c| matches!(c, RecordedCall::Wait { .. }))
			.unwrap();
		let mint_at = calls
			.iter()
			.position(|c| matches!(c, RecordedCall::Write { call, .. } if call.method.name() == "mint"))
			.unwrap();
		assert!(approve_at < approval_wait_at);
		assert!(approval_wait_at < mint_at);
	}

	#[tokio::test]
	async fn test_mint_follows_approval_acceptance_by_default() {
		let h = harness(TransactionPolicy::default(), 0);
		h.chain.fail_next_wait("header not found");

		let handle = h
			.orchestrator
			.approve_and_mint(&h.bindings, &h.signer, &AmountInput::stable("40"))
			.await
			.unwrap();

		// A flaky receipt poll cannot stop the mint from being submitted
		let calls = h.chain.calls();
		assert!(
			matches!(
				calls.as_slice(),
				[
					RecordedCall::Write { .. },
					RecordedCall::Write { .. },
					RecordedCall::Wait { .. },
				]
			),
			"unexpected call order: {:?}",
			calls
		);
		assert_eq!(h.chain.writes()[1].1.method.name(), "mint");
		assert_eq!(handle.state(), TxState::Failed);
		assert_eq!(
			handle.failure.unwrap().kind,
			TxFailureKind::ConfirmationFailed
		);
	}

	#[tokio::test]
	async fn test_reverted_approval_never_mints() {
		let mut h = harness(waiting_for_approval(), 0);
		h.chain.revert_next_confirmation();

		let handle = h
			.orchestrator
			.approve_and_mint(&h.bindings, &h.signer, &AmountInput::stable("40"))
			.await
			.unwrap();

		assert_eq!(handle.state(), TxState::Failed);
		assert!(handle.approval_hash.is_some());
		assert!(handle.tx_hash.is_none());
		assert_eq!(
			handle.failure.unwrap().kind,
			TxFailureKind::ConfirmationFailed
		);
		assert!(h
			.chain
			.writes()
			.iter()
			.all(|(_, call, _)| call.method.name() != "mint"));

		let last = drain(&mut h.events).pop().unwrap();
		assert_eq!(last.stage, TxStage::Approval);
		assert_eq!(last.state, TxState::Failed);
	}

	#[tokio::test]
	async fn test_approval_wait_error_never_mints() {
		let h = harness(waiting_for_approval(), 0);
		h.chain.fail_next_wait("header not found");

		let handle = h
			.orchestrator
			.approve_and_mint(&h.bindings, &h.signer, &AmountInput::stable("40"))
			.await
			.unwrap();

		assert_eq!(handle.state(), TxState::Failed);
		let failure = handle.failure.unwrap();
		assert_eq!(failure.kind, TxFailureKind::ConfirmationFailed);
		assert_eq!(failure.message, "header not found");
		assert_eq!(h.chain.writes().len(), 1);
		assert_eq!(h.chain.writes()[0].1.method.name(), "approve");
	}

	#[tokio::test]
	async fn test_purchase_wait_error_fails_without_resync() {
		let h = harness(TransactionPolicy::default(), 0);
		h.chain.fail_next_wait("request timed out");

		let handle = h
			.orchestrator
			.purchase(&h.bindings, &h.signer, &AmountInput::native("0.5"))
			.await
			.unwrap();

		assert_eq!(handle.state(), TxState::Failed);
		assert!(handle.tx_hash.is_some());
		let failure = handle.failure.unwrap();
		assert_eq!(failure.kind, TxFailureKind::ConfirmationFailed);
		assert_eq!(failure.message, "request timed out");
		assert_eq!(failure.notification.category, NotificationCategory::Other);
	}

	#[tokio::test]
	async fn test_invalid_amount_never_reaches_chain() {
		let h = harness(TransactionPolicy::default(), 0);
		for raw in ["-1", "abc", "0.0000000000000000001", ""] {
			let error = h
				.orchestrator
				.purchase(&h.bindings, &h.signer, &AmountInput::native(raw))
				.await
				.unwrap_err();
			assert_eq!(
				error.notification().category,
				NotificationCategory::InvalidAmount
			);
		}
		assert!(h.chain.calls().is_empty());
	}

	#[tokio::test]
	async fn test_submission_rejected_is_classified_without_resync() {
		let mut h = harness(TransactionPolicy::default(), 0);
		h.chain.set_token_balance(
			h.bindings.token.address,
			h.bindings.fund.address,
			U256::ZERO,
		);

		let handle = h
			.orchestrator
			.purchase(&h.bindings, &h.signer, &AmountInput::native("1"))
			.await
			.unwrap();

		assert_eq!(handle.state(), TxState::Failed);
		let failure = handle.failure.unwrap();
		assert_eq!(failure.kind, TxFailureKind::SubmissionRejected);
		assert_eq!(
			failure.notification.category,
			NotificationCategory::InsufficientLiquidity
		);
		assert!(handle.tx_hash.is_none());
		assert_eq!(drain(&mut h.events).last().unwrap().state, TxState::Failed);
	}

	#[tokio::test]
	async fn test_reverted_confirmation_fails_without_resync() {
		let h = harness(TransactionPolicy::default(), 0);
		h.chain.revert_next_confirmation();

		let handle = h
			.orchestrator
			.purchase(&h.bindings, &h.signer, &AmountInput::native("0.1"))
			.await
			.unwrap();

		assert_eq!(handle.state(), TxState::Failed);
		assert!(handle.tx_hash.is_some());
		assert_eq!(
			handle.failure.unwrap().kind,
			TxFailureKind::ConfirmationFailed
		);
	}

	#[tokio::test]
	async fn test_failed_mint_leaves_allowance() {
		let h = harness(TransactionPolicy::default(), 0);
		h.chain.fail_writes_of("mint", "user rejected transaction");

		let handle = h
			.orchestrator
			.approve_and_mint(&h.bindings, &h.signer, &AmountInput::stable("40"))
			.await
			.unwrap();

		assert_eq!(handle.state(), TxState::Failed);
		assert!(handle.approval_hash.is_some());
		let failure = handle.failure.unwrap();
		assert_eq!(failure.notification.category, NotificationCategory::UserRejected);
		assert_eq!(
			h.chain.allowance_of(
				h.bindings.stable.address,
				test_account(),
				h.bindings.issuer.address
			),
			units(40)
		);
	}

	#[tokio::test]
	async fn test_rejected_approval_never_mints() {
		let h = harness(TransactionPolicy::default(), 0);
		h.chain
			.fail_writes_of("approve", "MetaMask Tx Signature: User denied transaction signature.");

		let handle = h
			.orchestrator
			.approve_and_mint(&h.bindings, &h.signer, &AmountInput::stable("40"))
			.await
			.unwrap();

		assert_eq!(handle.state(), TxState::Failed);
		assert!(handle.approval_hash.is_none());
		assert!(h
			.chain
			.writes()
			.iter()
			.all(|(_, call, _)| call.method.name() != "mint"));
	}

	#[tokio::test]
	async fn test_existing_allowance_is_reused_when_enabled() {
		let policy = TransactionPolicy {
			reuse_existing_allowance: true,
			..TransactionPolicy::default()
		};
		let h = harness(policy, 1);
		h.chain.set_allowance(
			h.bindings.stable.address,
			test_account(),
			h.bindings.issuer.address,
			units(50),
		);

		let handle = h
			.orchestrator
			.approve_and_mint(&h.bindings, &h.signer, &AmountInput::stable("40"))
			.await
			.unwrap();

		assert_eq!(handle.state(), TxState::Confirmed);
		assert!(handle.approval_hash.is_none());
		let writes = h.chain.writes();
		assert_eq!(writes.len(), 1);
		assert_eq!(writes[0].1.method.name(), "mint");
	}

	#[test]
	fn test_policy_from_settings() {
		let settings = TransactionSettings {
			confirmations: 3,
			approval_confirmations: 0,
			resync_delay_ms: 250,
			reuse_existing_allowance: true,
		};
		let policy = TransactionPolicy::from(&settings);
		assert_eq!(policy.confirmations, 3);
		assert_eq!(policy.resync_delay, Duration::from_millis(250));
		assert_eq!(TransactionPolicy::default().resync_delay, Duration::from_secs(5));
	}
}
