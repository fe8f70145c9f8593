//! Purchase and approve-then-mint flows driven through the exchange

mod mocks;

use std::time::Duration;

use mint_exchange::models::{ContractMethod, TxStage};
use mint_exchange::{
	ExchangeError, NotificationCategory, SyncTrigger, TxFailureKind, TxState, U256,
};
use mocks::*;

const RESYNC_DELAY: Duration = Duration::from_millis(5000);

/// Wait for the post-confirmation trigger and return how long it took
async fn await_resync(exchange: &mut mint_exchange::Exchange) -> Duration {
	let started = tokio::time::Instant::now();
	let trigger = exchange.next_trigger().await;
	assert_eq!(trigger, Some(SyncTrigger::PostConfirmation));
	started.elapsed()
}

async fn assert_no_resync(exchange: &mut mint_exchange::Exchange) {
	let next = tokio::time::timeout(Duration::from_secs(60), exchange.next_trigger()).await;
	assert!(next.is_err(), "unexpected trigger: {:?}", next);
}

#[tokio::test(start_paused = true)]
async fn test_mint_approves_exact_amount_then_mints() {
	let chain = InMemoryChain::seeded();
	let deployment = chain.deployment().clone();
	let mut exchange = ready_exchange(&chain).await;
	let mut events = exchange.subscribe();
	chain.clear_calls();

	let handle = exchange.mint_stable("40").await.unwrap();
	assert_eq!(handle.state(), TxState::Confirmed);
	assert_eq!(handle.amount, units(40));
	assert!(handle.approval_hash.is_some());

	let writes = chain.writes();
	assert_eq!(writes.len(), 2);
	let (from, approve, _) = &writes[0];
	assert_eq!(*from, test_account());
	assert_eq!(approve.to, deployment.stable);
	assert_eq!(
		approve.method,
		ContractMethod::Approve {
			spender: deployment.issuer,
			amount: units(40),
		}
	);
	let (_, mint, value) = &writes[1];
	assert_eq!(mint.to, deployment.issuer);
	assert_eq!(mint.method, ContractMethod::Mint { amount: units(40) });
	assert_eq!(*value, U256::ZERO);

	// The mint follows the approval's acceptance without waiting for inclusion
	let calls = chain.calls();
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

	let seen = drain(&mut events);
	let transactions = transaction_events(&seen);
	assert_eq!(transactions.first().unwrap().stage, TxStage::Approval);
	let last = transactions.last().unwrap();
	assert_eq!(last.stage, TxStage::Mint);
	assert_eq!(last.state, TxState::Confirmed);
	let notification = last.notification.clone().unwrap();
	assert_eq!(notification.category, NotificationCategory::Confirmed);
	assert_eq!(
		notification.display_text,
		format!("Tx: {}", handle.tx_hash.unwrap())
	);
	assert!(transactions
		.iter()
		.any(|tx| tx.state == TxState::Confirming
			&& tx.notification.as_ref().map(|n| n.display_text.as_str())
				== Some("Pending transaction...")));
}

#[tokio::test(start_paused = true)]
async fn test_confirmed_mint_resyncs_once_after_delay() {
	let chain = InMemoryChain::seeded();
	let mut exchange = ready_exchange(&chain).await;
	assert_eq!(exchange.snapshot().user_stable_balance.as_str(), "100");
	chain.clear_calls();

	exchange.mint_stable("40").await.unwrap();

	// Nothing is read until the delay has passed
	assert_eq!(exchange.process_pending_triggers().await, 0);
	assert_eq!(chain.read_count(), 0);
	assert_eq!(exchange.snapshot().user_stable_balance.as_str(), "100");

	let waited = await_resync(&mut exchange).await;
	assert!(waited >= RESYNC_DELAY, "resync after {:?}", waited);
	assert!(waited < RESYNC_DELAY + Duration::from_secs(1));

	assert!(exchange.handle_trigger(SyncTrigger::PostConfirmation).await);
	assert_eq!(chain.read_count(), 3);
	assert_eq!(exchange.snapshot().user_stable_balance.as_str(), "60");

	assert_no_resync(&mut exchange).await;
}

#[tokio::test(start_paused = true)]
async fn test_purchase_pays_exact_value_into_fund() {
	let chain = InMemoryChain::seeded();
	let deployment = chain.deployment().clone();
	let mut exchange = ready_exchange(&chain).await;
	chain.clear_calls();

	let handle = exchange.buy_tokens("0.5").await.unwrap();
	assert_eq!(handle.state(), TxState::Confirmed);

	let half = U256::from(500_000_000_000_000_000u64);
	let writes = chain.writes();
	assert_eq!(writes.len(), 1);
	let (from, call, value) = &writes[0];
	assert_eq!(*from, test_account());
	assert_eq!(call.to, deployment.fund);
	assert_eq!(
		call.method,
		ContractMethod::BuyTokens {
			beneficiary: test_account(),
		}
	);
	assert_eq!(*value, half);

	let waited = await_resync(&mut exchange).await;
	assert!(waited >= RESYNC_DELAY);
	exchange.handle_trigger(SyncTrigger::PostConfirmation).await;

	let snapshot = exchange.snapshot();
	assert_eq!(snapshot.user_native_balance.as_str(), "1.5");
	assert_eq!(snapshot.fund_token_balance.as_str(), "4000000");
	assert_eq!(snapshot.user_stable_balance.as_str(), "100");
}

#[tokio::test(start_paused = true)]
async fn test_fund_shortfall_is_classified_without_resync() {
	let chain = InMemoryChain::seeded();
	let deployment = chain.deployment().clone();
	chain.set_token_balance(deployment.token, deployment.fund, units(1));
	let mut exchange = ready_exchange(&chain).await;
	let before = exchange.snapshot().clone();

	let handle = exchange.buy_tokens("0.5").await.unwrap();
	assert_eq!(handle.state(), TxState::Failed);
	let failure = handle.failure.unwrap();
	assert_eq!(failure.kind, TxFailureKind::SubmissionRejected);
	assert!(failure.message.contains("transfer amount exceeds balance"));
	assert_eq!(
		failure.notification.category,
		NotificationCategory::InsufficientLiquidity
	);
	assert_eq!(
		failure.notification.display_text,
		"Not enough tokens in the contract!"
	);

	assert_no_resync(&mut exchange).await;
	assert_eq!(exchange.snapshot(), &before);
}

#[tokio::test(start_paused = true)]
async fn test_declined_approval_never_mints() {
	let chain = InMemoryChain::seeded();
	chain.fail_writes_of(
		"approve",
		"MetaMask Tx Signature: User denied transaction signature.",
	);
	let mut exchange = ready_exchange(&chain).await;
	chain.clear_calls();

	let handle = exchange.mint_stable("40").await.unwrap();
	assert_eq!(handle.state(), TxState::Failed);
	let failure = handle.failure.unwrap();
	assert_eq!(failure.notification.category, NotificationCategory::UserRejected);

	let writes = chain.writes();
	assert_eq!(writes.len(), 1);
	assert_eq!(writes[0].1.method.name(), "approve");
	assert_no_resync(&mut exchange).await;
}

#[tokio::test(start_paused = true)]
async fn test_rejected_mint_leaves_allowance_granted() {
	let chain = InMemoryChain::seeded();
	let deployment = chain.deployment().clone();
	chain.fail_writes_of("mint", "execution reverted: Pausable: paused");
	let mut exchange = ready_exchange(&chain).await;

	let handle = exchange.mint_stable("40").await.unwrap();
	assert_eq!(handle.state(), TxState::Failed);
	let failure = handle.failure.unwrap();
	assert_eq!(failure.kind, TxFailureKind::SubmissionRejected);
	assert_eq!(failure.notification.category, NotificationCategory::Other);
	assert_eq!(
		failure.notification.display_text,
		"execution reverted: Pausable: paused"
	);

	assert_eq!(
		chain.allowance_of(deployment.stable, test_account(), deployment.issuer),
		units(40)
	);
	assert_eq!(
		chain.token_balance_of(deployment.stable, test_account()),
		units(100)
	);
	assert_no_resync(&mut exchange).await;
}

#[tokio::test(start_paused = true)]
async fn test_reverted_confirmation_fails_without_resync() {
	let chain = InMemoryChain::seeded();
	let mut exchange = ready_exchange(&chain).await;
	chain.revert_next_confirmation();

	let handle = exchange.buy_tokens("0.5").await.unwrap();
	assert_eq!(handle.state(), TxState::Failed);
	assert!(handle.tx_hash.is_some());
	assert_eq!(
		handle.failure.unwrap().kind,
		TxFailureKind::ConfirmationFailed
	);
	assert_no_resync(&mut exchange).await;
}

#[tokio::test]
async fn test_malformed_amounts_never_reach_the_chain() {
	let chain = InMemoryChain::seeded();
	let exchange = ready_exchange(&chain).await;
	chain.clear_calls();

	for input in ["abc", "1.2.3", "-1"] {
		let error = exchange.buy_tokens(input).await.unwrap_err();
		assert!(
			matches!(error, ExchangeError::InvalidAmount(_)),
			"{}: {:?}",
			input,
			error
		);
		assert_eq!(
			error.notification().category,
			NotificationCategory::InvalidAmount
		);
	}
	let error = exchange.mint_stable("forty").await.unwrap_err();
	assert!(matches!(error, ExchangeError::InvalidAmount(_)));

	assert!(chain.calls().is_empty());
}

#[tokio::test]
async fn test_actions_require_connected_wallet() {
	let chain = InMemoryChain::seeded();
	let exchange = built_exchange(&chain);

	assert!(!exchange.is_ready());
	assert_eq!(
		exchange.buy_tokens("1").await.unwrap_err(),
		ExchangeError::NotConnected
	);
	assert_eq!(
		exchange.mint_stable("1").await.unwrap_err(),
		ExchangeError::NotConnected
	);
	assert!(chain.calls().is_empty());
}
