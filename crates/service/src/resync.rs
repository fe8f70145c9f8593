//! Deferred balance resync after confirmed transactions

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

const TRACING_TARGET: &str = "mint_exchange::resync";

/// Named reasons for a balance sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncTrigger {
	/// Bindings were (re)resolved for the session's network
	BindingsChanged,
	/// The selected account changed or a wallet connected
	AccountChanged,
	/// The fixed delay after a confirmed transaction expired
	PostConfirmation,
	/// Requested explicitly by the host
	Manual,
}

/// Sending half of an exchange's trigger queue
pub type TriggerSender = mpsc::UnboundedSender<SyncTrigger>;

/// Schedules the one resync that follows every confirmed transaction
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ResyncScheduler: Send + Sync {
	/// Request a balance sync once `delay` has elapsed
	async fn schedule_resync(&self, delay: Duration);
}

/// Sleeps on the tokio timer, then posts [`SyncTrigger::PostConfirmation`]
/// into the exchange's trigger queue
#[derive(Debug, Clone)]
pub struct TokioResyncScheduler {
	triggers: TriggerSender,
}

impl TokioResyncScheduler {
	pub fn new(triggers: TriggerSender) -> Self {
		Self { triggers }
	}
}

#[async_trait]
impl ResyncScheduler for TokioResyncScheduler {
	async fn schedule_resync(&self, delay: Duration) {
		tracing::debug!(
			target: TRACING_TARGET,
			delay_ms = delay.as_millis() as u64,
			"Scheduling post-confirmation resync"
		);

		let deadline = tokio::time::Instant::now() + delay;
		let triggers = self.triggers.clone();
		tokio::spawn(async move {
			tokio::time::sleep_until(deadline).await;
			if triggers.send(SyncTrigger::PostConfirmation).is_err() {
				tracing::debug!(
					target: TRACING_TARGET,
					"Exchange dropped before resync delay expired"
				);
			}
		});
	}
}
