//! Exchange-level error kinds

use thiserror::Error;

use crate::chain::ChainError;
use crate::models::ChainId;
use crate::notifications::{Notification, NotificationCategory};
use crate::transactions::TransitionError;
use crate::units::UnitError;

/// Failures of user actions and session operations
///
/// None of these is fatal: each degrades to the last consistent state plus
/// a notification for the user. Only pre-flight failures are returned here.
/// A rejected submission or failed confirmation is carried by the `Failed`
/// handle as a [`TxFailureKind`](crate::TxFailureKind), and a failed balance
/// read is logged at `warn` while the snapshot keeps its previous value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
	/// Malformed user input, rejected before any chain call
	#[error(transparent)]
	InvalidAmount(#[from] UnitError),

	/// Session is on a network other than the supported one
	#[error("Unsupported network {actual:?}, expected chain {expected}")]
	UnsupportedNetwork {
		actual: Option<ChainId>,
		expected: ChainId,
	},

	/// No account or signer available
	#[error("Wallet is not connected")]
	NotConnected,

	/// Wallet provider failed while negotiating the session
	#[error("Wallet error: {0}")]
	Wallet(ChainError),

	/// A flow tried to move its handle outside the lifecycle graph
	#[error(transparent)]
	Transition(#[from] TransitionError),
}

impl ExchangeError {
	/// Notification for pre-flight failures that never reach the classifier
	pub fn notification(&self) -> Notification {
		match self {
			ExchangeError::InvalidAmount(e) => {
				Notification::new(NotificationCategory::InvalidAmount, e.to_string())
			},
			ExchangeError::UnsupportedNetwork { .. } => {
				Notification::new(NotificationCategory::UnsupportedNetwork, self.to_string())
			},
			other => Notification::other(other.to_string()),
		}
	}
}

/// Result type for exchange operations
pub type ExchangeResult<T> = Result<T, ExchangeError>;
