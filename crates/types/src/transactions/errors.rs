//! Error types for transaction lifecycle transitions

use thiserror::Error;

use super::TxState;

/// Attempted a move the transaction state machine does not allow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
	#[error("Illegal transaction transition: {from:?} -> {to:?}")]
	Illegal { from: TxState, to: TxState },

	#[error("Transaction is already settled as {state:?}")]
	AlreadySettled { state: TxState },
}
