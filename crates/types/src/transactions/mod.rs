//! Transaction lifecycle state machine
//!
//! ```text
//! Submitted ──► Confirming ──► Confirmed
//!     │              │
//!     └──────────────┴──────► Failed
//! ```

pub mod errors;

use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chain::{TxHash, TxReceipt};
use crate::notifications::Notification;

pub use errors::TransitionError;

/// Which user action a transaction belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
	/// Native asset sent to the minting fund's purchase entry point
	DirectPurchase,
	/// Stable-token approval followed by the issuer's mint call
	ApproveThenMint,
}

/// Lifecycle state of a transaction handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxState {
	/// Action accepted locally, chain calls in progress
	Submitted,
	/// Provider returned a pending transaction; waiting for inclusion
	Confirming,
	/// Included with the required confirmation depth
	Confirmed,
	/// Submission threw or confirmation reported failure
	Failed,
}

impl TxState {
	pub fn is_final(&self) -> bool {
		matches!(self, TxState::Confirmed | TxState::Failed)
	}

	pub fn can_transition_to(&self, next: TxState) -> bool {
		matches!(
			(self, next),
			(TxState::Submitted, TxState::Confirming)
				| (TxState::Submitted, TxState::Failed)
				| (TxState::Confirming, TxState::Confirmed)
				| (TxState::Confirming, TxState::Failed)
		)
	}
}

/// Which of the two failure kinds ended a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxFailureKind {
	/// Signing declined or simulation reverted before broadcast
	SubmissionRejected,
	/// Broadcast but not included successfully
	ConfirmationFailed,
}

/// Why a transaction ended in `Failed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxFailure {
	pub kind: TxFailureKind,
	/// Raw provider message
	pub message: String,
	/// Classified, user-facing rendering of `message`
	pub notification: Notification,
}

/// In-flight lifecycle object for one user-initiated action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHandle {
	pub id: Uuid,
	pub flow: FlowKind,
	state: TxState,
	/// Amount in base units, as passed to the contract call
	pub amount: U256,
	/// Approval transaction of the approve-then-mint flow
	pub approval_hash: Option<TxHash>,
	/// Main transaction (purchase or mint)
	pub tx_hash: Option<TxHash>,
	pub receipt: Option<TxReceipt>,
	pub failure: Option<TxFailure>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl TransactionHandle {
	pub fn new(flow: FlowKind, amount: U256) -> Self {
		let now = Utc::now();
		Self {
			id: Uuid::new_v4(),
			flow,
			state: TxState::Submitted,
			amount,
			approval_hash: None,
			tx_hash: None,
			receipt: None,
			failure: None,
			created_at: now,
			updated_at: now,
		}
	}

	pub fn state(&self) -> TxState {
		self.state
	}

	pub fn is_settled(&self) -> bool {
		self.state.is_final()
	}

	/// Move to `next`, rejecting anything outside the lifecycle graph
	pub fn advance(&mut self, next: TxState) -> Result<(), TransitionError> {
		if self.state.is_final() {
			return Err(TransitionError::AlreadySettled { state: self.state });
		}
		if !self.state.can_transition_to(next) {
			return Err(TransitionError::Illegal {
				from: self.state,
				to: next,
			});
		}
		self.state = next;
		self.updated_at = Utc::now();
		Ok(())
	}

	/// Record the approval transaction; the handle stays `Submitted`
	pub fn record_approval(&mut self, hash: TxHash) {
		self.approval_hash = Some(hash);
		self.updated_at = Utc::now();
	}

	pub fn mark_confirming(&mut self, hash: TxHash) -> Result<(), TransitionError> {
		self.advance(TxState::Confirming)?;
		self.tx_hash = Some(hash);
		Ok(())
	}

	pub fn mark_confirmed(&mut self, receipt: TxReceipt) -> Result<(), TransitionError> {
		self.advance(TxState::Confirmed)?;
		self.receipt = Some(receipt);
		Ok(())
	}

	pub fn mark_failed(&mut self, failure: TxFailure) -> Result<(), TransitionError> {
		self.advance(TxState::Failed)?;
		self.failure = Some(failure);
		Ok(())
	}
}
