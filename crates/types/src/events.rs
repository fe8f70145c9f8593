//! Events published to the UI surface

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::balances::BalanceSnapshot;
use crate::chain::TxHash;
use crate::models::ChainId;
use crate::notifications::Notification;
use crate::transactions::{FlowKind, TransactionHandle, TxState};

/// Which chain call of a flow an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStage {
	Approval,
	Mint,
	Purchase,
}

/// Transaction lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEvent {
	pub id: Uuid,
	pub flow: FlowKind,
	pub stage: TxStage,
	pub state: TxState,
	pub tx_hash: Option<TxHash>,
	pub notification: Option<Notification>,
}

impl TransactionEvent {
	pub fn from_handle(
		handle: &TransactionHandle,
		stage: TxStage,
		notification: Option<Notification>,
	) -> Self {
		let tx_hash = match stage {
			TxStage::Approval => handle.approval_hash,
			TxStage::Mint | TxStage::Purchase => handle.tx_hash,
		};
		Self {
			id: handle.id,
			flow: handle.flow,
			stage,
			state: handle.state(),
			tx_hash,
			notification,
		}
	}
}

/// Everything the exchange reports to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExchangeEvent {
	Transaction(TransactionEvent),
	BalancesUpdated(BalanceSnapshot),
	NetworkChanged {
		chain_id: Option<ChainId>,
		supported: bool,
	},
	Disconnected,
}
