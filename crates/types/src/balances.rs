//! Balance snapshot model

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ChainId, DecimalAmount};

/// Balances shown to the user, as of the last committed sync
///
/// A snapshot is always replaced as a whole. Figures come from confirmed
/// chain state only; nothing here is ever adjusted optimistically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
	/// Exchangeable tokens held by the minting fund ("available for minting")
	pub fund_token_balance: DecimalAmount,
	/// Stable-token balance of the connected account
	pub user_stable_balance: DecimalAmount,
	/// Native-asset balance of the connected account
	pub user_native_balance: DecimalAmount,
	/// Chain the figures were read from
	pub chain_id: Option<ChainId>,
	/// Account the user figures belong to
	pub account: Option<Address>,
	pub synced_at: Option<DateTime<Utc>>,
}

impl BalanceSnapshot {
	/// Whether any sync has been committed yet
	pub fn is_synced(&self) -> bool {
		self.synced_at.is_some()
	}
}
