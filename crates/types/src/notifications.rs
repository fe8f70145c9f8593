//! User-facing notification data

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chain::TxHash;

/// Category a notification falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
	/// The contract does not hold enough tokens to satisfy the transfer
	InsufficientLiquidity,
	/// The account cannot pay for the value or gas of the transaction
	InsufficientFunds,
	/// The user declined the signature request
	UserRejected,
	/// The typed amount is not a valid decimal
	InvalidAmount,
	/// The wallet is on a network the exchange does not support
	UnsupportedNetwork,
	/// A transaction is waiting for confirmation
	Pending,
	/// A transaction was confirmed
	Confirmed,
	/// Anything else; the display text carries the raw message
	Other,
}

impl NotificationCategory {
	pub fn is_error(&self) -> bool {
		!matches!(
			self,
			NotificationCategory::Pending | NotificationCategory::Confirmed
		)
	}
}

impl fmt::Display for NotificationCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			NotificationCategory::InsufficientLiquidity => "insufficient contract liquidity",
			NotificationCategory::InsufficientFunds => "insufficient funds",
			NotificationCategory::UserRejected => "user rejected",
			NotificationCategory::InvalidAmount => "invalid amount",
			NotificationCategory::UnsupportedNetwork => "unsupported network",
			NotificationCategory::Pending => "pending",
			NotificationCategory::Confirmed => "confirmed",
			NotificationCategory::Other => "other",
		};
		f.write_str(name)
	}
}

/// Notification handed to the UI surface for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
	pub category: NotificationCategory,
	pub display_text: String,
}

impl Notification {
	pub fn new(category: NotificationCategory, display_text: impl Into<String>) -> Self {
		Self {
			category,
			display_text: display_text.into(),
		}
	}

	pub fn pending() -> Self {
		Self::new(NotificationCategory::Pending, "Pending transaction...")
	}

	pub fn confirmed(tx_hash: &TxHash) -> Self {
		Self::new(NotificationCategory::Confirmed, format!("Tx: {}", tx_hash))
	}

	/// Unclassified failure carrying the original text
	pub fn other(message: impl Into<String>) -> Self {
		Self::new(NotificationCategory::Other, message)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_lifecycle_notifications() {
		assert_eq!(Notification::pending().display_text, "Pending transaction...");
		let hash = TxHash::repeat_byte(0xab);
		let confirmed = Notification::confirmed(&hash);
		assert_eq!(confirmed.category, NotificationCategory::Confirmed);
		assert!(confirmed.display_text.starts_with("Tx: 0xabab"));
		assert!(!confirmed.category.is_error());
	}

	#[test]
	fn test_category_serde_and_display() {
		let json = serde_json::to_string(&NotificationCategory::InsufficientLiquidity).unwrap();
		assert_eq!(json, "\"insufficient_liquidity\"");
		assert_eq!(
			NotificationCategory::InsufficientLiquidity.to_string(),
			"insufficient contract liquidity"
		);
		assert!(NotificationCategory::Other.is_error());
	}
}
