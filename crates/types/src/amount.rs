//! User-entered amounts

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::units::{to_base_units, UnitError};

/// Which send form an amount was typed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmountField {
	/// Stable tokens deposited into the approve-then-mint flow
	StableIn,
	/// Native asset paid into the direct-purchase flow
	NativeIn,
}

/// Raw amount as typed by the user
///
/// Kept as text until submission; conversion to base units happens at the
/// moment a flow starts and is never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountInput {
	pub raw: String,
	pub field: AmountField,
}

impl AmountInput {
	pub fn new(raw: impl Into<String>, field: AmountField) -> Self {
		Self {
			raw: raw.into(),
			field,
		}
	}

	pub fn stable(raw: impl Into<String>) -> Self {
		Self::new(raw, AmountField::StableIn)
	}

	pub fn native(raw: impl Into<String>) -> Self {
		Self::new(raw, AmountField::NativeIn)
	}

	/// Convert the raw text into base units
	pub fn to_base_units(&self) -> Result<U256, UnitError> {
		to_base_units(&self.raw)
	}
}
