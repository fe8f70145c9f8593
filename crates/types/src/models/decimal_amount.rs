//! Human-readable decimal amount model

use alloy_primitives::U256;

use crate::units::{format_units, parse_units, UnitError, BASE_UNIT_DECIMALS};

/// Decimal amount represented as a canonical string to preserve precision
///
/// Values are always normalised: no leading zeros in the integer part, no
/// trailing zeros in the fractional part, and no dangling decimal point.
/// Produced from base units by [`crate::units::to_decimal`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecimalAmount(String);

impl DecimalAmount {
	/// The zero amount
	pub fn zero() -> Self {
		Self("0".to_string())
	}

	/// Build from base units at the exchange's fixed scale
	pub fn from_base_units(value: U256) -> Self {
		format_units(value, BASE_UNIT_DECIMALS)
	}

	/// Convert back into base units at the exchange's fixed scale
	pub fn to_base_units(&self) -> Result<U256, UnitError> {
		parse_units(&self.0, BASE_UNIT_DECIMALS)
	}

	/// Get the raw string value
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Check if the value is zero
	pub fn is_zero(&self) -> bool {
		self.0 == "0"
	}

	/// Lossy conversion for presentation only, never for arithmetic
	pub fn to_f64(&self) -> f64 {
		self.0.parse().unwrap_or(0.0)
	}

	pub(crate) fn from_normalized(value: String) -> Self {
		Self(value)
	}
}

impl Default for DecimalAmount {
	fn default() -> Self {
		Self::zero()
	}
}

impl std::fmt::Display for DecimalAmount {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl TryFrom<&str> for DecimalAmount {
	type Error = UnitError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		parse_units(value, BASE_UNIT_DECIMALS).map(Self::from_base_units)
	}
}

// Serialized as a plain string, normalised on the way in
impl serde::Serialize for DecimalAmount {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(&self.0)
	}
}

impl<'de> serde::Deserialize<'de> for DecimalAmount {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		DecimalAmount::try_from(value.as_str()).map_err(serde::de::Error::custom)
	}
}
