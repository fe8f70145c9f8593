//! Conversion between human decimal amounts and on-chain base units
//!
//! Every amount that crosses the contract-call boundary goes through
//! [`to_base_units`]; every balance read back from the chain goes through
//! [`to_decimal`]. Both directions work on decimal digit strings and
//! `U256` integers only, so no precision is lost to floating point.

use alloy_primitives::U256;
use thiserror::Error;

use crate::models::DecimalAmount;

/// Fractional digits used by the chain's native fixed-point convention
pub const BASE_UNIT_DECIMALS: u8 = 18;

/// Errors produced while converting user input into base units
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
	#[error("Invalid amount '{input}': {reason}")]
	InvalidAmount { input: String, reason: String },
}

impl UnitError {
	fn invalid(input: &str, reason: impl Into<String>) -> Self {
		Self::InvalidAmount {
			input: input.to_string(),
			reason: reason.into(),
		}
	}
}

/// Convert a human decimal string into base units at 18 fractional digits
pub fn to_base_units(amount: &str) -> Result<U256, UnitError> {
	parse_units(amount, BASE_UNIT_DECIMALS)
}

/// Convert base units at 18 fractional digits into a human decimal amount
pub fn to_decimal(value: U256) -> DecimalAmount {
	format_units(value, BASE_UNIT_DECIMALS)
}

/// Parse a non-negative decimal string into an integer scaled by `10^decimals`
///
/// Accepts `"40"`, `"0.5"`, `".5"` and `"5."`. Surrounding whitespace is
/// ignored. Signs, exponents, separators and more than `decimals`
/// fractional digits are rejected.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, UnitError> {
	let trimmed = amount.trim();
	if trimmed.is_empty() {
		return Err(UnitError::invalid(amount, "amount is empty"));
	}
	if trimmed.starts_with('-') {
		return Err(UnitError::invalid(amount, "amount must not be negative"));
	}

	let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
	if whole.is_empty() && fraction.is_empty() {
		return Err(UnitError::invalid(amount, "amount has no digits"));
	}
	if !is_digits(whole) || !is_digits(fraction) {
		return Err(UnitError::invalid(
			amount,
			"amount must be a plain decimal number",
		));
	}
	if fraction.len() > decimals as usize {
		return Err(UnitError::invalid(
			amount,
			format!("more than {} fractional digits", decimals),
		));
	}

	let scale = ten_pow(decimals)
		.ok_or_else(|| UnitError::invalid(amount, "unsupported decimal scale"))?;
	let whole_units = parse_digits(whole)
		.ok_or_else(|| UnitError::invalid(amount, "amount is too large"))?;
	let padded = format!("{:0<width$}", fraction, width = decimals as usize);
	let fraction_units = parse_digits(&padded)
		.ok_or_else(|| UnitError::invalid(amount, "amount is too large"))?;

	whole_units
		.checked_mul(scale)
		.and_then(|units| units.checked_add(fraction_units))
		.ok_or_else(|| UnitError::invalid(amount, "amount is too large"))
}

/// Render an integer scaled by `10^decimals` as a normalised decimal amount
pub fn format_units(value: U256, decimals: u8) -> DecimalAmount {
	let digits = value.to_string();
	let scale = decimals as usize;

	let (whole, fraction) = if digits.len() > scale {
		let (whole, fraction) = digits.split_at(digits.len() - scale);
		(whole.to_string(), fraction.to_string())
	} else {
		("0".to_string(), format!("{:0>width$}", digits, width = scale))
	};

	let fraction = fraction.trim_end_matches('0');
	if fraction.is_empty() {
		DecimalAmount::from_normalized(whole)
	} else {
		DecimalAmount::from_normalized(format!("{}.{}", whole, fraction))
	}
}

fn is_digits(value: &str) -> bool {
	value.bytes().all(|b| b.is_ascii_digit())
}

fn parse_digits(value: &str) -> Option<U256> {
	if value.is_empty() {
		return Some(U256::ZERO);
	}
	U256::from_str_radix(value, 10).ok()
}

fn ten_pow(exponent: u8) -> Option<U256> {
	let ten = U256::from(10u64);
	(0..exponent).try_fold(U256::from(1u64), |acc, _| acc.checked_mul(ten))
}
