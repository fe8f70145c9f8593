//! Error types for chain reads, writes and confirmations

use thiserror::Error;

use super::models::TxHash;

/// Failure reported by the wallet provider or chain client
///
/// Every variant keeps the provider's own message text, since the
/// notification classifier works on that text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
	/// The provider refused the request (declined signature, failed simulation)
	#[error("{message}")]
	Rejected { message: String },

	/// The transaction was included but reverted
	#[error("Transaction {tx_hash} reverted: {message}")]
	Reverted { tx_hash: TxHash, message: String },

	/// Node or transport level failure
	#[error("Provider error: {message}")]
	Provider { message: String },

	/// The provider answered with something that could not be decoded
	#[error("Invalid provider response: {message}")]
	InvalidResponse { message: String },
}

impl ChainError {
	pub fn rejected(message: impl Into<String>) -> Self {
		Self::Rejected {
			message: message.into(),
		}
	}

	pub fn provider(message: impl Into<String>) -> Self {
		Self::Provider {
			message: message.into(),
		}
	}

	pub fn invalid_response(message: impl Into<String>) -> Self {
		Self::InvalidResponse {
			message: message.into(),
		}
	}

	/// Raw provider text, without the variant prefix
	pub fn raw_message(&self) -> &str {
		match self {
			ChainError::Rejected { message }
			| ChainError::Reverted { message, .. }
			| ChainError::Provider { message }
			| ChainError::InvalidResponse { message } => message,
		}
	}
}

/// Result type for chain collaborator calls
pub type ChainResult<T> = Result<T, ChainError>;
