//! Minimal JSON-RPC 2.0 transport over HTTP

use mint_types::{ChainError, SecretString};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

const TRACING_TARGET: &str = "mint_exchange::rpc";

/// EIP-1193 code for a request the user declined in the wallet
pub const USER_REJECTED_CODE: i64 = 4001;

/// JSON-RPC "method not found"
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

#[derive(Error, Debug)]
pub enum RpcError {
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	/// Error object returned by the node or wallet
	#[error("{message}")]
	Rpc { code: i64, message: String },

	#[error("Invalid JSON-RPC response: {0}")]
	InvalidResponse(String),
}

impl RpcError {
	pub fn code(&self) -> Option<i64> {
		match self {
			RpcError::Rpc { code, .. } => Some(*code),
			_ => None,
		}
	}
}

/// Error objects keep the provider's text, which the classifier relies on
impl From<RpcError> for ChainError {
	fn from(error: RpcError) -> Self {
		match error {
			RpcError::Rpc { message, .. } => ChainError::rejected(message),
			RpcError::Http(e) => ChainError::provider(e.to_string()),
			RpcError::InvalidResponse(message) => ChainError::invalid_response(message),
		}
	}
}

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
	pub jsonrpc: &'static str,
	pub id: u64,
	pub method: &'a str,
	pub params: Value,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
	#[serde(default)]
	pub id: Option<Value>,
	#[serde(default)]
	pub result: Option<Value>,
	#[serde(default)]
	pub error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcErrorObject {
	pub code: i64,
	pub message: String,
	#[serde(default)]
	pub data: Option<Value>,
}

impl JsonRpcErrorObject {
	/// Message with a string `data` payload (often the revert reason) appended
	fn into_error(self) -> RpcError {
		let message = match self.data {
			Some(Value::String(data)) if !data.is_empty() && !self.message.contains(&data) => {
				format!("{}: {}", self.message, data)
			},
			_ => self.message,
		};
		RpcError::Rpc {
			code: self.code,
			message,
		}
	}
}

impl JsonRpcResponse {
	/// Result of a response to request `id`
	///
	/// A `null` result is returned as `Value::Null`; callers that can see one
	/// (e.g. a receipt that is not mined yet) deserialize into an `Option`.
	pub fn into_result(self, id: u64) -> Result<Value, RpcError> {
		if let Some(error) = self.error {
			return Err(error.into_error());
		}
		if let Some(resp_id) = &self.id {
			if resp_id.as_u64() != Some(id) {
				return Err(RpcError::InvalidResponse(format!(
					"response id {} does not match request id {}",
					resp_id, id
				)));
			}
		}
		Ok(self.result.unwrap_or(Value::Null))
	}
}

/// HTTP JSON-RPC endpoint
#[derive(Debug)]
pub struct RpcTransport {
	client: Client,
	endpoint: SecretString,
	next_id: AtomicU64,
}

impl RpcTransport {
	pub fn new(endpoint: SecretString, timeout: Duration) -> Result<Self, RpcError> {
		let client = Client::builder()
			.timeout(timeout)
			.user_agent(concat!("mint-exchange/", env!("CARGO_PKG_VERSION")))
			.pool_max_idle_per_host(4)
			.pool_idle_timeout(Duration::from_secs(90))
			.build()?;
		Ok(Self {
			client,
			endpoint,
			next_id: AtomicU64::new(1),
		})
	}

	pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let request = JsonRpcRequest {
			jsonrpc: "2.0",
			id,
			method,
			params,
		};

		tracing::trace!(target: TRACING_TARGET, id, method, "JSON-RPC request");
		let response = self
			.client
			.post(self.endpoint.expose_secret())
			.json(&request)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(RpcError::InvalidResponse(format!(
				"endpoint {} returned status {}",
				self.endpoint.host_hint(),
				response.status()
			)));
		}

		let body: JsonRpcResponse = response.json().await?;
		let result = body.into_result(id).map_err(|e| {
			tracing::debug!(target: TRACING_TARGET, id, method, error = %e, "JSON-RPC error");
			e
		})?;
		serde_json::from_value(result).map_err(|e| {
			RpcError::InvalidResponse(format!("unexpected result for {}: {}", method, e))
		})
	}
}
