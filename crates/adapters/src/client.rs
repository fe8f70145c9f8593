//! JSON-RPC backed chain client and wallet provider
//!
//! Talks to a node (or a wallet bridge exposing the same interface) over
//! HTTP. Signing is delegated to the endpoint through
//! `eth_sendTransaction`, so the account must be unlocked there.

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use mint_types::{
	ChainClient, ChainError, ChainId, ChainResult, ContractCall, PendingTx, SecretString,
	SigningCapability, TxReceipt, WalletProvider, WriteOptions,
};

use crate::abi::{decode_uint_return, encode_call};
use crate::rpc::{RpcError, RpcTransport, METHOD_NOT_FOUND_CODE};

const TRACING_TARGET: &str = "mint_exchange::rpc";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
	transaction_hash: B256,
	block_number: Option<U64>,
	#[serde(default)]
	status: Option<U64>,
}

/// Chain client and wallet provider over one JSON-RPC endpoint
#[derive(Debug)]
pub struct JsonRpcChainClient {
	transport: RpcTransport,
	poll_interval: Duration,
}

impl JsonRpcChainClient {
	pub fn new(
		endpoint: SecretString,
		timeout: Duration,
		poll_interval: Duration,
	) -> Result<Self, RpcError> {
		tracing::debug!(
			target: TRACING_TARGET,
			endpoint = %endpoint.host_hint(),
			timeout_ms = timeout.as_millis() as u64,
			"Creating JSON-RPC chain client"
		);
		Ok(Self {
			transport: RpcTransport::new(endpoint, timeout)?,
			poll_interval,
		})
	}

	async fn block_number(&self) -> Result<u64, RpcError> {
		let number: U64 = self.transport.call("eth_blockNumber", json!([])).await?;
		Ok(number.to::<u64>())
	}

	async fn accounts(&self, method: &str) -> Result<Vec<Address>, RpcError> {
		self.transport.call(method, json!([])).await
	}
}

#[async_trait]
impl ChainClient for JsonRpcChainClient {
	async fn read(&self, call: &ContractCall) -> ChainResult<U256> {
		if !call.method.is_view() {
			return Err(ChainError::invalid_response(format!(
				"{} is not a view method",
				call.method.name()
			)));
		}
		let data = Bytes::from(encode_call(&call.method));
		let output: Bytes = self
			.transport
			.call("eth_call", json!([{ "to": call.to, "data": data }, "latest"]))
			.await?;
		Ok(decode_uint_return(&call.method, &output)?)
	}

	async fn write(
		&self,
		signer: &SigningCapability,
		call: &ContractCall,
		options: WriteOptions,
	) -> ChainResult<PendingTx> {
		let from = signer.account();
		let data = Bytes::from(encode_call(&call.method));
		let hash: B256 = self
			.transport
			.call(
				"eth_sendTransaction",
				json!([{
					"from": from,
					"to": call.to,
					"data": data,
					"value": options.value,
				}]),
			)
			.await?;

		tracing::info!(
			target: TRACING_TARGET,
			tx_hash = %hash,
			method = call.method.name(),
			to = %call.to,
			"Transaction accepted by provider"
		);
		Ok(PendingTx { hash, from })
	}

	async fn wait(&self, tx: &PendingTx, confirmations: u64) -> ChainResult<TxReceipt> {
		loop {
			let receipt: Option<RpcReceipt> = self
				.transport
				.call("eth_getTransactionReceipt", json!([tx.hash]))
				.await?;

			if let Some(block_number) = receipt.as_ref().and_then(|r| r.block_number) {
				let included_at = block_number.to::<u64>();
				let confirmed = if confirmations <= 1 {
					true
				} else {
					let head = self.block_number().await?;
					head.saturating_sub(included_at) + 1 >= confirmations
				};

				if confirmed {
					let receipt = receipt.ok_or_else(|| {
						ChainError::invalid_response("receipt disappeared while confirming")
					})?;
					if receipt.transaction_hash != tx.hash {
						return Err(ChainError::invalid_response(format!(
							"receipt for {} returned for {}",
							receipt.transaction_hash, tx.hash
						)));
					}
					let success = receipt.status.map_or(true, |s| !s.is_zero());
					return Ok(TxReceipt {
						hash: tx.hash,
						block_number: included_at,
						success,
					});
				}
			}

			tracing::trace!(target: TRACING_TARGET, tx_hash = %tx.hash, "Waiting for confirmation");
			tokio::time::sleep(self.poll_interval).await;
		}
	}

	async fn native_balance(&self, address: Address) -> ChainResult<U256> {
		Ok(self
			.transport
			.call("eth_getBalance", json!([address, "latest"]))
			.await?)
	}
}

#[async_trait]
impl WalletProvider for JsonRpcChainClient {
	async fn request_accounts(&self) -> ChainResult<Vec<Address>> {
		match self.accounts("eth_requestAccounts").await {
			Err(e) if e.code() == Some(METHOD_NOT_FOUND_CODE) => {
				tracing::debug!(
					target: TRACING_TARGET,
					"eth_requestAccounts not supported, falling back to eth_accounts"
				);
				Ok(self.accounts("eth_accounts").await?)
			},
			other => Ok(other?),
		}
	}

	async fn get_signer(&self) -> ChainResult<SigningCapability> {
		let accounts = self.accounts("eth_accounts").await?;
		accounts
			.first()
			.copied()
			.map(SigningCapability::new)
			.ok_or_else(|| ChainError::rejected("no account available for signing"))
	}

	async fn get_network(&self) -> ChainResult<ChainId> {
		let chain_id: U64 = self.transport.call("eth_chainId", json!([])).await?;
		Ok(chain_id.to::<u64>())
	}
}
