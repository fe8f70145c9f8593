//! Mint exchange adapters
//!
//! Chain access for the exchange over a node's JSON-RPC interface.

pub mod abi;
pub mod client;
pub mod rpc;

pub use client::JsonRpcChainClient;
pub use rpc::{RpcError, RpcTransport};
