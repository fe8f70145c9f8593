//! ABI encoding of the exchange's contract methods

use alloy_primitives::U256;
use alloy_sol_types::{sol, SolCall};
use mint_types::ContractMethod;

use crate::rpc::RpcError;

sol! {
	interface IERC20 {
		function balanceOf(address owner) external view returns (uint256);
		function allowance(address owner, address spender) external view returns (uint256);
		function approve(address spender, uint256 amount) external returns (bool);
	}

	interface IMintIssuer {
		function mint(uint256 amount) external;
	}

	interface IMintingFund {
		function buyTokens(address beneficiary) external payable;
	}
}

/// Calldata for `method`
pub fn encode_call(method: &ContractMethod) -> Vec<u8> {
	match method {
		ContractMethod::BalanceOf { owner } => IERC20::balanceOfCall { owner: *owner }.abi_encode(),
		ContractMethod::Allowance { owner, spender } => IERC20::allowanceCall {
			owner: *owner,
			spender: *spender,
		}
		.abi_encode(),
		ContractMethod::Approve { spender, amount } => IERC20::approveCall {
			spender: *spender,
			amount: *amount,
		}
		.abi_encode(),
		ContractMethod::Mint { amount } => IMintIssuer::mintCall { amount: *amount }.abi_encode(),
		ContractMethod::BuyTokens { beneficiary } => IMintingFund::buyTokensCall {
			beneficiary: *beneficiary,
		}
		.abi_encode(),
	}
}

/// Decode the `uint256` returned by a view method
pub fn decode_uint_return(method: &ContractMethod, data: &[u8]) -> Result<U256, RpcError> {
	let decoded = match method {
		ContractMethod::BalanceOf { .. } => {
			IERC20::balanceOfCall::abi_decode_returns(data, true).map(|ret| ret._0)
		},
		ContractMethod::Allowance { .. } => {
			IERC20::allowanceCall::abi_decode_returns(data, true).map(|ret| ret._0)
		},
		other => {
			return Err(RpcError::InvalidResponse(format!(
				"{} does not return a uint256",
				other.name()
			)))
		},
	};
	decoded.map_err(|e| {
		RpcError::InvalidResponse(format!("failed to decode {} return: {}", method.name(), e))
	})
}
