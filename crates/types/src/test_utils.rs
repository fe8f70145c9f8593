//! In-memory chain and wallet for tests
//!
//! [`InMemoryChain`] keeps ERC-20 style balances and allowances for the
//! exchange's deployment, applies the effects of `approve`, `mint` and
//! `buyTokens`, records every call in order, and can be scripted to fail or
//! to hold reads until released.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use tokio::sync::watch;

use crate::bindings::{ContractKind, Deployment};
use crate::chain::{
	ChainClient, ChainError, ChainResult, ContractCall, ContractMethod, PendingTx,
	SigningCapability, TxHash, TxReceipt, WalletProvider, WriteOptions,
};
use crate::models::ChainId;

/// Chain id used by test deployments
pub const TEST_CHAIN_ID: ChainId = 42161;

/// Project tokens (base units) paid out per base unit of native asset
pub const TEST_PURCHASE_RATE: u64 = 2_000_000;

/// Deployment with recognisable fixed addresses on [`TEST_CHAIN_ID`]
pub fn test_deployment() -> Deployment {
	Deployment {
		chain_id: TEST_CHAIN_ID,
		token: Address::repeat_byte(0x11),
		stable: Address::repeat_byte(0x22),
		fund: Address::repeat_byte(0x33),
		issuer: Address::repeat_byte(0x44),
	}
}

/// Default test user
pub fn test_account() -> Address {
	Address::repeat_byte(0xa1)
}

/// One whole unit (10^18 base units) times `n`
pub fn units(n: u64) -> U256 {
	U256::from(n) * U256::from(1_000_000_000_000_000_000u64)
}

/// A call observed by the in-memory chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
	Read(ContractCall),
	NativeBalance(Address),
	Write {
		from: Address,
		call: ContractCall,
		value: U256,
	},
	Wait {
		hash: TxHash,
		confirmations: u64,
	},
}

#[derive(Debug, Default)]
struct ChainState {
	token_balances: HashMap<(Address, Address), U256>,
	allowances: HashMap<(Address, Address, Address), U256>,
	native_balances: HashMap<Address, U256>,
	calls: Vec<RecordedCall>,
	read_failures: HashMap<ContractKind, String>,
	native_failure: Option<String>,
	write_failures: HashMap<&'static str, String>,
	wait_failure: Option<String>,
	revert_next: bool,
	pending: HashSet<TxHash>,
	tx_counter: u64,
	block_number: u64,
}

/// Scriptable in-memory implementation of [`ChainClient`]
#[derive(Debug, Clone)]
pub struct InMemoryChain {
	deployment: Deployment,
	state: Arc<Mutex<ChainState>>,
	read_gate: Arc<watch::Sender<bool>>,
}

impl InMemoryChain {
	pub fn new(deployment: Deployment) -> Self {
		let (read_gate, _) = watch::channel(true);
		Self {
			deployment,
			state: Arc::new(Mutex::new(ChainState::default())),
			read_gate: Arc::new(read_gate),
		}
	}

	/// Chain seeded with a funded user and a stocked minting fund
	pub fn seeded() -> Self {
		let chain = Self::new(test_deployment());
		let deployment = chain.deployment.clone();
		chain.set_token_balance(deployment.stable, test_account(), units(100));
		chain.set_native_balance(test_account(), units(2));
		chain.set_token_balance(deployment.token, deployment.fund, units(5_000_000));
		chain
	}

	pub fn deployment(&self) -> &Deployment {
		&self.deployment
	}

	fn state(&self) -> MutexGuard<'_, ChainState> {
		self.state.lock().expect("in-memory chain state poisoned")
	}

	pub fn set_token_balance(&self, token: Address, owner: Address, amount: U256) {
		self.state().token_balances.insert((token, owner), amount);
	}

	pub fn set_native_balance(&self, owner: Address, amount: U256) {
		self.state().native_balances.insert(owner, amount);
	}

	pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
		self.state()
			.allowances
			.insert((token, owner, spender), amount);
	}

	pub fn token_balance_of(&self, token: Address, owner: Address) -> U256 {
		self.state()
			.token_balances
			.get(&(token, owner))
			.copied()
			.unwrap_or_default()
	}

	pub fn native_balance_of(&self, owner: Address) -> U256 {
		self.state()
			.native_balances
			.get(&owner)
			.copied()
			.unwrap_or_default()
	}

	pub fn allowance_of(&self, token: Address, owner: Address, spender: Address) -> U256 {
		self.state()
			.allowances
			.get(&(token, owner, spender))
			.copied()
			.unwrap_or_default()
	}

	/// Every call made so far, in order
	pub fn calls(&self) -> Vec<RecordedCall> {
		self.state().calls.clone()
	}

	/// Only the write calls, in order
	pub fn writes(&self) -> Vec<(Address, ContractCall, U256)> {
		self.calls()
			.into_iter()
			.filter_map(|call| match call {
				RecordedCall::Write { from, call, value } => Some((from, call, value)),
				_ => None,
			})
			.collect()
	}

	/// Number of read calls (contract reads and native balance reads)
	pub fn read_count(&self) -> usize {
		self.calls()
			.iter()
			.filter(|call| {
				matches!(
					call,
					RecordedCall::Read(_) | RecordedCall::NativeBalance(_)
				)
			})
			.count()
	}

	pub fn clear_calls(&self) {
		self.state().calls.clear();
	}

	/// Make every read against `contract` fail with `message`
	pub fn fail_reads_of(&self, contract: ContractKind, message: &str) {
		self.state()
			.read_failures
			.insert(contract, message.to_string());
	}

	pub fn fail_native_balance(&self, message: &str) {
		self.state().native_failure = Some(message.to_string());
	}

	/// Reject submissions of `method` (e.g. `"approve"`) with `message`
	pub fn fail_writes_of(&self, method: &'static str, message: &str) {
		self.state()
			.write_failures
			.insert(method, message.to_string());
	}

	pub fn clear_failures(&self) {
		let mut state = self.state();
		state.read_failures.clear();
		state.native_failure = None;
		state.write_failures.clear();
		state.wait_failure = None;
		state.revert_next = false;
	}

	/// Make the next `wait` return a provider error
	pub fn fail_next_wait(&self, message: &str) {
		self.state().wait_failure = Some(message.to_string());
	}

	/// Make the next `wait` return a reverted receipt
	pub fn revert_next_confirmation(&self) {
		self.state().revert_next = true;
	}

	/// Hold all reads until [`InMemoryChain::resume_reads`] is called
	pub fn pause_reads(&self) {
		self.read_gate.send_replace(false);
	}

	pub fn resume_reads(&self) {
		self.read_gate.send_replace(true);
	}

	async fn wait_for_read_gate(&self) {
		let mut gate = self.read_gate.subscribe();
		// The sender lives as long as `self`, so this only returns once open
		let _ = gate.wait_for(|open| *open).await;
	}

	fn next_tx_hash(state: &mut ChainState) -> TxHash {
		state.tx_counter += 1;
		TxHash::from(U256::from(state.tx_counter).to_be_bytes::<32>())
	}

	fn debit(
		balances: &mut HashMap<(Address, Address), U256>,
		key: (Address, Address),
		amount: U256,
	) -> ChainResult<()> {
		let balance = balances.get(&key).copied().unwrap_or_default();
		let remaining = balance.checked_sub(amount).ok_or_else(|| {
			ChainError::rejected("execution reverted: ERC20: transfer amount exceeds balance")
		})?;
		balances.insert(key, remaining);
		Ok(())
	}

	fn credit(balances: &mut HashMap<(Address, Address), U256>, key: (Address, Address), amount: U256) {
		*balances.entry(key).or_default() += amount;
	}

	fn apply_write(
		&self,
		state: &mut ChainState,
		from: Address,
		call: &ContractCall,
		value: U256,
	) -> ChainResult<()> {
		let deployment = &self.deployment;
		match &call.method {
			ContractMethod::Approve { spender, amount } => {
				state.allowances.insert((call.to, from, *spender), *amount);
				Ok(())
			},
			ContractMethod::Mint { amount } => {
				let key = (deployment.stable, from, deployment.issuer);
				let allowance = state.allowances.get(&key).copied().unwrap_or_default();
				if allowance < *amount {
					return Err(ChainError::rejected(
						"execution reverted: ERC20: insufficient allowance",
					));
				}
				Self::debit(&mut state.token_balances, (deployment.stable, from), *amount)?;
				Self::credit(
					&mut state.token_balances,
					(deployment.stable, deployment.issuer),
					*amount,
				);
				state.allowances.insert(key, allowance - *amount);
				Ok(())
			},
			ContractMethod::BuyTokens { beneficiary } => {
				let native = state.native_balances.get(&from).copied().unwrap_or_default();
				if native < value {
					return Err(ChainError::rejected(
						"insufficient funds for gas * price + value",
					));
				}
				let tokens = value * U256::from(TEST_PURCHASE_RATE);
				Self::debit(
					&mut state.token_balances,
					(deployment.token, deployment.fund),
					tokens,
				)?;
				Self::credit(&mut state.token_balances, (deployment.token, *beneficiary), tokens);
				state.native_balances.insert(from, native - value);
				*state
					.native_balances
					.entry(deployment.fund)
					.or_default() += value;
				Ok(())
			},
			ContractMethod::BalanceOf { .. } | ContractMethod::Allowance { .. } => Err(
				ChainError::rejected(format!("{} is a view method", call.method.name())),
			),
		}
	}
}

#[async_trait]
impl ChainClient for InMemoryChain {
	async fn read(&self, call: &ContractCall) -> ChainResult<U256> {
		self.state().calls.push(RecordedCall::Read(call.clone()));
		self.wait_for_read_gate().await;

		let state = self.state();
		if let Some(message) = state.read_failures.get(&call.contract) {
			return Err(ChainError::provider(message.clone()));
		}
		let value = match &call.method {
			ContractMethod::BalanceOf { owner } => state.token_balances.get(&(call.to, *owner)),
			ContractMethod::Allowance { owner, spender } => {
				state.allowances.get(&(call.to, *owner, *spender))
			},
			other => {
				return Err(ChainError::rejected(format!(
					"{} is not a view method",
					other.name()
				)))
			},
		};
		Ok(value.copied().unwrap_or_default())
	}

	async fn write(
		&self,
		signer: &SigningCapability,
		call: &ContractCall,
		options: WriteOptions,
	) -> ChainResult<PendingTx> {
		let from = signer.account();
		let mut state = self.state();
		state.calls.push(RecordedCall::Write {
			from,
			call: call.clone(),
			value: options.value,
		});

		if let Some(message) = state.write_failures.get(call.method.name()) {
			return Err(ChainError::rejected(message.clone()));
		}
		self.apply_write(&mut state, from, call, options.value)?;

		let hash = Self::next_tx_hash(&mut state);
		state.pending.insert(hash);
		Ok(PendingTx { hash, from })
	}

	async fn wait(&self, tx: &PendingTx, confirmations: u64) -> ChainResult<TxReceipt> {
		let mut state = self.state();
		state.calls.push(RecordedCall::Wait {
			hash: tx.hash,
			confirmations,
		});

		if let Some(message) = state.wait_failure.take() {
			return Err(ChainError::provider(message));
		}
		if !state.pending.remove(&tx.hash) {
			return Err(ChainError::provider(format!("unknown transaction {}", tx.hash)));
		}
		state.block_number += confirmations.max(1);
		let success = !std::mem::take(&mut state.revert_next);
		Ok(TxReceipt {
			hash: tx.hash,
			block_number: state.block_number,
			success,
		})
	}

	async fn native_balance(&self, address: Address) -> ChainResult<U256> {
		self.state().calls.push(RecordedCall::NativeBalance(address));
		self.wait_for_read_gate().await;

		let state = self.state();
		if let Some(message) = &state.native_failure {
			return Err(ChainError::provider(message.clone()));
		}
		Ok(state.native_balances.get(&address).copied().unwrap_or_default())
	}
}

/// Wallet that hands out fixed accounts and network
#[derive(Debug, Clone)]
pub struct InMemoryWallet {
	pub accounts: Vec<Address>,
	pub chain_id: ChainId,
	pub reject_with: Option<String>,
}

impl InMemoryWallet {
	pub fn new(accounts: Vec<Address>, chain_id: ChainId) -> Self {
		Self {
			accounts,
			chain_id,
			reject_with: None,
		}
	}

	/// Wallet for [`test_account`] on [`TEST_CHAIN_ID`]
	pub fn connected() -> Self {
		Self::new(vec![test_account()], TEST_CHAIN_ID)
	}

	/// Wallet whose user declines the connection request
	pub fn rejecting(message: &str) -> Self {
		Self {
			reject_with: Some(message.to_string()),
			..Self::connected()
		}
	}
}

#[async_trait]
impl WalletProvider for InMemoryWallet {
	async fn request_accounts(&self) -> ChainResult<Vec<Address>> {
		match &self.reject_with {
			Some(message) => Err(ChainError::rejected(message.clone())),
			None => Ok(self.accounts.clone()),
		}
	}

	async fn get_signer(&self) -> ChainResult<SigningCapability> {
		self.accounts
			.first()
			.copied()
			.map(SigningCapability::new)
			.ok_or_else(|| ChainError::rejected("no accounts available"))
	}

	async fn get_network(&self) -> ChainResult<ChainId> {
		Ok(self.chain_id)
	}
}
