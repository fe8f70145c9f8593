//! Wallet session state

use alloy_primitives::Address;

use crate::chain::SigningCapability;
use crate::models::ChainId;

/// Connected wallet session
///
/// Mutated only through the named transitions below. Every transition that
/// changes the account or network bumps `epoch`, which lets asynchronous work
/// started under an older session detect that its results are stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
	account: Option<Address>,
	network: Option<ChainId>,
	signer: Option<SigningCapability>,
	epoch: u64,
}

impl Session {
	pub fn new() -> Self {
		Self::default()
	}

	/// Wallet-connect callback: accounts, signer and network are all known
	pub fn connect(&mut self, accounts: &[Address], signer: SigningCapability, network: ChainId) {
		self.account = accounts.first().copied().or(Some(signer.account()));
		self.signer = Some(signer);
		self.network = Some(network);
		self.epoch += 1;
	}

	/// Account-change event; an empty list means the wallet disconnected
	///
	/// Returns whether the session changed.
	pub fn on_account_changed(&mut self, accounts: &[Address]) -> bool {
		let next = accounts.first().copied();
		if next == self.account {
			return false;
		}

		match next {
			None => self.disconnect(),
			Some(account) => {
				self.account = Some(account);
				// The wallet signs for whichever account is selected
				if self.signer.is_some() {
					self.signer = Some(SigningCapability::new(account));
				}
				self.epoch += 1;
			},
		}
		true
	}

	/// Network-change event. Returns whether the session changed.
	pub fn on_network_changed(&mut self, chain_id: ChainId) -> bool {
		if self.network == Some(chain_id) {
			return false;
		}
		self.network = Some(chain_id);
		self.epoch += 1;
		true
	}

	/// Drop everything; the session becomes fully absent
	pub fn disconnect(&mut self) {
		self.account = None;
		self.network = None;
		self.signer = None;
		self.epoch += 1;
	}

	pub fn account(&self) -> Option<Address> {
		self.account
	}

	pub fn network(&self) -> Option<ChainId> {
		self.network
	}

	pub fn signer(&self) -> Option<&SigningCapability> {
		self.signer.as_ref()
	}

	pub fn epoch(&self) -> u64 {
		self.epoch
	}

	/// An account is selected and a signer is available
	pub fn is_connected(&self) -> bool {
		self.account.is_some() && self.signer.is_some()
	}

	pub fn is_on(&self, chain_id: ChainId) -> bool {
		self.network == Some(chain_id)
	}
}
