//! Chain binding resolution
//!
//! Contract addresses are static configuration, so resolving bindings makes
//! no chain call: it only checks the session's network against the one
//! supported deployment.

use mint_types::{ChainId, ContractBindings, Deployment};

const TRACING_TARGET: &str = "mint_exchange::bindings";

#[derive(Debug, Clone)]
pub struct BindingResolver {
	deployment: Deployment,
}

impl BindingResolver {
	pub fn new(deployment: Deployment) -> Self {
		Self { deployment }
	}

	/// The single chain the deployment lives on
	pub fn supported_chain_id(&self) -> ChainId {
		self.deployment.chain_id
	}

	pub fn is_supported(&self, network: Option<ChainId>) -> bool {
		network == Some(self.deployment.chain_id)
	}

	/// Bindings for `network`, or `None` when it is not the supported chain
	///
	/// Idempotent; callers replace whatever bindings they held before with
	/// the result, including when it is `None`.
	pub fn resolve(&self, network: Option<ChainId>) -> Option<ContractBindings> {
		if !self.is_supported(network) {
			tracing::debug!(
				target: TRACING_TARGET,
				network = ?network,
				supported = self.deployment.chain_id,
				"Network not supported, no bindings"
			);
			return None;
		}

		tracing::debug!(
			target: TRACING_TARGET,
			chain_id = self.deployment.chain_id,
			"Resolved contract bindings"
		);
		Some(ContractBindings::from_deployment(&self.deployment))
	}
}
