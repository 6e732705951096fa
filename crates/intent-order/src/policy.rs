//! Table-driven validation policy.

use crate::validation::ValidationPolicy;
use alloy_primitives::{Address, B256};
use intent_types::ChainId;
use std::collections::HashMap;

/// Oracles accepted on one chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainPolicy {
	/// Oracles an order originating on this chain may name as its input oracle.
	pub input_oracles: Vec<Address>,
	/// Oracles accepted for outputs delivered on this chain.
	pub output_oracles: Vec<B256>,
	/// Additionally accepted input oracle when every output is filled on
	/// this same chain.
	pub direct_filler_oracle: Option<Address>,
}

/// A [`ValidationPolicy`] backed by in-memory tables, one per deployment.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicy {
	chains: HashMap<ChainId, ChainPolicy>,
	output_settlers: Vec<B256>,
	resource_lock_settlers: Vec<Address>,
}

impl StaticPolicy {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_chain(mut self, chain_id: ChainId, policy: ChainPolicy) -> Self {
		self.chains.insert(chain_id, policy);
		self
	}

	pub fn with_output_settler(mut self, settler: B256) -> Self {
		self.output_settlers.push(settler);
		self
	}

	pub fn with_resource_lock_settler(mut self, settler: Address) -> Self {
		self.resource_lock_settlers.push(settler);
		self
	}

	/// Chains the policy knows, in ascending order.
	pub fn chains(&self) -> Vec<ChainId> {
		let mut chains: Vec<ChainId> = self.chains.keys().copied().collect();
		chains.sort();
		chains
	}
}

impl ValidationPolicy for StaticPolicy {
	fn allowed_input_oracles(
		&self,
		chain_id: ChainId,
		same_chain_fill: bool,
	) -> Option<Vec<Address>> {
		let chain = self.chains.get(&chain_id)?;
		let mut oracles = chain.input_oracles.clone();
		if same_chain_fill {
			oracles.extend(chain.direct_filler_oracle);
		}
		Some(oracles)
	}

	fn allowed_output_oracles(&self, chain_id: ChainId) -> Option<Vec<B256>> {
		self.chains
			.get(&chain_id)
			.map(|chain| chain.output_oracles.clone())
	}

	fn allowed_output_settlers(&self) -> Vec<B256> {
		self.output_settlers.clone()
	}

	fn resource_lock_settlers(&self) -> Vec<Address> {
		self.resource_lock_settlers.clone()
	}
}
