//! Configuration types for a protocol deployment.

use crate::serde_helpers::{deserialize_chain_id_map, serialize_chain_id_map};
use crate::ConfigError;
use alloy_primitives::Address;
use intent_order::{ChainPolicy, StaticPolicy};
use intent_types::{address_to_bytes32, ChainId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete deployment configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
	/// Settler contracts known to the deployment
	pub settlers: SettlersConfig,
	/// Cache lifetimes of mutable chain reads
	#[serde(default)]
	pub cache: CacheConfig,
	/// RPC client settings
	#[serde(default)]
	pub reader: ReaderConfig,
	/// Per-chain endpoints and oracles
	#[serde(
		deserialize_with = "deserialize_chain_id_map",
		serialize_with = "serialize_chain_id_map"
	)]
	pub chains: HashMap<ChainId, ChainConfig>,
}

/// Settler contracts
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SettlersConfig {
	/// Output settlers accepted on every chain
	pub output: Vec<Address>,
	/// Input settlers that take custody through resource locks
	#[serde(default)]
	pub resource_lock: Vec<Address>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
	#[serde(default = "default_fill_record_ttl_secs")]
	pub fill_record_ttl_secs: u64,
	#[serde(default = "default_proof_ttl_secs")]
	pub proof_ttl_secs: u64,
	#[serde(default = "default_finalisation_ttl_secs")]
	pub finalisation_ttl_secs: u64,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			fill_record_ttl_secs: default_fill_record_ttl_secs(),
			proof_ttl_secs: default_proof_ttl_secs(),
			finalisation_ttl_secs: default_finalisation_ttl_secs(),
		}
	}
}

fn default_fill_record_ttl_secs() -> u64 {
	12
}

fn default_proof_ttl_secs() -> u64 {
	30
}

fn default_finalisation_ttl_secs() -> u64 {
	30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReaderConfig {
	/// Upper bound on a single RPC request
	#[serde(default = "default_request_timeout_ms")]
	pub request_timeout_ms: u64,
}

impl Default for ReaderConfig {
	fn default() -> Self {
		Self {
			request_timeout_ms: default_request_timeout_ms(),
		}
	}
}

fn default_request_timeout_ms() -> u64 {
	10_000
}

/// Chain-specific configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
	/// Chain name for logging
	#[serde(default)]
	pub name: String,
	/// RPC endpoint URL
	pub rpc_url: String,
	/// Input oracles accepted for orders originating here
	#[serde(default)]
	pub input_oracles: Vec<Address>,
	/// Output oracles accepted for outputs delivered here
	#[serde(default)]
	pub output_oracles: Vec<Address>,
	/// Oracle accepted when an order is filled on its own origin chain
	pub direct_filler_oracle: Option<Address>,
	/// Resource lock contract
	pub compact: Option<Address>,
}

impl Config {
	/// Builds the validation policy of this deployment.
	pub fn policy(&self) -> StaticPolicy {
		let mut policy = StaticPolicy::new();
		for (chain_id, chain) in &self.chains {
			policy = policy.with_chain(
				*chain_id,
				ChainPolicy {
					input_oracles: chain.input_oracles.clone(),
					output_oracles: chain
						.output_oracles
						.iter()
						.copied()
						.map(address_to_bytes32)
						.collect(),
					direct_filler_oracle: chain.direct_filler_oracle,
				},
			);
		}
		for settler in &self.settlers.output {
			policy = policy.with_output_settler(address_to_bytes32(*settler));
		}
		for settler in &self.settlers.resource_lock {
			policy = policy.with_resource_lock_settler(*settler);
		}
		policy
	}

	/// Checks the configuration for values no deployment can work with.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.settlers.output.is_empty() {
			return Err(ConfigError::ValidationError(
				"At least one output settler must be configured".to_string(),
			));
		}
		if self.settlers.output.contains(&Address::ZERO)
			|| self.settlers.resource_lock.contains(&Address::ZERO)
		{
			return Err(ConfigError::ValidationError(
				"Settler addresses must be non-zero".to_string(),
			));
		}
		if self.reader.request_timeout_ms == 0 {
			return Err(ConfigError::ValidationError(
				"Request timeout must be positive".to_string(),
			));
		}

		for (chain_id, chain) in &self.chains {
			if chain.rpc_url.trim().is_empty() {
				return Err(ConfigError::ValidationError(format!(
					"Chain {} has an empty rpc_url",
					chain_id
				)));
			}
			let has_zero_oracle = chain
				.input_oracles
				.iter()
				.chain(&chain.output_oracles)
				.chain(&chain.direct_filler_oracle)
				.any(|oracle| oracle.is_zero());
			if has_zero_oracle {
				return Err(ConfigError::ValidationError(format!(
					"Chain {} has a zero oracle address",
					chain_id
				)));
			}
			if chain.compact == Some(Address::ZERO) {
				return Err(ConfigError::ValidationError(format!(
					"Chain {} has a zero resource lock contract",
					chain_id
				)));
			}
		}

		Ok(())
	}
}
