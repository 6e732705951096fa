//! Maps the deployment configuration onto settlement tracker inputs.

use intent_config::Config;
use intent_settlement::{CacheSettings, ChainEndpoint};
use intent_types::ChainId;
use std::collections::HashMap;
use std::time::Duration;

pub fn cache_settings(config: &Config) -> CacheSettings {
	CacheSettings {
		fill_record_ttl: Duration::from_secs(config.cache.fill_record_ttl_secs),
		proof_ttl: Duration::from_secs(config.cache.proof_ttl_secs),
		finalisation_ttl: Duration::from_secs(config.cache.finalisation_ttl_secs),
	}
}

pub fn chain_endpoints(config: &Config) -> HashMap<ChainId, ChainEndpoint> {
	config
		.chains
		.iter()
		.map(|(chain_id, chain)| {
			(
				*chain_id,
				ChainEndpoint {
					rpc_url: chain.rpc_url.clone(),
					compact: chain.compact,
				},
			)
		})
		.collect()
}

pub fn request_timeout(config: &Config) -> Duration {
	Duration::from_millis(config.reader.request_timeout_ms)
}
