//! Configuration loading from files and environment.

use crate::types::Config;
use crate::ConfigError;
use intent_types::ChainId;
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};

/// Prefix of per-chain RPC URL overrides, e.g. `INTENT_RPC_URL_8453`.
pub const RPC_URL_ENV_PREFIX: &str = "INTENT_RPC_URL_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
	/// Loads, overrides and validates a configuration file.
	///
	/// The format follows the file extension. `${VAR}` references are
	/// substituted from the environment before parsing.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
		let path = path.as_ref();
		info!("Loading configuration from {:?}", path);

		if !path.exists() {
			return Err(ConfigError::FileNotFound(path.display().to_string()));
		}
		let contents = std::fs::read_to_string(path)?;
		let contents = substitute_env_vars(&contents, |name| std::env::var(name).ok())?;

		let mut config = match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Self::from_toml(&contents)?,
			Some("json") => Self::from_json(&contents)?,
			Some("yaml") | Some("yml") => Self::from_yaml(&contents)?,
			_ => {
				return Err(ConfigError::ParseError(format!(
					"Unsupported config format: {:?}",
					path
				)))
			}
		};

		apply_rpc_overrides(&mut config, std::env::vars());
		config.validate()?;
		Ok(config)
	}

	/// Load from TOML string
	pub fn from_toml(contents: &str) -> Result<Config, ConfigError> {
		toml::from_str(contents)
			.map_err(|e| ConfigError::ParseError(format!("Failed to parse TOML: {}", e)))
	}

	/// Load from JSON string
	pub fn from_json(contents: &str) -> Result<Config, ConfigError> {
		serde_json::from_str(contents)
			.map_err(|e| ConfigError::ParseError(format!("Failed to parse JSON: {}", e)))
	}

	/// Load from YAML string
	pub fn from_yaml(contents: &str) -> Result<Config, ConfigError> {
		serde_yaml::from_str(contents)
			.map_err(|e| ConfigError::ParseError(format!("Failed to parse YAML: {}", e)))
	}
}

/// Replaces every `${VAR_NAME}` in `content` with the value `lookup` returns.
fn substitute_env_vars<F>(content: &str, lookup: F) -> Result<String, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;
	let mut result = content.to_string();

	for cap in re.captures_iter(content) {
		let full_match = &cap[0];
		let var_name = &cap[1];

		let value =
			lookup(var_name).ok_or_else(|| ConfigError::EnvVarNotFound(var_name.to_string()))?;
		result = result.replace(full_match, &value);
	}

	Ok(result)
}

/// Overrides RPC URLs of configured chains from `INTENT_RPC_URL_<chainId>`.
/// Overrides for chains absent from the file are ignored.
fn apply_rpc_overrides<I>(config: &mut Config, vars: I)
where
	I: IntoIterator<Item = (String, String)>,
{
	for (name, url) in vars {
		let Some(chain_id) = name.strip_prefix(RPC_URL_ENV_PREFIX) else {
			continue;
		};
		if let Ok(id) = chain_id.parse::<ChainId>() {
			if let Some(chain) = config.chains.get_mut(&id) {
				debug!("Overriding RPC URL for chain {} from environment", id);
				chain.rpc_url = url;
			}
		}
	}
}
