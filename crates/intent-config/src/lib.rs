//! Deployment configuration for the intent protocol engine.
//!
//! A deployment file names the settlers, the oracles accepted on each chain,
//! the RPC endpoints used to track settlement and the cache lifetimes of
//! chain reads. [`Config`] builds the validation policy; binaries map the
//! cache and reader sections onto the settlement types.

use thiserror::Error;

pub mod loader;
pub mod serde_helpers;
pub mod types;

pub use loader::{ConfigLoader, RPC_URL_ENV_PREFIX};
pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}
