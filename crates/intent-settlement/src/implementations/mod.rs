//! Chain reader implementations.

pub mod alloy;

pub use self::alloy::{AlloyChainReader, ChainEndpoint};
