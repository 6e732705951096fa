//! Chain identifiers.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chain identifier.
///
/// The protocol packs chain ids as `uint256`; every chain the engine talks to
/// fits in 64 bits, so the id is kept as a `u64` and widened when encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
	pub const ETHEREUM: Self = Self(1);
	pub const OPTIMISM: Self = Self(10);
	pub const POLYGON: Self = Self(137);
	pub const BASE: Self = Self(8453);
	pub const ARBITRUM: Self = Self(42161);

	/// Widens the id to the 256-bit form used in packed encodings.
	pub fn to_u256(self) -> U256 {
		U256::from(self.0)
	}
}

impl From<u64> for ChainId {
	fn from(id: u64) -> Self {
		Self(id)
	}
}

impl fmt::Display for ChainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for ChainId {
	type Err = std::num::ParseIntError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(ChainId(s.parse()?))
	}
}
