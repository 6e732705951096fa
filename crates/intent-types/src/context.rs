//! Output context codec.
//!
//! The `context` bytes of a [`crate::MandateOutput`] select how the delivered
//! amount is determined and whether one solver has an exclusive window:
//!
//! | tag    | layout                                                        | len |
//! |--------|---------------------------------------------------------------|-----|
//! | (none) | empty context, limit order                                    | 0   |
//! | `0x00` | limit order                                                   | 1   |
//! | `0x01` | `startTime u32 ‖ stopTime u32 ‖ slope u256`                   | 41  |
//! | `0xe0` | `exclusiveFor bytes32 ‖ startTime u32`                        | 37  |
//! | `0xe1` | `exclusiveFor bytes32 ‖ startTime u32 ‖ stopTime u32 ‖ slope` | 73  |

use alloy_primitives::{Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const LIMIT: u8 = 0x00;
const DUTCH: u8 = 0x01;
const EXCLUSIVE_LIMIT: u8 = 0xe0;
const EXCLUSIVE_DUTCH: u8 = 0xe1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
	#[error("Unknown output context type 0x{0:02x}")]
	UnknownType(u8),
	#[error("Output context type 0x{tag:02x} expects {expected} bytes, got {actual}")]
	InvalidLength {
		tag: u8,
		expected: usize,
		actual: usize,
	},
}

/// Linear price decay used by Dutch auctions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DutchAuction {
	pub start_time: u32,
	pub stop_time: u32,
	/// Amount added per second remaining until `stop_time`.
	pub slope: U256,
}

impl DutchAuction {
	/// Amount owed at `timestamp`: `amount + slope * (stopTime - max(timestamp, startTime))`
	/// while the auction runs, `amount` once it has stopped.
	pub fn resolve(&self, amount: U256, timestamp: u32) -> U256 {
		if timestamp >= self.stop_time {
			return amount;
		}
		let current = timestamp.max(self.start_time);
		let remaining = U256::from(self.stop_time.saturating_sub(current));
		amount.saturating_add(self.slope.saturating_mul(remaining))
	}
}

/// Decoded form of an output's `context` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputContext {
	Limit,
	Dutch(DutchAuction),
	ExclusiveLimit {
		exclusive_for: B256,
		start_time: u32,
	},
	ExclusiveDutch {
		exclusive_for: B256,
		auction: DutchAuction,
	},
}

impl OutputContext {
	pub fn decode(context: &[u8]) -> Result<Self, ContextError> {
		let Some(&tag) = context.first() else {
			return Ok(OutputContext::Limit);
		};

		match tag {
			LIMIT => {
				expect_len(tag, context, 1)?;
				Ok(OutputContext::Limit)
			}
			DUTCH => {
				expect_len(tag, context, 41)?;
				Ok(OutputContext::Dutch(read_auction(&context[1..])))
			}
			EXCLUSIVE_LIMIT => {
				expect_len(tag, context, 37)?;
				Ok(OutputContext::ExclusiveLimit {
					exclusive_for: B256::from_slice(&context[1..33]),
					start_time: read_u32(&context[33..37]),
				})
			}
			EXCLUSIVE_DUTCH => {
				expect_len(tag, context, 73)?;
				Ok(OutputContext::ExclusiveDutch {
					exclusive_for: B256::from_slice(&context[1..33]),
					auction: read_auction(&context[33..]),
				})
			}
			other => Err(ContextError::UnknownType(other)),
		}
	}

	pub fn encode(&self) -> Bytes {
		let mut out = Vec::with_capacity(73);
		match self {
			OutputContext::Limit => out.push(LIMIT),
			OutputContext::Dutch(auction) => {
				out.push(DUTCH);
				write_auction(&mut out, auction);
			}
			OutputContext::ExclusiveLimit {
				exclusive_for,
				start_time,
			} => {
				out.push(EXCLUSIVE_LIMIT);
				out.extend_from_slice(exclusive_for.as_slice());
				out.extend_from_slice(&start_time.to_be_bytes());
			}
			OutputContext::ExclusiveDutch {
				exclusive_for,
				auction,
			} => {
				out.push(EXCLUSIVE_DUTCH);
				out.extend_from_slice(exclusive_for.as_slice());
				write_auction(&mut out, auction);
			}
		}
		out.into()
	}

	/// Amount a solver must deliver when filling at `timestamp`.
	pub fn resolve_amount(&self, amount: U256, timestamp: u32) -> U256 {
		match self {
			OutputContext::Limit | OutputContext::ExclusiveLimit { .. } => amount,
			OutputContext::Dutch(auction) => auction.resolve(amount, timestamp),
			OutputContext::ExclusiveDutch { auction, .. } => auction.resolve(amount, timestamp),
		}
	}

	/// Whether `solver` may fill at `timestamp`. An exclusive context
	/// reserves the fill for one solver until its start time; after that
	/// anyone may.
	pub fn allows_solver(&self, solver: B256, timestamp: u32) -> bool {
		match self {
			OutputContext::Limit | OutputContext::Dutch(_) => true,
			OutputContext::ExclusiveLimit {
				exclusive_for,
				start_time,
			} => timestamp >= *start_time || *exclusive_for == solver,
			OutputContext::ExclusiveDutch {
				exclusive_for,
				auction,
			} => timestamp >= auction.start_time || *exclusive_for == solver,
		}
	}
}

fn expect_len(tag: u8, context: &[u8], expected: usize) -> Result<(), ContextError> {
	if context.len() != expected {
		return Err(ContextError::InvalidLength {
			tag,
			expected,
			actual: context.len(),
		});
	}
	Ok(())
}

fn read_u32(bytes: &[u8]) -> u32 {
	let mut buf = [0u8; 4];
	buf.copy_from_slice(&bytes[..4]);
	u32::from_be_bytes(buf)
}

// start ‖ stop ‖ slope, 40 bytes
fn read_auction(bytes: &[u8]) -> DutchAuction {
	DutchAuction {
		start_time: read_u32(&bytes[0..4]),
		stop_time: read_u32(&bytes[4..8]),
		slope: U256::from_be_slice(&bytes[8..40]),
	}
}

fn write_auction(out: &mut Vec<u8>, auction: &DutchAuction) {
	out.extend_from_slice(&auction.start_time.to_be_bytes());
	out.extend_from_slice(&auction.stop_time.to_be_bytes());
	out.extend_from_slice(&auction.slope.to_be_bytes::<32>());
}
