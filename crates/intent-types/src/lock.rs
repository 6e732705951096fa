//! Resource lock identifiers.
//!
//! Under the resource-lock custody scheme an input's 256-bit token id is a
//! lock id: the upper 96 bits are the lock tag and the lower 160 bits are the
//! token address. The lock tag itself packs, from the most significant bit,
//! a 1-bit scope, a 3-bit reset period and a 92-bit allocator id.

use crate::Input;
use alloy_primitives::{Address, FixedBytes, U256};
use serde::{Deserialize, Serialize};

/// Whether a lock may back claims on other chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
	Multichain,
	ChainSpecific,
}

/// Delay between a forced withdrawal request and its execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetPeriod {
	OneSecond,
	FifteenSeconds,
	OneMinute,
	TenMinutes,
	OneHourAndFiveMinutes,
	OneDay,
	SevenDaysAndOneHour,
	ThirtyDays,
}

impl ResetPeriod {
	fn from_bits(bits: u8) -> Self {
		match bits & 0x07 {
			0 => ResetPeriod::OneSecond,
			1 => ResetPeriod::FifteenSeconds,
			2 => ResetPeriod::OneMinute,
			3 => ResetPeriod::TenMinutes,
			4 => ResetPeriod::OneHourAndFiveMinutes,
			5 => ResetPeriod::OneDay,
			6 => ResetPeriod::SevenDaysAndOneHour,
			_ => ResetPeriod::ThirtyDays,
		}
	}

	/// Length of the period in seconds.
	pub fn as_secs(self) -> u64 {
		match self {
			ResetPeriod::OneSecond => 1,
			ResetPeriod::FifteenSeconds => 15,
			ResetPeriod::OneMinute => 60,
			ResetPeriod::TenMinutes => 600,
			ResetPeriod::OneHourAndFiveMinutes => 3_900,
			ResetPeriod::OneDay => 86_400,
			ResetPeriod::SevenDaysAndOneHour => 608_400,
			ResetPeriod::ThirtyDays => 2_592_000,
		}
	}
}

/// A resource lock commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lock {
	pub lock_tag: FixedBytes<12>,
	pub token: Address,
	pub amount: U256,
}

impl Lock {
	/// Splits an input's token id into lock tag and token address.
	pub fn from_input(input: &Input) -> Self {
		let id: [u8; 32] = input.token_id.to_be_bytes();
		Self {
			lock_tag: FixedBytes::from_slice(&id[..12]),
			token: Address::from_slice(&id[12..]),
			amount: input.amount,
		}
	}

	/// Reassembles the 256-bit lock id.
	pub fn id(&self) -> U256 {
		let mut id = [0u8; 32];
		id[..12].copy_from_slice(self.lock_tag.as_slice());
		id[12..].copy_from_slice(self.token.as_slice());
		U256::from_be_bytes(id)
	}

	pub fn scope(&self) -> Scope {
		if self.lock_tag[0] & 0x80 == 0 {
			Scope::Multichain
		} else {
			Scope::ChainSpecific
		}
	}

	pub fn reset_period(&self) -> ResetPeriod {
		ResetPeriod::from_bits(self.lock_tag[0] >> 4)
	}

	/// The 92-bit allocator id registered with the lock contract.
	pub fn allocator_id(&self) -> u128 {
		let mut buf = [0u8; 16];
		buf[4..].copy_from_slice(self.lock_tag.as_slice());
		buf[4] &= 0x0f;
		u128::from_be_bytes(buf)
	}
}
