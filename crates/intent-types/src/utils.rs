//! Conversions between EVM addresses and 32-byte identifiers.

use alloy_primitives::{Address, B256};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
	#[error("Invalid EVM address in bytes32: {0}")]
	NotAnEvmAddress(B256),
}

/// Convert an EVM address to bytes32 format (left-padded with zeroes).
pub fn address_to_bytes32(address: Address) -> B256 {
	address.into_word()
}

/// Convert bytes32 to an EVM address (the last 20 bytes).
///
/// Fails when any of the upper 12 bytes is set, since such an identifier
/// cannot name an EVM account.
pub fn bytes32_to_address(bytes: B256) -> Result<Address, AddressError> {
	if bytes[..12].iter().any(|&b| b != 0) {
		return Err(AddressError::NotAnEvmAddress(bytes));
	}
	Ok(Address::from_word(bytes))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_address_bytes32_conversion() {
		let addr = Address::repeat_byte(42);
		let bytes32 = address_to_bytes32(addr);

		// First 12 bytes should be zero
		assert!(bytes32[..12].iter().all(|&b| b == 0));
		// Last 20 bytes should match address
		assert_eq!(&bytes32[12..], addr.as_slice());

		assert_eq!(bytes32_to_address(bytes32).unwrap(), addr);
	}

	#[test]
	fn test_invalid_bytes32_to_address() {
		let mut bytes = [0u8; 32];
		bytes[0] = 1;

		let result = bytes32_to_address(B256::from(bytes));
		assert!(matches!(result, Err(AddressError::NotAnEvmAddress(_))));
	}
}
