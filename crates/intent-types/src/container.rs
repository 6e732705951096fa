//! Signed order container and custody schemes.

use crate::Order;
use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the inputs of an order are held on the origin chain(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustodyScheme {
	/// Inputs are deposited into a dedicated escrow settler.
	Escrow,
	/// Inputs stay in a shared resource lock and are released by an
	/// allocator-authorised claim.
	ResourceLock,
}

impl fmt::Display for CustodyScheme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CustodyScheme::Escrow => write!(f, "escrow"),
			CustodyScheme::ResourceLock => write!(f, "resource_lock"),
		}
	}
}

/// An order bound to the input settler it is submitted to, plus signatures.
///
/// The sponsor signature is the asset owner's consent. The allocator
/// signature attests the custody lock and is only used by resource locks.
/// Containers are only ever changed by attaching signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderContainer {
	pub input_settler: Address,
	pub order: Order,
	#[serde(default)]
	pub sponsor_signature: Option<Bytes>,
	#[serde(default)]
	pub allocator_signature: Option<Bytes>,
}

impl OrderContainer {
	pub fn new(input_settler: Address, order: impl Into<Order>) -> Self {
		Self {
			input_settler,
			order: order.into(),
			sponsor_signature: None,
			allocator_signature: None,
		}
	}

	pub fn with_sponsor_signature(mut self, signature: Bytes) -> Self {
		self.sponsor_signature = Some(signature);
		self
	}

	pub fn with_allocator_signature(mut self, signature: Bytes) -> Self {
		self.allocator_signature = Some(signature);
		self
	}
}
