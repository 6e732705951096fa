//! Read-only chain access used to track settlement.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use intent_types::ChainId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while reading chain state.
///
/// Cloneable so one failed read can be handed to every caller sharing it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
	/// Transport or node error.
	#[error("RPC error: {0}")]
	Rpc(String),
	/// The node did not answer in time.
	#[error("Request timed out after {0:?}")]
	Timeout(Duration),
	/// The requested transaction, block or contract does not exist.
	#[error("Not found: {0}")]
	NotFound(String),
	/// No endpoint is configured for the chain.
	#[error("Unknown chain: {0}")]
	UnknownChain(ChainId),
	/// A contract call reverted.
	#[error("Call reverted: {0}")]
	Reverted(String),
}

/// What a mined fill transaction reveals about the fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillTransaction {
	/// Sender of the fill transaction, left-padded to 32 bytes.
	pub solver: B256,
	pub block_number: u64,
	pub block_timestamp: u64,
}

/// Arguments of an input oracle's `isProven` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofQuery {
	pub remote_chain_id: ChainId,
	pub remote_oracle: B256,
	pub application: B256,
	pub data_hash: B256,
}

/// Escrow order status as stored by the input settler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
	#[default]
	None,
	Deposited,
	Claimed,
	Refunded,
}

impl OrderStatus {
	pub fn from_repr(value: u8) -> Option<Self> {
		match value {
			0 => Some(OrderStatus::None),
			1 => Some(OrderStatus::Deposited),
			2 => Some(OrderStatus::Claimed),
			3 => Some(OrderStatus::Refunded),
			_ => None,
		}
	}

	/// Claimed and refunded orders can no longer change.
	pub fn is_final(self) -> bool {
		matches!(self, OrderStatus::Claimed | OrderStatus::Refunded)
	}
}

/// Chain reads the progress tracker depends on.
///
/// Implementations must not cache; the tracker decides what to cache and for
/// how long.
#[async_trait]
pub trait ChainReader: Send + Sync {
	/// Fill record stored by the output settler for `(order_id, output_hash)`.
	/// Zero means the output has not been filled.
	async fn fill_record(
		&self,
		chain_id: ChainId,
		settler: Address,
		order_id: B256,
		output_hash: B256,
	) -> Result<B256, ReadError>;

	/// Solver and block time of a mined fill transaction.
	async fn fill_transaction(
		&self,
		chain_id: ChainId,
		tx_hash: B256,
	) -> Result<FillTransaction, ReadError>;

	/// Whether the input oracle on `chain_id` has received proof of the fill
	/// described by `query`.
	async fn is_proven(
		&self,
		chain_id: ChainId,
		oracle: Address,
		query: ProofQuery,
	) -> Result<bool, ReadError>;

	async fn order_status(
		&self,
		chain_id: ChainId,
		settler: Address,
		order_id: B256,
	) -> Result<OrderStatus, ReadError>;

	/// Allocator bound to the resource lock `token_id`.
	async fn lock_allocator(&self, chain_id: ChainId, token_id: U256)
		-> Result<Address, ReadError>;

	async fn has_consumed_allocator_nonce(
		&self,
		chain_id: ChainId,
		allocator: Address,
		nonce: U256,
	) -> Result<bool, ReadError>;
}
