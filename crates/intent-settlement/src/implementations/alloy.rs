//! Chain reader backed by alloy HTTP providers.
//!
//! One provider is kept per configured chain. Every request is bounded by
//! the reader's timeout; a request that runs out of time fails with
//! [`ReadError::Timeout`] and is retried by the next poll, never here.

use crate::reader::{ChainReader, FillTransaction, OrderStatus, ProofQuery, ReadError};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::BlockNumberOrTag;
use alloy::sol;
use async_trait::async_trait;
use intent_types::{address_to_bytes32, ChainId};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

sol! {
	#[sol(rpc)]
	interface IOutputSettler {
		function getFillRecord(bytes32 orderId, bytes32 outputHash) external view returns (bytes32);
	}

	#[sol(rpc)]
	interface IInputOracle {
		function isProven(uint256 remoteChainId, bytes32 remoteOracle, bytes32 application, bytes32 dataHash) external view returns (bool);
	}

	#[sol(rpc)]
	interface IInputSettlerEscrow {
		function orderStatus(bytes32 orderId) external view returns (uint8);
	}

	#[sol(rpc)]
	interface ITheCompact {
		function getLockDetails(uint256 id) external view returns (address token, address allocator, uint8 resetPeriod, uint8 scope, bytes12 lockTag);
		function hasConsumedAllocatorNonce(uint256 nonce, address allocator) external view returns (bool);
	}
}

/// Connection settings for one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEndpoint {
	pub rpc_url: String,
	/// Resource lock contract, required to track resource-lock orders.
	pub compact: Option<Address>,
}

struct Connection {
	provider: DynProvider,
	compact: Option<Address>,
}

/// [`ChainReader`] over per-chain JSON-RPC endpoints.
pub struct AlloyChainReader {
	connections: HashMap<ChainId, Connection>,
	timeout: Duration,
}

impl AlloyChainReader {
	/// Creates providers for every endpoint. No request is made until the
	/// first read.
	pub fn new(
		endpoints: HashMap<ChainId, ChainEndpoint>,
		timeout: Duration,
	) -> Result<Self, ReadError> {
		let mut connections = HashMap::with_capacity(endpoints.len());
		for (chain_id, endpoint) in endpoints {
			let url: reqwest::Url = endpoint.rpc_url.parse().map_err(|e| {
				ReadError::Rpc(format!("Invalid RPC URL for chain {chain_id}: {e}"))
			})?;
			let provider = ProviderBuilder::new().connect_http(url).erased();
			connections.insert(
				chain_id,
				Connection {
					provider,
					compact: endpoint.compact,
				},
			);
		}
		Ok(Self {
			connections,
			timeout,
		})
	}

	fn connection(&self, chain_id: ChainId) -> Result<&Connection, ReadError> {
		self.connections
			.get(&chain_id)
			.ok_or(ReadError::UnknownChain(chain_id))
	}

	async fn bounded<T, E, F>(&self, request: F) -> Result<T, ReadError>
	where
		F: Future<Output = Result<T, E>>,
		E: Into<ReadError>,
	{
		match tokio::time::timeout(self.timeout, request).await {
			Ok(result) => result.map_err(Into::into),
			Err(_) => Err(ReadError::Timeout(self.timeout)),
		}
	}
}

impl From<alloy::contract::Error> for ReadError {
	fn from(error: alloy::contract::Error) -> Self {
		if error.as_revert_data().is_some() {
			ReadError::Reverted(error.to_string())
		} else {
			ReadError::Rpc(error.to_string())
		}
	}
}

impl From<alloy::transports::TransportError> for ReadError {
	fn from(error: alloy::transports::TransportError) -> Self {
		ReadError::Rpc(error.to_string())
	}
}

#[async_trait]
impl ChainReader for AlloyChainReader {
	async fn fill_record(
		&self,
		chain_id: ChainId,
		settler: Address,
		order_id: B256,
		output_hash: B256,
	) -> Result<B256, ReadError> {
		let connection = self.connection(chain_id)?;
		let contract = IOutputSettler::new(settler, &connection.provider);
		debug!(%chain_id, %settler, %order_id, %output_hash, "Reading fill record");
		self.bounded(async {
			contract
				.getFillRecord(order_id, output_hash)
				.call()
				.await
		})
		.await
	}

	async fn fill_transaction(
		&self,
		chain_id: ChainId,
		tx_hash: B256,
	) -> Result<FillTransaction, ReadError> {
		let provider = &self.connection(chain_id)?.provider;

		let receipt = self
			.bounded(async { provider.get_transaction_receipt(tx_hash).await })
			.await?
			.ok_or_else(|| {
				ReadError::NotFound(format!("receipt for {tx_hash} on chain {chain_id}"))
			})?;
		if !receipt.status() {
			return Err(ReadError::Reverted(format!(
				"fill transaction {tx_hash} on chain {chain_id}"
			)));
		}
		let block_number = receipt.block_number.ok_or_else(|| {
			ReadError::NotFound(format!("block of {tx_hash} on chain {chain_id}"))
		})?;

		let block = self
			.bounded(async {
				provider
					.get_block_by_number(BlockNumberOrTag::Number(block_number))
					.await
			})
			.await?
			.ok_or_else(|| {
				ReadError::NotFound(format!("block {block_number} on chain {chain_id}"))
			})?;

		Ok(FillTransaction {
			solver: address_to_bytes32(receipt.from),
			block_number,
			block_timestamp: block.header.timestamp,
		})
	}

	async fn is_proven(
		&self,
		chain_id: ChainId,
		oracle: Address,
		query: ProofQuery,
	) -> Result<bool, ReadError> {
		let connection = self.connection(chain_id)?;
		let contract = IInputOracle::new(oracle, &connection.provider);
		self.bounded(async {
			contract
				.isProven(
					query.remote_chain_id.to_u256(),
					query.remote_oracle,
					query.application,
					query.data_hash,
				)
				.call()
				.await
		})
		.await
	}

	async fn order_status(
		&self,
		chain_id: ChainId,
		settler: Address,
		order_id: B256,
	) -> Result<OrderStatus, ReadError> {
		let connection = self.connection(chain_id)?;
		let contract = IInputSettlerEscrow::new(settler, &connection.provider);
		let status = self
			.bounded(async { contract.orderStatus(order_id).call().await })
			.await?;
		OrderStatus::from_repr(status)
			.ok_or_else(|| ReadError::Rpc(format!("Unexpected order status {status}")))
	}

	async fn lock_allocator(
		&self,
		chain_id: ChainId,
		token_id: U256,
	) -> Result<Address, ReadError> {
		let connection = self.connection(chain_id)?;
		let compact = connection.compact.ok_or_else(|| {
			ReadError::NotFound(format!("resource lock contract on chain {chain_id}"))
		})?;
		let contract = ITheCompact::new(compact, &connection.provider);
		let details = self
			.bounded(async { contract.getLockDetails(token_id).call().await })
			.await?;
		Ok(details.allocator)
	}

	async fn has_consumed_allocator_nonce(
		&self,
		chain_id: ChainId,
		allocator: Address,
		nonce: U256,
	) -> Result<bool, ReadError> {
		let connection = self.connection(chain_id)?;
		let compact = connection.compact.ok_or_else(|| {
			ReadError::NotFound(format!("resource lock contract on chain {chain_id}"))
		})?;
		let contract = ITheCompact::new(compact, &connection.provider);
		self.bounded(async {
			contract
				.hasConsumedAllocatorNonce(nonce, allocator)
				.call()
				.await
		})
		.await
	}
}
