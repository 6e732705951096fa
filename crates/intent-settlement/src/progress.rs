//! Settlement progress tracking.
//!
//! Progress is recomputed from chain state on every call and moves through
//! three stages, each a conjunction over its own set:
//!
//! 1. filled: every output has a fill record on its destination chain,
//! 2. validated: for every origin chain and output, the origin chain's input
//!    oracle has received proof of the fill,
//! 3. finalised: every origin chain has released the inputs.
//!
//! A stage is only checked once the previous one holds. Reads within a stage
//! run concurrently. Raw reads are cached; the progress itself never is.

use crate::reader::{ChainReader, FillTransaction, OrderStatus, ProofQuery, ReadError};
use alloy::primitives::{Address, B256};
use async_stream::stream;
use futures::future::try_join_all;
use futures::Stream;
use intent_cache::{FetchOptions, RpcCache};
use intent_order::{fill_description_hash, order_id, output_hash, EncodingError, ValidationPolicy};
use intent_types::{
	bytes32_to_address, AddressError, ChainId, CustodyScheme, Lock, MandateOutput, Order,
	OrderContainer,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Aggregate settlement state of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementProgress {
	pub all_filled: bool,
	pub all_validated: bool,
	pub all_finalised: bool,
}

/// Why a progress computation was abandoned.
#[derive(Debug, Error)]
pub enum ProgressError {
	#[error(transparent)]
	Read(#[from] ReadError),
	#[error(transparent)]
	Encoding(#[from] EncodingError),
	#[error(transparent)]
	Address(#[from] AddressError),
	#[error("Fill block timestamp {0} does not fit in 32 bits")]
	TimestampOverflow(u64),
}

/// How long reads whose answer can still change are reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
	pub fill_record_ttl: Duration,
	pub proof_ttl: Duration,
	pub finalisation_ttl: Duration,
}

impl Default for CacheSettings {
	fn default() -> Self {
		Self {
			fill_record_ttl: Duration::from_secs(12),
			proof_ttl: Duration::from_secs(30),
			finalisation_ttl: Duration::from_secs(30),
		}
	}
}

/// Computes [`SettlementProgress`] for order containers.
///
/// Every cache key starts with `"{order_id}:"`. [`ProgressTracker::invalidate_order`]
/// drops the reads that can still change after a state changing transaction.
/// Fill transactions and lock allocators cannot change once observed and are
/// kept until [`ProgressTracker::forget_order`].
pub struct ProgressTracker {
	reader: Arc<dyn ChainReader>,
	policy: Arc<dyn ValidationPolicy>,
	settings: CacheSettings,
	fill_records: RpcCache<B256, ReadError>,
	fill_transactions: RpcCache<FillTransaction, ReadError>,
	proofs: RpcCache<bool, ReadError>,
	order_statuses: RpcCache<OrderStatus, ReadError>,
	allocators: RpcCache<Address, ReadError>,
	nonces: RpcCache<bool, ReadError>,
}

impl ProgressTracker {
	pub fn new(
		reader: Arc<dyn ChainReader>,
		policy: Arc<dyn ValidationPolicy>,
		settings: CacheSettings,
	) -> Self {
		Self {
			reader,
			policy,
			settings,
			fill_records: RpcCache::new(),
			fill_transactions: RpcCache::new(),
			proofs: RpcCache::new(),
			order_statuses: RpcCache::new(),
			allocators: RpcCache::new(),
			nonces: RpcCache::new(),
		}
	}

	/// Current progress of `container`. `fills` maps output hashes to the
	/// transactions that filled them.
	///
	/// Read failures never surface here: they are logged and the result
	/// degrades to all-false until a later call succeeds.
	pub async fn progress(
		&self,
		container: &OrderContainer,
		fills: &HashMap<B256, B256>,
	) -> SettlementProgress {
		match self.compute(container, fills).await {
			Ok(progress) => progress,
			Err(error) => {
				warn!(
					user = %container.order.user(),
					nonce = %container.order.nonce(),
					%error,
					"Failed to compute settlement progress"
				);
				SettlementProgress::default()
			}
		}
	}

	/// Polls [`Self::progress`] every `interval`, yielding each snapshot. The
	/// stream ends after the first fully finalised snapshot.
	pub fn watch<'a>(
		&'a self,
		container: &'a OrderContainer,
		fills: &'a HashMap<B256, B256>,
		interval: Duration,
	) -> impl Stream<Item = SettlementProgress> + 'a {
		stream! {
			let mut ticker = tokio::time::interval(interval);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				ticker.tick().await;
				let progress = self.progress(container, fills).await;
				yield progress;
				if progress.all_finalised {
					let order_id = order_id(container);
					info!(%order_id, user = %container.order.user(), "Order fully settled");
					self.forget_order(order_id);
					break;
				}
			}
		}
	}

	/// Drops the cached reads of `order_id` that can still change.
	pub fn invalidate_order(&self, order_id: B256) {
		let prefix = format!("{order_id}:");
		self.fill_records.invalidate_prefix(&prefix);
		self.proofs.invalidate_prefix(&prefix);
		self.order_statuses.invalidate_prefix(&prefix);
		self.nonces.invalidate_prefix(&prefix);
		debug!(%order_id, "Invalidated cached reads");
	}

	/// Drops every cached read of `order_id`, immutable ones included, and
	/// sweeps expired reads of other orders.
	pub fn forget_order(&self, order_id: B256) {
		self.invalidate_order(order_id);
		let prefix = format!("{order_id}:");
		self.fill_transactions.invalidate_prefix(&prefix);
		self.allocators.invalidate_prefix(&prefix);

		self.fill_records.evict_expired();
		self.proofs.evict_expired();
		self.order_statuses.evict_expired();
		self.nonces.evict_expired();
		debug!(
			%order_id,
			fill_records = ?self.fill_records.stats(),
			fill_transactions = ?self.fill_transactions.stats(),
			proofs = ?self.proofs.stats(),
			order_statuses = ?self.order_statuses.stats(),
			allocators = ?self.allocators.stats(),
			nonces = ?self.nonces.stats(),
			"Forgot order reads"
		);
	}

	async fn compute(
		&self,
		container: &OrderContainer,
		fills: &HashMap<B256, B256>,
	) -> Result<SettlementProgress, ProgressError> {
		let scheme = self.policy.custody_scheme(container.input_settler);
		let order_id = order_id(container);
		let order = &container.order;
		let mut progress = SettlementProgress::default();

		progress.all_filled = self.all_filled(order_id, order.outputs()).await?;
		if !progress.all_filled {
			return Ok(progress);
		}

		progress.all_validated = self.all_validated(order_id, order, fills).await?;
		if !progress.all_validated {
			return Ok(progress);
		}

		progress.all_finalised = self
			.all_finalised(order_id, container, scheme)
			.await?;
		debug!(%order_id, %scheme, ?progress, "Computed settlement progress");
		Ok(progress)
	}

	async fn all_filled(
		&self,
		order_id: B256,
		outputs: &[MandateOutput],
	) -> Result<bool, ProgressError> {
		let checks = outputs.iter().map(|output| self.is_filled(order_id, output));
		Ok(conjunction(try_join_all(checks).await?))
	}

	async fn is_filled(
		&self,
		order_id: B256,
		output: &MandateOutput,
	) -> Result<bool, ProgressError> {
		let output_hash = output_hash(output)?;
		let settler = bytes32_to_address(output.settler)?;
		let chain_id = output.chain_id;
		let reader = self.reader.clone();

		let record = self
			.fill_records
			.get_or_fetch(
				format!("{order_id}:fill:{chain_id}:{output_hash}"),
				move || async move {
					reader
						.fill_record(chain_id, settler, order_id, output_hash)
						.await
				},
				FetchOptions::ttl(self.settings.fill_record_ttl),
			)
			.await?;
		Ok(!record.is_zero())
	}

	async fn all_validated(
		&self,
		order_id: B256,
		order: &Order,
		fills: &HashMap<B256, B256>,
	) -> Result<bool, ProgressError> {
		let origins = order.origin_chains();
		let outputs = order.outputs();
		let checks = origins.iter().flat_map(|origin| {
			outputs
				.iter()
				.map(move |output| {
					self.is_validated(order_id, *origin, order.input_oracle(), output, fills)
				})
		});
		Ok(conjunction(try_join_all(checks).await?))
	}

	async fn is_validated(
		&self,
		order_id: B256,
		origin: ChainId,
		input_oracle: Address,
		output: &MandateOutput,
		fills: &HashMap<B256, B256>,
	) -> Result<bool, ProgressError> {
		let output_hash = output_hash(output)?;
		let Some(&tx_hash) = fills.get(&output_hash) else {
			debug!(%order_id, %output_hash, "No fill transaction known for output");
			return Ok(false);
		};

		let fill = self.fill_transaction(order_id, output.chain_id, tx_hash).await?;
		debug!(
			%order_id,
			%tx_hash,
			block_number = fill.block_number,
			block_timestamp = fill.block_timestamp,
			"Using fill transaction"
		);
		let timestamp = u32::try_from(fill.block_timestamp)
			.map_err(|_| ProgressError::TimestampOverflow(fill.block_timestamp))?;
		let data_hash = fill_description_hash(fill.solver, order_id, timestamp, output)?;
		let query = ProofQuery {
			remote_chain_id: output.chain_id,
			remote_oracle: output.oracle,
			application: output.settler,
			data_hash,
		};

		let reader = self.reader.clone();
		let proven = self
			.proofs
			.get_or_fetch(
				format!("{order_id}:proof:{origin}:{input_oracle}:{data_hash}"),
				move || async move { reader.is_proven(origin, input_oracle, query).await },
				FetchOptions::ttl(self.settings.proof_ttl),
			)
			.await?;
		Ok(proven)
	}

	async fn fill_transaction(
		&self,
		order_id: B256,
		chain_id: ChainId,
		tx_hash: B256,
	) -> Result<FillTransaction, ReadError> {
		let reader = self.reader.clone();
		self.fill_transactions
			.get_or_fetch(
				format!("{order_id}:tx:{chain_id}:{tx_hash}"),
				move || async move { reader.fill_transaction(chain_id, tx_hash).await },
				FetchOptions::immutable(),
			)
			.await
	}

	async fn all_finalised(
		&self,
		order_id: B256,
		container: &OrderContainer,
		scheme: CustodyScheme,
	) -> Result<bool, ProgressError> {
		let origins = container.order.origin_chains();
		let checks = origins.iter().map(|origin| async move {
			match scheme {
				CustodyScheme::Escrow => {
					self.is_claimed_from_escrow(order_id, *origin, container.input_settler)
						.await
				}
				CustodyScheme::ResourceLock => {
					self.is_lock_nonce_consumed(order_id, *origin, &container.order)
						.await
				}
			}
		});
		Ok(conjunction(try_join_all(checks).await?))
	}

	async fn is_claimed_from_escrow(
		&self,
		order_id: B256,
		chain_id: ChainId,
		settler: Address,
	) -> Result<bool, ProgressError> {
		let reader = self.reader.clone();
		let status = self
			.order_statuses
			.get_or_fetch(
				format!("{order_id}:status:{chain_id}"),
				move || async move { reader.order_status(chain_id, settler, order_id).await },
				FetchOptions::ttl(self.settings.finalisation_ttl),
			)
			.await?;
		Ok(status.is_final())
	}

	async fn is_lock_nonce_consumed(
		&self,
		order_id: B256,
		chain_id: ChainId,
		order: &Order,
	) -> Result<bool, ProgressError> {
		let Some(first) = order.inputs_on(chain_id).and_then(|inputs| inputs.first()) else {
			return Ok(false);
		};
		let lock_id = Lock::from_input(first).id();
		let nonce = order.nonce();

		let reader = self.reader.clone();
		let allocator = self
			.allocators
			.get_or_fetch(
				format!("{order_id}:allocator:{chain_id}:{lock_id}"),
				move || async move { reader.lock_allocator(chain_id, lock_id).await },
				FetchOptions::immutable(),
			)
			.await?;

		let reader = self.reader.clone();
		let consumed = self
			.nonces
			.get_or_fetch(
				format!("{order_id}:nonce:{chain_id}:{allocator}"),
				move || async move {
					reader
						.has_consumed_allocator_nonce(chain_id, allocator, nonce)
						.await
				},
				FetchOptions::ttl(self.settings.finalisation_ttl),
			)
			.await?;
		Ok(consumed)
	}
}

/// True when every check passed; an empty set of checks is never true.
fn conjunction(results: Vec<bool>) -> bool {
	!results.is_empty() && results.into_iter().all(|passed| passed)
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::{Bytes, U256};
	use async_trait::async_trait;
	use futures::StreamExt;
	use intent_order::{ChainPolicy, StaticPolicy};
	use intent_types::{address_to_bytes32, ChainInputs, Input, MultichainOrder, StandardOrder};
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Mutex;

	const FILL_TIMESTAMP: u64 = 1_700_000_100;

	fn solver() -> Address {
		Address::repeat_byte(0x50)
	}

	fn escrow_settler() -> Address {
		Address::repeat_byte(0xe5)
	}

	fn compact_settler() -> Address {
		Address::repeat_byte(0xc0)
	}

	/// Mock chain reader with switchable answers and call counters.
	struct MockReader {
		filled: Mutex<bool>,
		proven: Mutex<bool>,
		status: Mutex<OrderStatus>,
		nonce_consumed: Mutex<bool>,
		fail_proofs: bool,
		fill_delay: Duration,
		fill_record_calls: AtomicUsize,
		proof_queries: Mutex<Vec<(ChainId, Address, ProofQuery)>>,
		allocator_lookups: Mutex<Vec<(ChainId, U256)>>,
	}

	impl MockReader {
		fn settled() -> Self {
			Self {
				filled: Mutex::new(true),
				proven: Mutex::new(true),
				status: Mutex::new(OrderStatus::Claimed),
				nonce_consumed: Mutex::new(true),
				fail_proofs: false,
				fill_delay: Duration::ZERO,
				fill_record_calls: AtomicUsize::new(0),
				proof_queries: Mutex::new(Vec::new()),
				allocator_lookups: Mutex::new(Vec::new()),
			}
		}
	}

	#[async_trait]
	impl ChainReader for MockReader {
		async fn fill_record(
			&self,
			_chain_id: ChainId,
			_settler: Address,
			_order_id: B256,
			_output_hash: B256,
		) -> Result<B256, ReadError> {
			self.fill_record_calls.fetch_add(1, Ordering::SeqCst);
			if !self.fill_delay.is_zero() {
				tokio::time::sleep(self.fill_delay).await;
			}
			if *self.filled.lock().unwrap() {
				Ok(B256::repeat_byte(0x01))
			} else {
				Ok(B256::ZERO)
			}
		}

		async fn fill_transaction(
			&self,
			_chain_id: ChainId,
			_tx_hash: B256,
		) -> Result<FillTransaction, ReadError> {
			Ok(FillTransaction {
				solver: address_to_bytes32(solver()),
				block_number: 100,
				block_timestamp: FILL_TIMESTAMP,
			})
		}

		async fn is_proven(
			&self,
			chain_id: ChainId,
			oracle: Address,
			query: ProofQuery,
		) -> Result<bool, ReadError> {
			if self.fail_proofs {
				return Err(ReadError::Timeout(Duration::from_secs(10)));
			}
			self.proof_queries
				.lock()
				.unwrap()
				.push((chain_id, oracle, query));
			Ok(*self.proven.lock().unwrap())
		}

		async fn order_status(
			&self,
			_chain_id: ChainId,
			_settler: Address,
			_order_id: B256,
		) -> Result<OrderStatus, ReadError> {
			Ok(*self.status.lock().unwrap())
		}

		async fn lock_allocator(
			&self,
			chain_id: ChainId,
			token_id: U256,
		) -> Result<Address, ReadError> {
			self.allocator_lookups
				.lock()
				.unwrap()
				.push((chain_id, token_id));
			Ok(Address::repeat_byte(0xa1))
		}

		async fn has_consumed_allocator_nonce(
			&self,
			_chain_id: ChainId,
			allocator: Address,
			_nonce: U256,
		) -> Result<bool, ReadError> {
			assert_eq!(allocator, Address::repeat_byte(0xa1));
			Ok(*self.nonce_consumed.lock().unwrap())
		}
	}

	fn policy() -> Arc<dyn ValidationPolicy> {
		Arc::new(
			StaticPolicy::new()
				.with_chain(ChainId::BASE, ChainPolicy::default())
				.with_resource_lock_settler(compact_settler()),
		)
	}

	fn tracker(reader: Arc<MockReader>) -> ProgressTracker {
		ProgressTracker::new(reader, policy(), CacheSettings::default())
	}

	fn output() -> MandateOutput {
		MandateOutput {
			oracle: B256::repeat_byte(0x0b),
			settler: address_to_bytes32(Address::repeat_byte(0x0c)),
			chain_id: ChainId::ARBITRUM,
			token: B256::repeat_byte(0x33),
			amount: U256::from(990_000),
			recipient: B256::repeat_byte(0x44),
			callback_data: Bytes::new(),
			context: Bytes::new(),
		}
	}

	fn standard_container() -> OrderContainer {
		OrderContainer::new(
			escrow_settler(),
			StandardOrder {
				user: Address::repeat_byte(0x55),
				nonce: U256::from(9),
				origin_chain_id: ChainId::BASE,
				expires: 1_700_003_600,
				fill_deadline: 1_700_000_000,
				input_oracle: Address::repeat_byte(0x0a),
				inputs: vec![Input::new(U256::from(1), U256::from(1_000_000))],
				outputs: vec![output()],
			},
		)
	}

	fn fills_for(container: &OrderContainer) -> HashMap<B256, B256> {
		container
			.order
			.outputs()
			.iter()
			.map(|output| (output_hash(output).unwrap(), B256::repeat_byte(0xf1)))
			.collect()
	}

	#[tokio::test]
	async fn test_no_outputs_is_never_filled() {
		let reader = Arc::new(MockReader::settled());
		let tracker = tracker(reader.clone());
		let mut container = standard_container();
		if let Order::Standard(order) = &mut container.order {
			order.outputs.clear();
		}

		let progress = tracker.progress(&container, &HashMap::new()).await;

		assert_eq!(progress, SettlementProgress::default());
		assert_eq!(reader.fill_record_calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_unfilled_order_skips_later_stages() {
		let reader = Arc::new(MockReader::settled());
		*reader.filled.lock().unwrap() = false;
		let tracker = tracker(reader.clone());
		let container = standard_container();

		let progress = tracker.progress(&container, &fills_for(&container)).await;

		assert_eq!(progress, SettlementProgress::default());
		assert!(reader.proof_queries.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_missing_fill_transaction_is_not_validated() {
		let reader = Arc::new(MockReader::settled());
		let tracker = tracker(reader.clone());

		let progress = tracker
			.progress(&standard_container(), &HashMap::new())
			.await;

		assert!(progress.all_filled);
		assert!(!progress.all_validated);
		assert!(!progress.all_finalised);
	}

	#[tokio::test]
	async fn test_escrow_order_settles() {
		let reader = Arc::new(MockReader::settled());
		let tracker = tracker(reader.clone());
		let container = standard_container();

		let progress = tracker.progress(&container, &fills_for(&container)).await;

		assert_eq!(
			progress,
			SettlementProgress {
				all_filled: true,
				all_validated: true,
				all_finalised: true
			}
		);

		let order_id = order_id(&container);
		let expected = fill_description_hash(
			address_to_bytes32(solver()),
			order_id,
			FILL_TIMESTAMP as u32,
			&output(),
		)
		.unwrap();
		let queries = reader.proof_queries.lock().unwrap();
		assert_eq!(queries.len(), 1);
		let (chain_id, oracle, query) = queries[0];
		assert_eq!(chain_id, ChainId::BASE);
		assert_eq!(oracle, Address::repeat_byte(0x0a));
		assert_eq!(query.remote_chain_id, ChainId::ARBITRUM);
		assert_eq!(query.remote_oracle, output().oracle);
		assert_eq!(query.application, output().settler);
		assert_eq!(query.data_hash, expected);
	}

	#[tokio::test]
	async fn test_deposited_escrow_is_not_finalised() {
		let reader = Arc::new(MockReader::settled());
		*reader.status.lock().unwrap() = OrderStatus::Deposited;
		let tracker = tracker(reader.clone());
		let container = standard_container();

		let progress = tracker.progress(&container, &fills_for(&container)).await;

		assert!(progress.all_validated);
		assert!(!progress.all_finalised);
	}

	#[tokio::test]
	async fn test_read_error_degrades_to_all_false() {
		let reader = Arc::new(MockReader {
			fail_proofs: true,
			..MockReader::settled()
		});
		let tracker = tracker(reader);
		let container = standard_container();

		let progress = tracker.progress(&container, &fills_for(&container)).await;

		assert_eq!(progress, SettlementProgress::default());
	}

	#[tokio::test]
	async fn test_resource_lock_checks_allocator_nonce_per_chain() {
		let reader = Arc::new(MockReader::settled());
		let tracker = tracker(reader.clone());
		let order = MultichainOrder {
			user: Address::repeat_byte(0x55),
			nonce: U256::from(9),
			expires: 1_700_003_600,
			fill_deadline: 1_700_000_000,
			input_oracle: Address::repeat_byte(0x0a),
			outputs: vec![output()],
			inputs: vec![
				ChainInputs {
					chain_id: ChainId::BASE,
					inputs: vec![Input::new(U256::from(0x1111), U256::from(5))],
				},
				ChainInputs {
					chain_id: ChainId::OPTIMISM,
					inputs: vec![Input::new(U256::from(0x2222), U256::from(5))],
				},
			],
		};
		let container = OrderContainer::new(compact_settler(), order);

		let progress = tracker.progress(&container, &fills_for(&container)).await;
		assert!(progress.all_finalised);

		let mut lookups = reader.allocator_lookups.lock().unwrap().clone();
		lookups.sort();
		assert_eq!(
			lookups,
			vec![
				(ChainId::OPTIMISM, U256::from(0x2222)),
				(ChainId::BASE, U256::from(0x1111)),
			]
		);
		// one proof per origin chain and output
		assert_eq!(reader.proof_queries.lock().unwrap().len(), 2);
	}

	#[tokio::test]
	async fn test_reads_are_cached_until_invalidated() {
		let reader = Arc::new(MockReader::settled());
		*reader.filled.lock().unwrap() = false;
		let tracker = tracker(reader.clone());
		let container = standard_container();
		let fills = fills_for(&container);

		tracker.progress(&container, &fills).await;
		tracker.progress(&container, &fills).await;
		assert_eq!(reader.fill_record_calls.load(Ordering::SeqCst), 1);

		*reader.filled.lock().unwrap() = true;
		tracker.invalidate_order(order_id(&container));
		let progress = tracker.progress(&container, &fills).await;
		assert_eq!(reader.fill_record_calls.load(Ordering::SeqCst), 2);
		assert!(progress.all_finalised);
	}

	#[tokio::test(start_paused = true)]
	async fn test_watch_ends_once_finalised() {
		let reader = Arc::new(MockReader::settled());
		*reader.status.lock().unwrap() = OrderStatus::Deposited;
		let tracker = tracker(reader.clone());
		let container = standard_container();
		let fills = fills_for(&container);

		let stream = tracker.watch(&container, &fills, Duration::from_secs(60));
		futures::pin_mut!(stream);

		let first = stream.next().await.unwrap();
		assert!(first.all_validated);
		assert!(!first.all_finalised);

		*reader.status.lock().unwrap() = OrderStatus::Refunded;
		let second = stream.next().await.unwrap();
		assert!(second.all_finalised);
		assert!(stream.next().await.is_none());

		assert!(tracker.fill_records.is_empty());
		assert!(tracker.fill_transactions.is_empty());
		assert!(tracker.order_statuses.is_empty());
	}

	#[tokio::test(start_paused = true)]
	async fn test_fill_stage_waits_for_slowest_read_only() {
		let reader = Arc::new(MockReader {
			fill_delay: Duration::from_secs(10),
			..MockReader::settled()
		});
		let tracker = tracker(reader.clone());
		let mut container = standard_container();
		if let Order::Standard(order) = &mut container.order {
			order.outputs = (1..=3)
				.map(|amount| MandateOutput {
					amount: U256::from(amount),
					..output()
				})
				.collect();
		}
		let fills = fills_for(&container);

		let started = tokio::time::Instant::now();
		let progress = tracker.progress(&container, &fills).await;
		let elapsed = started.elapsed();

		assert!(progress.all_finalised);
		assert_eq!(reader.fill_record_calls.load(Ordering::SeqCst), 3);
		assert!(elapsed >= Duration::from_secs(10));
		assert!(elapsed < Duration::from_secs(20));
	}

	#[tokio::test]
	async fn test_forget_order_keeps_other_orders() {
		let reader = Arc::new(MockReader::settled());
		let tracker = tracker(reader.clone());
		let first = standard_container();
		let mut second = standard_container();
		if let Order::Standard(order) = &mut second.order {
			order.nonce = U256::from(10);
		}
		tracker.progress(&first, &fills_for(&first)).await;
		tracker.progress(&second, &fills_for(&second)).await;
		assert_eq!(tracker.fill_transactions.len(), 2);

		tracker.forget_order(order_id(&first));

		assert_eq!(tracker.fill_records.len(), 1);
		assert_eq!(tracker.fill_transactions.len(), 1);
		assert_eq!(tracker.proofs.len(), 1);
		assert_eq!(tracker.order_statuses.len(), 1);
	}
}
