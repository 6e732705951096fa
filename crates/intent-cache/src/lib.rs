//! TTL cache with inflight request sharing for read-only chain queries.
//!
//! [`RpcCache`] keeps two maps behind one mutex: resolved values with their
//! expiry, and fetches that are still running. A caller that misses the value
//! map joins the running fetch for its key if there is one, so at most one
//! fetch per key is ever outstanding. The mutex is never held across an
//! await point.
//!
//! Only successful results are stored. A failed fetch is handed to every
//! caller that joined it and the next caller starts a new fetch.
//!
//! Expired values are swept when a miss finds the value map at its sweep
//! threshold. The threshold then moves to twice the surviving size, so a
//! sweep costs amortised constant time per miss.

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

type SharedFetch<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

/// Smallest value map size that triggers a sweep.
const MIN_SWEEP_THRESHOLD: usize = 64;

/// Per-call cache behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
	/// How long a fetched value stays fresh. `None` keeps it until it is
	/// invalidated, which suits data that cannot change once observed.
	pub ttl: Option<Duration>,
	/// Skip any stored value. A fetch already running is still joined.
	pub force: bool,
}

impl FetchOptions {
	pub fn ttl(ttl: Duration) -> Self {
		Self {
			ttl: Some(ttl),
			force: false,
		}
	}

	pub fn immutable() -> Self {
		Self::default()
	}

	pub fn forced(mut self) -> Self {
		self.force = true;
		self
	}
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
	/// Calls answered from a fresh stored value.
	pub hits: u64,
	/// Calls that started a fetch.
	pub misses: u64,
	/// Calls that joined a fetch already running.
	pub joins: u64,
	/// Expired values dropped by sweeps.
	pub evictions: u64,
}

#[derive(Default)]
struct Counters {
	hits: AtomicU64,
	misses: AtomicU64,
	joins: AtomicU64,
	evictions: AtomicU64,
}

struct Entry<V> {
	value: V,
	expires_at: Option<Instant>,
}

impl<V> Entry<V> {
	fn is_fresh(&self, now: Instant) -> bool {
		self.expires_at.map_or(true, |expires_at| now < expires_at)
	}
}

struct Inflight<V, E> {
	generation: u64,
	fetch: SharedFetch<V, E>,
}

struct State<V, E> {
	values: HashMap<String, Entry<V>>,
	inflight: HashMap<String, Inflight<V, E>>,
	next_generation: u64,
	sweep_at: usize,
}

impl<V, E> State<V, E> {
	fn sweep(&mut self, now: Instant) -> usize {
		let before = self.values.len();
		self.values.retain(|_, entry| entry.is_fresh(now));
		self.sweep_at = MIN_SWEEP_THRESHOLD.max(self.values.len() * 2);
		before - self.values.len()
	}
}

/// Cache of fallible asynchronous reads keyed by string.
///
/// Cloning is cheap and clones share their contents.
pub struct RpcCache<V, E> {
	state: Arc<Mutex<State<V, E>>>,
	counters: Arc<Counters>,
}

impl<V, E> Clone for RpcCache<V, E> {
	fn clone(&self) -> Self {
		Self {
			state: self.state.clone(),
			counters: self.counters.clone(),
		}
	}
}

impl<V, E> Default for RpcCache<V, E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<V, E> RpcCache<V, E> {
	pub fn new() -> Self {
		Self {
			state: Arc::new(Mutex::new(State {
				values: HashMap::new(),
				inflight: HashMap::new(),
				next_generation: 0,
				sweep_at: MIN_SWEEP_THRESHOLD,
			})),
			counters: Arc::new(Counters::default()),
		}
	}

	fn lock(&self) -> MutexGuard<'_, State<V, E>> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Drops the stored value for `key` and detaches any running fetch, whose
	/// result will then not be stored.
	pub fn invalidate(&self, key: &str) {
		let mut state = self.lock();
		state.values.remove(key);
		state.inflight.remove(key);
	}

	/// Invalidates every key starting with `prefix`.
	pub fn invalidate_prefix(&self, prefix: &str) {
		let mut state = self.lock();
		state.values.retain(|key, _| !key.starts_with(prefix));
		state.inflight.retain(|key, _| !key.starts_with(prefix));
	}

	/// Number of stored values, fresh or not.
	pub fn len(&self) -> usize {
		self.lock().values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Drops every expired value now and returns how many were dropped.
	pub fn evict_expired(&self) -> usize {
		let evicted = self.lock().sweep(Instant::now());
		self.record_evictions(evicted);
		evicted
	}

	fn record_evictions(&self, evicted: usize) {
		if evicted > 0 {
			self.counters
				.evictions
				.fetch_add(evicted as u64, Ordering::Relaxed);
			debug!(evicted, "Evicted expired cache entries");
		}
	}

	pub fn stats(&self) -> CacheStats {
		CacheStats {
			hits: self.counters.hits.load(Ordering::Relaxed),
			misses: self.counters.misses.load(Ordering::Relaxed),
			joins: self.counters.joins.load(Ordering::Relaxed),
			evictions: self.counters.evictions.load(Ordering::Relaxed),
		}
	}
}

impl<V, E> RpcCache<V, E>
where
	V: Clone + Send + Sync + 'static,
	E: Clone + Send + Sync + 'static,
{
	/// Fresh stored value for `key`, if any.
	pub fn get(&self, key: &str) -> Option<V> {
		let state = self.lock();
		state
			.values
			.get(key)
			.filter(|entry| entry.is_fresh(Instant::now()))
			.map(|entry| entry.value.clone())
	}

	/// Returns the value for `key`, fetching it with `fetcher` when there is
	/// no fresh value and no fetch to join.
	pub async fn get_or_fetch<F, Fut>(
		&self,
		key: impl Into<String>,
		fetcher: F,
		options: FetchOptions,
	) -> Result<V, E>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<V, E>> + Send + 'static,
	{
		let key = key.into();
		let fetch = {
			let mut state = self.lock();

			if !options.force {
				if let Some(entry) = state.values.get(&key) {
					if entry.is_fresh(Instant::now()) {
						self.counters.hits.fetch_add(1, Ordering::Relaxed);
						debug!(%key, "Cache hit");
						return Ok(entry.value.clone());
					}
				}
			}

			if let Some(inflight) = state.inflight.get(&key) {
				self.counters.joins.fetch_add(1, Ordering::Relaxed);
				debug!(%key, "Joining inflight fetch");
				inflight.fetch.clone()
			} else {
				self.counters.misses.fetch_add(1, Ordering::Relaxed);
				debug!(%key, "Cache miss");
				if state.values.len() >= state.sweep_at {
					let evicted = state.sweep(Instant::now());
					self.record_evictions(evicted);
				}
				let generation = state.next_generation;
				state.next_generation += 1;
				let fetch = self.start_fetch(key.clone(), generation, fetcher(), options.ttl);
				state.inflight.insert(
					key,
					Inflight {
						generation,
						fetch: fetch.clone(),
					},
				);
				fetch
			}
		};

		fetch.await
	}

	fn start_fetch<Fut>(
		&self,
		key: String,
		generation: u64,
		fetch: Fut,
		ttl: Option<Duration>,
	) -> SharedFetch<V, E>
	where
		Fut: Future<Output = Result<V, E>> + Send + 'static,
	{
		let state = Arc::clone(&self.state);
		async move {
			let result = fetch.await;

			let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
			let current = state
				.inflight
				.get(&key)
				.is_some_and(|inflight| inflight.generation == generation);
			if current {
				state.inflight.remove(&key);
				if let Ok(value) = &result {
					let expires_at = ttl.map(|ttl| Instant::now() + ttl);
					state.values.insert(
						key,
						Entry {
							value: value.clone(),
							expires_at,
						},
					);
				}
			}
			result
		}
		.boxed()
		.shared()
	}
}
