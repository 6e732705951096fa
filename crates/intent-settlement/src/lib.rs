//! Settlement progress tracking.
//!
//! A [`ProgressTracker`] answers three questions about a submitted order:
//! whether every output has been filled on its destination chain, whether
//! every fill has been proven to the input oracle on each origin chain, and
//! whether the inputs have been released on every origin chain. Chain state
//! is read through a [`ChainReader`] and memoised in per-kind caches so
//! repeated polls do not repeat requests.

pub mod implementations;
pub mod progress;
pub mod reader;

pub use implementations::{AlloyChainReader, ChainEndpoint};
pub use progress::{CacheSettings, ProgressError, ProgressTracker, SettlementProgress};
pub use reader::{ChainReader, FillTransaction, OrderStatus, ProofQuery, ReadError};
