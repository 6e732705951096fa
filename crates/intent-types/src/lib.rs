//! Shared types for the intent protocol engine.
//!
//! This crate defines the order model that every other crate in the workspace
//! operates on: output legs, single-origin and multichain orders, the signed
//! order container and the per-chain components a multichain order is split
//! into. It also carries the small codecs that belong to the model itself,
//! such as output context decoding and resource lock identifiers.
//!
//! The types in this crate carry no protocol behaviour; hashing, validation
//! and settlement tracking live in the crates built on top of it.

pub mod chain;
pub mod container;
pub mod context;
pub mod lock;
pub mod order;
pub mod utils;

pub use chain::*;
pub use container::*;
pub use context::*;
pub use lock::*;
pub use order::*;
pub use utils::*;
