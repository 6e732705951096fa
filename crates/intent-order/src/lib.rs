//! Order encoding, validation and multichain decomposition.
//!
//! Everything in this crate is pure and synchronous. The encoders reproduce
//! the byte layouts the settler and oracle contracts hash, the validator
//! checks orders against a deployment's [`ValidationPolicy`], and the
//! decomposer splits multichain orders into per-chain components whose
//! commitments chain back to one shared identifier.

pub mod abi;
pub mod encoding;
pub mod multichain;
pub mod policy;
pub mod validation;

pub use encoding::{
	chain_inputs_hash, encode_fill_description, encode_mandate_output, fill_description_hash,
	multichain_order_id, order_id, output_hash, standard_order_id, EncodingError, SharedFields,
};
pub use multichain::{decompose, reconstruct_identifier, shared_identifier, DecomposeError};
pub use policy::{ChainPolicy, StaticPolicy};
pub use validation::{OrderValidator, RejectReason, ValidationPolicy, ValidationReport};
