//! Canonical encodings and identifier derivation.
//!
//! Every function here reproduces a packing performed by the on-chain
//! settlers and oracles. Field order and width are a protocol contract: any
//! deviation yields identifiers that never match on-chain state.

use crate::abi;
use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::{SolStruct, SolValue};
use intent_types::{
	ChainId, Input, Lock, MandateOutput, MultichainOrder, Order, OrderComponent, OrderContainer,
	StandardOrder,
};
use thiserror::Error;

/// Errors raised while packing variable-length fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
	/// Length-prefixed fields carry a u16 length.
	#[error("Field `{field}` is {len} bytes, longer than the 65535 byte limit")]
	FieldTooLong { field: &'static str, len: usize },
}

fn push_u16_prefixed(
	out: &mut Vec<u8>,
	field: &'static str,
	bytes: &[u8],
) -> Result<(), EncodingError> {
	let len = u16::try_from(bytes.len()).map_err(|_| EncodingError::FieldTooLong {
		field,
		len: bytes.len(),
	})?;
	out.extend_from_slice(&len.to_be_bytes());
	out.extend_from_slice(bytes);
	Ok(())
}

fn push_u256(out: &mut Vec<u8>, value: U256) {
	out.extend_from_slice(&value.to_be_bytes::<32>());
}

/// Packs an output leg: `oracle ‖ settler ‖ chainId ‖ token ‖ amount ‖
/// recipient ‖ u16 ‖ callbackData ‖ u16 ‖ context`.
pub fn encode_mandate_output(output: &MandateOutput) -> Result<Vec<u8>, EncodingError> {
	let mut out = Vec::with_capacity(196 + output.callback_data.len() + output.context.len());
	out.extend_from_slice(output.oracle.as_slice());
	out.extend_from_slice(output.settler.as_slice());
	push_u256(&mut out, output.chain_id.to_u256());
	out.extend_from_slice(output.token.as_slice());
	push_u256(&mut out, output.amount);
	out.extend_from_slice(output.recipient.as_slice());
	push_u16_prefixed(&mut out, "callbackData", &output.callback_data)?;
	push_u16_prefixed(&mut out, "context", &output.context)?;
	Ok(out)
}

/// Hash identifying an output leg, used as the key of fill records.
pub fn output_hash(output: &MandateOutput) -> Result<B256, EncodingError> {
	Ok(keccak256(encode_mandate_output(output)?))
}

/// Packs inputs as `tokenId ‖ amount`, 64 bytes each.
pub fn encode_inputs(inputs: &[Input]) -> Vec<u8> {
	let mut out = Vec::with_capacity(inputs.len() * 64);
	for input in inputs {
		push_u256(&mut out, input.token_id);
		push_u256(&mut out, input.amount);
	}
	out
}

/// `abi.encode(outputs)`, including the leading offset word.
pub fn abi_encode_outputs(outputs: &[MandateOutput]) -> Vec<u8> {
	abi::outputs(outputs).abi_encode()
}

/// Identifier of a standard order as derived by its input settler.
pub fn standard_order_id(order: &StandardOrder, input_settler: Address) -> B256 {
	let mut out = Vec::with_capacity(512);
	push_u256(&mut out, order.origin_chain_id.to_u256());
	out.extend_from_slice(input_settler.as_slice());
	out.extend_from_slice(order.user.as_slice());
	push_u256(&mut out, order.nonce);
	out.extend_from_slice(&order.expires.to_be_bytes());
	out.extend_from_slice(&order.fill_deadline.to_be_bytes());
	out.extend_from_slice(order.input_oracle.as_slice());
	out.extend_from_slice(keccak256(encode_inputs(&order.inputs)).as_slice());
	out.extend_from_slice(&abi_encode_outputs(&order.outputs));
	keccak256(out)
}

/// Escrow commitment for the inputs an order holds on one chain.
pub fn chain_inputs_hash(chain_id: ChainId, inputs: &[Input]) -> B256 {
	let mut out = Vec::with_capacity(32 + inputs.len() * 64);
	push_u256(&mut out, chain_id.to_u256());
	out.extend_from_slice(&encode_inputs(inputs));
	keccak256(out)
}

/// Fields every component of a multichain order shares.
#[derive(Debug, Clone, Copy)]
pub struct SharedFields<'a> {
	pub user: Address,
	pub nonce: U256,
	pub expires: u32,
	pub fill_deadline: u32,
	pub input_oracle: Address,
	pub outputs: &'a [MandateOutput],
}

impl<'a> From<&'a MultichainOrder> for SharedFields<'a> {
	fn from(order: &'a MultichainOrder) -> Self {
		Self {
			user: order.user,
			nonce: order.nonce,
			expires: order.expires,
			fill_deadline: order.fill_deadline,
			input_oracle: order.input_oracle,
			outputs: &order.outputs,
		}
	}
}

impl<'a> From<&'a OrderComponent> for SharedFields<'a> {
	fn from(component: &'a OrderComponent) -> Self {
		Self {
			user: component.user,
			nonce: component.nonce,
			expires: component.expires,
			fill_deadline: component.fill_deadline,
			input_oracle: component.input_oracle,
			outputs: &component.outputs,
		}
	}
}

/// Combines per-chain escrow commitments with the shared fields.
pub fn multichain_order_id_from_chain_hashes(
	shared: SharedFields<'_>,
	chain_hashes: &[B256],
) -> B256 {
	let mut out = Vec::with_capacity(512);
	out.extend_from_slice(shared.user.as_slice());
	push_u256(&mut out, shared.nonce);
	out.extend_from_slice(&shared.expires.to_be_bytes());
	out.extend_from_slice(&shared.fill_deadline.to_be_bytes());
	out.extend_from_slice(shared.input_oracle.as_slice());
	out.extend_from_slice(concat_hash(chain_hashes).as_slice());
	out.extend_from_slice(&abi_encode_outputs(shared.outputs));
	keccak256(out)
}

/// Identifier shared by every escrow component of a multichain order.
pub fn multichain_order_id(order: &MultichainOrder) -> B256 {
	let chain_hashes: Vec<B256> = order
		.inputs
		.iter()
		.map(|chain| chain_inputs_hash(chain.chain_id, &chain.inputs))
		.collect();
	multichain_order_id_from_chain_hashes(order.into(), &chain_hashes)
}

/// Packs the payload an output oracle attests to once `output` is filled.
pub fn encode_fill_description(
	solver: B256,
	order_id: B256,
	timestamp: u32,
	output: &MandateOutput,
) -> Result<Vec<u8>, EncodingError> {
	let mut out = Vec::with_capacity(168 + output.callback_data.len() + output.context.len());
	out.extend_from_slice(solver.as_slice());
	out.extend_from_slice(order_id.as_slice());
	out.extend_from_slice(&timestamp.to_be_bytes());
	out.extend_from_slice(output.token.as_slice());
	push_u256(&mut out, output.amount);
	out.extend_from_slice(output.recipient.as_slice());
	push_u16_prefixed(&mut out, "callbackData", &output.callback_data)?;
	push_u16_prefixed(&mut out, "context", &output.context)?;
	Ok(out)
}

pub fn fill_description_hash(
	solver: B256,
	order_id: B256,
	timestamp: u32,
	output: &MandateOutput,
) -> Result<B256, EncodingError> {
	Ok(keccak256(encode_fill_description(
		solver, order_id, timestamp, output,
	)?))
}

/// EIP-712 hash of one chain's element in a multichain compact.
pub fn element_hash(
	arbiter: Address,
	chain_id: ChainId,
	locks: &[Lock],
	fill_deadline: u32,
	input_oracle: Address,
	outputs: &[MandateOutput],
) -> B256 {
	abi::Element {
		arbiter,
		chainId: chain_id.to_u256(),
		commitments: locks.iter().map(abi::Lock::from).collect(),
		mandate: abi::Mandate {
			fillDeadline: fill_deadline,
			inputOracle: input_oracle,
			outputs: abi::outputs(outputs),
		},
	}
	.eip712_hash_struct()
}

/// EIP-712 type hash of `MultichainCompact`, including referenced types.
pub fn multichain_compact_typehash() -> B256 {
	keccak256(abi::MultichainCompact::eip712_encode_type().as_bytes())
}

/// EIP-712 struct hash of a multichain compact given its element hashes.
pub fn multichain_compact_hash(
	sponsor: Address,
	nonce: U256,
	expires: u32,
	element_hashes: &[B256],
) -> B256 {
	keccak256(
		(
			multichain_compact_typehash(),
			sponsor,
			nonce,
			U256::from(expires),
			concat_hash(element_hashes),
		)
			.abi_encode_params(),
	)
}

/// Identifier of the order in a container, the key settlers store fills
/// and statuses under.
///
/// A multichain order has one identifier whatever its custody scheme. The
/// resource-lock claim hash that links its components is a separate value,
/// see [`crate::multichain::shared_identifier`].
pub fn order_id(container: &OrderContainer) -> B256 {
	match &container.order {
		Order::Standard(order) => standard_order_id(order, container.input_settler),
		Order::Multichain(order) => multichain_order_id(order),
	}
}

fn concat_hash(hashes: &[B256]) -> B256 {
	let mut out = Vec::with_capacity(hashes.len() * 32);
	for hash in hashes {
		out.extend_from_slice(hash.as_slice());
	}
	keccak256(out)
}
