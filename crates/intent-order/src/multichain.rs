//! Decomposition of multichain orders into per-chain components.
//!
//! Each origin chain contributes one commitment: the escrow input hash or,
//! for resource locks, the EIP-712 element hash. A component carries its own
//! inputs plus the commitments of every sibling chain, which is enough for a
//! verifier on its chain to rebuild the identifier shared by all components.

use crate::encoding::{
	chain_inputs_hash, element_hash, multichain_compact_hash,
	multichain_order_id_from_chain_hashes, SharedFields,
};
use crate::validation::ValidationPolicy;
use alloy_primitives::{Address, B256};
use intent_types::{ChainId, CustodyScheme, Input, Lock, MultichainOrder, OrderComponent};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecomposeError {
	#[error("Multichain order has no input chains")]
	NoInputChains,
	#[error("Chain index {index} is out of range for {chains} chains")]
	ChainIndexOutOfRange { index: u64, chains: usize },
}

/// Commitment one chain contributes to the shared identifier.
pub fn chain_commitment(
	shared: SharedFields<'_>,
	chain_id: ChainId,
	inputs: &[Input],
	input_settler: Address,
	scheme: CustodyScheme,
) -> B256 {
	match scheme {
		CustodyScheme::Escrow => chain_inputs_hash(chain_id, inputs),
		CustodyScheme::ResourceLock => {
			let locks: Vec<Lock> = inputs.iter().map(Lock::from_input).collect();
			element_hash(
				input_settler,
				chain_id,
				&locks,
				shared.fill_deadline,
				shared.input_oracle,
				shared.outputs,
			)
		}
	}
}

/// Commitments of every origin chain, in input order.
pub fn chain_commitments(
	order: &MultichainOrder,
	input_settler: Address,
	scheme: CustodyScheme,
) -> Vec<B256> {
	order
		.inputs
		.iter()
		.map(|chain| {
			chain_commitment(
				order.into(),
				chain.chain_id,
				&chain.inputs,
				input_settler,
				scheme,
			)
		})
		.collect()
}

fn combine(shared: SharedFields<'_>, commitments: &[B256], scheme: CustodyScheme) -> B256 {
	match scheme {
		CustodyScheme::Escrow => multichain_order_id_from_chain_hashes(shared, commitments),
		CustodyScheme::ResourceLock => {
			multichain_compact_hash(shared.user, shared.nonce, shared.expires, commitments)
		}
	}
}

/// Identifier shared by every component: the multichain order id under
/// escrow, the multichain compact hash under resource locks.
pub fn shared_identifier(
	order: &MultichainOrder,
	input_settler: Address,
	scheme: CustodyScheme,
) -> B256 {
	combine(
		order.into(),
		&chain_commitments(order, input_settler, scheme),
		scheme,
	)
}

/// Splits `order` into one component per origin chain, in input order. The
/// custody scheme follows from `policy` and the input settler.
///
/// # Panics
///
/// Panics if a component does not reconstruct the shared identifier. That
/// can only happen if the encodings here disagree with each other, and any
/// identifier produced afterwards would be wrong.
pub fn decompose(
	order: &MultichainOrder,
	input_settler: Address,
	policy: &dyn ValidationPolicy,
) -> Result<Vec<OrderComponent>, DecomposeError> {
	let scheme = policy.custody_scheme(input_settler);
	let first_chain = order
		.inputs
		.first()
		.map(|chain| chain.chain_id)
		.ok_or(DecomposeError::NoInputChains)?;

	let commitments = chain_commitments(order, input_settler, scheme);
	let expected = combine(order.into(), &commitments, scheme);

	let mut components = Vec::with_capacity(order.inputs.len());
	for (index, chain) in order.inputs.iter().enumerate() {
		let chain_index = u64::try_from(index).map_err(|_| DecomposeError::ChainIndexOutOfRange {
			index: u64::MAX,
			chains: order.inputs.len(),
		})?;
		let additional_chains = commitments
			.iter()
			.enumerate()
			.filter(|(i, _)| *i != index)
			.map(|(_, hash)| *hash)
			.collect();
		// resource-lock components are all notarised against the first chain
		let chain_id_field = match scheme {
			CustodyScheme::Escrow => chain.chain_id,
			CustodyScheme::ResourceLock => first_chain,
		};

		let component = OrderComponent {
			user: order.user,
			nonce: order.nonce,
			chain_id_field,
			chain_index,
			expires: order.expires,
			fill_deadline: order.fill_deadline,
			input_oracle: order.input_oracle,
			inputs: chain.inputs.clone(),
			outputs: order.outputs.clone(),
			additional_chains,
		};

		let rebuilt = reconstruct_identifier(&component, chain.chain_id, input_settler, scheme)?;
		assert_eq!(
			rebuilt, expected,
			"component {index} on chain {} does not reconstruct the shared identifier",
			chain.chain_id
		);
		components.push(component);
	}

	debug!(
		user = %order.user,
		chains = components.len(),
		%scheme,
		identifier = %expected,
		"Decomposed multichain order"
	);
	Ok(components)
}

/// Rebuilds the shared identifier from a single component, as the verifier
/// on `chain_id` does: the component's own commitment is recomputed and
/// inserted at `chain_index` among its sibling commitments.
pub fn reconstruct_identifier(
	component: &OrderComponent,
	chain_id: ChainId,
	input_settler: Address,
	scheme: CustodyScheme,
) -> Result<B256, DecomposeError> {
	let chains = component.additional_chains.len() + 1;
	let index = usize::try_from(component.chain_index)
		.ok()
		.filter(|index| *index < chains)
		.ok_or(DecomposeError::ChainIndexOutOfRange {
			index: component.chain_index,
			chains,
		})?;

	let shared = SharedFields::from(component);
	let own = chain_commitment(shared, chain_id, &component.inputs, input_settler, scheme);
	let mut commitments = component.additional_chains.clone();
	commitments.insert(index, own);
	Ok(combine(shared, &commitments, scheme))
}
