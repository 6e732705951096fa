//! Order model.
//!
//! Orders come in two shapes: a [`StandardOrder`] whose inputs all live on one
//! origin chain, and a [`MultichainOrder`] whose inputs are partitioned across
//! several origin chains. Both share the same output legs. The [`Order`] enum
//! tags the two shapes explicitly so consumers match on the variant instead of
//! probing for fields.

use crate::ChainId;
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// An output leg of an order.
///
/// IMPORTANT: Field order mirrors the on-chain `MandateOutput` struct and is
/// part of every hash derived from it.
///
/// `oracle`, `settler`, `token` and `recipient` are 32-byte identifiers so that
/// destinations with addresses of any width fit uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MandateOutput {
	/// Oracle on the destination chain that attests to the fill.
	pub oracle: B256,
	/// Output settler contract on the destination chain.
	pub settler: B256,
	/// Destination chain id.
	pub chain_id: ChainId,
	/// Token to deliver.
	pub token: B256,
	/// Amount to deliver.
	pub amount: U256,
	/// Receiver of the delivered tokens.
	pub recipient: B256,
	/// Data passed to the recipient after delivery.
	#[serde(default)]
	pub callback_data: Bytes,
	/// Auction and exclusivity parameters, see [`crate::OutputContext`].
	#[serde(default)]
	pub context: Bytes,
}

/// An input committed by the user on an origin chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
	/// Token identifier. For resource locks this packs the lock tag and the
	/// token address, see [`crate::Lock`].
	pub token_id: U256,
	/// Committed amount.
	pub amount: U256,
}

impl Input {
	pub fn new(token_id: U256, amount: U256) -> Self {
		Self { token_id, amount }
	}
}

/// Order whose inputs all live on a single origin chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardOrder {
	pub user: Address,
	pub nonce: U256,
	pub origin_chain_id: ChainId,
	/// Timestamp after which the order can no longer be claimed.
	pub expires: u32,
	/// Timestamp after which outputs can no longer be filled.
	pub fill_deadline: u32,
	/// Oracle on the origin chain trusted to relay fill proofs.
	pub input_oracle: Address,
	pub inputs: Vec<Input>,
	pub outputs: Vec<MandateOutput>,
}

/// The inputs a multichain order commits on one origin chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInputs {
	pub chain_id: ChainId,
	pub inputs: Vec<Input>,
}

/// Order whose inputs are partitioned across several origin chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultichainOrder {
	pub user: Address,
	pub nonce: U256,
	pub expires: u32,
	pub fill_deadline: u32,
	pub input_oracle: Address,
	pub outputs: Vec<MandateOutput>,
	pub inputs: Vec<ChainInputs>,
}

impl MultichainOrder {
	/// Origin chains in input order.
	pub fn origin_chains(&self) -> Vec<ChainId> {
		self.inputs.iter().map(|chain| chain.chain_id).collect()
	}

	/// Inputs committed on the given chain, if the order touches it.
	pub fn inputs_on(&self, chain_id: ChainId) -> Option<&[Input]> {
		self.inputs
			.iter()
			.find(|chain| chain.chain_id == chain_id)
			.map(|chain| chain.inputs.as_slice())
	}
}

/// Per-chain signable unit of a multichain order.
///
/// Components are derived by decomposition and never persisted on their own.
/// `additional_chains` holds the commitments of every sibling chain so that a
/// verifier on one chain can rebuild the shared order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderComponent {
	pub user: Address,
	pub nonce: U256,
	pub chain_id_field: ChainId,
	pub chain_index: u64,
	pub expires: u32,
	pub fill_deadline: u32,
	pub input_oracle: Address,
	/// Inputs committed on this component's chain only.
	pub inputs: Vec<Input>,
	/// The full, shared set of outputs.
	pub outputs: Vec<MandateOutput>,
	pub additional_chains: Vec<B256>,
}

/// An order of either shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Order {
	Standard(StandardOrder),
	Multichain(MultichainOrder),
}

impl Order {
	pub fn user(&self) -> Address {
		match self {
			Order::Standard(order) => order.user,
			Order::Multichain(order) => order.user,
		}
	}

	pub fn nonce(&self) -> U256 {
		match self {
			Order::Standard(order) => order.nonce,
			Order::Multichain(order) => order.nonce,
		}
	}

	pub fn expires(&self) -> u32 {
		match self {
			Order::Standard(order) => order.expires,
			Order::Multichain(order) => order.expires,
		}
	}

	pub fn fill_deadline(&self) -> u32 {
		match self {
			Order::Standard(order) => order.fill_deadline,
			Order::Multichain(order) => order.fill_deadline,
		}
	}

	pub fn input_oracle(&self) -> Address {
		match self {
			Order::Standard(order) => order.input_oracle,
			Order::Multichain(order) => order.input_oracle,
		}
	}

	pub fn outputs(&self) -> &[MandateOutput] {
		match self {
			Order::Standard(order) => &order.outputs,
			Order::Multichain(order) => &order.outputs,
		}
	}

	/// Origin chains the order commits inputs on, in input order.
	pub fn origin_chains(&self) -> Vec<ChainId> {
		match self {
			Order::Standard(order) => vec![order.origin_chain_id],
			Order::Multichain(order) => order.origin_chains(),
		}
	}

	/// Inputs committed on the given origin chain.
	pub fn inputs_on(&self, chain_id: ChainId) -> Option<&[Input]> {
		match self {
			Order::Standard(order) if order.origin_chain_id == chain_id => Some(&order.inputs),
			Order::Standard(_) => None,
			Order::Multichain(order) => order.inputs_on(chain_id),
		}
	}
}

impl From<StandardOrder> for Order {
	fn from(order: StandardOrder) -> Self {
		Order::Standard(order)
	}
}

impl From<MultichainOrder> for Order {
	fn from(order: MultichainOrder) -> Self {
		Order::Multichain(order)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn multichain_order() -> MultichainOrder {
		MultichainOrder {
			user: Address::repeat_byte(0x01),
			nonce: U256::from(7),
			expires: 2_000,
			fill_deadline: 1_000,
			input_oracle: Address::repeat_byte(0x02),
			outputs: vec![],
			inputs: vec![
				ChainInputs {
					chain_id: ChainId::BASE,
					inputs: vec![Input::new(U256::from(1), U256::from(10))],
				},
				ChainInputs {
					chain_id: ChainId::ARBITRUM,
					inputs: vec![Input::new(U256::from(2), U256::from(20))],
				},
			],
		}
	}

	#[test]
	fn test_origin_chains_keep_input_order() {
		let order = Order::from(multichain_order());
		assert_eq!(
			order.origin_chains(),
			vec![ChainId::BASE, ChainId::ARBITRUM]
		);
		assert_eq!(
			order.inputs_on(ChainId::ARBITRUM).unwrap()[0].amount,
			U256::from(20)
		);
		assert!(order.inputs_on(ChainId::ETHEREUM).is_none());
	}

	#[test]
	fn test_order_tagged_serialization() {
		let order = Order::from(multichain_order());
		let json = serde_json::to_value(&order).unwrap();
		assert_eq!(json["type"], "multichain");
		assert_eq!(json["fillDeadline"], 1_000);

		let parsed: Order = serde_json::from_value(json).unwrap();
		assert_eq!(parsed, order);
	}

	#[test]
	fn test_output_defaults_empty_bytes() {
		let json = serde_json::json!({
			"oracle": B256::repeat_byte(0x11),
			"settler": B256::repeat_byte(0x22),
			"chainId": 42161,
			"token": B256::repeat_byte(0x33),
			"amount": "0x1",
			"recipient": B256::repeat_byte(0x44),
		});

		let output: MandateOutput = serde_json::from_value(json).unwrap();
		assert!(output.callback_data.is_empty());
		assert!(output.context.is_empty());
		assert_eq!(output.chain_id, ChainId::ARBITRUM);
	}
}
