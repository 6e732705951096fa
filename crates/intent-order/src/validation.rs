//! Order validation pipeline.
//!
//! Validation is a fixed sequence of checks; the first failing check decides
//! the [`RejectReason`]. The validator holds no state beyond the injected
//! [`ValidationPolicy`] and can be shared freely between tasks.
//!
//! Resource lock policy, signatures and nonce replay are not checked here;
//! the settler contracts enforce them when the order is opened.

use alloy_primitives::{Address, B256};
use intent_types::{ChainId, CustodyScheme, Order, OrderContainer, OutputContext};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Deployment-specific allowlists the validator checks orders against.
pub trait ValidationPolicy: Send + Sync {
	/// Input oracles accepted for orders originating on `chain_id`, or `None`
	/// if the chain is unknown. `same_chain_fill` is set when every output
	/// is delivered on `chain_id` itself.
	fn allowed_input_oracles(
		&self,
		chain_id: ChainId,
		same_chain_fill: bool,
	) -> Option<Vec<Address>>;

	/// Output oracles accepted on `chain_id`, or `None` if the chain is unknown.
	fn allowed_output_oracles(&self, chain_id: ChainId) -> Option<Vec<B256>>;

	/// Output settlers accepted on every chain.
	fn allowed_output_settlers(&self) -> Vec<B256>;

	/// Input settlers that hold inputs in resource locks rather than escrow.
	fn resource_lock_settlers(&self) -> Vec<Address>;

	fn custody_scheme(&self, input_settler: Address) -> CustodyScheme {
		if self.resource_lock_settlers().contains(&input_settler) {
			CustodyScheme::ResourceLock
		} else {
			CustodyScheme::Escrow
		}
	}
}

/// Why an order was rejected.
///
/// Rejections are expected outcomes and are returned as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
	FillDeadlineAfterExpires,
	UnknownOriginChain,
	InputOracleNotAllowed,
	NoInputs,
	InputAmountNonPositive,
	NoOutputs,
	UnknownOutputChain,
	/// Never produced: output amounts are unsigned, so every decoded amount
	/// already satisfies `amount >= 0`.
	OutputAmountNonPositive,
	InvalidOutputOracle,
	InvalidOutputSettler,
	OutputTokenZero,
	OutputRecipientZero,
	InvalidOutputContext,
}

impl RejectReason {
	pub fn code(&self) -> &'static str {
		match self {
			RejectReason::FillDeadlineAfterExpires => "FILL_DEADLINE_AFTER_EXPIRES",
			RejectReason::UnknownOriginChain => "UNKNOWN_ORIGIN_CHAIN",
			RejectReason::InputOracleNotAllowed => "INPUT_ORACLE_NOT_ALLOWED",
			RejectReason::NoInputs => "NO_INPUTS",
			RejectReason::InputAmountNonPositive => "INPUT_AMOUNT_NON_POSITIVE",
			RejectReason::NoOutputs => "NO_OUTPUTS",
			RejectReason::UnknownOutputChain => "UNKNOWN_OUTPUT_CHAIN",
			RejectReason::OutputAmountNonPositive => "OUTPUT_AMOUNT_NON_POSITIVE",
			RejectReason::InvalidOutputOracle => "INVALID_OUTPUT_ORACLE",
			RejectReason::InvalidOutputSettler => "INVALID_OUTPUT_SETTLER",
			RejectReason::OutputTokenZero => "OUTPUT_TOKEN_ZERO",
			RejectReason::OutputRecipientZero => "OUTPUT_RECIPIENT_ZERO",
			RejectReason::InvalidOutputContext => "INVALID_OUTPUT_CONTEXT",
		}
	}
}

impl fmt::Display for RejectReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.code())
	}
}

/// Serialisable outcome of a validation run. `reason` is empty when passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
	pub passed: bool,
	pub reason: String,
}

impl From<Result<(), RejectReason>> for ValidationReport {
	fn from(result: Result<(), RejectReason>) -> Self {
		match result {
			Ok(()) => Self {
				passed: true,
				reason: String::new(),
			},
			Err(reason) => Self {
				passed: false,
				reason: reason.code().to_string(),
			},
		}
	}
}

/// Validates orders against a [`ValidationPolicy`].
#[derive(Clone)]
pub struct OrderValidator {
	policy: Arc<dyn ValidationPolicy>,
}

impl OrderValidator {
	pub fn new(policy: Arc<dyn ValidationPolicy>) -> Self {
		Self { policy }
	}

	pub fn validate(&self, order: &Order) -> Result<(), RejectReason> {
		let result = self.run_checks(order);
		if let Err(reason) = result {
			debug!(user = %order.user(), nonce = %order.nonce(), %reason, "Order rejected");
		}
		result
	}

	pub fn validate_container(&self, container: &OrderContainer) -> Result<(), RejectReason> {
		debug!(
			settler = %container.input_settler,
			scheme = %self.policy.custody_scheme(container.input_settler),
			"Validating order container"
		);
		self.validate(&container.order)
	}

	pub fn report(&self, order: &Order) -> ValidationReport {
		self.validate(order).into()
	}

	fn run_checks(&self, order: &Order) -> Result<(), RejectReason> {
		if order.fill_deadline() > order.expires() {
			return Err(RejectReason::FillDeadlineAfterExpires);
		}
		self.check_origin_chains(order)?;
		check_inputs(order)?;
		self.check_outputs(order)
	}

	fn check_origin_chains(&self, order: &Order) -> Result<(), RejectReason> {
		let outputs = order.outputs();
		for chain_id in order.origin_chains() {
			let same_chain_fill =
				!outputs.is_empty() && outputs.iter().all(|output| output.chain_id == chain_id);
			let allowed = self
				.policy
				.allowed_input_oracles(chain_id, same_chain_fill)
				.ok_or(RejectReason::UnknownOriginChain)?;
			if !allowed.contains(&order.input_oracle()) {
				return Err(RejectReason::InputOracleNotAllowed);
			}
		}
		Ok(())
	}

	fn check_outputs(&self, order: &Order) -> Result<(), RejectReason> {
		let outputs = order.outputs();
		if outputs.is_empty() {
			return Err(RejectReason::NoOutputs);
		}

		let settlers = self.policy.allowed_output_settlers();
		for output in outputs {
			let oracles = self
				.policy
				.allowed_output_oracles(output.chain_id)
				.ok_or(RejectReason::UnknownOutputChain)?;
			if output.oracle.is_zero() || !oracles.contains(&output.oracle) {
				return Err(RejectReason::InvalidOutputOracle);
			}
			if output.settler.is_zero() || !settlers.contains(&output.settler) {
				return Err(RejectReason::InvalidOutputSettler);
			}
			if output.token.is_zero() {
				return Err(RejectReason::OutputTokenZero);
			}
			if output.recipient.is_zero() {
				return Err(RejectReason::OutputRecipientZero);
			}
			if let Err(error) = OutputContext::decode(&output.context) {
				debug!(chain_id = %output.chain_id, %error, "Undecodable output context");
				return Err(RejectReason::InvalidOutputContext);
			}
		}
		Ok(())
	}
}

fn check_inputs(order: &Order) -> Result<(), RejectReason> {
	let bundles: Vec<_> = match order {
		Order::Standard(order) => vec![order.inputs.as_slice()],
		Order::Multichain(order) => order
			.inputs
			.iter()
			.map(|chain| chain.inputs.as_slice())
			.collect(),
	};
	if bundles.is_empty() || bundles.iter().any(|inputs| inputs.is_empty()) {
		return Err(RejectReason::NoInputs);
	}
	if bundles
		.iter()
		.flat_map(|inputs| inputs.iter())
		.any(|input| input.amount.is_zero())
	{
		return Err(RejectReason::InputAmountNonPositive);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::policy::{ChainPolicy, StaticPolicy};
	use alloy_primitives::{Bytes, U256};
	use intent_types::{
		ChainInputs, DutchAuction, Input, MandateOutput, MultichainOrder, StandardOrder,
	};

	fn input_oracle() -> Address {
		Address::repeat_byte(0x0a)
	}

	fn direct_filler() -> Address {
		Address::repeat_byte(0xdf)
	}

	fn output_oracle() -> B256 {
		B256::repeat_byte(0x0b)
	}

	fn output_settler() -> B256 {
		B256::repeat_byte(0x0c)
	}

	fn validator() -> OrderValidator {
		let chain = |input_oracles| ChainPolicy {
			input_oracles,
			output_oracles: vec![output_oracle()],
			direct_filler_oracle: Some(direct_filler()),
		};
		let policy = StaticPolicy::new()
			.with_chain(ChainId::BASE, chain(vec![input_oracle()]))
			.with_chain(ChainId::ARBITRUM, chain(vec![input_oracle()]))
			.with_output_settler(output_settler());
		OrderValidator::new(Arc::new(policy))
	}

	fn output(chain_id: ChainId) -> MandateOutput {
		MandateOutput {
			oracle: output_oracle(),
			settler: output_settler(),
			chain_id,
			token: B256::repeat_byte(0x33),
			amount: U256::from(1),
			recipient: B256::repeat_byte(0x44),
			callback_data: Bytes::new(),
			context: Bytes::new(),
		}
	}

	fn order() -> StandardOrder {
		StandardOrder {
			user: Address::repeat_byte(0x55),
			nonce: U256::from(1),
			origin_chain_id: ChainId::BASE,
			expires: 2_000,
			fill_deadline: 1_000,
			input_oracle: input_oracle(),
			inputs: vec![Input::new(U256::from(1), U256::from(1_000_000))],
			outputs: vec![output(ChainId::ARBITRUM)],
		}
	}

	fn check(order: impl Into<Order>) -> Result<(), RejectReason> {
		validator().validate(&order.into())
	}

	#[test]
	fn test_valid_order_passes() {
		assert_eq!(check(order()), Ok(()));
		let report = validator().report(&order().into());
		assert!(report.passed);
		assert_eq!(report.reason, "");
	}

	#[test]
	fn test_deadline_check_runs_first() {
		let mut order = order();
		order.fill_deadline = 3_000;
		order.inputs.clear();
		assert_eq!(check(order), Err(RejectReason::FillDeadlineAfterExpires));
	}

	#[test]
	fn test_fill_deadline_equal_to_expiry_is_accepted() {
		let mut order = order();
		order.fill_deadline = order.expires;
		assert_eq!(check(order), Ok(()));
	}

	#[test]
	fn test_unknown_origin_chain_wins_over_direct_filler() {
		let mut order = order();
		order.origin_chain_id = ChainId::ETHEREUM;
		order.input_oracle = direct_filler();
		order.outputs = vec![output(ChainId::ETHEREUM)];
		assert_eq!(check(order), Err(RejectReason::UnknownOriginChain));
	}

	#[test]
	fn test_direct_filler_accepted_only_for_same_chain_fill() {
		let mut order = order();
		order.input_oracle = direct_filler();
		assert_eq!(check(order.clone()), Err(RejectReason::InputOracleNotAllowed));

		order.outputs = vec![output(ChainId::BASE)];
		assert_eq!(check(order), Ok(()));
	}

	#[test]
	fn test_input_checks() {
		let mut order = order();
		order.inputs[0].amount = U256::ZERO;
		assert_eq!(
			check(order.clone()),
			Err(RejectReason::InputAmountNonPositive)
		);

		order.inputs.clear();
		assert_eq!(check(order), Err(RejectReason::NoInputs));
	}

	#[test]
	fn test_output_checks_in_order() {
		let mut order = order();
		order.outputs.clear();
		assert_eq!(check(order.clone()), Err(RejectReason::NoOutputs));

		let cases: [(fn(&mut MandateOutput), RejectReason); 7] = [
			(
				|o| o.chain_id = ChainId::POLYGON,
				RejectReason::UnknownOutputChain,
			),
			(|o| o.oracle = B256::ZERO, RejectReason::InvalidOutputOracle),
			(
				|o| o.oracle = B256::repeat_byte(0xee),
				RejectReason::InvalidOutputOracle,
			),
			(|o| o.settler = B256::ZERO, RejectReason::InvalidOutputSettler),
			(|o| o.token = B256::ZERO, RejectReason::OutputTokenZero),
			(
				|o| o.recipient = B256::ZERO,
				RejectReason::OutputRecipientZero,
			),
			(
				|o| o.context = Bytes::from(vec![0x07]),
				RejectReason::InvalidOutputContext,
			),
		];
		for (mutate, expected) in cases {
			let mut out = output(ChainId::ARBITRUM);
			mutate(&mut out);
			order.outputs = vec![out];
			assert_eq!(check(order.clone()), Err(expected));
		}
	}

	#[test]
	fn test_output_context_must_decode() {
		let dutch = OutputContext::Dutch(DutchAuction {
			start_time: 1_000,
			stop_time: 1_600,
			slope: U256::from(5),
		})
		.encode();

		let mut order = order();
		order.outputs[0].context = dutch.clone();
		assert_eq!(check(order.clone()), Ok(()));

		order.outputs[0].context = Bytes::from(dutch[..40].to_vec());
		assert_eq!(check(order.clone()), Err(RejectReason::InvalidOutputContext));
		assert_eq!(
			RejectReason::InvalidOutputContext.code(),
			"INVALID_OUTPUT_CONTEXT"
		);
	}

	#[test]
	fn test_zero_output_amount_is_accepted() {
		let mut order = order();
		order.outputs[0].amount = U256::ZERO;
		assert_eq!(check(order), Ok(()));
	}

	#[test]
	fn test_multichain_checks_every_chain() {
		let multichain = MultichainOrder {
			user: Address::repeat_byte(0x55),
			nonce: U256::from(1),
			expires: 2_000,
			fill_deadline: 1_000,
			input_oracle: input_oracle(),
			outputs: vec![output(ChainId::ARBITRUM)],
			inputs: vec![
				ChainInputs {
					chain_id: ChainId::BASE,
					inputs: vec![Input::new(U256::from(1), U256::from(5))],
				},
				ChainInputs {
					chain_id: ChainId::ARBITRUM,
					inputs: vec![Input::new(U256::from(2), U256::from(5))],
				},
			],
		};
		assert_eq!(check(multichain.clone()), Ok(()));

		let mut unknown = multichain.clone();
		unknown.inputs[1].chain_id = ChainId::OPTIMISM;
		assert_eq!(check(unknown), Err(RejectReason::UnknownOriginChain));

		let mut empty_bundle = multichain.clone();
		empty_bundle.inputs[1].inputs.clear();
		assert_eq!(check(empty_bundle), Err(RejectReason::NoInputs));

		let mut no_chains = multichain;
		no_chains.inputs.clear();
		assert_eq!(check(no_chains), Err(RejectReason::NoInputs));
	}

	#[test]
	fn test_reason_serializes_as_code() {
		let json = serde_json::to_string(&RejectReason::FillDeadlineAfterExpires).unwrap();
		assert_eq!(json, "\"FILL_DEADLINE_AFTER_EXPIRES\"");
		assert_eq!(
			RejectReason::OutputRecipientZero.to_string(),
			"OUTPUT_RECIPIENT_ZERO"
		);
	}
}
