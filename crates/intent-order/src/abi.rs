//! Solidity struct bindings shared by the encoder and the decomposer.
//!
//! Struct and field names are part of the EIP-712 type strings and must
//! match the contracts exactly.

use alloy_sol_types::sol;
use intent_types as types;

sol! {
	/// Output leg as the settlers ABI-encode it.
	struct MandateOutput {
		bytes32 oracle;
		bytes32 settler;
		uint256 chainId;
		bytes32 token;
		uint256 amount;
		bytes32 recipient;
		bytes callbackData;
		bytes context;
	}

	/// Resource lock commitment.
	struct Lock {
		bytes12 lockTag;
		address token;
		uint256 amount;
	}

	/// Destination-side terms bound into a resource-lock claim.
	struct Mandate {
		uint32 fillDeadline;
		address inputOracle;
		MandateOutput[] outputs;
	}

	/// Per-chain element of a multichain compact.
	struct Element {
		address arbiter;
		uint256 chainId;
		Lock[] commitments;
		Mandate mandate;
	}

	struct MultichainCompact {
		address sponsor;
		uint256 nonce;
		uint256 expires;
		Element[] elements;
	}
}

impl From<&types::MandateOutput> for MandateOutput {
	fn from(output: &types::MandateOutput) -> Self {
		Self {
			oracle: output.oracle,
			settler: output.settler,
			chainId: output.chain_id.to_u256(),
			token: output.token,
			amount: output.amount,
			recipient: output.recipient,
			callbackData: output.callback_data.clone(),
			context: output.context.clone(),
		}
	}
}

impl From<&types::Lock> for Lock {
	fn from(lock: &types::Lock) -> Self {
		Self {
			lockTag: lock.lock_tag,
			token: lock.token,
			amount: lock.amount,
		}
	}
}

pub(crate) fn outputs(outputs: &[types::MandateOutput]) -> Vec<MandateOutput> {
	outputs.iter().map(MandateOutput::from).collect()
}
