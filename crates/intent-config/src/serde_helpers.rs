//! Serde helpers for chain-keyed maps.
//!
//! TOML and JSON only allow string keys, so chain ids are written as decimal
//! strings and parsed back into [`ChainId`].

use intent_types::ChainId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Deserializes a `HashMap<ChainId, T>` from a map with string keys.
pub fn deserialize_chain_id_map<'de, D, T>(
	deserializer: D,
) -> Result<HashMap<ChainId, T>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	let map = HashMap::<String, T>::deserialize(deserializer)?;

	map.into_iter()
		.map(|(k, v)| {
			k.parse::<ChainId>()
				.map(|id| (id, v))
				.map_err(|_| serde::de::Error::custom(format!("Invalid chain ID: {}", k)))
		})
		.collect()
}

/// Serializes a `HashMap<ChainId, T>` with decimal string keys, in chain id
/// order.
pub fn serialize_chain_id_map<S, T>(
	map: &HashMap<ChainId, T>,
	serializer: S,
) -> Result<S::Ok, S::Error>
where
	S: Serializer,
	T: Serialize,
{
	let ordered: BTreeMap<ChainId, &T> = map.iter().map(|(k, v)| (*k, v)).collect();
	let string_map: Vec<(String, &T)> = ordered
		.into_iter()
		.map(|(k, v)| (k.to_string(), v))
		.collect();

	serializer.collect_map(string_map)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug, Deserialize, Serialize)]
	struct TestStruct {
		#[serde(
			deserialize_with = "deserialize_chain_id_map",
			serialize_with = "serialize_chain_id_map"
		)]
		endpoints: HashMap<ChainId, String>,
	}

	#[test]
	fn test_deserialize_chain_id_map() {
		let toml = r#"
            [endpoints]
            8453 = "https://base.example.com"
            42161 = "https://arb.example.com"
        "#;

		let result: TestStruct = toml::from_str(toml).unwrap();
		assert_eq!(
			result.endpoints.get(&ChainId::BASE).unwrap(),
			"https://base.example.com"
		);
		assert_eq!(
			result.endpoints.get(&ChainId::ARBITRUM).unwrap(),
			"https://arb.example.com"
		);
	}

	#[test]
	fn test_rejects_non_numeric_chain_key() {
		let toml = r#"
            [endpoints]
            base = "https://base.example.com"
        "#;

		let error = toml::from_str::<TestStruct>(toml).unwrap_err();
		assert!(error.to_string().contains("Invalid chain ID: base"));
	}

	#[test]
	fn test_serialize_chain_id_map() {
		let mut endpoints = HashMap::new();
		endpoints.insert(ChainId::ARBITRUM, "arb".to_string());
		endpoints.insert(ChainId::ETHEREUM, "eth".to_string());

		let json = serde_json::to_string(&TestStruct { endpoints }).unwrap();
		assert_eq!(json, r#"{"endpoints":{"1":"eth","42161":"arb"}}"#);

		let parsed: TestStruct = serde_json::from_str(&json).unwrap();
		assert_eq!(parsed.endpoints.len(), 2);
	}
}
