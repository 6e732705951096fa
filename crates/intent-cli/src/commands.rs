//! Command handlers. Each handler prints JSON to stdout.

use crate::settings::{cache_settings, chain_endpoints, request_timeout};
use alloy_primitives::B256;
use anyhow::{bail, Context, Result};
use futures::StreamExt;
use intent_config::{Config, ConfigLoader};
use intent_order::{decompose as decompose_order, order_id as container_order_id, output_hash};
use intent_order::{shared_identifier, OrderValidator, StaticPolicy, ValidationPolicy};
use intent_settlement::{AlloyChainReader, ProgressTracker, SettlementProgress};
use intent_types::{
	CustodyScheme, Input, Lock, MandateOutput, Order, OrderContainer, OutputContext,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

pub fn validate(config_path: &Path, container_path: &Path) -> Result<()> {
	let config = load_config(config_path)?;
	let container = read_container(container_path)?;
	print_json(&validation_report(&config.policy(), &container))
}

/// Evaluates output contexts for a fill at `timestamp`, optionally by `solver`.
#[derive(Debug, Clone, Copy)]
pub struct FillAt {
	pub timestamp: u32,
	pub solver: Option<B256>,
}

pub fn order_id(
	config_path: &Path,
	container_path: &Path,
	fill_at: Option<FillAt>,
) -> Result<()> {
	let config = load_config(config_path)?;
	let container = read_container(container_path)?;
	print_json(&identifiers(&config.policy(), &container, fill_at)?)
}

pub fn decompose(config_path: &Path, container_path: &Path) -> Result<()> {
	let config = load_config(config_path)?;
	let container = read_container(container_path)?;
	print_json(&components(&config.policy(), &container)?)
}

/// Prints the current progress once, or every `interval` until the order is
/// finalised or the process is interrupted.
pub async fn progress(
	config_path: &Path,
	container_path: &Path,
	fills_path: Option<&Path>,
	interval: Option<Duration>,
) -> Result<()> {
	let config = load_config(config_path)?;
	let container = read_container(container_path)?;
	let fills = match fills_path {
		Some(path) => {
			let contents = std::fs::read_to_string(path)
				.with_context(|| format!("Failed to read fills file: {:?}", path))?;
			parse_fills(&contents)?
		}
		None => HashMap::new(),
	};

	let reader = AlloyChainReader::new(chain_endpoints(&config), request_timeout(&config))
		.context("Failed to create chain reader")?;
	let tracker = ProgressTracker::new(
		Arc::new(reader),
		Arc::new(config.policy()),
		cache_settings(&config),
	);

	let Some(interval) = interval else {
		let progress = tracker.progress(&container, &fills).await;
		return print_json(&snapshot(progress));
	};

	info!("Watching settlement progress every {:?}", interval);
	let updates = tracker.watch(&container, &fills, interval);
	futures::pin_mut!(updates);
	let shutdown = signal::ctrl_c();
	tokio::pin!(shutdown);

	loop {
		tokio::select! {
			update = updates.next() => match update {
				Some(progress) => print_json(&snapshot(progress))?,
				None => break,
			},
			_ = &mut shutdown => {
				info!("Interrupted, stopping watch");
				break;
			}
		}
	}
	Ok(())
}

fn load_config(path: &Path) -> Result<Config> {
	ConfigLoader::from_file(path)
		.with_context(|| format!("Failed to load configuration: {:?}", path))
}

fn read_container(path: &Path) -> Result<OrderContainer> {
	let contents = std::fs::read_to_string(path)
		.with_context(|| format!("Failed to read order container: {:?}", path))?;
	serde_json::from_str(&contents).context("Failed to parse order container")
}

fn print_json(value: &Value) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

fn validation_report(policy: &StaticPolicy, container: &OrderContainer) -> Value {
	let validator = OrderValidator::new(Arc::new(policy.clone()));
	let report: intent_order::ValidationReport = validator.validate_container(container).into();
	json!(report)
}

fn identifiers(
	policy: &StaticPolicy,
	container: &OrderContainer,
	fill_at: Option<FillAt>,
) -> Result<Value> {
	let outputs = container.order.outputs();
	let output_hashes = outputs
		.iter()
		.map(output_hash)
		.collect::<Result<Vec<_>, _>>()
		.context("Failed to hash outputs")?;
	let details: Vec<Value> = outputs
		.iter()
		.zip(&output_hashes)
		.map(|(output, hash)| describe_output(output, *hash, fill_at))
		.collect();

	Ok(json!({
		"orderId": container_order_id(container),
		"custodyScheme": policy.custody_scheme(container.input_settler),
		"outputHashes": output_hashes,
		"outputs": details,
	}))
}

/// Decoded context of one output. An undecodable context is reported, not
/// raised, so the identifiers still print.
fn describe_output(output: &MandateOutput, hash: B256, fill_at: Option<FillAt>) -> Value {
	let mut entry = json!({
		"outputHash": hash,
		"chainId": output.chain_id,
	});
	let context = match OutputContext::decode(&output.context) {
		Ok(context) => context,
		Err(error) => {
			entry["contextError"] = json!(error.to_string());
			return entry;
		}
	};
	entry["context"] = json!(context);
	if let Some(FillAt { timestamp, solver }) = fill_at {
		entry["amountDue"] = json!(context.resolve_amount(output.amount, timestamp));
		if let Some(solver) = solver {
			entry["solverMayFill"] = json!(context.allows_solver(solver, timestamp));
		}
	}
	entry
}

fn components(policy: &StaticPolicy, container: &OrderContainer) -> Result<Value> {
	let Order::Multichain(order) = &container.order else {
		bail!("Only multichain orders can be decomposed");
	};
	let scheme = policy.custody_scheme(container.input_settler);
	let components = decompose_order(order, container.input_settler, policy)?
		.into_iter()
		.map(|component| {
			let mut value = json!(component);
			if scheme == CustodyScheme::ResourceLock {
				value["locks"] = component.inputs.iter().map(lock_details).collect();
			}
			value
		})
		.collect::<Vec<_>>();

	Ok(json!({
		"sharedIdentifier": shared_identifier(order, container.input_settler, scheme),
		"custodyScheme": scheme,
		"components": components,
	}))
}

fn lock_details(input: &Input) -> Value {
	let lock = Lock::from_input(input);
	let reset_period = lock.reset_period();
	json!({
		"lockId": lock.id(),
		"lockTag": lock.lock_tag,
		"token": lock.token,
		"amount": lock.amount,
		"scope": lock.scope(),
		"resetPeriod": reset_period,
		"resetPeriodSecs": reset_period.as_secs(),
		"allocatorId": format!("{:#x}", lock.allocator_id()),
	})
}

/// Parses `{"<outputHash>": "<fillTxHash>", ...}`.
fn parse_fills(contents: &str) -> Result<HashMap<B256, B256>> {
	let raw: HashMap<String, String> =
		serde_json::from_str(contents).context("Fills must be a JSON object of hashes")?;

	raw.into_iter()
		.map(|(output, tx)| {
			let output = output
				.parse::<B256>()
				.with_context(|| format!("Invalid output hash: {}", output))?;
			let tx = tx
				.parse::<B256>()
				.with_context(|| format!("Invalid transaction hash: {}", tx))?;
			Ok((output, tx))
		})
		.collect()
}

fn snapshot(progress: SettlementProgress) -> Value {
	json!({
		"observedAt": chrono::Utc::now().to_rfc3339(),
		"progress": progress,
	})
}
