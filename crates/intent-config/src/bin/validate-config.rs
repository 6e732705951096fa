//! Configuration validation utility
//!
//! Usage: cargo run -p intent-config --bin validate-config config/example.toml

use std::env;
use std::process;

use intent_config::ConfigLoader;

fn main() {
	let args: Vec<String> = env::args().collect();

	if args.len() != 2 {
		eprintln!("Usage: {} <config-file>", args[0]);
		process::exit(1);
	}

	let config_path = &args[1];

	println!("Validating configuration file: {}", config_path);

	match ConfigLoader::from_file(config_path) {
		Ok(config) => {
			let mut chains: Vec<_> = config.chains.iter().collect();
			chains.sort_by_key(|(chain_id, _)| **chain_id);

			println!("✅ Configuration is valid!");
			println!("Output settlers: {}", config.settlers.output.len());
			println!("Resource lock settlers: {}", config.settlers.resource_lock.len());
			println!("Chains configured: {}", chains.len());
			for (chain_id, chain) in chains {
				println!(
					"  {} ({}): {} input oracles, {} output oracles",
					chain_id,
					chain.name,
					chain.input_oracles.len(),
					chain.output_oracles.len()
				);
			}
			println!("Request timeout: {}ms", config.reader.request_timeout_ms);
		}
		Err(e) => {
			eprintln!("❌ Configuration validation failed:");
			eprintln!("{}", e);
			process::exit(1);
		}
	}
}
