use alloy_primitives::B256;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod settings;

#[derive(Parser)]
#[command(name = "intent")]
#[command(about = "Cross-chain intent order tooling", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[arg(
		short,
		long,
		value_name = "FILE",
		env = "INTENT_CONFIG",
		default_value = "config/local.toml"
	)]
	config: PathBuf,

	#[arg(long, env = "INTENT_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[derive(Subcommand)]
enum Commands {
	/// Validate an order container against the deployment policy
	Validate {
		/// Order container JSON
		container: PathBuf,
	},
	/// Print the order identifier, output hashes and decoded output contexts
	OrderId {
		container: PathBuf,
		/// Unix timestamp to evaluate auction amounts at
		#[arg(long)]
		at: Option<u32>,
		/// Solver to check exclusivity for, as bytes32; requires --at
		#[arg(long, requires = "at")]
		solver: Option<B256>,
	},
	/// Split a multichain order into per-chain components
	Decompose { container: PathBuf },
	/// Report settlement progress of a submitted order
	Progress {
		container: PathBuf,
		/// JSON object mapping output hashes to fill transaction hashes
		#[arg(long, value_name = "FILE")]
		fills: Option<PathBuf>,
		/// Keep polling until the order is finalised
		#[arg(long)]
		watch: bool,
		#[arg(long, default_value_t = 12)]
		interval_secs: u64,
	},
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level)?;

	match cli.command {
		Commands::Validate { container } => commands::validate(&cli.config, &container),
		Commands::OrderId {
			container,
			at,
			solver,
		} => {
			let fill_at = at.map(|timestamp| commands::FillAt { timestamp, solver });
			commands::order_id(&cli.config, &container, fill_at)
		}
		Commands::Decompose { container } => commands::decompose(&cli.config, &container),
		Commands::Progress {
			container,
			fills,
			watch,
			interval_secs,
		} => {
			commands::progress(
				&cli.config,
				&container,
				fills.as_deref(),
				watch.then(|| std::time::Duration::from_secs(interval_secs)),
			)
			.await
		}
	}
}

/// Logs go to stderr; stdout carries command output only.
fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	Ok(())
}
