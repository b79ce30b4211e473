//! `tessera`: generate, encode and decode stable type identifiers.

use clap::Parser;
use tessera_type_registry::TypeIdentityRegistry;

mod cli;
mod commands;

use cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	match cli.command {
		Command::New { count } => {
			for identifier in commands::fresh(&TypeIdentityRegistry::global(), count) {
				println!("{identifier}");
			}
		}
		Command::Encode { value, width } => println!("{}", commands::encode(&value, width)?),
		Command::Decode { text } => println!("{}", commands::decode(&text)?),
		Command::Types => {
			for line in commands::types(&TypeIdentityRegistry::global()) {
				println!("{line}");
			}
		}
		Command::CheckConfig { path } => {
			for line in commands::check_config(&path)? {
				println!("{line}");
			}
		}
	}
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("TESSERA_LOG").unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("tessera=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose)
		.init();
}
