use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(about = "Stable type identifier tooling")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Verbose logging (overridden by TESSERA_LOG)
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Generate identifiers unused by any linked type
	New {
		/// Number of identifiers to generate
		#[arg(long, short = 'n', default_value_t = 1)]
		count: usize,
	},
	/// Render an unsigned integer as quintet text
	Encode {
		/// Integer to encode (decimal, or hex with a 0x prefix)
		value: String,

		/// Integer width in bits
		#[arg(long, short = 'w', value_enum, default_value_t = Width::W64)]
		width: Width,
	},
	/// Parse quintet text back into its integer
	Decode {
		/// Quintet text; the group count selects the width
		text: String,
	},
	/// List identifiers declared by linked types
	Types,
	/// Validate a coding configuration file
	CheckConfig {
		/// Path to the TOML file
		#[arg(value_name = "PATH")]
		path: PathBuf,
	},
}

/// Integer widths the codec renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Width {
	#[value(name = "16")]
	W16,
	#[value(name = "32")]
	W32,
	#[value(name = "64")]
	W64,
	#[value(name = "128")]
	W128,
}

impl Width {
	pub fn bits(self) -> u32 {
		match self {
			Self::W16 => 16,
			Self::W32 => 32,
			Self::W64 => 64,
			Self::W128 => 128,
		}
	}

	/// Width implied by a number of `-`-separated groups.
	pub fn from_groups(groups: usize) -> Option<Self> {
		match groups {
			1 => Some(Self::W16),
			2 => Some(Self::W32),
			4 => Some(Self::W64),
			8 => Some(Self::W128),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn command_definition_is_consistent() {
		Cli::command().debug_assert();
	}

	#[test]
	fn encode_width_defaults_to_identifier_width() {
		let cli = Cli::try_parse_from(["tessera", "encode", "42"]).unwrap();
		assert!(matches!(cli.command, Command::Encode { width: Width::W64, .. }));

		let cli = Cli::try_parse_from(["tessera", "-v", "encode", "42", "--width", "16"]).unwrap();
		assert!(cli.verbose);
		assert!(matches!(cli.command, Command::Encode { width: Width::W16, .. }));
	}

	#[test]
	fn unsupported_width_is_rejected() {
		assert!(Cli::try_parse_from(["tessera", "encode", "42", "--width", "8"]).is_err());
	}

	#[test]
	fn group_counts_map_to_widths() {
		assert_eq!(Width::from_groups(4), Some(Width::W64));
		assert_eq!(Width::from_groups(3), None);
	}
}
