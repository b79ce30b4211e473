//! Subcommand implementations. Each returns its output lines so `main` only prints.

use std::path::Path;

use anyhow::{Context, Result};
use tessera_coding::{CodingConfig, Placement};
use tessera_identity::{StableIdentifier, quintet};
use tessera_type_registry::TypeIdentityRegistry;
use tracing::{debug, warn};

use crate::cli::Width;

/// Distinct identifiers unused by any type `registry` knows after its scan.
pub fn fresh(registry: &TypeIdentityRegistry, count: usize) -> Vec<StableIdentifier> {
	let mut fresh = Vec::with_capacity(count);
	while fresh.len() < count {
		let candidate = registry.fresh_identifier();
		if !fresh.contains(&candidate) {
			fresh.push(candidate);
		}
	}
	debug!(count, registry = registry.label(), "generated identifiers");
	fresh
}

pub fn encode(value: &str, width: Width) -> Result<String> {
	let n = parse_integer(value)?;
	let overflow = || format!("{n} does not fit in {} bits", width.bits());
	Ok(match width {
		Width::W16 => quintet::encode(u16::try_from(n).with_context(overflow)?),
		Width::W32 => quintet::encode(u32::try_from(n).with_context(overflow)?),
		Width::W64 => quintet::encode(u64::try_from(n).with_context(overflow)?),
		Width::W128 => quintet::encode(n),
	})
}

pub fn decode(text: &str) -> Result<u128> {
	let groups = text.split('-').count();
	let width = Width::from_groups(groups).with_context(|| format!("`{text}` has {groups} groups; expected 1, 2, 4 or 8"))?;
	Ok(match width {
		Width::W16 => quintet::decode::<u16>(text)?.into(),
		Width::W32 => quintet::decode::<u32>(text)?.into(),
		Width::W64 => quintet::decode::<u64>(text)?.into(),
		Width::W128 => quintet::decode::<u128>(text)?,
	})
}

/// One line per registered type, after a full scan. Scan rejections are logged.
pub fn types(registry: &TypeIdentityRegistry) -> Vec<String> {
	registry.index_all_types_if_needed();
	for rejection in registry.scan_rejections() {
		warn!(%rejection, "type skipped during scan");
	}
	registry
		.entries()
		.into_iter()
		.map(|(identifier, handle)| format!("{identifier}  {handle}"))
		.collect()
}

pub fn check_config(path: &Path) -> Result<Vec<String>> {
	let config = CodingConfig::load(path).with_context(|| format!("checking {}", path.display()))?;
	Ok(vec![
		format!("identity placement: {}", describe(&config.identity_placement)),
		format!("variant placement: {}", describe(&config.variant_placement)),
	])
}

fn describe(placement: &Placement) -> String {
	match placement {
		Placement::ReservedField { key } => format!("reserved field `{key}`"),
		Placement::Wrapper { type_key, data_key } => format!("wrapper `{type_key}` / `{data_key}`"),
	}
}

fn parse_integer(text: &str) -> Result<u128> {
	match text.strip_prefix("0x") {
		Some(hex) => u128::from_str_radix(hex, 16),
		None => text.parse(),
	}
	.with_context(|| format!("`{text}` is not an unsigned integer"))
}

#[cfg(test)]
mod tests;
