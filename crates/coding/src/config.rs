//! Coding configuration loaded from TOML.
//!
//! ```toml
//! [identity_placement]
//! kind = "reserved_field"
//! key = "@type"
//!
//! [variant_placement]
//! kind = "wrapper"
//! type_key = "kind"
//! data_key = "value"
//! ```
//!
//! Omitted sections keep their defaults: `$type` reserved field for identities, `{type, data}`
//! wrapper for variants.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tessera_type_registry::TypeIdentityRegistry;

use crate::identity::IdentityDiscriminatorPlugin;
use crate::placement::Placement;
use crate::variant::{TypeDiscriminator, VariantDiscriminatorPlugin};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid coding config: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("invalid {field}: {reason}")]
	Placement { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodingConfig {
	pub identity_placement: Placement,
	pub variant_placement: Placement,
}

impl Default for CodingConfig {
	fn default() -> Self {
		Self {
			identity_placement: Placement::reserved_field(),
			variant_placement: Placement::wrapper(),
		}
	}
}

impl CodingConfig {
	pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(text)?;
		config.check()?;
		Ok(config)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml(&text)
	}

	fn check(&self) -> Result<(), ConfigError> {
		for (field, placement) in [("identity_placement", &self.identity_placement), ("variant_placement", &self.variant_placement)] {
			placement.check().map_err(|reason| ConfigError::Placement { field, reason })?;
		}
		Ok(())
	}

	pub fn identity_plugin(&self, registry: Arc<TypeIdentityRegistry>) -> IdentityDiscriminatorPlugin {
		IdentityDiscriminatorPlugin::new(registry).with_placement(self.identity_placement.clone())
	}

	pub fn variant_plugin<D: TypeDiscriminator>(&self) -> VariantDiscriminatorPlugin<D> {
		VariantDiscriminatorPlugin::with_placement(self.variant_placement.clone())
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_config_uses_defaults() {
		assert_eq!(CodingConfig::from_toml("").unwrap(), CodingConfig::default());
	}

	#[test]
	fn placements_parse_with_partial_keys() {
		let config = CodingConfig::from_toml(
			r#"
			[identity_placement]
			kind = "reserved_field"
			key = "@type"

			[variant_placement]
			kind = "wrapper"
			type_key = "kind"
			"#,
		)
		.unwrap();
		assert_eq!(config.identity_placement, Placement::ReservedField { key: "@type".into() });
		assert_eq!(
			config.variant_placement,
			Placement::Wrapper {
				type_key: "kind".into(),
				data_key: "data".into(),
			}
		);
	}

	#[test]
	fn unknown_fields_are_rejected() {
		assert!(matches!(CodingConfig::from_toml("compression = true"), Err(ConfigError::Parse(_))));
	}

	#[test]
	fn shadowing_keys_are_rejected() {
		let err = CodingConfig::from_toml(
			r#"
			[variant_placement]
			kind = "wrapper"
			type_key = "x"
			data_key = "x"
			"#,
		)
		.unwrap_err();
		assert!(matches!(err, ConfigError::Placement { field: "variant_placement", .. }));
	}

	#[test]
	fn missing_file_reports_path() {
		let err = CodingConfig::load("/nonexistent/tessera.toml").unwrap_err();
		assert!(err.to_string().contains("/nonexistent/tessera.toml"));
	}
}
