use pretty_assertions::assert_eq;
use tessera_type_registry::{StableIdentity, TypeIdentityRegistry};

use super::*;

#[test]
fn encode_renders_each_width() {
	assert_eq!(encode("42", Width::W16).unwrap(), "pobab");
	assert_eq!(encode("0x2a", Width::W64).unwrap(), "babab-babab-babab-pobab");
	assert_eq!(encode("42", Width::W32).unwrap(), "babab-pobab");
}

#[test]
fn encode_rejects_overflow_and_garbage() {
	assert!(encode("65536", Width::W16).is_err());
	assert!(encode("-1", Width::W64).is_err());
	assert!(encode("forty-two", Width::W64).is_err());
}

/// The group count picks the width, so text decodes without flags.
#[test]
fn decode_infers_width() {
	assert_eq!(decode("pobab").unwrap(), 42);
	assert_eq!(decode("babab-babab-babab-pobab").unwrap(), 42);
	assert_eq!(decode(&encode(&u128::MAX.to_string(), Width::W128).unwrap()).unwrap(), u128::MAX);
	assert!(decode("pobab-pobab-pobab").is_err());
	assert!(decode("aaaa-aaaa-aaaa-aaaa").is_err());
}

#[test]
fn fresh_identifiers_avoid_known_types() {
	let registry = TypeIdentityRegistry::new("cli");
	registry.register(String::type_handle()).unwrap();
	let ids = fresh(&registry, 16);
	assert_eq!(ids.len(), 16);
	for (i, id) in ids.iter().enumerate() {
		assert_ne!(*id, String::STABLE_IDENTIFIER);
		assert!(!ids[..i].contains(id));
	}
}

#[test]
fn types_lists_registered_entries() {
	let registry = TypeIdentityRegistry::new("cli");
	registry.register(bool::type_handle()).unwrap();
	assert_eq!(types(&registry), vec![format!("{}  bool", bool::STABLE_IDENTIFIER)]);
}

#[test]
fn missing_config_is_reported_with_path() {
	let err = check_config(Path::new("/nonexistent/tessera.toml")).unwrap_err();
	assert!(format!("{err:#}").contains("/nonexistent/tessera.toml"));
}
