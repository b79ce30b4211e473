//! The process-wide registry as seen from a downstream crate.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use tessera_type_registry::{Polymorphic, StableIdentity, TypeIdentityRegistry, stable_identity};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Screening {
	room: u8,
	title: String,
}

stable_identity!(Screening = "mubaf-sikot-vadul-ginoz");

#[test]
fn global_is_shared_and_linked() {
	let a = TypeIdentityRegistry::global();
	let b = TypeIdentityRegistry::global();
	assert!(Arc::ptr_eq(&a, &b));
	assert_eq!(a.label(), "global");

	let handle = a.lookup_type(Screening::STABLE_IDENTIFIER).expect("declared downstream");
	assert!(handle.is::<Screening>());
	assert!(a.has_indexed_all());
	assert!(a.scan_rejections().is_empty());
}

#[test]
fn resolved_handle_decodes_payloads() {
	let registry = TypeIdentityRegistry::linked("downstream");
	let handle = registry.lookup_type(Screening::STABLE_IDENTIFIER).unwrap();

	let value = Screening {
		room: 3,
		title: "Stalker".into(),
	};
	let decoded = handle.decode(value.to_tree().unwrap()).unwrap().unwrap();
	assert_eq!(decoded.downcast_ref::<Screening>(), Some(&value));
}

#[test]
fn builtin_scalars_are_declared() {
	let registry = TypeIdentityRegistry::linked("downstream");
	registry.index_all_types_if_needed();
	assert!(registry.len() >= 6);
	for (id, name) in registry.entries().iter().map(|(id, handle)| (*id, handle.name())) {
		assert_eq!(registry.lookup_type(id).map(|h| h.name()), Some(name));
	}
	for id in [String::STABLE_IDENTIFIER, bool::STABLE_IDENTIFIER, i64::STABLE_IDENTIFIER, u64::STABLE_IDENTIFIER] {
		assert!(registry.lookup_type(id).is_some_and(|handle| handle.is_codable()));
	}
}
