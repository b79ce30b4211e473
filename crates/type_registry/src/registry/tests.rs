use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

use super::*;
use crate::{StableIdentity, stable_identity};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Foo {
	title: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Adapted(u32);

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Alpha;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Beta;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Trailer {
	seconds: u32,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Poster {
	url: String,
}

struct Catalog;

struct Shelf;

stable_identity!(Foo = "kadop-lusiv-gabot-nuhim");
stable_identity!(Trailer = "pomuh-fasid-goliv-rabuk");
stable_identity!(Poster = "sudag-nikov-jafum-tolib");
stable_identity!(opaque Catalog = "tafiz-gokud-bisom-lunav"; nested: [Trailer, Poster]);

const ADAPTED_ID: StableIdentifier = StableIdentifier::from_static("zisak-hopuv-dimal-tanok");
const SHARED_ID: StableIdentifier = StableIdentifier::from_static("vibun-mozak-hulid-pagos");
const OTHER_ID: StableIdentifier = StableIdentifier::from_static("ratik-bunof-sovug-dilam");
const SHELF_ID: StableIdentifier = StableIdentifier::from_static("dabak-somup-rivaf-hulog");

fn shelf_contents() -> Vec<TypeHandle> {
	vec![Trailer::type_handle(), TypeHandle::codable::<Beta>().with_identifier(SHARED_ID)]
}

fn counting_enumerator(handles: Vec<TypeHandle>) -> (Arc<AtomicUsize>, impl TypeEnumerator) {
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&calls);
	let enumerator = move || {
		counter.fetch_add(1, Ordering::SeqCst);
		handles.clone()
	};
	(calls, enumerator)
}

/// A self-declared registration is visible from both directions.
#[test]
fn register_then_lookup_both_directions() {
	let registry = TypeIdentityRegistry::new("test");
	assert_eq!(registry.register(Foo::type_handle()), Ok(Registration::Inserted));

	let id = StableIdentifier::parse("kadop-lusiv-gabot-nuhim").unwrap();
	let handle = registry.lookup_type(id).expect("Foo registered");
	assert!(handle.is::<Foo>());
	assert!(handle.is_codable());
	assert_eq!(registry.identifier_of::<Foo>(), Some(id));
	assert_eq!(registry.identifier_of::<Foo>().map(|id| id.to_string()).as_deref(), Some("kadop-lusiv-gabot-nuhim"));
}

/// Registering the same identifier for the same type changes nothing.
#[test]
fn same_pair_twice_is_noop() {
	let registry = TypeIdentityRegistry::new("test");
	registry.register(Foo::type_handle()).unwrap();
	assert_eq!(registry.register(Foo::type_handle()), Ok(Registration::AlreadyPresent));
	assert_eq!(registry.len(), 1);
}

/// Two distinct types under one identifier are rejected and the first entry survives.
#[test]
fn distinct_types_under_one_identifier_are_rejected() {
	let registry = TypeIdentityRegistry::new("test");
	registry.register(TypeHandle::codable::<Alpha>().with_identifier(SHARED_ID)).unwrap();

	let err = registry.register(TypeHandle::codable::<Beta>().with_identifier(SHARED_ID)).unwrap_err();
	assert!(matches!(err, RegistryError::Collision { identifier, .. } if identifier == SHARED_ID));
	assert!(registry.lookup_type(SHARED_ID).unwrap().is::<Alpha>());
	assert_eq!(registry.identifier_of::<Beta>(), None);
}

/// A type keeps its first identifier.
#[test]
fn second_identifier_for_a_type_is_rejected() {
	let registry = TypeIdentityRegistry::new("test");
	registry.register_as(TypeHandle::codable::<Adapted>(), ADAPTED_ID).unwrap();

	let err = registry.register_as(TypeHandle::codable::<Adapted>(), OTHER_ID).unwrap_err();
	assert_eq!(
		err,
		RegistryError::ConflictingIdentity {
			type_name: std::any::type_name::<Adapted>(),
			existing: ADAPTED_ID,
			incoming: OTHER_ID,
		}
	);
	assert_eq!(registry.lookup_type(OTHER_ID), None);
}

/// Manual overrides work for plain types and refuse self-declared ones.
#[test]
fn register_as_covers_only_undeclared_types() {
	let registry = TypeIdentityRegistry::new("test");
	assert_eq!(registry.register_as(TypeHandle::codable::<Adapted>(), ADAPTED_ID), Ok(Registration::Inserted));
	assert!(registry.lookup_type(ADAPTED_ID).unwrap().is::<Adapted>());

	let err = registry.register_as(Foo::type_handle(), OTHER_ID).unwrap_err();
	assert!(matches!(err, RegistryError::SelfDeclared { declared, .. } if declared == Foo::STABLE_IDENTIFIER));
	assert_eq!(registry.identifier_of::<Foo>(), None);
}

#[test]
fn undeclared_types_are_not_identified() {
	let registry = TypeIdentityRegistry::new("test");
	assert_eq!(registry.register(TypeHandle::of::<u8>()), Ok(Registration::NotIdentified));
	assert!(registry.is_empty());
}

/// Namespace types pull their nested types in with them.
#[test]
fn nested_types_register_with_their_namespace() {
	let registry = TypeIdentityRegistry::new("test");
	assert_eq!(registry.register(Catalog::type_handle()), Ok(Registration::Inserted));

	assert_eq!(registry.len(), 3);
	assert!(registry.lookup_type(Trailer::STABLE_IDENTIFIER).unwrap().is::<Trailer>());
	assert!(registry.lookup_type(Poster::STABLE_IDENTIFIER).unwrap().is::<Poster>());
	assert!(!registry.lookup_type(Catalog::STABLE_IDENTIFIER).unwrap().is_codable());
}

/// A lookup miss scans once; later misses are answered without rescanning.
#[test]
fn miss_triggers_single_scan() {
	let (calls, enumerator) = counting_enumerator(vec![Foo::type_handle()]);
	let registry = TypeIdentityRegistry::with_enumerator("test", enumerator);
	assert!(!registry.has_indexed_all());

	assert!(registry.lookup_type(Foo::STABLE_IDENTIFIER).unwrap().is::<Foo>());
	assert_eq!(registry.lookup_type(OTHER_ID), None);
	assert_eq!(registry.identifier_of::<Adapted>(), None);

	assert!(registry.has_indexed_all());
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Running the full scan twice yields the same contents as running it once.
#[test]
fn scan_is_idempotent() {
	let (calls, enumerator) = counting_enumerator(vec![Catalog::type_handle(), Foo::type_handle()]);
	let registry = TypeIdentityRegistry::with_enumerator("test", enumerator);

	registry.index_all_types_if_needed();
	let once: Vec<_> = registry.entries().into_iter().map(|(id, handle)| (id, handle.name())).collect();
	registry.index_all_types_if_needed();
	let twice: Vec<_> = registry.entries().into_iter().map(|(id, handle)| (id, handle.name())).collect();

	assert_eq!(once, twice);
	assert_eq!(once.len(), 4);
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Scan collisions are resolved by name order and recorded rather than dropped silently.
#[test]
fn scan_collisions_are_recorded() {
	let (_, enumerator) = counting_enumerator(vec![
		TypeHandle::codable::<Beta>().with_identifier(SHARED_ID),
		TypeHandle::codable::<Alpha>().with_identifier(SHARED_ID),
	]);
	let registry = TypeIdentityRegistry::with_enumerator("test", enumerator);
	registry.index_all_types_if_needed();

	assert!(registry.lookup_type(SHARED_ID).unwrap().is::<Alpha>());
	assert_eq!(
		registry.scan_rejections(),
		vec![RegistryError::Collision {
			identifier: SHARED_ID,
			existing: std::any::type_name::<Alpha>(),
			incoming: std::any::type_name::<Beta>(),
		}]
	);
}

/// Concurrent misses block on one scan instead of each running their own.
#[test]
fn concurrent_lookups_share_one_scan() {
	let (calls, enumerator) = counting_enumerator(vec![Foo::type_handle(), Catalog::type_handle()]);
	let registry = TypeIdentityRegistry::with_enumerator("test", enumerator);

	std::thread::scope(|scope| {
		for _ in 0..8 {
			scope.spawn(|| {
				assert!(registry.lookup_type(Trailer::STABLE_IDENTIFIER).is_some());
				assert_eq!(registry.identifier_of::<Foo>(), Some(Foo::STABLE_IDENTIFIER));
			});
		}
	});

	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(registry.len(), 4);
}

#[test]
fn fresh_identifier_is_unused() {
	let registry = TypeIdentityRegistry::new("test");
	registry.register(Catalog::type_handle()).unwrap();
	for _ in 0..32 {
		let id = registry.fresh_identifier();
		assert_eq!(registry.lookup_type(id), None);
	}
}

/// Codable re-registration upgrades an opaque entry in place.
#[test]
fn re_registration_keeps_richer_capabilities() {
	let registry = TypeIdentityRegistry::new("test");
	registry.register_as(TypeHandle::of::<Adapted>(), ADAPTED_ID).unwrap();
	assert!(!registry.lookup_type(ADAPTED_ID).unwrap().is_codable());

	assert_eq!(registry.register_as(TypeHandle::codable::<Adapted>(), ADAPTED_ID), Ok(Registration::AlreadyPresent));
	assert!(registry.lookup_type(ADAPTED_ID).unwrap().is_codable());
}

#[test]
fn linked_registry_discovers_declarations() {
	let registry = TypeIdentityRegistry::linked("test");
	assert!(registry.lookup_type(Foo::STABLE_IDENTIFIER).unwrap().is::<Foo>());
	assert!(registry.lookup_type(String::STABLE_IDENTIFIER).unwrap().is::<String>());
	assert_eq!(registry.identifier_of::<f64>(), Some(f64::STABLE_IDENTIFIER));
	assert!(registry.scan_rejections().is_empty());
}

/// A namespace whose nested type collides is rejected whole; nothing it brought in stays.
#[test]
fn rejected_namespace_leaves_no_partial_entries() {
	let registry = TypeIdentityRegistry::new("test");
	registry.register(TypeHandle::codable::<Alpha>().with_identifier(SHARED_ID)).unwrap();

	let shelf = TypeHandle::of::<Shelf>().with_identifier(SHELF_ID).with_nested(shelf_contents);
	let err = registry.register(shelf).unwrap_err();
	assert!(matches!(err, RegistryError::Collision { identifier, .. } if identifier == SHARED_ID));

	assert_eq!(registry.lookup_type(SHELF_ID), None);
	assert_eq!(registry.lookup_type(Trailer::STABLE_IDENTIFIER), None);
	assert_eq!(registry.identifier_of::<Shelf>(), None);
	assert_eq!(registry.len(), 1);
}

/// A batch is all or nothing, including capability upgrades made before the rejection.
#[test]
fn rejected_batch_is_rolled_back() {
	let registry = TypeIdentityRegistry::new("test");
	registry.register_as(TypeHandle::of::<Adapted>(), ADAPTED_ID).unwrap();

	let err = registry
		.register_all([
			Foo::type_handle(),
			TypeHandle::codable::<Adapted>().with_identifier(ADAPTED_ID),
			TypeHandle::codable::<Alpha>().with_identifier(ADAPTED_ID),
		])
		.unwrap_err();
	assert!(matches!(err, RegistryError::Collision { identifier, .. } if identifier == ADAPTED_ID));

	assert_eq!(registry.identifier_of::<Foo>(), None);
	assert!(!registry.lookup_type(ADAPTED_ID).unwrap().is_codable());
	assert_eq!(registry.len(), 1);
}

/// Manual overrides also refuse types whose declaration only the enumerator knows about.
#[test]
fn register_as_refuses_enumerated_declarations() {
	let (_, enumerator) = counting_enumerator(vec![Foo::type_handle()]);
	let registry = TypeIdentityRegistry::with_enumerator("test", enumerator);

	let err = registry.register_as(TypeHandle::codable::<Foo>(), OTHER_ID).unwrap_err();
	assert!(matches!(err, RegistryError::SelfDeclared { declared, .. } if declared == Foo::STABLE_IDENTIFIER));
	assert_eq!(registry.lookup_type(OTHER_ID), None);
	assert_eq!(registry.identifier_of::<Foo>(), Some(Foo::STABLE_IDENTIFIER));
	assert!(registry.scan_rejections().is_empty());
}
