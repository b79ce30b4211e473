//! The identifier ↔ type map.
//!
//! # Invariants
//!
//! - Partial bijection: each type has at most one identifier and each identifier names at most one type.
//! - Append-only: entries are never removed or replaced by a different type.
//! - The full scan runs at most once per registry, under the lock, and registers in a deterministic
//!   order (identifier, then type name) so repeated processes resolve scan collisions identically.

use std::any::TypeId;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::StableIdentifier;
use crate::enumerator::{LinkedTypes, NoTypeEnumeration, TypeEnumerator};
use crate::error::RegistryError;
use crate::handle::TypeHandle;

/// Outcome of an accepted registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
	/// A new identifier ↔ type pair was recorded.
	Inserted,
	/// The same pair was already present; nothing changed.
	AlreadyPresent,
	/// The type declares no identifier; only its nested types were considered.
	NotIdentified,
}

/// Thread-safe bidirectional map between [`StableIdentifier`]s and [`TypeHandle`]s.
///
/// Construct one per isolation domain with [`new`](Self::new) or [`with_enumerator`](Self::with_enumerator),
/// or share the process-wide instance from [`global`](Self::global).
pub struct TypeIdentityRegistry {
	label: &'static str,
	enumerator: Box<dyn TypeEnumerator>,
	tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
	by_identifier: FxHashMap<StableIdentifier, TypeHandle>,
	by_type: FxHashMap<TypeId, StableIdentifier>,
	scanned: bool,
	rejections: Vec<RegistryError>,
}

static GLOBAL: OnceLock<Arc<TypeIdentityRegistry>> = OnceLock::new();

impl TypeIdentityRegistry {
	/// Registry populated only by explicit registration.
	pub fn new(label: &'static str) -> Self {
		Self::with_enumerator(label, NoTypeEnumeration)
	}

	pub fn with_enumerator(label: &'static str, enumerator: impl TypeEnumerator + 'static) -> Self {
		Self {
			label,
			enumerator: Box::new(enumerator),
			tables: Mutex::new(Tables::default()),
		}
	}

	/// Registry whose full scan walks every `stable_identity!` declaration in the binary.
	pub fn linked(label: &'static str) -> Self {
		Self::with_enumerator(label, LinkedTypes)
	}

	/// Process-wide registry backed by [`LinkedTypes`], created on first use.
	pub fn global() -> Arc<Self> {
		GLOBAL.get_or_init(|| Arc::new(Self::linked("global"))).clone()
	}

	pub fn label(&self) -> &'static str {
		self.label
	}

	/// Registers a type under its self-declared identifier, then its nested types.
	///
	/// Registering the same pair twice is a no-op. A different type under a taken identifier is
	/// rejected with [`RegistryError::Collision`] and the existing entry is kept.
	pub fn register(&self, handle: TypeHandle) -> Result<Registration, RegistryError> {
		self.tables.lock().atomically(|tables, journal| tables.register(self.label, handle, journal))
	}

	/// Registers each handle in order, all or nothing. Returns the number inserted.
	pub fn register_all(&self, handles: impl IntoIterator<Item = TypeHandle>) -> Result<usize, RegistryError> {
		self.tables.lock().atomically(|tables, journal| {
			let mut inserted = 0;
			for handle in handles {
				if tables.register(self.label, handle, journal)? == Registration::Inserted {
					inserted += 1;
				}
			}
			Ok(inserted)
		})
	}

	/// Registers a type that cannot declare an identifier itself.
	///
	/// Types that do declare one must go through [`register`](Self::register), so a type never
	/// enters the registry through two paths. A declaration is recognised on the handle itself or
	/// among the enumerator's top-level declarations, so a bare `TypeHandle::codable::<T>()` for a
	/// declared `T` is refused as well.
	pub fn register_as(&self, handle: TypeHandle, identifier: StableIdentifier) -> Result<Registration, RegistryError> {
		let declared = handle.declared_identifier().or_else(|| {
			self.enumerator
				.enumerate()
				.into_iter()
				.find(|candidate| *candidate == handle)
				.and_then(|candidate| candidate.declared_identifier())
		});
		if let Some(declared) = declared {
			let err = RegistryError::SelfDeclared {
				type_name: handle.name(),
				declared,
			};
			warn!(registry = self.label, error = %err, "rejected type registration");
			return Err(err);
		}
		self.tables
			.lock()
			.atomically(|tables, journal| tables.register_under(self.label, identifier, handle, journal))
	}

	/// Resolves an identifier to its type, scanning all types once on a miss.
	///
	/// A miss after the scan is reported as `None`; the caller decides its severity.
	pub fn lookup_type(&self, identifier: StableIdentifier) -> Option<TypeHandle> {
		let mut tables = self.tables.lock();
		if let Some(handle) = tables.by_identifier.get(&identifier).copied() {
			return Some(handle);
		}
		if tables.scanned {
			trace!(registry = self.label, %identifier, "identifier not registered");
			return None;
		}
		self.scan(&mut tables);
		tables.by_identifier.get(&identifier).copied()
	}

	/// Resolves a type to its identifier, scanning all types once on a miss.
	pub fn lookup_identifier(&self, handle: &TypeHandle) -> Option<StableIdentifier> {
		let mut tables = self.tables.lock();
		if let Some(identifier) = tables.by_type.get(&handle.type_id()).copied() {
			return Some(identifier);
		}
		if tables.scanned {
			trace!(registry = self.label, type_name = handle.name(), "type has no identifier");
			return None;
		}
		self.scan(&mut tables);
		tables.by_type.get(&handle.type_id()).copied()
	}

	pub fn identifier_of<T: ?Sized + 'static>(&self) -> Option<StableIdentifier> {
		self.lookup_identifier(&TypeHandle::of::<T>())
	}

	/// Runs the full scan unless it already ran. Idempotent.
	pub fn index_all_types_if_needed(&self) {
		let mut tables = self.tables.lock();
		self.scan(&mut tables);
	}

	pub fn has_indexed_all(&self) -> bool {
		self.tables.lock().scanned
	}

	/// Snapshot of every entry, sorted by identifier.
	pub fn entries(&self) -> Vec<(StableIdentifier, TypeHandle)> {
		let tables = self.tables.lock();
		let mut entries: Vec<_> = tables.by_identifier.iter().map(|(id, handle)| (*id, *handle)).collect();
		entries.sort_unstable_by_key(|(id, _)| *id);
		entries
	}

	pub fn len(&self) -> usize {
		self.tables.lock().by_identifier.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Generates a random identifier unused by any known type, scanning first.
	pub fn fresh_identifier(&self) -> StableIdentifier {
		self.index_all_types_if_needed();
		let tables = self.tables.lock();
		StableIdentifier::random_where(|candidate| !tables.by_identifier.contains_key(&candidate))
	}

	/// Registrations the full scan rejected, in scan order.
	pub fn scan_rejections(&self) -> Vec<RegistryError> {
		self.tables.lock().rejections.clone()
	}

	fn scan(&self, tables: &mut Tables) {
		if tables.scanned {
			return;
		}
		tables.scanned = true;

		let mut handles = self.enumerator.enumerate();
		handles.sort_by(|a, b| {
			a.declared_identifier()
				.cmp(&b.declared_identifier())
				.then_with(|| a.name().cmp(b.name()))
		});

		let discovered = handles.len();
		let mut inserted = 0usize;
		for handle in handles {
			match tables.atomically(|tables, journal| tables.register(self.label, handle, journal)) {
				Ok(Registration::Inserted) => inserted += 1,
				Ok(_) => {}
				Err(err) => tables.rejections.push(err),
			}
		}
		debug!(
			registry = self.label,
			discovered,
			inserted,
			rejected = tables.rejections.len(),
			total = tables.by_identifier.len(),
			"indexed all types"
		);
	}
}

/// Changes made by one registration call, undone if the call is rejected.
enum Change {
	Inserted(StableIdentifier),
	Absorbed(StableIdentifier, TypeHandle),
}

impl Tables {
	/// Runs `f` as one registration call: a rejection anywhere leaves the tables as they were.
	fn atomically<R>(&mut self, f: impl FnOnce(&mut Self, &mut Vec<Change>) -> Result<R, RegistryError>) -> Result<R, RegistryError> {
		let mut journal = Vec::new();
		let result = f(self, &mut journal);
		if result.is_err() {
			for change in journal.into_iter().rev() {
				match change {
					Change::Inserted(identifier) => {
						if let Some(handle) = self.by_identifier.remove(&identifier) {
							self.by_type.remove(&handle.type_id());
						}
					}
					Change::Absorbed(identifier, previous) => {
						self.by_identifier.insert(identifier, previous);
					}
				}
			}
		}
		result
	}

	fn register(&mut self, label: &'static str, handle: TypeHandle, journal: &mut Vec<Change>) -> Result<Registration, RegistryError> {
		match handle.declared_identifier() {
			Some(identifier) => self.register_under(label, identifier, handle, journal),
			None => {
				for nested in handle.nested() {
					self.register(label, nested, journal)?;
				}
				Ok(Registration::NotIdentified)
			}
		}
	}

	fn register_under(
		&mut self,
		label: &'static str,
		identifier: StableIdentifier,
		handle: TypeHandle,
		journal: &mut Vec<Change>,
	) -> Result<Registration, RegistryError> {
		let registration = self.insert(identifier, handle, journal).inspect_err(|err| {
			warn!(registry = label, error = %err, "rejected type registration");
		})?;
		if registration == Registration::Inserted {
			debug!(registry = label, %identifier, type_name = handle.name(), "registered type identity");
			for nested in handle.nested() {
				self.register(label, nested, journal)?;
			}
		}
		Ok(registration)
	}

	fn insert(&mut self, identifier: StableIdentifier, handle: TypeHandle, journal: &mut Vec<Change>) -> Result<Registration, RegistryError> {
		if let Some(existing) = self.by_identifier.get_mut(&identifier) {
			if *existing != handle {
				return Err(RegistryError::Collision {
					identifier,
					existing: existing.name(),
					incoming: handle.name(),
				});
			}
			journal.push(Change::Absorbed(identifier, *existing));
			existing.absorb(&handle);
			return Ok(Registration::AlreadyPresent);
		}
		if let Some(&existing) = self.by_type.get(&handle.type_id()) {
			return Err(RegistryError::ConflictingIdentity {
				type_name: handle.name(),
				existing,
				incoming: identifier,
			});
		}
		self.by_identifier.insert(identifier, handle);
		self.by_type.insert(handle.type_id(), identifier);
		journal.push(Change::Inserted(identifier));
		Ok(Registration::Inserted)
	}
}

impl fmt::Debug for TypeIdentityRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let tables = self.tables.lock();
		f.debug_struct("TypeIdentityRegistry")
			.field("label", &self.label)
			.field("entries", &tables.by_identifier.len())
			.field("scanned", &tables.scanned)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests;
