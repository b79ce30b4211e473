use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::StableIdentifier;
use crate::polymorphic::Polymorphic;

/// Structural decoder for a codable type: rebuilds a boxed value from its tree.
pub type DecodeFn = fn(Value) -> Result<Box<dyn Polymorphic>, serde_json::Error>;

/// Lists the registrable types nested under a namespace type.
pub type NestedFn = fn() -> Vec<TypeHandle>;

/// A runtime reference to a type itself, usable as a map key.
///
/// Equality and hashing use only the [`TypeId`]; the remaining fields describe capabilities.
#[derive(Clone, Copy)]
pub struct TypeHandle {
	type_id: TypeId,
	name: &'static str,
	declared: Option<StableIdentifier>,
	decode: Option<DecodeFn>,
	nested: Option<NestedFn>,
	self_describing: bool,
}

impl TypeHandle {
	/// Handle for any type, without structural decoding.
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self {
			type_id: TypeId::of::<T>(),
			name: type_name::<T>(),
			declared: None,
			decode: None,
			nested: None,
			self_describing: false,
		}
	}

	/// Handle for a type that can be rebuilt from its structural tree.
	pub fn codable<T: Polymorphic + DeserializeOwned>() -> Self {
		Self {
			decode: Some(decode_boxed::<T> as DecodeFn),
			..Self::of::<T>()
		}
	}

	/// Attaches the identifier the type declares for itself.
	pub const fn with_identifier(mut self, identifier: StableIdentifier) -> Self {
		self.declared = Some(identifier);
		self
	}

	/// Marks the type as a namespace whose nested types register alongside it.
	pub const fn with_nested(mut self, nested: NestedFn) -> Self {
		self.nested = Some(nested);
		self
	}

	/// Marks the type as carrying its own internal type tag.
	///
	/// Self-describing types may be decoded from payloads that lack an outer discriminator.
	pub const fn self_describing(mut self) -> Self {
		self.self_describing = true;
		self
	}

	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn declared_identifier(&self) -> Option<StableIdentifier> {
		self.declared
	}

	pub fn is_codable(&self) -> bool {
		self.decode.is_some()
	}

	pub fn is_self_describing(&self) -> bool {
		self.self_describing
	}

	pub fn is<T: ?Sized + 'static>(&self) -> bool {
		self.type_id == TypeId::of::<T>()
	}

	pub fn nested(&self) -> Vec<TypeHandle> {
		self.nested.map(|nested| nested()).unwrap_or_default()
	}

	/// Decodes `tree` as this type, or `None` if the type has no structural decoder.
	pub fn decode(&self, tree: Value) -> Option<Result<Box<dyn Polymorphic>, serde_json::Error>> {
		self.decode.map(|decode| decode(tree))
	}

	/// Keeps the capabilities of `other` that this handle lacks.
	pub(crate) fn absorb(&mut self, other: &TypeHandle) {
		debug_assert_eq!(self.type_id, other.type_id);
		self.decode = self.decode.or(other.decode);
		self.nested = self.nested.or(other.nested);
		self.self_describing |= other.self_describing;
	}
}

fn decode_boxed<T: Polymorphic + DeserializeOwned>(tree: Value) -> Result<Box<dyn Polymorphic>, serde_json::Error> {
	let value: Box<dyn Polymorphic> = Box::new(serde_json::from_value::<T>(tree)?);
	Ok(value)
}

impl PartialEq for TypeHandle {
	fn eq(&self, other: &Self) -> bool {
		self.type_id == other.type_id
	}
}

impl Eq for TypeHandle {}

impl Hash for TypeHandle {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.type_id.hash(state);
	}
}

impl fmt::Debug for TypeHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeHandle")
			.field("name", &self.name)
			.field("declared", &self.declared)
			.field("codable", &self.decode.is_some())
			.field("self_describing", &self.self_describing)
			.finish_non_exhaustive()
	}
}

impl fmt::Display for TypeHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}
