use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser};
use tessera_identity::StableIdentifier;
use tessera_type_registry::TypeHandle;

use crate::context::{CodingContext, surface};
use crate::error::CodingError;
use crate::identity::IdentityDiscriminatorPlugin;
use crate::plugin::DiscriminatorPlugin;

/// A serializable reference to a type itself rather than to a value of it.
///
/// Encoded as the type's stable identifier and resolved on decode through the registry of the
/// active [`IdentityDiscriminatorPlugin`]. Unlike polymorphic payloads the referenced type need not
/// be codable.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef(TypeHandle);

impl TypeRef {
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self(TypeHandle::of::<T>())
	}

	pub fn new(handle: TypeHandle) -> Self {
		Self(handle)
	}

	pub fn handle(&self) -> TypeHandle {
		self.0
	}

	pub fn is<T: ?Sized + 'static>(&self) -> bool {
		self.0.is::<T>()
	}
}

impl fmt::Debug for TypeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TypeRef({})", self.0.name())
	}
}

impl Serialize for TypeRef {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let cx = CodingContext::current();
		let identifier = IdentityDiscriminatorPlugin::active(cx.as_deref())
			.and_then(|plugin| plugin.discriminator_for_type(&self.0))
			.map_err(|err| <S::Error as ser::Error>::custom(surface(cx.as_deref(), err)))?;
		identifier.serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for TypeRef {
	fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
		let identifier = StableIdentifier::deserialize(deserializer)?;
		let cx = CodingContext::current();
		IdentityDiscriminatorPlugin::active(cx.as_deref())
			.and_then(|plugin| {
				plugin
					.registry()
					.lookup_type(identifier)
					.ok_or(CodingError::TypeNotFoundForIdentifier { identifier })
			})
			.map(TypeRef)
			.map_err(|err| <De::Error as de::Error>::custom(surface(cx.as_deref(), err)))
	}
}
