use std::any::Any;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser};
use serde_json::Value;
use tessera_type_registry::{Polymorphic, TypeHandle};

use crate::context::{CodingContext, surface};
use crate::error::CodingError;
use crate::space::DiscriminatorSpace;

/// A value of statically unknown concrete type, discriminated by space `D`.
///
/// Serializes as the payload with its discriminator placed by the plugin active for `D`, and
/// deserializes by resolving that discriminator first. Compose it into ordinary serde types:
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Shelf {
/// 	featured: PolymorphicField<MediaKind>,
/// 	extras: Vec<PolymorphicField<Registered>>,
/// }
/// ```
pub struct PolymorphicField<D: DiscriminatorSpace> {
	value: Box<D::Payload>,
}

impl<D: DiscriminatorSpace> PolymorphicField<D> {
	pub fn new(value: Box<D::Payload>) -> Self {
		Self { value }
	}

	/// Wraps a concrete value, provided space `D` admits its type.
	pub fn from_value<T: Polymorphic>(value: T) -> Result<Self, CodingError> {
		D::erase(value).map(Self::new)
	}

	pub fn get(&self) -> &D::Payload {
		&self.value
	}

	pub fn get_mut(&mut self) -> &mut D::Payload {
		&mut self.value
	}

	pub fn into_inner(self) -> Box<D::Payload> {
		self.value
	}

	/// Swaps in a new payload, returning the old one.
	pub fn replace(&mut self, value: Box<D::Payload>) -> Box<D::Payload> {
		std::mem::replace(&mut self.value, value)
	}

	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		D::view(&self.value).downcast_ref::<T>()
	}

	pub fn is<T: Any>(&self) -> bool {
		D::view(&self.value).is::<T>()
	}

	/// Handle of the payload's concrete runtime type.
	pub fn type_handle(&self) -> TypeHandle {
		D::view(&self.value).dyn_type_handle()
	}
}

impl<D: DiscriminatorSpace> From<Box<D::Payload>> for PolymorphicField<D> {
	fn from(value: Box<D::Payload>) -> Self {
		Self::new(value)
	}
}

impl<D: DiscriminatorSpace> fmt::Debug for PolymorphicField<D> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("PolymorphicField").field(&&*self.value).finish()
	}
}

impl<D: DiscriminatorSpace> PartialEq for PolymorphicField<D> {
	fn eq(&self, other: &Self) -> bool {
		D::view(&self.value).dyn_eq(D::view(&other.value))
	}
}

impl<D: DiscriminatorSpace> Serialize for PolymorphicField<D> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let cx = CodingContext::current();
		let tree = D::encode_payload(&self.value, cx.as_deref()).map_err(|err| <S::Error as ser::Error>::custom(surface(cx.as_deref(), err)))?;
		if let Some(cx) = &cx {
			cx.note_encoded();
		}
		tree.serialize(serializer)
	}
}

impl<'de, D: DiscriminatorSpace> Deserialize<'de> for PolymorphicField<D> {
	fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
		let tree = Value::deserialize(deserializer)?;
		let cx = CodingContext::current();
		let value = D::decode_payload(tree, cx.as_deref()).map_err(|err| <De::Error as de::Error>::custom(surface(cx.as_deref(), err)))?;
		if let Some(cx) = &cx {
			cx.note_decoded();
		}
		Ok(Self { value })
	}
}
