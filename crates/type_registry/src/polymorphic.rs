//! Capability set of values whose concrete type is known only at runtime.

use std::any::Any;
use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::handle::TypeHandle;

/// An erased, structurally encodable value.
///
/// Implemented for every `Serialize + DeserializeOwned + Debug + PartialEq + Send + Sync` type.
/// The structural tree is the neutral intermediate form discriminator plugins operate on; it is
/// never a wire format by itself.
pub trait Polymorphic: Any + Debug + Send + Sync {
	/// Handle of the concrete runtime type.
	fn dyn_type_handle(&self) -> TypeHandle;

	/// Encodes the value into its structural tree.
	fn to_tree(&self) -> Result<Value, serde_json::Error>;

	/// Equality across erased values; values of different concrete types are never equal.
	fn dyn_eq(&self, other: &dyn Polymorphic) -> bool;
}

impl<T> Polymorphic for T
where
	T: Serialize + DeserializeOwned + Debug + PartialEq + Send + Sync + 'static,
{
	fn dyn_type_handle(&self) -> TypeHandle {
		TypeHandle::codable::<T>()
	}

	fn to_tree(&self) -> Result<Value, serde_json::Error> {
		serde_json::to_value(self)
	}

	fn dyn_eq(&self, other: &dyn Polymorphic) -> bool {
		other.downcast_ref::<T>().is_some_and(|other| self == other)
	}
}

impl dyn Polymorphic {
	pub fn is<T: Any>(&self) -> bool {
		(self as &dyn Any).is::<T>()
	}

	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		(self as &dyn Any).downcast_ref::<T>()
	}

	pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
		(self as &mut dyn Any).downcast_mut::<T>()
	}
}

impl PartialEq for dyn Polymorphic {
	fn eq(&self, other: &Self) -> bool {
		self.dyn_eq(other)
	}
}
