//! Identity-bearing types and their link-time declarations.
//!
//! [`stable_identity!`](crate::stable_identity) implements [`StableIdentity`] and submits an
//! [`IdentityDecl`] through `inventory`. [`LinkedTypes`](crate::LinkedTypes) walks those
//! declarations when a registry performs its full scan.

use crate::StableIdentifier;
use crate::handle::TypeHandle;

/// A type that declares a fixed identifier for itself.
pub trait StableIdentity: 'static {
	const STABLE_IDENTIFIER: StableIdentifier;

	/// Handle carrying [`Self::STABLE_IDENTIFIER`] and the type's capabilities.
	fn type_handle() -> TypeHandle;
}

/// Link-time declaration of one identity-bearing type.
pub struct IdentityDecl {
	handle: fn() -> TypeHandle,
}

inventory::collect!(IdentityDecl);

impl IdentityDecl {
	pub const fn new(handle: fn() -> TypeHandle) -> Self {
		Self { handle }
	}

	pub fn handle(&self) -> TypeHandle {
		(self.handle)()
	}
}

/// Declares a stable identifier for a type and makes it discoverable by the full scan.
///
/// ```ignore
/// stable_identity!(Movie = "mokuv-datil-sapon-fihuz");
/// stable_identity!(opaque Catalog = "tafiz-gokud-bisom-lunav"; nested: [Movie, Trailer]);
/// ```
///
/// The plain form requires the type to be [`Polymorphic`](crate::Polymorphic) and deserializable so
/// registry-backed decoding can rebuild it. `opaque` types are identified but never decoded; they
/// typically act as namespaces for their `nested` types. Malformed identifier literals fail at
/// compile time.
#[macro_export]
macro_rules! stable_identity {
	(opaque $ty:ty = $id:literal $(; nested: [$($nested:ty),* $(,)?])? $(;)?) => {
		$crate::stable_identity!(@impl $ty, $id, $crate::TypeHandle::of::<$ty>() $(, [$($nested),*])?);
	};
	($ty:ty = $id:literal $(; nested: [$($nested:ty),* $(,)?])? $(;)?) => {
		$crate::stable_identity!(@impl $ty, $id, $crate::TypeHandle::codable::<$ty>() $(, [$($nested),*])?);
	};
	(@impl $ty:ty, $id:literal, $base:expr $(, [$($nested:ty),*])?) => {
		impl $crate::StableIdentity for $ty {
			const STABLE_IDENTIFIER: $crate::StableIdentifier = $crate::StableIdentifier::from_static($id);

			fn type_handle() -> $crate::TypeHandle {
				$base
					.with_identifier(<Self as $crate::StableIdentity>::STABLE_IDENTIFIER)
					$(.with_nested(|| vec![$(<$nested as $crate::StableIdentity>::type_handle()),*]))?
			}
		}

		$crate::inventory::submit! {
			$crate::IdentityDecl::new(<$ty as $crate::StableIdentity>::type_handle)
		}
	};
}
