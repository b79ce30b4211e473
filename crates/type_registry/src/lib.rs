//! Bidirectional registry between [`StableIdentifier`]s and runtime types.
//!
//! # Purpose
//!
//! - Owns the type-side vocabulary: [`TypeHandle`] (a runtime reference to a type itself) and the
//!   [`Polymorphic`] capability for values whose concrete type is known only at runtime.
//! - Maintains the partial bijection identifier ↔ type in a [`TypeIdentityRegistry`].
//! - Collects link-time identity declarations made with [`stable_identity!`] so the lazy full scan
//!   can discover every identity-bearing type in the program.
//!
//! # Population
//!
//! Entries arrive through three paths:
//!
//! 1. [`TypeIdentityRegistry::register`] for types that declare their own identifier.
//! 2. [`TypeIdentityRegistry::register_as`] for types adapted from elsewhere that cannot declare one.
//! 3. The one-shot scan ([`TypeIdentityRegistry::index_all_types_if_needed`]) driven by the
//!    registry's [`TypeEnumerator`], triggered by the first lookup miss.
//!
//! Entries are never removed. Two distinct types claiming one identifier is always rejected with
//! [`RegistryError::Collision`], regardless of build profile. A rejected call, nested types and
//! batches included, leaves the registry exactly as it was.
//!
//! # Declaring identities
//!
//! ```
//! use tessera_type_registry::{StableIdentity, TypeIdentityRegistry, stable_identity};
//!
//! #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
//! struct Movie {
//! 	title: String,
//! }
//!
//! stable_identity!(Movie = "mokuv-datil-sapon-fihuz");
//!
//! let registry = TypeIdentityRegistry::new("doc");
//! registry.register(Movie::type_handle()).unwrap();
//! assert_eq!(registry.identifier_of::<Movie>(), Some(Movie::STABLE_IDENTIFIER));
//! ```

mod builtins;
mod enumerator;
mod error;
mod handle;
mod identity;
mod polymorphic;
mod registry;

pub use enumerator::{LinkedTypes, NoTypeEnumeration, TypeEnumerator};
pub use error::RegistryError;
pub use handle::{DecodeFn, NestedFn, TypeHandle};
pub use identity::{IdentityDecl, StableIdentity};
#[doc(hidden)]
pub use inventory;
pub use polymorphic::Polymorphic;
pub use registry::{Registration, TypeIdentityRegistry};
pub use tessera_identity::StableIdentifier;
