//! Polymorphic, identity-preserving coding over ordinary serde wire formats.
//!
//! # Flow
//!
//! A [`ModularCoder`] wraps a [`WireFormat`] and an ordered list of [`CodingPlugin`]s. Each top-level
//! call enters a fresh [`CodingContext`]; every [`PolymorphicField`] reached while serde walks the
//! value finds the active plugins there.
//!
//! - Encode: payload type → discriminator ([`DiscriminatorPlugin::discriminator_for_type`]) →
//!   structural tree → discriminator placed beside it ([`Placement`]).
//! - Decode: discriminator split off → concrete type resolved → payload decoded as that type.
//!
//! # Discriminator spaces
//!
//! | Space | Plugin | Default placement |
//! |-------|--------|-------------------|
//! | closed, from [`type_discriminator!`] | [`VariantDiscriminatorPlugin`] | `{"type": .., "data": ..}` |
//! | open, [`Registered`] | [`IdentityDiscriminatorPlugin`] | `{"$type": .., ..fields}` |
//!
//! Closed spaces work without a coder, using their default plugin. The open space needs a coder
//! carrying an [`IdentityDiscriminatorPlugin`].
//!
//! # Errors
//!
//! Typed failures raised inside serde callbacks are stored in the call's context and returned as the
//! call's [`CodingError`], not flattened into the wire format's message.

mod coder;
mod config;
mod context;
mod error;
mod field;
mod format;
mod identity;
mod placement;
mod plugin;
mod space;
mod type_ref;
mod variant;

pub use coder::ModularCoder;
pub use config::{CodingConfig, ConfigError};
pub use context::{CodingContext, ContextGuard};
pub use error::{CodingError, WireError};
pub use field::PolymorphicField;
pub use format::{JsonFormat, JsonTreeFormat, MessagePackFormat, WireFormat};
pub use identity::IdentityDiscriminatorPlugin;
pub use placement::{DEFAULT_DATA_KEY, DEFAULT_RESERVED_KEY, DEFAULT_TYPE_KEY, DecodedDiscriminator, Placement, VALUE_KEY};
pub use plugin::{CodingPlugin, DiscriminatorPlugin};
pub use space::{DiscriminatorSpace, Registered};
pub use type_ref::TypeRef;
pub use variant::{TypeDiscriminator, VariantDefect, VariantDiscriminatorPlugin, validate_space};

#[doc(hidden)]
pub mod __private {
	pub use serde_json::{Error as JsonError, Value, from_value};
	pub use tessera_type_registry::{Polymorphic, TypeHandle};

	pub use crate::space::{decode_variant, encode_variant};
}
