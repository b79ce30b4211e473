//! Plugin protocol threaded through every [`ModularCoder`](crate::ModularCoder) call.

use std::any::Any;

use serde_json::Value;
use tessera_type_registry::TypeHandle;

use crate::error::CodingError;
use crate::placement::DecodedDiscriminator;

/// Any object a coder carries into its calls. Looked up by concrete type.
pub trait CodingPlugin: Any + Send + Sync {
	fn name(&self) -> &'static str;
}

/// Strategy mapping runtime types to discriminators and placing them in the structural tree.
///
/// Strategies hold configuration only; they keep no state between calls.
pub trait DiscriminatorPlugin: CodingPlugin {
	type Discriminator;

	/// Resolves a decoded discriminator to the concrete type to decode.
	fn type_for_discriminator(&self, discriminator: &Self::Discriminator) -> Result<TypeHandle, CodingError>;

	/// Resolves a value's runtime type to the discriminator that names it.
	fn discriminator_for_type(&self, ty: &TypeHandle) -> Result<Self::Discriminator, CodingError>;

	/// Splits a discriminator off an encoded tree.
	fn decode_discriminator(&self, tree: Value) -> Result<DecodedDiscriminator<Self::Discriminator>, CodingError>;

	/// Places a discriminator beside an encoded payload.
	fn encode_discriminator(&self, discriminator: &Self::Discriminator, payload: Value) -> Result<Value, CodingError>;
}
