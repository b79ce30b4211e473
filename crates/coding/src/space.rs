use std::fmt::Debug;

use serde_json::Value;
use tessera_type_registry::Polymorphic;

use crate::context::CodingContext;
use crate::error::CodingError;
use crate::identity::IdentityDiscriminatorPlugin;
use crate::variant::{TypeDiscriminator, with_variant_plugin};

/// The set of concrete types a [`PolymorphicField`](crate::PolymorphicField) may hold, and how it is discriminated.
///
/// Closed spaces come from [`type_discriminator!`](crate::type_discriminator); [`Registered`] is the open space.
pub trait DiscriminatorSpace: 'static {
	type Payload: ?Sized + Debug + Send + Sync + 'static;

	fn view(payload: &Self::Payload) -> &dyn Polymorphic;

	/// Erases a concrete value into this space's payload, if the space admits its type.
	fn erase<T: Polymorphic>(value: T) -> Result<Box<Self::Payload>, CodingError>;

	/// Encodes the payload with its discriminator, using the plugins active in `cx`.
	fn encode_payload(payload: &Self::Payload, cx: Option<&CodingContext>) -> Result<Value, CodingError>;

	/// Resolves the discriminator in `tree` and decodes the payload it names.
	fn decode_payload(tree: Value, cx: Option<&CodingContext>) -> Result<Box<Self::Payload>, CodingError>;
}

/// Open space: any type known to the active [`IdentityDiscriminatorPlugin`]'s registry.
///
/// Requires a coder carrying that plugin; outside one every call fails with
/// [`CodingError::PluginUnavailable`].
#[derive(Debug)]
pub enum Registered {}

impl DiscriminatorSpace for Registered {
	type Payload = dyn Polymorphic;

	fn view(payload: &Self::Payload) -> &dyn Polymorphic {
		payload
	}

	fn erase<T: Polymorphic>(value: T) -> Result<Box<Self::Payload>, CodingError> {
		let erased: Box<dyn Polymorphic> = Box::new(value);
		Ok(erased)
	}

	fn encode_payload(payload: &Self::Payload, cx: Option<&CodingContext>) -> Result<Value, CodingError> {
		IdentityDiscriminatorPlugin::active(cx)?.encode_polymorphic(payload)
	}

	fn decode_payload(tree: Value, cx: Option<&CodingContext>) -> Result<Box<Self::Payload>, CodingError> {
		IdentityDiscriminatorPlugin::active(cx)?.decode_polymorphic(tree)
	}
}

pub fn encode_variant<D: TypeDiscriminator>(payload: &D::Payload, cx: Option<&CodingContext>) -> Result<Value, CodingError> {
	with_variant_plugin::<D, _>(cx, |plugin| plugin.encode_variant(payload))
}

pub fn decode_variant<D: TypeDiscriminator>(tree: Value, cx: Option<&CodingContext>) -> Result<Box<D::Payload>, CodingError> {
	with_variant_plugin::<D, _>(cx, |plugin| plugin.decode_variant(tree))
}
