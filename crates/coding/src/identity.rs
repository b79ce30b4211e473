//! Registry-backed discriminators: the stable identifier of the payload's type.

use std::sync::Arc;

use serde_json::Value;
use tessera_identity::StableIdentifier;
use tessera_type_registry::{Polymorphic, Registration, TypeHandle, TypeIdentityRegistry};
use tracing::trace;

use crate::context::CodingContext;
use crate::error::CodingError;
use crate::placement::{DecodedDiscriminator, Placement};
use crate::plugin::{CodingPlugin, DiscriminatorPlugin};

/// Discriminates open polymorphic values by their registered [`StableIdentifier`].
///
/// Defaults to reserved-field placement under `$type`.
#[derive(Debug, Clone)]
pub struct IdentityDiscriminatorPlugin {
	registry: Arc<TypeIdentityRegistry>,
	placement: Placement,
	fallback: Option<TypeHandle>,
}

impl IdentityDiscriminatorPlugin {
	pub const NAME: &'static str = "identity-discriminator";

	pub fn new(registry: Arc<TypeIdentityRegistry>) -> Self {
		Self {
			registry,
			placement: Placement::reserved_field(),
			fallback: None,
		}
	}

	/// Plugin over the process-wide registry.
	pub fn global() -> Self {
		Self::new(TypeIdentityRegistry::global())
	}

	pub fn with_placement(mut self, placement: Placement) -> Self {
		self.placement = placement;
		self
	}

	/// Decodes undiscriminated payloads as `handle`, if it is self-describing and codable.
	///
	/// Covers data written before discriminators were introduced, where the stored type carries its
	/// own internal tag. Other handles never match and such payloads fail with
	/// [`CodingError::MissingDiscriminator`].
	pub fn with_self_describing_fallback(mut self, handle: TypeHandle) -> Self {
		self.fallback = Some(handle);
		self
	}

	/// The plugin carried by the call `cx` belongs to.
	pub fn active(cx: Option<&CodingContext>) -> Result<&Self, CodingError> {
		cx.and_then(|cx| cx.plugin::<Self>())
			.ok_or(CodingError::PluginUnavailable { plugin: Self::NAME })
	}

	pub fn registry(&self) -> &Arc<TypeIdentityRegistry> {
		&self.registry
	}

	pub fn placement(&self) -> &Placement {
		&self.placement
	}

	/// Registers a self-declaring type with the backing registry.
	pub fn register(&self, handle: TypeHandle) -> Result<Registration, CodingError> {
		Ok(self.registry.register(handle)?)
	}

	/// Encodes `value` with its identifier placed beside it.
	pub fn encode_polymorphic(&self, value: &dyn Polymorphic) -> Result<Value, CodingError> {
		let identifier = self.discriminator_for_type(&value.dyn_type_handle())?;
		let payload = value.to_tree()?;
		self.encode_discriminator(&identifier, payload)
	}

	/// Decodes a discriminated tree into the registered type its identifier names.
	pub fn decode_polymorphic(&self, tree: Value) -> Result<Box<dyn Polymorphic>, CodingError> {
		match self.decode_discriminator(tree)? {
			DecodedDiscriminator::Present { discriminator, payload } => {
				let handle = self.type_for_discriminator(&discriminator)?;
				decode_with(&handle, payload, discriminator)
			}
			DecodedDiscriminator::Absent(tree) => match self.fallback {
				Some(handle) if handle.is_self_describing() && handle.is_codable() => {
					trace!(type_name = handle.name(), "decoding undiscriminated payload as self-describing type");
					match handle.decode(tree) {
						Some(decoded) => Ok(decoded?),
						None => Err(self.missing()),
					}
				}
				_ => Err(self.missing()),
			},
		}
	}

	fn missing(&self) -> CodingError {
		CodingError::MissingDiscriminator {
			key: self.placement.discriminator_key().to_owned(),
		}
	}
}

fn decode_with(handle: &TypeHandle, payload: Value, identifier: StableIdentifier) -> Result<Box<dyn Polymorphic>, CodingError> {
	match handle.decode(payload) {
		Some(decoded) => Ok(decoded?),
		None => Err(CodingError::TypeNotFoundForIdentifier { identifier }),
	}
}

impl CodingPlugin for IdentityDiscriminatorPlugin {
	fn name(&self) -> &'static str {
		Self::NAME
	}
}

impl DiscriminatorPlugin for IdentityDiscriminatorPlugin {
	type Discriminator = StableIdentifier;

	fn type_for_discriminator(&self, identifier: &StableIdentifier) -> Result<TypeHandle, CodingError> {
		match self.registry.lookup_type(*identifier) {
			Some(handle) if handle.is_codable() => Ok(handle),
			_ => Err(CodingError::TypeNotFoundForIdentifier { identifier: *identifier }),
		}
	}

	fn discriminator_for_type(&self, ty: &TypeHandle) -> Result<StableIdentifier, CodingError> {
		self.registry
			.lookup_identifier(ty)
			.ok_or(CodingError::UnresolvedTypeIdentity { type_name: ty.name() })
	}

	/// A non-text value under the discriminator key counts as no discriminator, leaving the tree
	/// intact for the self-describing fallback.
	fn decode_discriminator(&self, tree: Value) -> Result<DecodedDiscriminator<StableIdentifier>, CodingError> {
		let key = self.placement.discriminator_key();
		if tree.get(key).is_some_and(|discriminator| !discriminator.is_string()) {
			trace!(key, "non-text discriminator treated as absent");
			return Ok(DecodedDiscriminator::Absent(tree));
		}
		self.placement.extract(tree)?.try_map(|discriminator| match discriminator {
			Value::String(text) => Ok(StableIdentifier::parse(&text)?),
			other => Err(CodingError::MalformedDiscriminator {
				key: self.placement.discriminator_key().to_owned(),
				reason: format!("expected identifier text, found {other}"),
			}),
		})
	}

	fn encode_discriminator(&self, identifier: &StableIdentifier, payload: Value) -> Result<Value, CodingError> {
		trace!(%identifier, key = self.placement.discriminator_key(), "placing identity discriminator");
		self.placement.place(Value::String(identifier.to_string()), payload)
	}
}
