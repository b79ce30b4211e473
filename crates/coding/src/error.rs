use tessera_identity::{MalformedIdentifier, StableIdentifier};
use tessera_type_registry::RegistryError;

use crate::variant::VariantDefect;

/// Boxed failure reported by a wire format backend.
pub type WireError = Box<dyn std::error::Error + Send + Sync>;

/// Failures of one top-level encode or decode call.
///
/// A failed call aborts as a whole; partial output is never returned.
#[derive(Debug, thiserror::Error)]
pub enum CodingError {
	#[error(transparent)]
	MalformedIdentifier(#[from] MalformedIdentifier),

	/// Encoding needed the identifier of a type the registry does not know.
	#[error("type {type_name} has no stable identifier")]
	UnresolvedTypeIdentity { type_name: &'static str },

	/// Decoding met an identifier with no decodable type behind it.
	#[error("no decodable type registered for identifier {identifier}")]
	TypeNotFoundForIdentifier { identifier: StableIdentifier },

	/// No variant of a closed discriminator set maps to the value's type.
	#[error("no variant of {space} corresponds to type {type_name}")]
	UnknownDiscriminantForType { space: &'static str, type_name: &'static str },

	/// The payload carries no discriminator and no self-describing fallback applies.
	#[error("payload has no discriminator under {key:?}")]
	MissingDiscriminator { key: String },

	#[error(transparent)]
	RegistryCollision(#[from] RegistryError),

	/// A field needed a plugin that the active coder does not carry.
	#[error("no {plugin} plugin is active for this call")]
	PluginUnavailable { plugin: &'static str },

	#[error("invalid discriminator space {space}: {defect}")]
	InvalidVariantSpace { space: &'static str, defect: VariantDefect },

	/// A discriminator is present but has the wrong shape or an unknown value.
	#[error("malformed discriminator under {key:?}: {reason}")]
	MalformedDiscriminator { key: String, reason: String },

	/// The container around the payload does not match the configured placement.
	#[error("malformed envelope: {0}")]
	MalformedEnvelope(String),

	/// Structural encoding or decoding of the payload itself failed.
	#[error("payload: {0}")]
	Payload(#[from] serde_json::Error),

	#[error("wire format: {0}")]
	Wire(WireError),
}
