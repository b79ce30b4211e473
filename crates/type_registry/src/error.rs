use crate::StableIdentifier;

/// Rejected registrations.
///
/// Every variant is a programmer error in the calling code; the registry keeps its existing
/// entries unchanged and reports the rejection instead of overwriting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	/// Two distinct types claim the same identifier.
	#[error("identifier {identifier} already names {existing}, rejected for {incoming}")]
	Collision {
		identifier: StableIdentifier,
		existing: &'static str,
		incoming: &'static str,
	},
	/// A type already registered under one identifier is offered a second one.
	#[error("type {type_name} is registered as {existing}, rejected second identifier {incoming}")]
	ConflictingIdentity {
		type_name: &'static str,
		existing: StableIdentifier,
		incoming: StableIdentifier,
	},
	/// A manual override targeted a type that declares its own identifier.
	#[error("type {type_name} declares identifier {declared}; register it without an override")]
	SelfDeclared {
		type_name: &'static str,
		declared: StableIdentifier,
	},
}

impl RegistryError {
	/// The identifier the rejected registration asked for.
	pub fn identifier(&self) -> StableIdentifier {
		match self {
			Self::Collision { identifier, .. } => *identifier,
			Self::ConflictingIdentity { incoming, .. } => *incoming,
			Self::SelfDeclared { declared, .. } => *declared,
		}
	}
}
