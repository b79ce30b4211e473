//! Stable, human-readable identities for runtime types.
//!
//! Two layers:
//!
//! - [`quintet`] - bijective codec between fixed-width unsigned integers and pronounceable
//!   five-letter words joined by `-`.
//! - [`StableIdentifier`] - an immutable 64-bit identity rendered through the codec, used as the
//!   discriminator of polymorphic payloads and as the key of the type registry.

/// Identifier parse failures.
pub mod error;
/// Pronounceable integer codec.
pub mod quintet;

mod identifier;

pub use error::{MalformedIdentifier, MalformedReason};
pub use identifier::StableIdentifier;
pub use quintet::QuintetInt;
