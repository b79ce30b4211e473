use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::MalformedIdentifier;
use crate::quintet;

/// A 64-bit identity that names a type independently of its Rust path.
///
/// Rendered as four quintet words (`gujof-fuvom-nodon-johul`). Equality, ordering and hashing
/// use the raw integer, never the text.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StableIdentifier(u64);

impl StableIdentifier {
	/// Identity width in bits.
	pub const BITS: u32 = u64::BITS;
	/// Number of quintet groups in the canonical text.
	pub const GROUPS: usize = (Self::BITS / 16) as usize;

	pub const fn from_raw(raw: u64) -> Self {
		Self(raw)
	}

	pub const fn raw(self) -> u64 {
		self.0
	}

	/// Decodes an identifier literal at compile time.
	///
	/// # Panics
	///
	/// Panics (a compile error in const context) if `text` is not canonical quintet text.
	pub const fn from_static(text: &'static str) -> Self {
		match quintet::decode_u64_const(text) {
			Some(raw) => Self(raw),
			None => panic!("malformed stable identifier literal"),
		}
	}

	/// Parses canonical text such as `babab-babab-babab-pobab`.
	pub fn parse(text: &str) -> Result<Self, MalformedIdentifier> {
		quintet::decode::<u64>(text).map(Self)
	}

	/// Generates a uniformly random identifier.
	///
	/// Freshly generated values must be checked against the registry before they are committed;
	/// see [`Self::random_where`].
	pub fn random() -> Self {
		Self(rand::random())
	}

	/// Generates random identifiers until `accept` returns true.
	pub fn random_where(mut accept: impl FnMut(Self) -> bool) -> Self {
		loop {
			let candidate = Self::random();
			if accept(candidate) {
				return candidate;
			}
		}
	}

	/// The four 16-bit words, most significant first.
	pub fn words(self) -> [u16; 4] {
		[(self.0 >> 48) as u16, (self.0 >> 32) as u16, (self.0 >> 16) as u16, self.0 as u16]
	}
}

impl fmt::Display for StableIdentifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&quintet::encode(self.0))
	}
}

impl fmt::Debug for StableIdentifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "StableIdentifier({self})")
	}
}

impl FromStr for StableIdentifier {
	type Err = MalformedIdentifier;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl From<u64> for StableIdentifier {
	fn from(raw: u64) -> Self {
		Self(raw)
	}
}

impl From<StableIdentifier> for u64 {
	fn from(id: StableIdentifier) -> Self {
		id.0
	}
}

impl Serialize for StableIdentifier {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for StableIdentifier {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct IdentifierVisitor;

		impl Visitor<'_> for IdentifierVisitor {
			type Value = StableIdentifier;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str("a stable identifier such as `babab-babab-babab-pobab`")
			}

			fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
				StableIdentifier::parse(v).map_err(E::custom)
			}
		}

		deserializer.deserialize_str(IdentifierVisitor)
	}
}
