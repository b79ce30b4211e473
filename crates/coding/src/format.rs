use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::WireError;

/// A concrete wire format: the structural encoder/decoder pair a [`ModularCoder`](crate::ModularCoder) wraps.
///
/// Formats used with polymorphic fields must be self-describing, since fields read their input
/// as a structural tree before resolving the discriminator.
pub trait WireFormat: Send + Sync {
	/// Encoded representation.
	type Repr;

	fn name(&self) -> &'static str;

	fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Self::Repr, WireError>;

	fn decode<T: DeserializeOwned>(&self, repr: &Self::Repr) -> Result<T, WireError>;
}

/// JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat {
	pub pretty: bool,
}

impl JsonFormat {
	pub fn pretty() -> Self {
		Self { pretty: true }
	}
}

impl WireFormat for JsonFormat {
	type Repr = String;

	fn name(&self) -> &'static str {
		"json"
	}

	fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, WireError> {
		let text = if self.pretty {
			serde_json::to_string_pretty(value)?
		} else {
			serde_json::to_string(value)?
		};
		Ok(text)
	}

	fn decode<T: DeserializeOwned>(&self, repr: &String) -> Result<T, WireError> {
		Ok(serde_json::from_str(repr)?)
	}
}

/// In-memory JSON tree, for callers that post-process the structure.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTreeFormat;

impl WireFormat for JsonTreeFormat {
	type Repr = Value;

	fn name(&self) -> &'static str {
		"json-tree"
	}

	fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value, WireError> {
		Ok(serde_json::to_value(value)?)
	}

	fn decode<T: DeserializeOwned>(&self, repr: &Value) -> Result<T, WireError> {
		Ok(T::deserialize(repr)?)
	}
}

/// MessagePack with named struct fields, so payload trees keep their keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePackFormat;

impl WireFormat for MessagePackFormat {
	type Repr = Vec<u8>;

	fn name(&self) -> &'static str {
		"msgpack"
	}

	fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, WireError> {
		Ok(rmp_serde::to_vec_named(&value)?)
	}

	fn decode<T: DeserializeOwned>(&self, repr: &Vec<u8>) -> Result<T, WireError> {
		Ok(rmp_serde::from_slice(repr)?)
	}
}
