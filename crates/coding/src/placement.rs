//! Where a discriminator physically sits relative to its payload.
//!
//! ```text
//! reserved field:  {"$type": "<disc>", "title": "Alien", "year": 1979}
//!                  {"$type": "<disc>", "$value": 42}            (non-object payload)
//! wrapper:         {"type": "<disc>", "data": {"title": "Alien", "year": 1979}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CodingError;

/// Default reserved discriminator key.
pub const DEFAULT_RESERVED_KEY: &str = "$type";
/// Companion key holding non-object payloads under reserved-field placement.
pub const VALUE_KEY: &str = "$value";
pub const DEFAULT_TYPE_KEY: &str = "type";
pub const DEFAULT_DATA_KEY: &str = "data";

/// Discriminator placement strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
	/// Discriminator merged into the payload's own object under `key`.
	ReservedField {
		#[serde(default = "default_reserved_key")]
		key: String,
	},
	/// Discriminator and payload as the two keys of an enclosing object.
	Wrapper {
		#[serde(default = "default_type_key")]
		type_key: String,
		#[serde(default = "default_data_key")]
		data_key: String,
	},
}

fn default_reserved_key() -> String {
	DEFAULT_RESERVED_KEY.to_owned()
}

fn default_type_key() -> String {
	DEFAULT_TYPE_KEY.to_owned()
}

fn default_data_key() -> String {
	DEFAULT_DATA_KEY.to_owned()
}

/// A payload split from its discriminator, if it had one.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedDiscriminator<D> {
	Present { discriminator: D, payload: Value },
	/// No discriminator was found; the tree is returned untouched.
	Absent(Value),
}

impl<D> DecodedDiscriminator<D> {
	/// Converts the discriminator, leaving the payload as is.
	pub fn try_map<E, F, R>(self, f: F) -> Result<DecodedDiscriminator<R>, E>
	where
		F: FnOnce(D) -> Result<R, E>,
	{
		Ok(match self {
			Self::Present { discriminator, payload } => DecodedDiscriminator::Present {
				discriminator: f(discriminator)?,
				payload,
			},
			Self::Absent(tree) => DecodedDiscriminator::Absent(tree),
		})
	}
}

impl Default for Placement {
	fn default() -> Self {
		Self::reserved_field()
	}
}

impl Placement {
	pub fn reserved_field() -> Self {
		Self::ReservedField { key: default_reserved_key() }
	}

	pub fn wrapper() -> Self {
		Self::Wrapper {
			type_key: default_type_key(),
			data_key: default_data_key(),
		}
	}

	/// Key the discriminator is stored under.
	pub fn discriminator_key(&self) -> &str {
		match self {
			Self::ReservedField { key } => key,
			Self::Wrapper { type_key, .. } => type_key,
		}
	}

	/// Checks that the configured keys cannot shadow each other.
	pub fn check(&self) -> Result<(), String> {
		match self {
			Self::ReservedField { key } if key.is_empty() => Err("reserved key is empty".into()),
			Self::ReservedField { key } if key == VALUE_KEY => Err(format!("reserved key may not be {VALUE_KEY:?}")),
			Self::Wrapper { type_key, data_key } if type_key == data_key => Err(format!("wrapper keys are both {type_key:?}")),
			_ => Ok(()),
		}
	}

	/// Stores `discriminator` alongside `payload`.
	pub fn place(&self, discriminator: Value, payload: Value) -> Result<Value, CodingError> {
		let mut out = Map::new();
		match self {
			Self::ReservedField { key } => match payload {
				Value::Object(mut fields) => {
					if let Some(taken) = [key.as_str(), VALUE_KEY].into_iter().find(|name| fields.contains_key(*name)) {
						return Err(CodingError::MalformedEnvelope(format!("payload already has a field named {taken:?}")));
					}
					fields.insert(key.clone(), discriminator);
					return Ok(Value::Object(fields));
				}
				other => {
					out.insert(key.clone(), discriminator);
					out.insert(VALUE_KEY.to_owned(), other);
				}
			},
			Self::Wrapper { type_key, data_key } => {
				out.insert(type_key.clone(), discriminator);
				out.insert(data_key.clone(), payload);
			}
		}
		Ok(Value::Object(out))
	}

	/// Separates the discriminator from `tree`.
	pub fn extract(&self, tree: Value) -> Result<DecodedDiscriminator<Value>, CodingError> {
		let Value::Object(mut fields) = tree else {
			return Ok(DecodedDiscriminator::Absent(tree));
		};
		match self {
			Self::ReservedField { key } => {
				let Some(discriminator) = fields.remove(key) else {
					return Ok(DecodedDiscriminator::Absent(Value::Object(fields)));
				};
				let payload = match fields.remove(VALUE_KEY) {
					Some(value) if fields.is_empty() => value,
					Some(_) => {
						return Err(CodingError::MalformedEnvelope(format!("{VALUE_KEY:?} must be the only field beside {key:?}")));
					}
					None => Value::Object(fields),
				};
				Ok(DecodedDiscriminator::Present { discriminator, payload })
			}
			Self::Wrapper { type_key, data_key } => {
				let Some(discriminator) = fields.remove(type_key) else {
					return Ok(DecodedDiscriminator::Absent(Value::Object(fields)));
				};
				let payload = fields
					.remove(data_key)
					.ok_or_else(|| CodingError::MalformedEnvelope(format!("wrapper has no {data_key:?} field")))?;
				if let Some(extra) = fields.keys().next() {
					return Err(CodingError::MalformedEnvelope(format!("wrapper has unexpected field {extra:?}")));
				}
				Ok(DecodedDiscriminator::Present { discriminator, payload })
			}
		}
	}
}
