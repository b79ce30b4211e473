//! Variant-backed discriminators: a closed set of named variants, each bound to one concrete type.
//!
//! # Validation
//!
//! Before a variant space is first used in either direction it is checked once per process:
//!
//! - it declares at least one variant,
//! - every declared type is codable,
//! - no two variants declare the same type.
//!
//! The outcome is memoized per discriminator type. A defective space fails every call that touches
//! it with [`CodingError::InvalidVariantSpace`], whichever variant the call concerns.

use std::any::{TypeId, type_name};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::LazyLock;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tessera_type_registry::{Polymorphic, TypeHandle};
use tracing::{debug, trace};

use crate::context::CodingContext;
use crate::error::CodingError;
use crate::placement::{DecodedDiscriminator, Placement};
use crate::plugin::{CodingPlugin, DiscriminatorPlugin};

/// A closed discriminator set.
///
/// Usually implemented with [`type_discriminator!`](crate::type_discriminator).
pub trait TypeDiscriminator: Copy + Eq + Debug + Send + Sync + 'static {
	/// Erased payload shared by every variant's type, such as `dyn Polymorphic` or a sub-trait of it.
	type Payload: ?Sized + Debug + Send + Sync + 'static;

	/// Variants in declaration order; [`DiscriminatorPlugin::discriminator_for_type`] tests them in this order.
	fn variants() -> &'static [Self];

	/// Serialized form of the variant.
	fn tag(&self) -> &'static str;

	/// Concrete type this variant stands for.
	fn declared_type(&self) -> TypeHandle;

	fn view(payload: &Self::Payload) -> &dyn Polymorphic;

	/// Decodes `tree` as this variant's declared type.
	fn decode_payload(&self, tree: Value) -> Result<Box<Self::Payload>, serde_json::Error>;

	/// Whether this variant corresponds to values of runtime type `ty`.
	fn matches_type(&self, ty: &TypeHandle) -> bool {
		self.declared_type() == *ty
	}
}

/// Why a variant space cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariantDefect {
	#[error("no variants declared")]
	Empty,
	#[error("variant {variant:?} declares {type_name}, which cannot be encoded")]
	NotCodable { variant: &'static str, type_name: &'static str },
	#[error("variants {first:?} and {second:?} both declare {type_name}")]
	DuplicateType {
		first: &'static str,
		second: &'static str,
		type_name: &'static str,
	},
}

static VALIDATED: LazyLock<Mutex<FxHashMap<TypeId, Result<(), VariantDefect>>>> = LazyLock::new(Default::default);

/// Validates the variant space of `D`, at most once per process.
pub fn validate_space<D: TypeDiscriminator>() -> Result<(), CodingError> {
	let outcome = VALIDATED
		.lock()
		.entry(TypeId::of::<D>())
		.or_insert_with(|| {
			let outcome = check_space::<D>();
			debug!(space = type_name::<D>(), variants = D::variants().len(), valid = outcome.is_ok(), "validated variant space");
			outcome
		})
		.clone();
	outcome.map_err(|defect| CodingError::InvalidVariantSpace {
		space: type_name::<D>(),
		defect,
	})
}

fn check_space<D: TypeDiscriminator>() -> Result<(), VariantDefect> {
	let variants = D::variants();
	if variants.is_empty() {
		return Err(VariantDefect::Empty);
	}
	for (index, variant) in variants.iter().enumerate() {
		let declared = variant.declared_type();
		if !declared.is_codable() {
			return Err(VariantDefect::NotCodable {
				variant: variant.tag(),
				type_name: declared.name(),
			});
		}
		if let Some(first) = variants[..index].iter().find(|earlier| earlier.declared_type() == declared) {
			return Err(VariantDefect::DuplicateType {
				first: first.tag(),
				second: variant.tag(),
				type_name: declared.name(),
			});
		}
	}
	Ok(())
}

/// Strategy for a closed [`TypeDiscriminator`] set. Defaults to wrapper placement.
#[derive(Debug, Clone)]
pub struct VariantDiscriminatorPlugin<D> {
	placement: Placement,
	_space: PhantomData<fn() -> D>,
}

impl<D: TypeDiscriminator> Default for VariantDiscriminatorPlugin<D> {
	fn default() -> Self {
		Self::new()
	}
}

impl<D: TypeDiscriminator> VariantDiscriminatorPlugin<D> {
	pub const NAME: &'static str = "variant-discriminator";

	pub fn new() -> Self {
		Self::with_placement(Placement::wrapper())
	}

	pub fn with_placement(placement: Placement) -> Self {
		Self {
			placement,
			_space: PhantomData,
		}
	}

	pub fn placement(&self) -> &Placement {
		&self.placement
	}

	/// Encodes a payload with its variant tag placed beside it.
	pub fn encode_variant(&self, payload: &D::Payload) -> Result<Value, CodingError> {
		let value = D::view(payload);
		let variant = self.discriminator_for_type(&value.dyn_type_handle())?;
		let tree = value.to_tree()?;
		self.encode_discriminator(&variant, tree)
	}

	/// Decodes a tagged tree as the variant's declared type.
	pub fn decode_variant(&self, tree: Value) -> Result<Box<D::Payload>, CodingError> {
		match self.decode_discriminator(tree)? {
			DecodedDiscriminator::Present { discriminator, payload } => {
				let declared = self.type_for_discriminator(&discriminator)?;
				trace!(variant = discriminator.tag(), type_name = declared.name(), "decoding variant payload");
				Ok(discriminator.decode_payload(payload)?)
			}
			DecodedDiscriminator::Absent(_) => Err(CodingError::MissingDiscriminator {
				key: self.placement.discriminator_key().to_owned(),
			}),
		}
	}
}

impl<D: TypeDiscriminator> CodingPlugin for VariantDiscriminatorPlugin<D> {
	fn name(&self) -> &'static str {
		Self::NAME
	}
}

impl<D: TypeDiscriminator> DiscriminatorPlugin for VariantDiscriminatorPlugin<D> {
	type Discriminator = D;

	fn type_for_discriminator(&self, variant: &D) -> Result<TypeHandle, CodingError> {
		validate_space::<D>()?;
		Ok(variant.declared_type())
	}

	fn discriminator_for_type(&self, ty: &TypeHandle) -> Result<D, CodingError> {
		validate_space::<D>()?;
		D::variants()
			.iter()
			.find(|variant| variant.matches_type(ty))
			.copied()
			.ok_or(CodingError::UnknownDiscriminantForType {
				space: type_name::<D>(),
				type_name: ty.name(),
			})
	}

	fn decode_discriminator(&self, tree: Value) -> Result<DecodedDiscriminator<D>, CodingError> {
		let key = self.placement.discriminator_key();
		self.placement.extract(tree)?.try_map(|discriminator| {
			let found = match &discriminator {
				Value::String(tag) => D::variants().iter().find(|variant| variant.tag() == tag.as_str()).copied(),
				_ => None,
			};
			found.ok_or_else(|| CodingError::MalformedDiscriminator {
				key: key.to_owned(),
				reason: format!("{discriminator} is not a variant of {}", type_name::<D>()),
			})
		})
	}

	fn encode_discriminator(&self, variant: &D, payload: Value) -> Result<Value, CodingError> {
		trace!(variant = variant.tag(), key = self.placement.discriminator_key(), "placing variant discriminator");
		self.placement.place(Value::String(variant.tag().to_owned()), payload)
	}
}

/// Variant plugin active in `cx`, or the default-placement plugin when none is.
pub(crate) fn with_variant_plugin<D: TypeDiscriminator, R>(cx: Option<&CodingContext>, f: impl FnOnce(&VariantDiscriminatorPlugin<D>) -> R) -> R {
	match cx.and_then(|cx| cx.plugin::<VariantDiscriminatorPlugin<D>>()) {
		Some(plugin) => f(plugin),
		None => f(&VariantDiscriminatorPlugin::new()),
	}
}

/// Declares a closed discriminator set and binds it to [`PolymorphicField`](crate::PolymorphicField).
///
/// ```ignore
/// type_discriminator! {
/// 	/// Kinds of catalog media.
/// 	pub enum MediaKind: dyn Polymorphic {
/// 		Movie("movie") => Movie,
/// 		Trailer("trailer") => Trailer,
/// 	}
/// }
/// ```
///
/// Each variant names its serialized tag and its concrete type. The payload type is the erased
/// capability every variant type coerces to.
#[macro_export]
macro_rules! type_discriminator {
	(
		$(#[$meta:meta])*
		$vis:vis enum $name:ident : $payload:ty {
			$($(#[$variant_meta:meta])* $variant:ident($tag:literal) => $ty:ty),+ $(,)?
		}
	) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		$vis enum $name {
			$($(#[$variant_meta])* $variant),+
		}

		impl $crate::TypeDiscriminator for $name {
			type Payload = $payload;

			fn variants() -> &'static [Self] {
				&[$(Self::$variant),+]
			}

			fn tag(&self) -> &'static str {
				match self {
					$(Self::$variant => $tag),+
				}
			}

			fn declared_type(&self) -> $crate::__private::TypeHandle {
				match self {
					$(Self::$variant => $crate::__private::TypeHandle::codable::<$ty>()),+
				}
			}

			fn view(payload: &Self::Payload) -> &dyn $crate::__private::Polymorphic {
				payload
			}

			fn decode_payload(
				&self,
				tree: $crate::__private::Value,
			) -> ::std::result::Result<::std::boxed::Box<Self::Payload>, $crate::__private::JsonError> {
				match self {
					$(Self::$variant => {
						let value: $ty = $crate::__private::from_value(tree)?;
						let boxed: ::std::boxed::Box<Self::Payload> = ::std::boxed::Box::new(value);
						::std::result::Result::Ok(boxed)
					}),+
				}
			}
		}

		impl $crate::DiscriminatorSpace for $name {
			type Payload = $payload;

			fn view(payload: &Self::Payload) -> &dyn $crate::__private::Polymorphic {
				payload
			}

			fn erase<T: $crate::__private::Polymorphic>(
				value: T,
			) -> ::std::result::Result<::std::boxed::Box<Self::Payload>, $crate::CodingError> {
				let any: ::std::boxed::Box<dyn ::std::any::Any> = ::std::boxed::Box::new(value);
				$(
					let any = match any.downcast::<$ty>() {
						::std::result::Result::Ok(concrete) => {
							let erased: ::std::boxed::Box<Self::Payload> = concrete;
							return ::std::result::Result::Ok(erased);
						}
						::std::result::Result::Err(other) => other,
					};
				)+
				::std::mem::drop(any);
				::std::result::Result::Err($crate::CodingError::UnknownDiscriminantForType {
					space: ::std::any::type_name::<Self>(),
					type_name: ::std::any::type_name::<T>(),
				})
			}

			fn encode_payload(
				payload: &Self::Payload,
				cx: ::std::option::Option<&$crate::CodingContext>,
			) -> ::std::result::Result<$crate::__private::Value, $crate::CodingError> {
				$crate::__private::encode_variant::<Self>(payload, cx)
			}

			fn decode_payload(
				tree: $crate::__private::Value,
				cx: ::std::option::Option<&$crate::CodingContext>,
			) -> ::std::result::Result<::std::boxed::Box<Self::Payload>, $crate::CodingError> {
				$crate::__private::decode_variant::<Self>(tree, cx)
			}
		}
	};
}
