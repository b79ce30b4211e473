use std::any::Any;
use std::rc::Rc;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, debug_span};

use crate::context::CodingContext;
use crate::error::{CodingError, WireError};
use crate::format::WireFormat;
use crate::plugin::CodingPlugin;

/// Wrapper around a [`WireFormat`] that threads an ordered plugin list through every call.
///
/// Each [`encode`](Self::encode) or [`decode`](Self::decode) builds a fresh [`CodingContext`], so
/// concurrent calls, on one coder or many, share nothing. Without polymorphic fields in the value
/// the coder behaves exactly like the bare format. It caches nothing.
pub struct ModularCoder<F> {
	format: F,
	plugins: Vec<Arc<dyn CodingPlugin>>,
}

impl<F: WireFormat> ModularCoder<F> {
	pub fn new(format: F) -> Self {
		Self { format, plugins: Vec::new() }
	}

	pub fn with_plugin(mut self, plugin: impl CodingPlugin) -> Self {
		self.plugins.push(Arc::new(plugin));
		self
	}

	pub fn push_plugin(&mut self, plugin: Arc<dyn CodingPlugin>) {
		self.plugins.push(plugin);
	}

	/// Drops every plugin of concrete type `P`.
	pub fn without_plugin<P: CodingPlugin>(mut self) -> Self {
		self.plugins.retain(|plugin| !(plugin.as_ref() as &dyn Any).is::<P>());
		self
	}

	pub fn plugins(&self) -> &[Arc<dyn CodingPlugin>] {
		&self.plugins
	}

	pub fn format(&self) -> &F {
		&self.format
	}

	pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<F::Repr, CodingError> {
		let span = debug_span!("encode", format = self.format.name(), plugins = self.plugins.len());
		let _span = span.enter();
		let (result, cx) = self.scoped(|| self.format.encode(value));
		let repr = settle(result, &cx)?;
		debug!(fields = cx.fields_encoded(), "encoded");
		Ok(repr)
	}

	pub fn decode<T: DeserializeOwned>(&self, repr: &F::Repr) -> Result<T, CodingError> {
		let span = debug_span!("decode", format = self.format.name(), plugins = self.plugins.len());
		let _span = span.enter();
		let (result, cx) = self.scoped(|| self.format.decode::<T>(repr));
		let value = settle(result, &cx)?;
		debug!(fields = cx.fields_decoded(), "decoded");
		Ok(value)
	}

	fn scoped<R>(&self, call: impl FnOnce() -> R) -> (R, Rc<CodingContext>) {
		let cx = Rc::new(CodingContext::new(self.plugins.clone()));
		let result = {
			let _scope = Rc::clone(&cx).enter();
			call()
		};
		(result, cx)
	}
}

/// Prefers the typed failure a field recorded over the format's own error message.
fn settle<R>(result: Result<R, WireError>, cx: &CodingContext) -> Result<R, CodingError> {
	match result {
		Ok(value) => Ok(value),
		Err(wire) => Err(cx.take_failure().unwrap_or(CodingError::Wire(wire))),
	}
}

impl<F: std::fmt::Debug> std::fmt::Debug for ModularCoder<F> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ModularCoder")
			.field("format", &self.format)
			.field("plugins", &self.plugins.iter().map(|plugin| plugin.name()).collect::<Vec<_>>())
			.finish()
	}
}
