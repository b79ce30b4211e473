//! Call-scoped state shared by every nested (de)serialization step of one top-level call.
//!
//! # Scoping
//!
//! A [`ModularCoder`](crate::ModularCoder) builds one [`CodingContext`] per top-level call and
//! [`enter`](CodingContext::enter)s it for the duration of that call. Entered contexts form a
//! thread-local stack, so a nested top-level call made from inside a serde callback sees its own
//! context and restores the outer one when it returns.
//!
//! Contexts are `!Send` and `!Sync`: concurrent calls on different threads can never observe each
//! other's context.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::CodingError;
use crate::plugin::CodingPlugin;

thread_local! {
	static SCOPE: RefCell<Vec<Rc<CodingContext>>> = const { RefCell::new(Vec::new()) };
}

pub struct CodingContext {
	plugins: Vec<Arc<dyn CodingPlugin>>,
	failure: RefCell<Option<CodingError>>,
	encoded: Cell<usize>,
	decoded: Cell<usize>,
}

impl CodingContext {
	pub fn new(plugins: Vec<Arc<dyn CodingPlugin>>) -> Self {
		Self {
			plugins,
			failure: RefCell::new(None),
			encoded: Cell::new(0),
			decoded: Cell::new(0),
		}
	}

	/// Innermost entered context on this thread.
	pub fn current() -> Option<Rc<CodingContext>> {
		SCOPE.with_borrow(|scope| scope.last().cloned())
	}

	/// Makes this context current until the guard drops.
	pub fn enter(self: Rc<Self>) -> ContextGuard {
		SCOPE.with_borrow_mut(|scope| scope.push(self));
		ContextGuard { _not_send: PhantomData }
	}

	pub fn plugins(&self) -> &[Arc<dyn CodingPlugin>] {
		&self.plugins
	}

	/// First plugin of concrete type `P`, in coder order.
	pub fn plugin<P: CodingPlugin>(&self) -> Option<&P> {
		self.plugins.iter().find_map(|plugin| (plugin.as_ref() as &dyn Any).downcast_ref::<P>())
	}

	/// Records a typed failure; only the first one per call is kept.
	pub fn record_failure(&self, err: CodingError) {
		let mut failure = self.failure.borrow_mut();
		if failure.is_none() {
			*failure = Some(err);
		}
	}

	pub fn take_failure(&self) -> Option<CodingError> {
		self.failure.borrow_mut().take()
	}

	/// Polymorphic fields encoded so far in this call.
	pub fn fields_encoded(&self) -> usize {
		self.encoded.get()
	}

	/// Polymorphic fields decoded so far in this call.
	pub fn fields_decoded(&self) -> usize {
		self.decoded.get()
	}

	pub(crate) fn note_encoded(&self) {
		self.encoded.set(self.encoded.get() + 1);
	}

	pub(crate) fn note_decoded(&self) {
		self.decoded.set(self.decoded.get() + 1);
	}
}

/// Hands a typed failure to the enclosing call and returns the message serde will carry.
pub(crate) fn surface(cx: Option<&CodingContext>, err: CodingError) -> String {
	let message = err.to_string();
	if let Some(cx) = cx {
		cx.record_failure(err);
	}
	message
}

impl std::fmt::Debug for CodingContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CodingContext")
			.field("plugins", &self.plugins.iter().map(|plugin| plugin.name()).collect::<Vec<_>>())
			.field("encoded", &self.encoded.get())
			.field("decoded", &self.decoded.get())
			.finish_non_exhaustive()
	}
}

/// Pops the entered context on drop.
#[must_use = "the context is only current while the guard is alive"]
pub struct ContextGuard {
	_not_send: PhantomData<Rc<()>>,
}

impl Drop for ContextGuard {
	fn drop(&mut self) {
		SCOPE.with_borrow_mut(|scope| {
			scope.pop();
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Marker(&'static str);

	impl CodingPlugin for Marker {
		fn name(&self) -> &'static str {
			self.0
		}
	}

	#[test]
	fn scopes_nest_and_unwind() {
		assert!(CodingContext::current().is_none());
		let outer = Rc::new(CodingContext::new(vec![Arc::new(Marker("outer"))]));
		{
			let _outer = Rc::clone(&outer).enter();
			let inner = Rc::new(CodingContext::new(Vec::new()));
			{
				let _inner = Rc::clone(&inner).enter();
				assert!(Rc::ptr_eq(&CodingContext::current().unwrap(), &inner));
			}
			assert!(Rc::ptr_eq(&CodingContext::current().unwrap(), &outer));
		}
		assert!(CodingContext::current().is_none());
	}

	#[test]
	fn plugin_lookup_takes_first_of_type() {
		let cx = CodingContext::new(vec![Arc::new(Marker("first")), Arc::new(Marker("second"))]);
		assert_eq!(cx.plugin::<Marker>().map(|m| m.0), Some("first"));
	}

	#[test]
	fn first_failure_wins() {
		let cx = CodingContext::new(Vec::new());
		cx.record_failure(CodingError::MalformedEnvelope("first".into()));
		cx.record_failure(CodingError::MalformedEnvelope("second".into()));
		assert!(matches!(cx.take_failure(), Some(CodingError::MalformedEnvelope(m)) if m == "first"));
		assert!(cx.take_failure().is_none());
	}
}
