use crate::handle::TypeHandle;
use crate::identity::IdentityDecl;

/// Source of every identity-bearing type in the running program, consulted by the full scan.
///
/// Called at most once per registry, synchronously, while the registry lock is held. Implementations
/// must not call back into the registry that owns them.
pub trait TypeEnumerator: Send + Sync {
	fn enumerate(&self) -> Vec<TypeHandle>;
}

/// Enumerates nothing; the registry then relies on explicit registration alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTypeEnumeration;

impl TypeEnumerator for NoTypeEnumeration {
	fn enumerate(&self) -> Vec<TypeHandle> {
		Vec::new()
	}
}

/// Enumerates every type declared with [`stable_identity!`](crate::stable_identity) in linked crates.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkedTypes;

impl TypeEnumerator for LinkedTypes {
	fn enumerate(&self) -> Vec<TypeHandle> {
		inventory::iter::<IdentityDecl>.into_iter().map(IdentityDecl::handle).collect()
	}
}

impl<F> TypeEnumerator for F
where
	F: Fn() -> Vec<TypeHandle> + Send + Sync,
{
	fn enumerate(&self) -> Vec<TypeHandle> {
		self()
	}
}
