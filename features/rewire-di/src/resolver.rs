use std::{
    fmt::Debug,
    sync::{Arc, Weak},
};

use once_cell::sync::OnceCell;

use crate::{
    container::{DiContainer, DiContainerInner},
    errors::ResolveError,
    types::Injectable,
};

/// Lazily resolved dependency
///
/// Resolution happens on first access, from a fresh chain, so two types can refer to
/// each other as long as one side only holds a `Lazy`.
/// The result of the first access, success or failure, is kept.
///
/// Holds a weak reference to its container, the container owning an instance which
/// holds a `Lazy` does not keep itself alive.
pub struct Lazy<T: ?Sized + Injectable> {
    registry: Weak<DiContainerInner>,
    once: OnceCell<Result<Arc<T>, ResolveError>>,
}

impl<T: ?Sized + Injectable> Lazy<T> {
    pub(crate) fn new(container: &DiContainer) -> Self {
        Lazy {
            registry: Arc::downgrade(&container.0),
            once: OnceCell::new(),
        }
    }

    /// Accesses the lazy dependency, resolving it on first use
    pub fn get(&self) -> Result<&Arc<T>, &ResolveError> {
        self.once
            .get_or_init(|| match self.registry.upgrade() {
                Some(inner) => DiContainer(inner).resolve::<T>(),
                None => Err(ResolveError::ContainerDropped),
            })
            .as_ref()
    }

    /// Accesses the dependency only if it was already resolved
    pub fn try_get(&self) -> Option<Result<&Arc<T>, &ResolveError>> {
        self.once.get().map(Result::as_ref)
    }
}

impl<T: ?Sized + Injectable> Debug for Lazy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.try_get() {
            None => "pending",
            Some(Ok(_)) => "resolved",
            Some(Err(_)) => "failed",
        };
        f.debug_tuple("Lazy")
            .field(&std::any::type_name::<T>())
            .field(&state)
            .finish()
    }
}
