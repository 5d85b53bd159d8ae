use std::{any::TypeId, collections::HashMap, convert::Infallible, fmt::Debug, sync::Arc};

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::{
    binding::{Concrete, Lifetime, Registration},
    builder::{ContainerOptions, DiBuilder},
    constructor::{Autowire, ErasedConstructor},
    dependency_graph::{DependencyGraph, DependencyGraphErrors},
    errors::ResolveError,
    handle::DiHandle,
    types::{DynError, Injectable, Instance, TypeInfo, Upcast},
};

/// Registry of bindings and the types it knows how to construct
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct DiContainer(pub(crate) Arc<DiContainerInner>);
pub struct DiContainerInner {
    registry: RwLock<Registry>,
    options: ContainerOptions,
}

#[derive(Default)]
pub(crate) struct Registry {
    pub bindings: HashMap<TypeId, Registration>,
    /// Constructors of all registered types
    pub catalog: HashMap<TypeId, Arc<ErasedConstructor>>,
}

impl Debug for DiContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.0.registry.read();
        let mut map = f.debug_struct("DiContainer");
        for registration in registry.bindings.values() {
            map.field(
                registration.info.type_name,
                &format_args!(
                    "{:?} {}",
                    registration.concrete,
                    registration.lifetime.describe()
                ),
            );
        }
        map.finish()
    }
}

impl Default for DiContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiContainer {
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    pub fn with_options(options: ContainerOptions) -> Self {
        Self(Arc::new(DiContainerInner {
            registry: RwLock::new(Registry::default()),
            options,
        }))
    }

    pub fn builder() -> DiBuilder {
        DiBuilder::new()
    }

    pub fn options(&self) -> ContainerOptions {
        self.0.options
    }
}

// Registration
impl DiContainer {
    /// Makes `C` known to the container, so it can be auto-constructed
    pub fn register<C: Autowire>(&self) -> &Self {
        let constructor = ErasedConstructor::of::<C>();
        tracing::debug!("Registered constructor of {}", constructor.info);

        self.0
            .registry
            .write()
            .catalog
            .insert(constructor.info.type_id, Arc::new(constructor));
        self
    }

    /// Binds `T` to itself: resolving `T` auto-constructs `T`
    ///
    /// Like every `bind*`, this keeps the cache slot of an earlier singleton binding,
    /// a populated slot keeps being returned.
    pub fn bind<T: ?Sized + Injectable>(&self) -> &Self {
        self.insert::<T>(Concrete::itself::<T>(), None)
    }

    /// Binds `A` to the concrete type `C`: resolving `A` auto-constructs a `C`
    pub fn bind_to<A, C>(&self) -> &Self
    where
        A: ?Sized + Injectable,
        C: Upcast<A>,
    {
        self.insert::<A>(Concrete::to::<A, C>(), None)
    }

    /// Binds `A` to a factory, called on every resolution
    pub fn bind_factory<A, F, E>(&self, factory: F) -> &Self
    where
        A: ?Sized + Injectable,
        F: Fn(&DiHandle<'_>) -> Result<Arc<A>, E> + Send + Sync + 'static,
        E: Into<DynError>,
    {
        self.insert::<A>(Concrete::factory(factory), None)
    }

    /// Like [bind](Self::bind), but the first constructed instance is reused
    pub fn singleton<T: ?Sized + Injectable>(&self) -> &Self {
        self.insert::<T>(Concrete::itself::<T>(), Some(Lifetime::singleton()))
    }

    /// Like [bind_to](Self::bind_to), but the first constructed instance is reused
    pub fn singleton_to<A, C>(&self) -> &Self
    where
        A: ?Sized + Injectable,
        C: Upcast<A>,
    {
        self.insert::<A>(Concrete::to::<A, C>(), Some(Lifetime::singleton()))
    }

    /// Like [bind_factory](Self::bind_factory), but the factory runs at most once
    pub fn singleton_factory<A, F, E>(&self, factory: F) -> &Self
    where
        A: ?Sized + Injectable,
        F: Fn(&DiHandle<'_>) -> Result<Arc<A>, E> + Send + Sync + 'static,
        E: Into<DynError>,
    {
        self.insert::<A>(Concrete::factory(factory), Some(Lifetime::singleton()))
    }

    /// Binds `A` to an already created instance
    pub fn instance<A: ?Sized + Injectable>(&self, instance: Arc<A>) -> &Self {
        let slot = OnceCell::with_value(Instance::new(instance.clone()));
        let concrete = Concrete::factory(move |_| Ok::<_, Infallible>(instance.clone()));

        self.insert::<A>(concrete, Some(Lifetime::Singleton(Arc::new(slot))))
    }

    /// Adds or replaces the binding of `A`
    ///
    /// `Some` installs the given lifetime, discarding any previous cache slot.
    /// `None` keeps the cache slot of a previous singleton binding, or is transient.
    fn insert<A: ?Sized + Injectable>(
        &self,
        concrete: Concrete,
        lifetime: Option<Lifetime>,
    ) -> &Self {
        let info = TypeInfo::of::<A>();
        let mut registry = self.0.registry.write();
        let previous = registry.bindings.get(&info.type_id).map(|r| &r.lifetime);

        let lifetime = match (lifetime, previous) {
            (Some(lifetime), Some(replaced)) => {
                if replaced.cached().is_some() {
                    tracing::warn!("Rebinding {} discards its cached singleton", info.type_name);
                }
                lifetime
            }
            (Some(lifetime), None) => lifetime,
            (None, Some(kept @ Lifetime::Singleton(_))) => kept.clone(),
            (None, _) => Lifetime::Transient,
        };

        tracing::debug!(
            "Binding {} to {:?} ({})",
            info.type_name,
            concrete,
            lifetime.describe()
        );

        registry.bindings.insert(
            info.type_id,
            Registration {
                info,
                concrete,
                lifetime,
            },
        );
        self
    }
}

// Resolution
impl DiContainer {
    /// Resolves the type bound under `T`
    ///
    /// Singletons are constructed on first resolution and shared afterwards,
    /// other bindings produce a new instance on every call.
    pub fn resolve<T: ?Sized + Injectable>(&self) -> Result<Arc<T>, ResolveError> {
        DiHandle::root(self).resolve()
    }

    /// Returns true if anything is bound under `T`
    pub fn contains<T: ?Sized + Injectable>(&self) -> bool {
        self.0
            .registry
            .read()
            .bindings
            .contains_key(&TypeId::of::<T>())
    }

    /// Returns true if `T` is bound as a singleton
    pub fn is_singleton<T: ?Sized + Injectable>(&self) -> bool {
        matches!(
            self.0.registry.read().bindings.get(&TypeId::of::<T>()),
            Some(Registration {
                lifetime: Lifetime::Singleton(_),
                ..
            })
        )
    }

    /// Snapshot of the current bindings as a dependency graph
    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::new(&self.0.registry.read())
    }

    /// Statically checks every binding without constructing anything
    ///
    /// Reports missing bindings, types unknown to the container, untyped parameters
    /// and dependency cycles. Factories are opaque and not looked into.
    pub fn validate(&self) -> Result<(), DependencyGraphErrors> {
        self.graph().check()
    }

    // The lock is released before any user code runs, factories may register bindings
    pub(crate) fn registration(&self, type_id: TypeId) -> Option<Registration> {
        self.0.registry.read().bindings.get(&type_id).cloned()
    }

    pub(crate) fn constructor(&self, type_id: TypeId) -> Option<Arc<ErasedConstructor>> {
        self.0.registry.read().catalog.get(&type_id).cloned()
    }
}
