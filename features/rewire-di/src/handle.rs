use std::{cell::RefCell, sync::Arc};

use crate::{
    binding::{Concrete, Lifetime, Registration},
    container::DiContainer,
    errors::ResolveError,
    resolver::Lazy,
    types::{Injectable, Instance, TypeInfo},
};

thread_local! {
    /// Chains of the factories and constructors running on this thread, innermost last
    static ACTIVE_CHAINS: RefCell<Vec<(usize, Vec<TypeInfo>)>> = const { RefCell::new(Vec::new()) };
}

/// Publishes a chain while user code runs, popped on drop
struct ActiveChainGuard;
impl ActiveChainGuard {
    fn push(handle: &DiHandle<'_>) -> Self {
        ACTIVE_CHAINS.with(|active| {
            active
                .borrow_mut()
                .push((container_id(handle.container), handle.chain.clone()))
        });
        ActiveChainGuard
    }
}
impl Drop for ActiveChainGuard {
    fn drop(&mut self) {
        ACTIVE_CHAINS.with(|active| {
            active.borrow_mut().pop();
        });
    }
}

fn container_id(container: &DiContainer) -> usize {
    Arc::as_ptr(&container.0) as usize
}

/// DI Handle for resolving dependencies from the container.
///
/// A handle tracks the chain of types currently under construction, factories receive
/// one so the dependencies they resolve are part of the same chain.
pub struct DiHandle<'c> {
    container: &'c DiContainer,
    chain: Vec<TypeInfo>,
}

impl<'c> DiHandle<'c> {
    /// Handle for a resolution entering `container`
    ///
    /// Inside a factory of the same container on this thread, the factory's chain is
    /// continued, so resolving through [container](Self::container) still detects cycles.
    pub(crate) fn root(container: &'c DiContainer) -> Self {
        let id = container_id(container);
        let chain = ACTIVE_CHAINS.with(|active| {
            active
                .borrow()
                .iter()
                .rev()
                .find(|(owner, _)| *owner == id)
                .map(|(_, chain)| chain.clone())
        });

        DiHandle {
            container,
            chain: chain.unwrap_or_default(),
        }
    }

    /// The container this handle resolves from
    ///
    /// Resolving through it while this handle's factory runs continues the same chain.
    pub fn container(&self) -> &'c DiContainer {
        self.container
    }

    /// Types currently being resolved, outermost first
    pub fn chain(&self) -> &[TypeInfo] {
        &self.chain
    }

    /// Resolves the type bound under `T`
    pub fn resolve<T: ?Sized + Injectable>(&self) -> Result<Arc<T>, ResolveError> {
        let instance = self.resolve_instance(TypeInfo::of::<T>())?;

        instance
            .downcast::<T>()
            .map_err(|actual_type| ResolveError::DowncastFailed {
                required_type: std::any::type_name::<T>(),
                actual_type,
            })
    }

    /// Resolves `T`, or `None` if nothing is bound under it
    ///
    /// Only a missing binding for `T` itself is tolerated, failures further down still surface.
    pub fn resolve_optional<T: ?Sized + Injectable>(
        &self,
    ) -> Result<Option<Arc<T>>, ResolveError> {
        match self.resolve::<T>() {
            Ok(resolved) => Ok(Some(resolved)),
            Err(ResolveError::BindingNotFound(missing)) if missing == TypeInfo::of::<T>() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Defers resolving `T` until the returned [Lazy] is first accessed
    pub fn resolve_lazy<T: ?Sized + Injectable>(&self) -> Lazy<T> {
        Lazy::new(self.container)
    }

    pub(crate) fn resolve_instance(&self, info: TypeInfo) -> Result<Instance, ResolveError> {
        let Some(registration) = self.container.registration(info.type_id) else {
            tracing::debug!("No binding found for {}", info.type_name);
            return Err(ResolveError::BindingNotFound(info));
        };

        if let Some(cached) = registration.lifetime.cached() {
            tracing::trace!("Using cached singleton of {}", info.type_name);
            return Ok(cached.clone());
        }

        let handle = self.descend(info)?;
        match &registration.lifetime {
            Lifetime::Transient => handle.produce(&registration),
            // At most one thread runs the initializer, others wait for its result
            Lifetime::Singleton(slot) => slot
                .get_or_try_init(|| handle.produce(&registration))
                .cloned(),
        }
    }

    /// Handle for resolving the dependencies of `info`
    fn descend(&self, info: TypeInfo) -> Result<DiHandle<'c>, ResolveError> {
        let options = self.container.options();
        let seen = self.chain.contains(&info);

        let mut chain = Vec::with_capacity(self.chain.len() + 1);
        chain.extend_from_slice(&self.chain);
        chain.push(info);

        if options.detect_cycles && seen {
            tracing::error!("Circular dependency detected while resolving {}", info);
            return Err(ResolveError::CircularDependency { chain });
        }

        if let Some(limit) = options.max_depth {
            if chain.len() > limit {
                return Err(ResolveError::DepthExceeded { limit, chain });
            }
        }

        Ok(DiHandle {
            container: self.container,
            chain,
        })
    }

    fn produce(&self, registration: &Registration) -> Result<Instance, ResolveError> {
        let instance = {
            let _active = ActiveChainGuard::push(self);
            match &registration.concrete {
                Concrete::Factory(factory) => factory(self)?,
                Concrete::Type { target, upcast } => upcast(self.build(*target)?)?,
            }
        };

        tracing::debug!(
            "Constructed instance of {} ({})",
            registration.info.type_name,
            registration.lifetime.describe()
        );
        Ok(instance)
    }

    /// Auto-constructs `target` by resolving its declared constructor parameters in order
    fn build(&self, target: TypeInfo) -> Result<Instance, ResolveError> {
        let constructor = self
            .container
            .constructor(target.type_id)
            .ok_or(ResolveError::UninstantiableType(target))?;

        let Some(parameters) = &constructor.parameters else {
            return constructor.instantiate(Vec::new());
        };

        let mut dependencies = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            let declared = parameter
                .declared
                .ok_or(ResolveError::UnresolvableParameter {
                    parameter: parameter.name,
                    owner: target,
                })?;

            dependencies.push(self.resolve_instance(declared)?);
        }

        constructor.instantiate(dependencies)
    }
}
