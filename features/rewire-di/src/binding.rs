use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::{
    errors::ResolveError,
    handle::DiHandle,
    types::{DynError, Injectable, Instance, TypeInfo, Upcast},
};

type FactoryFn = dyn Fn(&DiHandle<'_>) -> Result<Instance, ResolveError> + Send + Sync;
type UpcastFn = dyn Fn(Instance) -> Result<Instance, ResolveError> + Send + Sync;

/// How a bound type is produced
#[derive(Clone)]
pub(crate) enum Concrete {
    /// User supplied factory
    Factory(Arc<FactoryFn>),
    /// Auto construct `target` from the type catalog, then convert it to the bound type
    Type {
        target: TypeInfo,
        upcast: Arc<UpcastFn>,
    },
}

impl Concrete {
    pub fn factory<A, F, E>(factory: F) -> Self
    where
        A: ?Sized + Injectable,
        F: Fn(&DiHandle<'_>) -> Result<Arc<A>, E> + Send + Sync + 'static,
        E: Into<DynError>,
    {
        let product = TypeInfo::of::<A>();
        Concrete::Factory(erase_factory(move |handle| match factory(handle) {
            Ok(instance) => Ok(Instance::new(instance)),
            Err(error) => Err(ResolveError::from_dyn(product, error.into())),
        }))
    }

    /// The bound type is also the type to construct
    pub fn itself<T: ?Sized + Injectable>() -> Self {
        Concrete::Type {
            target: TypeInfo::of::<T>(),
            upcast: Arc::new(Ok::<Instance, ResolveError>),
        }
    }

    pub fn to<A, C>() -> Self
    where
        A: ?Sized + Injectable,
        C: Upcast<A>,
    {
        Concrete::Type {
            target: TypeInfo::of::<C>(),
            upcast: Arc::new(|built: Instance| -> Result<Instance, ResolveError> {
                let concrete = built.downcast::<C>().map_err(|actual_type| {
                    ResolveError::DowncastFailed {
                        required_type: std::any::type_name::<C>(),
                        actual_type,
                    }
                })?;
                Ok(Instance::new::<A>(<C as Upcast<A>>::upcast(concrete)))
            }),
        }
    }
}

fn erase_factory<F>(factory: F) -> Arc<FactoryFn>
where
    F: Fn(&DiHandle<'_>) -> Result<Instance, ResolveError> + Send + Sync + 'static,
{
    Arc::new(factory)
}

impl std::fmt::Debug for Concrete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Concrete::Factory(_) => f.write_str("factory"),
            Concrete::Type { target, .. } => write!(f, "type({target})"),
        }
    }
}

/// Whether produced instances are cached
#[derive(Clone)]
pub(crate) enum Lifetime {
    Transient,
    /// Cache slot, empty until first resolution
    Singleton(Arc<OnceCell<Instance>>),
}

impl Lifetime {
    pub fn singleton() -> Self {
        Lifetime::Singleton(Arc::new(OnceCell::new()))
    }

    pub fn cached(&self) -> Option<&Instance> {
        match self {
            Lifetime::Transient => None,
            Lifetime::Singleton(slot) => slot.get(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Lifetime::Transient => "transient",
            Lifetime::Singleton(slot) if slot.get().is_some() => "singleton(populated)",
            Lifetime::Singleton(_) => "singleton(empty)",
        }
    }
}

/// A binding of an abstract type
#[derive(Clone)]
pub(crate) struct Registration {
    pub info: TypeInfo,
    pub concrete: Concrete,
    pub lifetime: Lifetime,
}
