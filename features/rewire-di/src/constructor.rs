use std::sync::Arc;

use crate::{
    errors::ResolveError,
    types::{DynError, Injectable, Instance, TypeInfo},
};

/// A type the container can build on its own
///
/// The implementation declares the type's constructor: which parameters it takes,
/// in which order, and how to call it once they are resolved.
/// Usually generated with [`autowire!`](crate::autowire).
pub trait Autowire: Injectable + Sized {
    fn constructor() -> Constructor<Self>;
}

/// A declared constructor parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub name: &'static str,
    /// The type to resolve the parameter by, `None` if it has no injectable type
    pub declared: Option<TypeInfo>,
}
impl Parameter {
    pub fn typed<T: ?Sized + Injectable>(name: &'static str) -> Self {
        Parameter {
            name,
            declared: Some(TypeInfo::of::<T>()),
        }
    }

    /// A parameter the container has no type for, e.g. a plain `u16` port
    pub fn untyped(name: &'static str) -> Self {
        Parameter {
            name,
            declared: None,
        }
    }
}

type InstantiateFn<T> = Box<dyn Fn(&mut Arguments) -> Result<T, DynError> + Send + Sync>;

/// Declared constructor of `T`
pub struct Constructor<T> {
    parameters: Option<Vec<Parameter>>,
    instantiate: InstantiateFn<T>,
}

impl<T: Injectable> Constructor<T> {
    /// Constructor taking `parameters` positionally
    pub fn new<F, E>(parameters: Vec<Parameter>, instantiate: F) -> Self
    where
        F: Fn(&mut Arguments) -> Result<T, E> + Send + Sync + 'static,
        E: Into<DynError>,
    {
        Constructor {
            parameters: Some(parameters),
            instantiate: Box::new(move |args: &mut Arguments| -> Result<T, DynError> {
                instantiate(args).map_err(Into::into)
            }),
        }
    }

    /// The type has no declared constructor and is built without arguments
    pub fn without_parameters<F>(make: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Constructor {
            parameters: None,
            instantiate: Box::new(move |_: &mut Arguments| -> Result<T, DynError> { Ok(make()) }),
        }
    }

    pub fn parameters(&self) -> Option<&[Parameter]> {
        self.parameters.as_deref()
    }
}

/// Positional arguments handed to a constructor, in declaration order
pub struct Arguments {
    owner: TypeInfo,
    values: std::vec::IntoIter<Instance>,
    position: usize,
}
impl Arguments {
    pub(crate) fn new(owner: TypeInfo, values: Vec<Instance>) -> Self {
        Arguments {
            owner,
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Takes the next argument
    pub fn take<T: ?Sized + Injectable>(&mut self) -> Result<Arc<T>, ResolveError> {
        let position = self.position;
        self.position += 1;

        let value = self.values.next().ok_or(ResolveError::MissingArgument {
            owner: self.owner,
            position,
        })?;

        value
            .downcast::<T>()
            .map_err(|actual_type| ResolveError::DowncastFailed {
                required_type: std::any::type_name::<T>(),
                actual_type,
            })
    }

    /// Number of arguments not taken yet
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

type ErasedInstantiateFn = Box<dyn Fn(Arguments) -> Result<Instance, ResolveError> + Send + Sync>;

/// Constructor with its product type erased, as stored in the catalog
pub(crate) struct ErasedConstructor {
    pub info: TypeInfo,
    pub parameters: Option<Vec<Parameter>>,
    instantiate: ErasedInstantiateFn,
}
impl ErasedConstructor {
    pub fn of<T: Autowire>() -> Self {
        let Constructor {
            parameters,
            instantiate,
        } = T::constructor();
        let info = TypeInfo::of::<T>();

        ErasedConstructor {
            info,
            parameters,
            instantiate: Box::new(move |mut args: Arguments| -> Result<Instance, ResolveError> {
                let product = instantiate(&mut args)
                    .map_err(|error| ResolveError::from_dyn(info, error))?;

                if args.remaining() > 0 {
                    tracing::warn!(
                        "Constructor of {} left {} declared arguments untaken",
                        info,
                        args.remaining()
                    );
                }
                Ok(Instance::new(Arc::new(product)))
            }),
        }
    }

    pub fn instantiate(&self, dependencies: Vec<Instance>) -> Result<Instance, ResolveError> {
        (self.instantiate)(Arguments::new(self.info, dependencies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Engine;
    struct Car {
        engine: Arc<Engine>,
        seats: u8,
    }
    impl Autowire for Car {
        fn constructor() -> Constructor<Self> {
            Constructor::new(vec![Parameter::typed::<Engine>("engine")], |args| {
                Ok::<_, ResolveError>(Car {
                    engine: args.take::<Engine>()?,
                    seats: 4,
                })
            })
        }
    }

    #[derive(Default)]
    struct Bare;
    impl Autowire for Bare {
        fn constructor() -> Constructor<Self> {
            Constructor::without_parameters(Bare::default)
        }
    }

    #[test]
    fn instantiates_with_positional_arguments() {
        let ctor = ErasedConstructor::of::<Car>();
        let engine = Arc::new(Engine);

        let car = ctor
            .instantiate(vec![Instance::new(engine.clone())])
            .unwrap()
            .downcast::<Car>()
            .unwrap();

        assert!(Arc::ptr_eq(&car.engine, &engine));
        assert_eq!(car.seats, 4);
    }

    #[test]
    fn missing_argument_is_reported_with_position() {
        let ctor = ErasedConstructor::of::<Car>();

        let err = ctor.instantiate(vec![]).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::MissingArgument { owner, position: 0 } if owner == TypeInfo::of::<Car>()
        ));
    }

    #[test]
    fn wrong_argument_type_fails_downcast() {
        let ctor = ErasedConstructor::of::<Car>();

        let err = ctor
            .instantiate(vec![Instance::new(Arc::new(Bare))])
            .unwrap_err();
        assert!(matches!(err, ResolveError::DowncastFailed { .. }));
    }

    #[test]
    fn no_declared_constructor() {
        let ctor = ErasedConstructor::of::<Bare>();

        assert!(ctor.parameters.is_none());
        assert!(ctor.instantiate(vec![]).unwrap().downcast::<Bare>().is_ok());
    }

    #[test]
    fn parameter_declarations() {
        assert_eq!(
            Parameter::typed::<Engine>("engine").declared,
            Some(TypeInfo::of::<Engine>())
        );
        assert_eq!(Parameter::untyped("port").declared, None);
    }

    #[test]
    fn declared_parameters_are_exposed() {
        assert_eq!(
            Car::constructor().parameters(),
            Some(&[Parameter::typed::<Engine>("engine")][..])
        );
        assert_eq!(Bare::constructor().parameters(), None);
    }

    #[test]
    fn arguments_are_taken_in_order() {
        let mut args = Arguments::new(
            TypeInfo::of::<Car>(),
            vec![
                Instance::new(Arc::new(Engine)),
                Instance::new(Arc::new(Bare)),
            ],
        );
        assert_eq!(args.remaining(), 2);

        assert!(args.take::<Engine>().is_ok());
        assert_eq!(args.remaining(), 1);
        assert!(args.take::<Bare>().is_ok());
        assert_eq!(args.remaining(), 0);

        assert!(matches!(
            args.take::<Engine>(),
            Err(ResolveError::MissingArgument { position: 2, .. })
        ));
    }
}
