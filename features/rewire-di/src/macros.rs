/// Implements [`Autowire`](crate::Autowire) from a constructor signature
///
/// Parameter types are the types to resolve, the constructor receives each as an `Arc`.
///
/// ```rust
/// use std::sync::Arc;
/// use rewire_di::{autowire, DiContainer};
///
/// #[derive(Default)]
/// struct Database;
///
/// struct Repository {
///     db: Arc<Database>,
/// }
/// impl Repository {
///     fn new(db: Arc<Database>) -> Self {
///         Repository { db }
///     }
/// }
///
/// // No declared constructor, built with `Default`
/// autowire!(impl Database;);
/// autowire! {
///     impl Repository {
///         fn new(db: Database);
///     }
/// }
///
/// let container = DiContainer::new();
/// container
///     .register::<Database>()
///     .register::<Repository>()
///     .singleton::<Database>()
///     .bind::<Repository>();
///
/// let repository = container.resolve::<Repository>().unwrap();
/// assert!(Arc::ptr_eq(&repository.db, &container.resolve::<Database>().unwrap()));
/// ```
#[macro_export]
macro_rules! autowire {
    (impl $ty:ty { fn $ctor:ident ( $( $param:ident : $dep:ty ),* $(,)? ); }) => {
        impl $crate::Autowire for $ty {
            fn constructor() -> $crate::Constructor<Self> {
                $crate::Constructor::new(
                    ::std::vec![ $( $crate::Parameter::typed::<$dep>(::std::stringify!($param)) ),* ],
                    |_args: &mut $crate::Arguments| {
                        ::std::result::Result::Ok::<_, $crate::ResolveError>(
                            <$ty>::$ctor( $( _args.take::<$dep>()? ),* )
                        )
                    },
                )
            }
        }
    };
    (impl $ty:ty;) => {
        impl $crate::Autowire for $ty {
            fn constructor() -> $crate::Constructor<Self> {
                $crate::Constructor::without_parameters(<$ty as ::std::default::Default>::default)
            }
        }
    };
}

/// Lets a concrete type be bound to the trait objects it implements
///
/// ```rust
/// use rewire_di::{autowire, implements, DiContainer};
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// #[derive(Default)]
/// struct FixedClock;
/// impl Clock for FixedClock {
///     fn now(&self) -> u64 {
///         42
///     }
/// }
///
/// autowire!(impl FixedClock;);
/// implements!(FixedClock => dyn Clock);
///
/// let container = DiContainer::new();
/// container
///     .register::<FixedClock>()
///     .bind_to::<dyn Clock, FixedClock>();
///
/// assert_eq!(container.resolve::<dyn Clock>().unwrap().now(), 42);
/// ```
#[macro_export]
macro_rules! implements {
    ($concrete:ty => $( $abstract:ty ),+ $(,)?) => {
        $(
            impl $crate::Upcast<$abstract> for $concrete {
                fn upcast(this: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$abstract> {
                    this
                }
            }
        )+
    };
}
