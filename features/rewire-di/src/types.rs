use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// Errors coming out of user factories and constructors
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// The registry is shared between threads
/// So anything injectable needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: ?Sized + Send + Sync + 'static> Injectable for T {}

/// Type erased instance, always wrapping an `Arc<T>` of the type named by `info`
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    pub instance: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub(crate) fn new<T: ?Sized + Injectable>(instance: Arc<T>) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            instance: Arc::new(instance),
        }
    }

    /// Returns the wrapped `Arc<T>`, or the name of the actual type on mismatch
    pub fn downcast<T: ?Sized + Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match self.instance.downcast_ref::<Arc<T>>() {
            Some(downcasted) => Ok(downcasted.clone()),
            None => Err(self.info.type_name),
        }
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

/// Type Name and Type Id
///
/// Identifies both abstract types (`dyn Trait`) and concrete types.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// Converts a shared concrete instance into the abstract type it is bound to
///
/// Every sized type upcasts to itself. Trait object impls are usually written with
/// [`implements!`](crate::implements).
pub trait Upcast<Abstract: ?Sized>: Injectable {
    fn upcast(this: Arc<Self>) -> Arc<Abstract>;
}
impl<T: Injectable> Upcast<T> for T {
    fn upcast(this: Arc<Self>) -> Arc<T> {
        this
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: Send + Sync {
        fn name(&self) -> &str;
    }
    struct Fixed;
    impl Named for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn instance_keeps_identity_of_wrapped_arc() {
        let original = Arc::new(String::from("value"));
        let instance = Instance::new(original.clone());

        let back = instance.downcast::<String>().unwrap();
        assert!(Arc::ptr_eq(&original, &back));
        assert_eq!(instance.info, TypeInfo::of::<String>());
    }

    #[test]
    fn instance_of_trait_object() {
        let named: Arc<dyn Named> = Arc::new(Fixed);
        let instance = Instance::new(named);

        assert_eq!(instance.downcast::<dyn Named>().unwrap().name(), "fixed");
    }

    #[test]
    fn downcast_mismatch_names_actual_type() {
        let instance = Instance::new(Arc::new(5_u32));

        let actual = instance.downcast::<String>().unwrap_err();
        assert_eq!(actual, std::any::type_name::<u32>());
    }

    #[test]
    fn type_info_displays_type_name() {
        assert_eq!(TypeInfo::of::<u8>().to_string(), "u8");
        assert_ne!(TypeInfo::of::<u8>(), TypeInfo::of::<u16>());
    }
}
