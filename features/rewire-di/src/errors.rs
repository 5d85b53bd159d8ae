use std::sync::Arc;

use thiserror::Error;

use crate::types::{DynError, TypeInfo};

/// Errors when trying to resolve a type
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// Nothing is bound under the requested type
    #[error("No binding found for '{0}'")]
    BindingNotFound(TypeInfo),
    /// The type to construct is not known to the type catalog
    #[error("Cannot instantiate '{0}' - register it or bind it to a concrete type")]
    UninstantiableType(TypeInfo),
    /// A constructor parameter has no declared type to resolve by
    #[error("Cannot resolve parameter '{parameter}' in '{owner}'")]
    UnresolvableParameter {
        parameter: &'static str,
        owner: TypeInfo,
    },
    /// The type is already being constructed further up the chain
    #[error("Circular dependency while resolving '{}': {}", chain_target(.chain), display_chain(.chain))]
    CircularDependency { chain: Vec<TypeInfo> },
    /// The resolution chain grew past the configured limit
    #[error("Resolution depth limit of {limit} exceeded: {}", display_chain(.chain))]
    DepthExceeded { limit: usize, chain: Vec<TypeInfo> },
    /// A factory or constructor returned an error
    #[error("Factory for '{product}' failed - error: {error}")]
    FactoryFailed {
        product: TypeInfo,
        error: Arc<DynError>,
    },
    /// The constructor consumed more arguments than it declared
    #[error("Constructor of '{owner}' requested argument {position} which it never declared")]
    MissingArgument { owner: TypeInfo, position: usize },
    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
    /// A `Lazy` was accessed after its container was dropped
    #[error("The container backing this lazy dependency was dropped")]
    ContainerDropped,
}

impl ResolveError {
    /// Wraps an error coming out of user code
    ///
    /// Resolution errors raised inside a factory pass through untouched.
    pub(crate) fn from_dyn(product: TypeInfo, error: DynError) -> Self {
        match error.downcast::<ResolveError>() {
            Ok(inner) => *inner,
            Err(error) => ResolveError::FactoryFailed {
                product,
                error: Arc::new(error),
            },
        }
    }
}

fn chain_target(chain: &[TypeInfo]) -> &'static str {
    chain.last().map(|info| info.type_name).unwrap_or("<empty>")
}

fn display_chain(chain: &[TypeInfo]) -> String {
    chain
        .iter()
        .map(|info| info.type_name)
        .collect::<Vec<_>>()
        .join(" -> ")
}
