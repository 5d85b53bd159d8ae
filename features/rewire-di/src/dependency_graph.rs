use std::{
    any::TypeId,
    collections::{BTreeMap, HashSet},
};

use thiserror::Error;

use crate::{
    binding::Concrete,
    constructor::Parameter,
    container::Registry,
    types::TypeInfo,
};

/// Graph of all bindings of a container
/// Used to check for missing or circular dependencies before resolving anything
pub struct DependencyGraph {
    map: BTreeMap<TypeId, DependencyGraphEntry>,
}
impl DependencyGraph {
    pub(crate) fn new(registry: &Registry) -> Self {
        let mut map = BTreeMap::new();

        for registration in registry.bindings.values() {
            let node = match &registration.concrete {
                Concrete::Factory(_) => Node::Factory,
                Concrete::Type { target, .. } => match registry.catalog.get(&target.type_id) {
                    None => Node::Uninstantiable { target: *target },
                    Some(constructor) => Node::Constructed {
                        target: *target,
                        parameters: constructor.parameters.clone().unwrap_or_default(),
                    },
                },
            };

            map.insert(
                registration.info.type_id,
                DependencyGraphEntry {
                    info: registration.info,
                    node,
                },
            );
        }

        Self { map }
    }

    /// Number of bound types
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Declared dependencies of the type bound under `info`
    ///
    /// Empty for factories and types without a declared constructor,
    /// `None` if nothing is bound under `info`.
    pub fn dependencies_of(&self, info: TypeInfo) -> Option<Vec<TypeInfo>> {
        let entry = self.map.get(&info.type_id)?;
        Some(entry.declared_dependencies().collect())
    }

    /// Validate the graph
    ///
    /// Returns a list of all issues
    pub fn check(&self) -> Result<(), DependencyGraphErrors> {
        let mut checked = HashSet::new();
        let mut errors = Vec::new();
        for entry in self.map.values() {
            let mut dependency_chain = Vec::new();
            check_recurse(
                self,
                &mut checked,
                &mut errors,
                &mut dependency_chain,
                entry,
            );
        }

        if !errors.is_empty() {
            return Err(DependencyGraphErrors { errors });
        }

        return Ok(());

        fn check_recurse(
            graph: &DependencyGraph,
            checked: &mut HashSet<TypeId>,
            errors: &mut Vec<DependencyGraphError>,
            dependency_chain: &mut Vec<TypeInfo>,
            entry: &DependencyGraphEntry,
        ) {
            // Circular Dependency Check
            if let Some(start) = dependency_chain.iter().position(|info| *info == entry.info) {
                let mut chain = dependency_chain[start..].to_vec();
                chain.push(entry.info); // Add current so chain is complete

                errors.push(DependencyGraphError::CircularDependency { chain });
                return;
            }

            // Skip other checks if already checked
            if !checked.insert(entry.info.type_id) {
                return;
            };

            let (target, parameters) = match &entry.node {
                Node::Factory => return,
                Node::Uninstantiable { target } => {
                    errors.push(DependencyGraphError::Uninstantiable {
                        target: *target,
                        bound_as: entry.info,
                    });
                    return;
                }
                Node::Constructed { target, parameters } => (*target, parameters),
            };

            dependency_chain.push(entry.info);

            for parameter in parameters {
                let Some(declared) = parameter.declared else {
                    errors.push(DependencyGraphError::UnresolvableParameter {
                        parameter: parameter.name,
                        owner: target,
                    });
                    continue;
                };

                let Some(next_entry) = graph.map.get(&declared.type_id) else {
                    errors.push(DependencyGraphError::MissingDependency {
                        dependency: declared,
                        required_by: target,
                    });
                    continue;
                };

                check_recurse(graph, checked, errors, dependency_chain, next_entry);
            }

            dependency_chain.pop();
        }
    }
}

struct DependencyGraphEntry {
    info: TypeInfo,
    node: Node,
}
impl DependencyGraphEntry {
    fn declared_dependencies(&self) -> impl Iterator<Item = TypeInfo> + '_ {
        let parameters: &[Parameter] = match &self.node {
            Node::Constructed { parameters, .. } => parameters,
            Node::Factory | Node::Uninstantiable { .. } => &[],
        };
        parameters.iter().filter_map(|parameter| parameter.declared)
    }
}

enum Node {
    /// Opaque, dependencies are only known once it runs
    Factory,
    Constructed {
        target: TypeInfo,
        parameters: Vec<Parameter>,
    },
    Uninstantiable {
        target: TypeInfo,
    },
}

#[derive(Error, Debug, Clone)]
pub enum DependencyGraphError {
    #[error("'{required_by}' needs '{dependency}' but it is not bound")]
    MissingDependency {
        dependency: TypeInfo,
        required_by: TypeInfo,
    },
    #[error("'{bound_as}' is bound to '{target}' which the container cannot instantiate")]
    Uninstantiable { target: TypeInfo, bound_as: TypeInfo },
    #[error("Parameter '{parameter}' of '{owner}' has no type to resolve by")]
    UnresolvableParameter {
        parameter: &'static str,
        owner: TypeInfo,
    },
    #[error("A Circular Dependency exists through {chain:?} - Consider using `Lazy`")]
    CircularDependency { chain: Vec<TypeInfo> },
}
impl std::fmt::Display for DependencyGraphErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("The dependency graph had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}

#[derive(Error, Debug, Clone)]
pub struct DependencyGraphErrors {
    pub errors: Vec<DependencyGraphError>,
}

#[cfg(test)]
mod tests {
    use std::{convert::Infallible, sync::Arc};

    use crate::{
        constructor::{Autowire, Constructor},
        container::DiContainer,
        errors::ResolveError,
    };

    use super::*;

    #[derive(Default)]
    struct Clock;
    impl Autowire for Clock {
        fn constructor() -> Constructor<Self> {
            Constructor::without_parameters(Clock::default)
        }
    }

    struct Scheduler {
        _clock: Arc<Clock>,
    }
    impl Autowire for Scheduler {
        fn constructor() -> Constructor<Self> {
            Constructor::new(vec![Parameter::typed::<Clock>("clock")], |args| {
                Ok::<_, ResolveError>(Scheduler {
                    _clock: args.take::<Clock>()?,
                })
            })
        }
    }

    struct Ping;
    struct Pong;
    impl Autowire for Ping {
        fn constructor() -> Constructor<Self> {
            Constructor::new(vec![Parameter::typed::<Pong>("pong")], |args| {
                args.take::<Pong>().map(|_| Ping)
            })
        }
    }
    impl Autowire for Pong {
        fn constructor() -> Constructor<Self> {
            Constructor::new(vec![Parameter::typed::<Ping>("ping")], |args| {
                args.take::<Ping>().map(|_| Pong)
            })
        }
    }

    struct Server;
    impl Autowire for Server {
        fn constructor() -> Constructor<Self> {
            Constructor::new(vec![Parameter::untyped("port")], |_| Ok::<_, Infallible>(Server))
        }
    }

    #[test]
    fn valid_graph() {
        let container = DiContainer::new();
        container
            .register::<Clock>()
            .register::<Scheduler>()
            .singleton::<Clock>()
            .bind::<Scheduler>()
            .bind_factory::<String, _, _>(|_| Ok::<_, Infallible>(Arc::new(String::new())));

        let graph = container.graph();
        assert_eq!(graph.len(), 3);
        assert_eq!(
            graph.dependencies_of(TypeInfo::of::<Scheduler>()),
            Some(vec![TypeInfo::of::<Clock>()])
        );
        assert_eq!(graph.dependencies_of(TypeInfo::of::<u8>()), None);
        assert!(graph.check().is_ok());
    }

    #[test]
    fn reports_missing_dependency() {
        let container = DiContainer::new();
        container.register::<Scheduler>().bind::<Scheduler>();

        let errors = container.validate().unwrap_err().errors;
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            DependencyGraphError::MissingDependency { dependency, required_by }
                if *dependency == TypeInfo::of::<Clock>() && *required_by == TypeInfo::of::<Scheduler>()
        ));
    }

    #[test]
    fn reports_cycle_once() {
        let container = DiContainer::new();
        container
            .register::<Ping>()
            .register::<Pong>()
            .bind::<Ping>()
            .bind::<Pong>();

        let errors = container.validate().unwrap_err().errors;
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            DependencyGraphError::CircularDependency { chain } => {
                assert_eq!(chain.len(), 3);
                assert_eq!(chain.first(), chain.last());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reports_uninstantiable_and_untyped() {
        let container = DiContainer::new();
        container
            .register::<Server>()
            .bind::<Server>()
            .bind::<Clock>();

        let errors = container.validate().unwrap_err();
        assert_eq!(errors.errors.len(), 2);
        assert!(errors.errors.iter().any(|e| matches!(
            e,
            DependencyGraphError::UnresolvableParameter { parameter: "port", .. }
        )));
        assert!(errors
            .errors
            .iter()
            .any(|e| matches!(e, DependencyGraphError::Uninstantiable { .. })));
        assert!(errors
            .to_string()
            .starts_with("The dependency graph had one or more errors:"));
    }
}
