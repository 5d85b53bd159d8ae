use crate::container::DiContainer;

/// Settings of a [DiContainer], fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerOptions {
    /// Fail with `CircularDependency` when a type is requested while it is being constructed.
    ///
    /// Without it a cyclic graph recurses until the stack is exhausted,
    /// or blocks forever if a singleton is part of the cycle.
    pub detect_cycles: bool,
    /// Maximum length of a resolution chain, unlimited if `None`
    pub max_depth: Option<usize>,
}
impl Default for ContainerOptions {
    fn default() -> Self {
        ContainerOptions {
            detect_cycles: true,
            max_depth: None,
        }
    }
}

/// Builder for a [DiContainer] with non default options
///
/// ```rust
/// use rewire_di::DiContainer;
///
/// let container = DiContainer::builder()
///     .detect_cycles(true)
///     .max_depth(32)
///     .build();
///
/// assert_eq!(container.options().max_depth, Some(32));
/// ```
#[derive(Debug, Default)]
pub struct DiBuilder {
    options: ContainerOptions,
}

impl DiBuilder {
    pub fn new() -> Self {
        DiBuilder {
            options: ContainerOptions::default(),
        }
    }
}
impl DiBuilder {
    pub fn detect_cycles(mut self, enabled: bool) -> Self {
        self.options.detect_cycles = enabled;
        self
    }

    pub fn max_depth(mut self, limit: usize) -> Self {
        self.options.max_depth = Some(limit);
        self
    }

    pub fn options(mut self, options: ContainerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> DiContainer {
        DiContainer::with_options(self.options)
    }
}
