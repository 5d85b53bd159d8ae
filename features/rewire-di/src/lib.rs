//! Rewire DI is a small dependency injection container.
//!
//! Types are bound under an abstract type, usually a trait object or the type itself,
//! and resolved on demand. A binding either calls a factory, or auto-constructs a
//! concrete type by resolving each parameter of its declared constructor.
//!
//! Rewire DI consists of the following parts:
//!
//! 1. [DiContainer] - holds bindings, singleton instances and known constructors
//! 2. [Autowire] - declares a type's constructor, usually through [autowire!]
//! 3. [DiHandle] - handed to factories, resolves dependencies as part of the current chain
//! 4. [DependencyGraph] - static validation of all bindings
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rewire_di::{autowire, implements, DiContainer};
//!
//! trait Mailer: Send + Sync {
//!     fn send(&self, to: &str) -> String;
//! }
//!
//! #[derive(Default)]
//! struct SmtpMailer;
//! impl Mailer for SmtpMailer {
//!     fn send(&self, to: &str) -> String {
//!         format!("mail to {to}")
//!     }
//! }
//! autowire!(impl SmtpMailer;);
//! implements!(SmtpMailer => dyn Mailer);
//!
//! struct Signup {
//!     mailer: Arc<dyn Mailer>,
//! }
//! impl Signup {
//!     fn new(mailer: Arc<dyn Mailer>) -> Self {
//!         Signup { mailer }
//!     }
//! }
//! autowire! {
//!     impl Signup {
//!         fn new(mailer: dyn Mailer);
//!     }
//! }
//!
//! let container = DiContainer::new();
//! container
//!     .register::<SmtpMailer>()
//!     .register::<Signup>()
//!     .singleton_to::<dyn Mailer, SmtpMailer>()
//!     .bind::<Signup>();
//!
//! container.validate().unwrap();
//!
//! let signup = container.resolve::<Signup>().unwrap();
//! assert_eq!(signup.mailer.send("ada"), "mail to ada");
//! ```

mod binding;
pub mod builder;
pub mod constructor;
pub mod container;
pub mod dependency_graph;
pub mod errors;
pub mod handle;
mod macros;
pub mod resolver;
pub mod types;

pub use builder::{ContainerOptions, DiBuilder};
pub use constructor::{Arguments, Autowire, Constructor, Parameter};
pub use container::DiContainer;
pub use dependency_graph::{DependencyGraph, DependencyGraphError, DependencyGraphErrors};
pub use errors::ResolveError;
pub use handle::DiHandle;
pub use resolver::Lazy;
pub use types::{DynError, Injectable, Instance, TypeInfo, Upcast};
