//! # ferrous-locator
//!
//! Scope-managed service location for Rust: named lifetime scopes with an
//! exactly-once close protocol, scope-bound definition contexts and loosely
//! typed properties.
//!
//! ## Features
//!
//! - **Scopes**: named containers that register with a registry, resolve through
//!   it while live and close exactly once, even under concurrent `close` calls
//! - **Close callbacks**: ordered listeners notified after the scope is dead,
//!   with panics isolated per callback
//! - **Definition contexts**: constructors receive the scope they are building for
//!   and can still reach any other live scope by id
//! - **Properties**: a global store plus an independent store per scope
//! - **Lifetimes**: single, factory and scoped definitions grouped in modules
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_locator::{Locator, Module, Resolver};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let locator = Locator::builder()
//!     .property("db.url", "postgres://localhost")
//!     .module(
//!         Module::new()
//!             .single(|ctx, _| Ok(Database { url: ctx.get_property("db.url")? }))
//!             .factory(|ctx, _| Ok(UserService { db: ctx.get()? })),
//!     )
//!     .build();
//!
//! let users = locator.get::<UserService>().unwrap();
//! assert_eq!(users.db.url, "postgres://localhost");
//! ```
//!
//! ## Scopes
//!
//! ```rust
//! use ferrous_locator::{Locator, LocatorError, Module, Resolver, Scope};
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//!
//! struct Cart;
//!
//! let locator = Locator::builder()
//!     .module(Module::new().scope("session", |s| s.scoped(|_, _| Ok(Cart))))
//!     .build();
//!
//! let scope = locator.create_scope("session-42", Some(&"session".into())).unwrap();
//! let cart = scope.get::<Cart>().unwrap();
//! assert!(Arc::ptr_eq(&cart, &scope.get::<Cart>().unwrap()));
//!
//! let notified = Arc::new(AtomicBool::new(false));
//! let flag = notified.clone();
//! scope.register_callback(Arc::new(move |closed: &Scope| {
//!     // The scope is already dead when callbacks run
//!     assert!(closed.is_closed());
//!     flag.store(true, Ordering::SeqCst);
//! }));
//!
//! scope.close();
//! assert!(notified.load(Ordering::SeqCst));
//! assert!(matches!(scope.get::<Cart>(), Err(LocatorError::ClosedScope(_))));
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: scope lifecycle at `debug`, resolution at
//! `trace`, isolated callback panics at `warn`. No subscriber is installed.

pub mod context;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod locator;
pub mod observer;
pub mod parameters;
pub mod properties;
pub mod scope;
pub mod traits;

#[cfg(feature = "config")]
pub mod config;

// Internal modules
mod internal;

pub use context::DefinitionContext;
pub use error::{LocatorError, LocatorResult};
pub use key::{AnyArc, Key, Qualifier};
pub use lifetime::Lifetime;
pub use locator::{Locator, LocatorBuilder, Module, ScopeModule};
pub use observer::{LocatorObserver, LoggingObserver, MetricsObserver};
pub use parameters::{parameters, Parameters, ParametersDefinition};
pub use properties::{FromProperty, Properties, PropertyValue};
pub use scope::{Injected, Scope, ScopeId, ScopeSet, GLOBAL_SCOPE_ID};
pub use traits::{Dispose, RegistryCore, RegistryRef, Resolver, ScopeCallback};
