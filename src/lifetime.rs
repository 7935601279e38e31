//! Definition lifetimes.

use std::fmt;

use crate::key::Qualifier;

/// How instances of a definition are created and cached.
///
/// - **Single**: created once per locator, shared by every scope.
/// - **Factory**: created on every resolution, never cached.
/// - **Scoped**: created once per scope instantiated from the named scope set,
///   released when that scope closes.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{Locator, Module, Resolver};
/// use std::sync::Arc;
///
/// struct Database;
/// struct Session;
/// struct Request;
///
/// let locator = Locator::builder()
///     .module(
///         Module::new()
///             .single(|_, _| Ok(Database))
///             .factory(|_, _| Ok(Request))
///             .scope("session", |s| s.scoped(|_, _| Ok(Session))),
///     )
///     .build();
///
/// let a = locator.create_scope("a", Some(&"session".into())).unwrap();
/// let b = locator.create_scope("b", Some(&"session".into())).unwrap();
///
/// // Single: same instance everywhere
/// assert!(Arc::ptr_eq(&a.get::<Database>().unwrap(), &locator.get::<Database>().unwrap()));
///
/// // Scoped: same within a scope, different across scopes
/// assert!(Arc::ptr_eq(&a.get::<Session>().unwrap(), &a.get::<Session>().unwrap()));
/// assert!(!Arc::ptr_eq(&a.get::<Session>().unwrap(), &b.get::<Session>().unwrap()));
///
/// // Factory: always new
/// assert!(!Arc::ptr_eq(&a.get::<Request>().unwrap(), &a.get::<Request>().unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifetime {
    Single,
    Factory,
    Scoped(Qualifier),
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Single => f.write_str("single"),
            Lifetime::Factory => f.write_str("factory"),
            Lifetime::Scoped(set) => write!(f, "scoped({})", set),
        }
    }
}
