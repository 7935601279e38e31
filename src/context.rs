//! Definition contexts: which scope a resolution call implicitly targets.
//!
//! Constructors receive a [`DefinitionContext`] so they can resolve their own
//! dependencies without knowing whether they were invoked for the global
//! scope or for a specific scope.

use std::fmt;
use std::sync::Arc;

use crate::error::{LocatorError, LocatorResult};
use crate::key::{downcast, AnyArc, Key, Qualifier};
use crate::parameters::ParametersDefinition;
use crate::properties::FromProperty;
use crate::scope::Scope;
use crate::traits::{RegistryRef, Resolver};

/// Dispatch layer binding resolution calls to a current scope.
///
/// Both variants expose the same surface and differ only in
/// [`current_scope`](DefinitionContext::current_scope). Every typed `get`
/// goes through the registry's `resolve_any`.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{Locator, Module, Resolver};
///
/// struct Database { url: String }
/// struct Repository { db: std::sync::Arc<Database> }
///
/// let locator = Locator::builder()
///     .property("db.url", "postgres://localhost")
///     .module(
///         Module::new()
///             .single(|ctx, _| Ok(Database { url: ctx.get_property::<String>("db.url")? }))
///             .factory(|ctx, _| Ok(Repository { db: ctx.get::<Database>()? })),
///     )
///     .build();
///
/// let repo = locator.get::<Repository>().unwrap();
/// assert_eq!(repo.db.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub enum DefinitionContext {
    /// Always resolves against the global scope.
    Default { registry: RegistryRef },
    /// Always resolves against one specific scope.
    Scoped { registry: RegistryRef, scope: Arc<Scope> },
}

impl DefinitionContext {
    pub fn global(registry: RegistryRef) -> Self {
        DefinitionContext::Default { registry }
    }

    pub fn scoped(registry: RegistryRef, scope: Arc<Scope>) -> Self {
        DefinitionContext::Scoped { registry, scope }
    }

    pub fn registry(&self) -> &RegistryRef {
        match self {
            DefinitionContext::Default { registry } | DefinitionContext::Scoped { registry, .. } => registry,
        }
    }

    /// The scope implicit in this context.
    pub fn current_scope(&self) -> Arc<Scope> {
        match self {
            DefinitionContext::Default { .. } => Scope::global(),
            DefinitionContext::Scoped { scope, .. } => scope.clone(),
        }
    }

    pub fn is_scoped(&self) -> bool {
        matches!(self, DefinitionContext::Scoped { .. })
    }

    /// Resolves `T` against an explicitly supplied scope instead of the implicit one.
    pub fn get_in<T: Send + Sync + 'static>(
        &self,
        scope: &Arc<Scope>,
        qualifier: Option<&Qualifier>,
        parameters: Option<&ParametersDefinition>,
    ) -> LocatorResult<Arc<T>> {
        let key = Key::of::<T>().with_qualifier(qualifier);
        downcast::<T>(self.registry().resolve_any(&key, scope, parameters)?)
    }

    /// Looks up a live scope by id, then resolves `T` against it.
    ///
    /// Fails with `UnknownScope` when no scope with that id is live.
    pub fn get_from_scope<T: Send + Sync + 'static>(
        &self,
        scope_id: &str,
        qualifier: Option<&Qualifier>,
        parameters: Option<&ParametersDefinition>,
    ) -> LocatorResult<Arc<T>> {
        let scope = self.registry().lookup_scope(scope_id)?;
        self.get_in::<T>(&scope, qualifier, parameters)
    }

    /// Reads a global property; fails with `MissingProperty` when unset.
    pub fn get_property<T: FromProperty>(&self, key: &str) -> LocatorResult<T> {
        match self.registry().lookup_property(key) {
            Some(value) => T::from_property(key, &value),
            None => Err(LocatorError::MissingProperty(key.to_string())),
        }
    }

    /// Reads a global property, returning `default` only when it is unset.
    pub fn get_property_or<T: FromProperty>(&self, key: &str, default: T) -> LocatorResult<T> {
        match self.registry().lookup_property(key) {
            Some(value) => T::from_property(key, &value),
            None => Ok(default),
        }
    }
}

impl Resolver for DefinitionContext {
    fn resolve_key(
        &self,
        key: &Key,
        parameters: Option<&ParametersDefinition>,
    ) -> LocatorResult<AnyArc> {
        self.registry().resolve_any(key, &self.current_scope(), parameters)
    }
}

impl fmt::Debug for DefinitionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionContext::Default { .. } => f.write_str("DefaultContext"),
            DefinitionContext::Scoped { scope, .. } => write!(f, "ScopedContext({})", scope),
        }
    }
}
