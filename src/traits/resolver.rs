//! Registry contract and typed resolution.

use std::sync::Arc;

use crate::error::LocatorResult;
use crate::key::{downcast, AnyArc, Key, Qualifier};
use crate::parameters::ParametersDefinition;
use crate::properties::PropertyValue;
use crate::scope::{Injected, Scope};

/// Object-safe contract between the scope core and the registry that owns it.
///
/// The scope core never constructs instances itself; it reaches the registry
/// only through these four calls. [`Locator`](crate::Locator) is the
/// reference implementation, but any registry satisfying the contract can own
/// scopes.
pub trait RegistryCore: Send + Sync {
    /// Resolves `key` with `scope` as the resolution context.
    ///
    /// Errors are owned by the registry and reach the caller unchanged.
    fn resolve_any(
        &self,
        key: &Key,
        scope: &Arc<Scope>,
        parameters: Option<&ParametersDefinition>,
    ) -> LocatorResult<AnyArc>;

    /// Removes the scope from the live-scope table. No-op if absent.
    fn forget_scope(&self, scope_id: &str);

    /// Returns the live scope for `scope_id` or `UnknownScope`.
    fn lookup_scope(&self, scope_id: &str) -> LocatorResult<Arc<Scope>>;

    /// Returns the stored global property, if any.
    fn lookup_property(&self, key: &str) -> Option<PropertyValue>;
}

/// Shared handle to a registry, as held by scopes and contexts.
pub type RegistryRef = Arc<dyn RegistryCore>;

/// Typed resolution on top of a single type-erased entry point.
///
/// Implemented by `Arc<Scope>`, [`DefinitionContext`](crate::DefinitionContext)
/// and [`Locator`](crate::Locator); each decides which scope a call resolves
/// against.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{Locator, Module, Resolver};
///
/// struct Config { name: &'static str }
///
/// let locator = Locator::builder()
///     .module(Module::new().single(|_, _| Ok(Config { name: "app" })))
///     .build();
///
/// let config = locator.get::<Config>().unwrap();
/// assert_eq!(config.name, "app");
///
/// let lazy = locator.inject::<Config>();
/// assert_eq!(lazy.get().unwrap().name, "app");
/// ```
pub trait Resolver {
    /// Resolves a fully-formed key in this resolver's current scope.
    fn resolve_key(
        &self,
        key: &Key,
        parameters: Option<&ParametersDefinition>,
    ) -> LocatorResult<AnyArc>;

    fn get<T: Send + Sync + 'static>(&self) -> LocatorResult<Arc<T>> {
        self.get_with::<T>(None, None)
    }

    fn get_named<T: Send + Sync + 'static>(&self, qualifier: impl Into<Qualifier>) -> LocatorResult<Arc<T>> {
        let qualifier = qualifier.into();
        self.get_with::<T>(Some(&qualifier), None)
    }

    fn get_with<T: Send + Sync + 'static>(
        &self,
        qualifier: Option<&Qualifier>,
        parameters: Option<&ParametersDefinition>,
    ) -> LocatorResult<Arc<T>> {
        let key = Key::of::<T>().with_qualifier(qualifier);
        downcast::<T>(self.resolve_key(&key, parameters)?)
    }

    /// Panicking variant of [`get`](Resolver::get) for wiring code.
    fn get_required<T: Send + Sync + 'static>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }

    /// Lazy handle; nothing is resolved until the first read.
    fn inject<T: Send + Sync + 'static>(&self) -> Injected<T>
    where
        Self: Clone + Send + Sync + 'static,
    {
        self.inject_with::<T>(None, None)
    }

    fn inject_with<T: Send + Sync + 'static>(
        &self,
        qualifier: Option<Qualifier>,
        parameters: Option<ParametersDefinition>,
    ) -> Injected<T>
    where
        Self: Clone + Send + Sync + 'static,
    {
        let resolver = self.clone();
        Injected::new(move || resolver.get_with::<T>(qualifier.as_ref(), parameters.as_ref()))
    }
}
