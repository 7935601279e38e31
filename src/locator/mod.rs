//! Reference registry: definitions, scope sets, live scopes and global properties.
//!
//! [`Locator`] is a cheap-to-clone handle; clones share state. Its shared
//! state is the [`RegistryCore`] scopes are registered with, and
//! [`Locator::registry`] hands out that one allocation rather than a copy.

mod builder;
mod definition;
mod module;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::context::DefinitionContext;
use crate::error::{LocatorError, LocatorResult};
use crate::internal::with_circular_guard;
use crate::key::{AnyArc, Key, Qualifier};
use crate::lifetime::Lifetime;
use crate::observer::Observers;
use crate::parameters::ParametersDefinition;
use crate::properties::{FromProperty, Properties, PropertyValue};
use crate::scope::{Scope, ScopeId, ScopeSet, GLOBAL_SCOPE_ID};
use crate::traits::{RegistryCore, RegistryRef, Resolver};

pub use builder::LocatorBuilder;
use definition::Definition;
pub use module::{Module, ScopeModule};

/// The service locator.
///
/// Resolution through the locator itself targets the global scope; use
/// [`create_scope`](Locator::create_scope) for scoped lifetimes.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{Locator, LocatorError, Module, Resolver};
///
/// struct Theme(String);
///
/// let locator = Locator::builder()
///     .module(Module::new().scope("session", |s| {
///         s.scoped(|ctx, _| {
///             let scope = ctx.current_scope();
///             Ok(Theme(scope.properties().get_or("theme", "light".to_string())?))
///         })
///     }))
///     .build();
///
/// let scope = locator.create_scope("session-42", Some(&"session".into())).unwrap();
/// scope.properties().set("theme", "dark");
/// assert_eq!(scope.get::<Theme>().unwrap().0, "dark");
///
/// // Other contexts can borrow the live scope by id
/// let theme = locator.context().get_from_scope::<Theme>("session-42", None, None).unwrap();
/// assert_eq!(theme.0, "dark");
///
/// scope.close();
/// assert!(matches!(
///     locator.get_scope("session-42"),
///     Err(LocatorError::UnknownScope(_))
/// ));
/// ```
///
/// # Shutdown
///
/// Every registered scope holds a strong handle on the locator it belongs to,
/// and the locator holds its live scopes. Dropping the last `Locator` handle
/// while scopes are still live therefore leaks the locator, its scopes and
/// their scoped instances. Call [`close`](Locator::close) (or close each scope)
/// before letting the locator go.
#[derive(Clone)]
pub struct Locator {
    inner: Arc<LocatorInner>,
}

pub(crate) struct LocatorInner {
    me: Weak<LocatorInner>,
    definitions: HashMap<Key, Arc<Definition>>,
    scope_sets: HashMap<Qualifier, Arc<ScopeSet>>,
    scopes: RwLock<HashMap<ScopeId, Arc<Scope>>>,
    properties: Properties,
    observers: Observers,
}

impl Locator {
    pub fn builder() -> LocatorBuilder {
        LocatorBuilder::new()
    }

    /// The registry handle scopes and contexts are bound to. Shared, not copied.
    pub fn registry(&self) -> RegistryRef {
        self.inner.clone()
    }

    /// A context bound to the global scope.
    pub fn context(&self) -> DefinitionContext {
        self.inner.context()
    }

    /// Creates and registers a scope, optionally instantiated from a scope set.
    pub fn create_scope(
        &self,
        id: impl Into<ScopeId>,
        set: Option<&Qualifier>,
    ) -> LocatorResult<Arc<Scope>> {
        let id = id.into();
        if id == GLOBAL_SCOPE_ID {
            return Err(LocatorError::ReservedScopeId(id));
        }

        let scope_set = match set {
            Some(q) => Some(self.scope_set(q)?),
            None => None,
        };
        let scope = Scope::new(id.clone(), scope_set.as_ref());

        {
            let mut scopes = self.inner.scopes.write();
            if scopes.contains_key(&id) {
                return Err(LocatorError::DuplicateScope(id));
            }
            scope.register(self.registry())?;
            scopes.insert(id, scope.clone());
        }

        self.inner.observers.scope_created(&scope);
        Ok(scope)
    }

    /// Returns the live scope with this id, creating it if absent.
    pub fn get_or_create_scope(
        &self,
        id: impl Into<ScopeId>,
        set: Option<&Qualifier>,
    ) -> LocatorResult<Arc<Scope>> {
        let id = id.into();
        if let Some(scope) = self.get_scope_or_none(&id) {
            return Ok(scope);
        }
        match self.create_scope(id.clone(), set) {
            Err(LocatorError::DuplicateScope(_)) => self.get_scope(&id),
            other => other,
        }
    }

    /// Returns the live scope with this id or `UnknownScope`.
    pub fn get_scope(&self, id: &str) -> LocatorResult<Arc<Scope>> {
        self.inner.get_scope(id)
    }

    pub fn get_scope_or_none(&self, id: &str) -> Option<Arc<Scope>> {
        self.inner.scopes.read().get(id).cloned()
    }

    /// Closes the live scope with this id, removing it from the locator.
    pub fn delete_scope(&self, id: &str) -> LocatorResult<()> {
        self.get_scope(id)?.close();
        Ok(())
    }

    /// Ids of all live scopes.
    pub fn scope_ids(&self) -> Vec<ScopeId> {
        self.inner.scopes.read().keys().cloned().collect()
    }

    /// The declared scope set for `qualifier`.
    pub fn scope_set(&self, qualifier: &Qualifier) -> LocatorResult<Arc<ScopeSet>> {
        self.inner.scope_set(qualifier)
    }

    /// The global property store.
    pub fn properties(&self) -> &Properties {
        &self.inner.properties
    }

    pub fn set_property(&self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.inner.properties.set(key, value);
    }

    /// Reads a global property; fails with `MissingProperty` when unset.
    pub fn get_property<T: FromProperty>(&self, key: &str) -> LocatorResult<T> {
        self.inner.properties.get_as(key)
    }

    /// Reads a global property, returning `default` only when it is unset.
    pub fn get_property_or<T: FromProperty>(&self, key: &str, default: T) -> LocatorResult<T> {
        self.inner.properties.get_or(key, default)
    }

    /// Closes every live scope.
    ///
    /// This also drops the handles scopes hold on the locator; see the
    /// shutdown notes on [`Locator`].
    pub fn close(&self) {
        let scopes: Vec<Arc<Scope>> = self.inner.scopes.read().values().cloned().collect();
        debug!(scopes = scopes.len(), "closing locator");
        for scope in scopes {
            scope.close();
        }
    }

    /// Text dump of definitions, scope sets and live scopes.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Locator Debug ===\n");
        s.push_str("Definitions:\n");
        let mut definitions: Vec<_> = self.inner.definitions.values().collect();
        definitions.sort_by_key(|d| d.key.to_string());
        for d in definitions {
            s.push_str(&format!("  {}: {}\n", d.key, d.lifetime));
        }
        s.push_str("Scope sets:\n");
        for (q, set) in &self.inner.scope_sets {
            s.push_str(&format!("  {}: {} active scopes\n", q, set.active_scope_ids().len()));
        }
        s.push_str("Live scopes:\n");
        for scope in self.inner.scopes.read().values() {
            s.push_str(&format!("  {}\n", scope));
        }
        s
    }
}

impl LocatorInner {
    fn context(self: &Arc<Self>) -> DefinitionContext {
        DefinitionContext::global(self.clone())
    }

    fn context_for(self: &Arc<Self>, scope: &Arc<Scope>) -> DefinitionContext {
        if scope.is_global() {
            self.context()
        } else {
            DefinitionContext::scoped(self.clone(), scope.clone())
        }
    }

    fn get_scope(&self, id: &str) -> LocatorResult<Arc<Scope>> {
        self.scopes
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| LocatorError::UnknownScope(id.to_string()))
    }

    fn scope_set(&self, qualifier: &Qualifier) -> LocatorResult<Arc<ScopeSet>> {
        self.scope_sets
            .get(qualifier)
            .cloned()
            .ok_or_else(|| LocatorError::UnknownScopeSet(qualifier.to_string()))
    }

    fn resolve(
        self: &Arc<Self>,
        key: &Key,
        scope: &Arc<Scope>,
        parameters: Option<&ParametersDefinition>,
    ) -> LocatorResult<AnyArc> {
        trace!(key = %key, scope = %scope, "resolving");
        if !self.observers.has_observers() {
            return self.resolve_definition(key, scope, parameters);
        }

        let start = Instant::now();
        self.observers.resolving(key, scope);
        let result = self.resolve_definition(key, scope, parameters);
        match &result {
            Ok(_) => self.observers.resolved(key, scope, start.elapsed()),
            Err(e) => self.observers.resolution_failed(key, scope, e),
        }
        result
    }

    fn resolve_definition(
        self: &Arc<Self>,
        key: &Key,
        scope: &Arc<Scope>,
        parameters: Option<&ParametersDefinition>,
    ) -> LocatorResult<AnyArc> {
        if !scope.is_global() && !scope.is_registered() {
            return Err(LocatorError::ClosedScope(scope.to_string()));
        }

        let definition = self
            .definitions
            .get(key)
            .ok_or_else(|| LocatorError::NotFound(key.to_string()))?;

        with_circular_guard(key.to_string(), || {
            self.instantiate(definition, scope, parameters)
        })
    }

    fn instantiate(
        self: &Arc<Self>,
        definition: &Definition,
        scope: &Arc<Scope>,
        parameters: Option<&ParametersDefinition>,
    ) -> LocatorResult<AnyArc> {
        let params = || parameters.map(|supply| supply()).unwrap_or_default();

        match &definition.lifetime {
            Lifetime::Single => definition
                .single
                .get_or_try_init(|| (definition.ctor)(&self.context(), &params()))
                .cloned(),
            Lifetime::Factory => (definition.ctor)(&self.context_for(scope), &params()),
            Lifetime::Scoped(set) => {
                if scope.set_qualifier() != Some(set) {
                    return Err(LocatorError::WrongScope {
                        definition: definition.key.to_string(),
                        expected: set.to_string(),
                        scope: scope.to_string(),
                    });
                }
                let scope_set = self.scope_set(set)?;
                scope_set.get_or_create(scope, &definition.key, definition.on_release.as_ref(), || {
                    (definition.ctor)(&self.context_for(scope), &params())
                })
            }
        }
    }
}

impl RegistryCore for LocatorInner {
    fn resolve_any(
        &self,
        key: &Key,
        scope: &Arc<Scope>,
        parameters: Option<&ParametersDefinition>,
    ) -> LocatorResult<AnyArc> {
        // Callers hold a strong handle, so this only fails mid-teardown
        let this = self
            .me
            .upgrade()
            .ok_or_else(|| LocatorError::ClosedScope(scope.to_string()))?;
        this.resolve(key, scope, parameters)
    }

    fn forget_scope(&self, scope_id: &str) {
        if self.scopes.write().remove(scope_id).is_some() {
            debug!(scope_id, "scope forgotten");
            self.observers.scope_closed(scope_id);
        }
    }

    fn lookup_scope(&self, scope_id: &str) -> LocatorResult<Arc<Scope>> {
        self.get_scope(scope_id)
    }

    fn lookup_property(&self, key: &str) -> Option<PropertyValue> {
        self.properties.get(key)
    }
}

impl RegistryCore for Locator {
    fn resolve_any(
        &self,
        key: &Key,
        scope: &Arc<Scope>,
        parameters: Option<&ParametersDefinition>,
    ) -> LocatorResult<AnyArc> {
        self.inner.resolve(key, scope, parameters)
    }

    fn forget_scope(&self, scope_id: &str) {
        self.inner.forget_scope(scope_id)
    }

    fn lookup_scope(&self, scope_id: &str) -> LocatorResult<Arc<Scope>> {
        self.inner.get_scope(scope_id)
    }

    fn lookup_property(&self, key: &str) -> Option<PropertyValue> {
        self.inner.lookup_property(key)
    }
}

impl Resolver for Locator {
    fn resolve_key(
        &self,
        key: &Key,
        parameters: Option<&ParametersDefinition>,
    ) -> LocatorResult<AnyArc> {
        self.inner.resolve(key, &Scope::global(), parameters)
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("definitions", &self.inner.definitions.len())
            .field("scope_sets", &self.inner.scope_sets.len())
            .field("live_scopes", &self.inner.scopes.read().len())
            .field("observers", &self.inner.observers.len())
            .finish()
    }
}
