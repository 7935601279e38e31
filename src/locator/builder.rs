//! Builder assembling modules, properties and observers into a [`Locator`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::{Locator, LocatorInner, Module};
use crate::observer::{LocatorObserver, Observers};
use crate::properties::{Properties, PropertyValue};
use crate::scope::ScopeSet;

/// Builder for [`Locator`].
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{Locator, LoggingObserver, Module, Resolver};
/// use std::sync::Arc;
///
/// let locator = Locator::builder()
///     .module(Module::new().single(|_, _| Ok(42u64)))
///     .property("app.name", "demo")
///     .observer(Arc::new(LoggingObserver::new()))
///     .build();
///
/// assert_eq!(*locator.get::<u64>().unwrap(), 42);
/// assert_eq!(locator.get_property::<String>("app.name").unwrap(), "demo");
/// ```
#[derive(Default)]
pub struct LocatorBuilder {
    modules: Vec<Module>,
    properties: Vec<(String, PropertyValue)>,
    observers: Observers,
}

impl LocatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    pub fn modules(mut self, modules: impl IntoIterator<Item = Module>) -> Self {
        self.modules.extend(modules);
        self
    }

    /// Sets a global property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    pub fn properties<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        self.properties
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Copies every property exposed by `source`.
    #[cfg(feature = "config")]
    pub fn properties_from(self, source: &dyn crate::config::PropertySource) -> Self {
        self.properties(source.entries())
    }

    pub fn observer(mut self, observer: Arc<dyn LocatorObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    pub fn build(self) -> Locator {
        let mut definitions = HashMap::new();
        let mut scope_sets = HashMap::new();

        for module in self.modules {
            for set in module.scope_sets {
                scope_sets
                    .entry(set.clone())
                    .or_insert_with(|| Arc::new(ScopeSet::new(set)));
            }
            for definition in module.definitions {
                let key = definition.key.clone();
                if definitions.insert(key.clone(), Arc::new(definition)).is_some() {
                    debug!(key = %key, "definition overridden");
                }
            }
        }

        let properties = Properties::new();
        properties.extend(self.properties);

        debug!(
            definitions = definitions.len(),
            scope_sets = scope_sets.len(),
            properties = properties.len(),
            "locator built"
        );

        Locator {
            inner: Arc::new_cyclic(|me| LocatorInner {
                me: me.clone(),
                definitions,
                scope_sets,
                scopes: RwLock::new(HashMap::new()),
                properties,
                observers: self.observers,
            }),
        }
    }
}
