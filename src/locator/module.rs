//! Modules: groups of definitions handed to the locator builder.

use std::sync::Arc;

use super::definition::{erase, Definition};
use crate::context::DefinitionContext;
use crate::error::LocatorResult;
use crate::key::{AnyArc, Key, Qualifier};
use crate::lifetime::Lifetime;
use crate::parameters::Parameters;
use crate::scope::ReleaseHook;
use crate::traits::Dispose;

/// A group of definitions.
///
/// Constructors receive the [`DefinitionContext`] of the resolution call and
/// the call's [`Parameters`]. Registering the same type and qualifier twice
/// keeps the later definition.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{Locator, Module, Parameters, Resolver, parameters};
///
/// struct Greeter { greeting: String }
///
/// let module = Module::new()
///     .single_named("en", |_, _| Ok(Greeter { greeting: "hello".into() }))
///     .factory(|_, params| Ok(Greeter { greeting: params.get::<String>(0)?.to_string() }));
///
/// let locator = Locator::builder().module(module).build();
///
/// assert_eq!(locator.get_named::<Greeter>("en").unwrap().greeting, "hello");
///
/// let params = parameters(|| Parameters::new().with("hallo".to_string()));
/// let german = locator.get_with::<Greeter>(None, Some(&params)).unwrap();
/// assert_eq!(german.greeting, "hallo");
/// ```
#[derive(Default)]
pub struct Module {
    pub(crate) definitions: Vec<Definition>,
    pub(crate) scope_sets: Vec<Qualifier>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a definition created once and shared by every scope.
    pub fn single<T, F>(self, ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&DefinitionContext, &Parameters) -> LocatorResult<T> + Send + Sync + 'static,
    {
        self.push::<T, F>(None, Lifetime::Single, ctor)
    }

    pub fn single_named<T, F>(self, qualifier: impl Into<Qualifier>, ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&DefinitionContext, &Parameters) -> LocatorResult<T> + Send + Sync + 'static,
    {
        self.push::<T, F>(Some(qualifier.into()), Lifetime::Single, ctor)
    }

    /// Declares a definition created on every resolution.
    pub fn factory<T, F>(self, ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&DefinitionContext, &Parameters) -> LocatorResult<T> + Send + Sync + 'static,
    {
        self.push::<T, F>(None, Lifetime::Factory, ctor)
    }

    pub fn factory_named<T, F>(self, qualifier: impl Into<Qualifier>, ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&DefinitionContext, &Parameters) -> LocatorResult<T> + Send + Sync + 'static,
    {
        self.push::<T, F>(Some(qualifier.into()), Lifetime::Factory, ctor)
    }

    /// Declares a scope set and its scoped definitions.
    pub fn scope<F>(mut self, set: impl Into<Qualifier>, build: F) -> Self
    where
        F: FnOnce(ScopeModule) -> ScopeModule,
    {
        let scoped = build(ScopeModule::new(set.into()));
        self.scope_sets.push(scoped.set);
        self.definitions.extend(scoped.definitions);
        self
    }

    fn push<T, F>(mut self, qualifier: Option<Qualifier>, lifetime: Lifetime, ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&DefinitionContext, &Parameters) -> LocatorResult<T> + Send + Sync + 'static,
    {
        let key = Key::of::<T>().with_qualifier(qualifier.as_ref());
        self.definitions.push(Definition::new(key, lifetime, erase(ctor)));
        self
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Scoped definitions of one scope set, built inside [`Module::scope`].
pub struct ScopeModule {
    set: Qualifier,
    definitions: Vec<Definition>,
}

impl ScopeModule {
    fn new(set: Qualifier) -> Self {
        Self {
            set,
            definitions: Vec::new(),
        }
    }

    /// Declares a definition created once per scope of this set.
    pub fn scoped<T, F>(self, ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&DefinitionContext, &Parameters) -> LocatorResult<T> + Send + Sync + 'static,
    {
        self.push::<T, F>(None, ctor, None)
    }

    pub fn scoped_named<T, F>(self, qualifier: impl Into<Qualifier>, ctor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&DefinitionContext, &Parameters) -> LocatorResult<T> + Send + Sync + 'static,
    {
        self.push::<T, F>(Some(qualifier.into()), ctor, None)
    }

    /// Like [`scoped`](ScopeModule::scoped), calling [`Dispose::dispose`] when the scope closes.
    pub fn scoped_disposable<T, F>(self, ctor: F) -> Self
    where
        T: Dispose,
        F: Fn(&DefinitionContext, &Parameters) -> LocatorResult<T> + Send + Sync + 'static,
    {
        self.push::<T, F>(None, ctor, Some(dispose_hook::<T>()))
    }

    fn push<T, F>(mut self, qualifier: Option<Qualifier>, ctor: F, on_release: Option<ReleaseHook>) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&DefinitionContext, &Parameters) -> LocatorResult<T> + Send + Sync + 'static,
    {
        let key = Key::of::<T>().with_qualifier(qualifier.as_ref());
        let mut definition = Definition::new(key, Lifetime::Scoped(self.set.clone()), erase(ctor));
        if let Some(hook) = on_release {
            definition = definition.with_release(hook);
        }
        self.definitions.push(definition);
        self
    }
}

fn dispose_hook<T: Dispose>() -> ReleaseHook {
    Arc::new(|value: &AnyArc| {
        if let Some(instance) = (**value).downcast_ref::<T>() {
            instance.dispose();
        }
    })
}
