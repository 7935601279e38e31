//! Definition records held by the locator.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::context::DefinitionContext;
use crate::error::LocatorResult;
use crate::key::{AnyArc, Key};
use crate::lifetime::Lifetime;
use crate::parameters::Parameters;
use crate::scope::ReleaseHook;

/// Type-erased constructor.
pub(crate) type Constructor =
    Arc<dyn Fn(&DefinitionContext, &Parameters) -> LocatorResult<AnyArc> + Send + Sync>;

pub(crate) struct Definition {
    pub(crate) key: Key,
    pub(crate) lifetime: Lifetime,
    pub(crate) ctor: Constructor,
    pub(crate) on_release: Option<ReleaseHook>,
    // Cached instance for `Lifetime::Single`
    pub(crate) single: OnceCell<AnyArc>,
}

impl Definition {
    pub(crate) fn new(key: Key, lifetime: Lifetime, ctor: Constructor) -> Self {
        Self {
            key,
            lifetime,
            ctor,
            on_release: None,
            single: OnceCell::new(),
        }
    }

    pub(crate) fn with_release(mut self, hook: ReleaseHook) -> Self {
        self.on_release = Some(hook);
        self
    }
}

/// Erases a typed constructor.
pub(crate) fn erase<T, F>(ctor: F) -> Constructor
where
    T: Send + Sync + 'static,
    F: Fn(&DefinitionContext, &Parameters) -> LocatorResult<T> + Send + Sync + 'static,
{
    Arc::new(move |ctx: &DefinitionContext, params: &Parameters| {
        ctor(ctx, params).map(|value| Arc::new(value) as AnyArc)
    })
}
