//! Lazily resolved handles.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::LocatorResult;

type Resolve<T> = Box<dyn FnOnce() -> LocatorResult<Arc<T>> + Send>;

/// A deferred resolution.
///
/// Created by [`Resolver::inject`](crate::Resolver::inject). The underlying
/// `get` runs once, on the first call to [`Injected::get`]; its outcome, value
/// or error, is kept and replayed for the lifetime of the handle.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{Locator, Module, Resolver};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let built = Arc::new(AtomicUsize::new(0));
/// let counter = built.clone();
/// let locator = Locator::builder()
///     .module(Module::new().factory(move |_, _| {
///         counter.fetch_add(1, Ordering::SeqCst);
///         Ok(String::from("ready"))
///     }))
///     .build();
///
/// let lazy = locator.inject::<String>();
/// assert_eq!(built.load(Ordering::SeqCst), 0);
///
/// assert_eq!(lazy.get().unwrap().as_str(), "ready");
/// assert_eq!(lazy.get().unwrap().as_str(), "ready");
/// assert_eq!(built.load(Ordering::SeqCst), 1);
/// ```
pub struct Injected<T> {
    cell: Lazy<LocatorResult<Arc<T>>, Resolve<T>>,
}

impl<T> Injected<T> {
    pub(crate) fn new<F>(resolve: F) -> Self
    where
        F: FnOnce() -> LocatorResult<Arc<T>> + Send + 'static,
    {
        Self {
            cell: Lazy::new(Box::new(resolve)),
        }
    }

    /// Resolves on first call; later calls replay the first outcome.
    pub fn get(&self) -> LocatorResult<Arc<T>> {
        Lazy::force(&self.cell).clone()
    }

    /// True once the first read has happened.
    pub fn is_resolved(&self) -> bool {
        Lazy::get(&self.cell).is_some()
    }
}

impl<T> fmt::Debug for Injected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injected")
            .field("type", &std::any::type_name::<T>())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
