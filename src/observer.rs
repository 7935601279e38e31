//! Diagnostic observers for resolution and scope lifecycle events.
//!
//! Observers are registered on the [`LocatorBuilder`](crate::LocatorBuilder)
//! and called from the locator's single resolution chokepoint, so every typed
//! `get` (through a scope, a context or the locator itself) is seen exactly once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::LocatorError;
use crate::key::Key;
use crate::scope::Scope;

/// Hooks for observing the locator.
///
/// All methods have empty defaults; implement only what you need.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{Key, Locator, LocatorObserver, Module, Resolver, Scope};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl LocatorObserver for Counter {
///     fn resolving(&self, _key: &Key, _scope: &Scope) {
///         self.0.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let counter = Arc::new(Counter::default());
/// let locator = Locator::builder()
///     .module(Module::new().single(|_, _| Ok(1u32)))
///     .observer(counter.clone())
///     .build();
///
/// locator.get::<u32>().unwrap();
/// assert_eq!(counter.0.load(Ordering::SeqCst), 1);
/// ```
pub trait LocatorObserver: Send + Sync {
    /// Called before a definition is resolved.
    fn resolving(&self, _key: &Key, _scope: &Scope) {}

    /// Called after a successful resolution.
    fn resolved(&self, _key: &Key, _scope: &Scope, _duration: Duration) {}

    /// Called when resolution fails.
    fn resolution_failed(&self, _key: &Key, _scope: &Scope, _error: &LocatorError) {}

    /// Called once a scope is registered and live.
    fn scope_created(&self, _scope: &Scope) {}

    /// Called when a scope is removed from the live-scope table.
    fn scope_closed(&self, _scope_id: &str) {}
}

#[derive(Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn LocatorObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn LocatorObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn resolving(&self, key: &Key, scope: &Scope) {
        for observer in &self.observers {
            observer.resolving(key, scope);
        }
    }

    pub(crate) fn resolved(&self, key: &Key, scope: &Scope, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, scope, duration);
        }
    }

    pub(crate) fn resolution_failed(&self, key: &Key, scope: &Scope, error: &LocatorError) {
        for observer in &self.observers {
            observer.resolution_failed(key, scope, error);
        }
    }

    pub(crate) fn scope_created(&self, scope: &Scope) {
        for observer in &self.observers {
            observer.scope_created(scope);
        }
    }

    pub(crate) fn scope_closed(&self, scope_id: &str) {
        for observer in &self.observers {
            observer.scope_closed(scope_id);
        }
    }
}

/// Observer that emits `tracing` events at `debug` level.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl LoggingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl LocatorObserver for LoggingObserver {
    fn resolving(&self, key: &Key, scope: &Scope) {
        tracing::debug!(key = %key, scope = %scope, "resolving");
    }

    fn resolved(&self, key: &Key, scope: &Scope, duration: Duration) {
        tracing::debug!(key = %key, scope = %scope, ?duration, "resolved");
    }

    fn resolution_failed(&self, key: &Key, scope: &Scope, error: &LocatorError) {
        tracing::debug!(key = %key, scope = %scope, %error, "resolution failed");
    }

    fn scope_created(&self, scope: &Scope) {
        tracing::debug!(scope = %scope, "scope created");
    }

    fn scope_closed(&self, scope_id: &str) {
        tracing::debug!(scope_id, "scope closed");
    }
}

/// Observer collecting simple counters.
#[derive(Debug, Default)]
pub struct MetricsObserver {
    resolutions: AtomicU64,
    failures: AtomicU64,
    total_resolution_nanos: AtomicU64,
    scopes_created: AtomicU64,
    scopes_closed: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolution_count(&self) -> u64 {
        self.resolutions.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn average_resolution_time(&self) -> Option<Duration> {
        let count = self.resolution_count();
        if count == 0 {
            return None;
        }
        let total = self.total_resolution_nanos.load(Ordering::Relaxed);
        Some(Duration::from_nanos(total / count))
    }

    pub fn scopes_created(&self) -> u64 {
        self.scopes_created.load(Ordering::Relaxed)
    }

    pub fn scopes_closed(&self) -> u64 {
        self.scopes_closed.load(Ordering::Relaxed)
    }

    /// Scopes created but not yet closed.
    pub fn live_scopes(&self) -> u64 {
        self.scopes_created().saturating_sub(self.scopes_closed())
    }
}

impl LocatorObserver for MetricsObserver {
    fn resolved(&self, _key: &Key, _scope: &Scope, duration: Duration) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        self.total_resolution_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn resolution_failed(&self, _key: &Key, _scope: &Scope, _error: &LocatorError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    fn scope_created(&self, _scope: &Scope) {
        self.scopes_created.fetch_add(1, Ordering::Relaxed);
    }

    fn scope_closed(&self, _scope_id: &str) {
        self.scopes_closed.fetch_add(1, Ordering::Relaxed);
    }
}
