//! Release hook for scoped instances.

/// Trait for scoped instances that need cleanup when their scope closes.
///
/// Definitions registered with
/// [`ScopeModule::scoped_disposable`](crate::ScopeModule::scoped_disposable)
/// call `dispose` when the scope set releases the scope. Instances are
/// disposed in reverse creation order.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::Dispose;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct Connection {
///     open: AtomicBool,
/// }
///
/// impl Dispose for Connection {
///     fn dispose(&self) {
///         self.open.store(false, Ordering::SeqCst);
///     }
/// }
/// ```
pub trait Dispose: Send + Sync + 'static {
    fn dispose(&self);
}
