//! Close notifications for scopes.

use crate::scope::Scope;

/// Listener notified once when a scope closes.
///
/// Callbacks run in registration order after the scope has been released and
/// forgotten by its registry. A panicking callback is logged and skipped; the
/// remaining callbacks still run.
///
/// Closures taking `&Scope` implement this trait:
///
/// ```rust
/// use ferrous_locator::{Scope, ScopeCallback};
/// use std::sync::Arc;
///
/// let scope = Scope::new("job-7", None);
/// scope.register_callback(Arc::new(|s: &Scope| println!("{} closed", s)));
/// ```
pub trait ScopeCallback: Send + Sync {
    fn on_scope_close(&self, scope: &Scope);
}

impl<F> ScopeCallback for F
where
    F: Fn(&Scope) + Send + Sync,
{
    fn on_scope_close(&self, scope: &Scope) {
        self(scope)
    }
}
