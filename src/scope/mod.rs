//! Named lifetime scopes and their close protocol.
//!
//! A [`Scope`] is created unregistered, becomes live when a registry attaches
//! itself through [`Scope::register`], and dies exactly once in
//! [`Scope::close`]. Resolution through a scope checks liveness on every call.

mod injected;
mod set;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use once_cell::sync::Lazy;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use tracing::{debug, trace, warn};

use crate::context::DefinitionContext;
use crate::error::{LocatorError, LocatorResult};
use crate::internal::panic_message;
use crate::key::{AnyArc, Key, Qualifier};
use crate::parameters::ParametersDefinition;
use crate::properties::Properties;
use crate::traits::{RegistryRef, Resolver, ScopeCallback};

pub use injected::Injected;
pub(crate) use set::ReleaseHook;
pub use set::ScopeSet;

/// Scope identifier, unique among a registry's live scopes.
pub type ScopeId = String;

/// Reserved id of the global scope.
pub const GLOBAL_SCOPE_ID: &str = "-GLOBAL-";

static GLOBAL: Lazy<Arc<Scope>> = Lazy::new(|| Scope::new(GLOBAL_SCOPE_ID, None));

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

enum ScopeState {
    Unregistered,
    Registered(RegistryRef),
    Closed,
}

struct ScopeSetLink {
    qualifier: Qualifier,
    set: Weak<ScopeSet>,
}

/// A named lifetime container.
///
/// Scopes hold scope-local [`Properties`], an optional weak link to the
/// [`ScopeSet`] they were instantiated from, the registry that owns them and
/// an ordered list of close callbacks.
///
/// # Lifecycle
///
/// - **Unregistered**: created, no owner; resolution fails with `ClosedScope`.
/// - **Registered**: owner attached; resolution delegates to the owner.
/// - **Closed**: terminal; owner and callbacks cleared. A closed scope cannot
///   be registered again.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{Locator, LocatorError, Module, Resolver};
///
/// struct Cart { items: Vec<String> }
///
/// let locator = Locator::builder()
///     .module(Module::new().scope("session", |s| {
///         s.scoped(|_, _| Ok(Cart { items: Vec::new() }))
///     }))
///     .build();
///
/// let scope = locator.create_scope("session-42", Some(&"session".into())).unwrap();
/// assert!(scope.get::<Cart>().unwrap().items.is_empty());
///
/// scope.close();
/// assert!(matches!(scope.get::<Cart>(), Err(LocatorError::ClosedScope(_))));
/// ```
pub struct Scope {
    id: ScopeId,
    // Distinguishes scopes that reuse an id
    token: u64,
    set: Option<ScopeSetLink>,
    state: RwLock<ScopeState>,
    closing: AtomicBool,
    properties: Properties,
    callbacks: Mutex<Vec<Arc<dyn ScopeCallback>>>,
    close_lock: ReentrantMutex<()>,
}

impl Scope {
    /// Creates an unregistered scope, optionally linked to the set it comes from.
    pub fn new(id: impl Into<ScopeId>, set: Option<&Arc<ScopeSet>>) -> Arc<Self> {
        Arc::new(Self {
            id: id.into(),
            token: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
            set: set.map(|s| ScopeSetLink {
                qualifier: s.qualifier().clone(),
                set: Arc::downgrade(s),
            }),
            state: RwLock::new(ScopeState::Unregistered),
            closing: AtomicBool::new(false),
            properties: Properties::new(),
            callbacks: Mutex::new(Vec::new()),
            close_lock: ReentrantMutex::new(()),
        })
    }

    /// The process-wide global scope.
    ///
    /// It is never registered to a registry and never closed; registries
    /// resolve it specially.
    pub fn global() -> Arc<Scope> {
        GLOBAL.clone()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Process-unique identity of this scope instance.
    pub(crate) fn token(&self) -> u64 {
        self.token
    }

    pub fn is_global(&self) -> bool {
        self.id == GLOBAL_SCOPE_ID
    }

    /// Qualifier of the scope set this scope was instantiated from.
    pub fn set_qualifier(&self) -> Option<&Qualifier> {
        self.set.as_ref().map(|link| &link.qualifier)
    }

    /// The scope set, if it is still alive.
    pub fn scope_set(&self) -> Option<Arc<ScopeSet>> {
        self.set.as_ref().and_then(|link| link.set.upgrade())
    }

    /// Scope-local properties, independent of the registry's global store.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Attaches the owning registry.
    ///
    /// Fails with `AlreadyRegistered` on a live scope, `ClosedScope` on a
    /// closed one and `ReservedScopeId` for the global scope.
    pub fn register(&self, owner: RegistryRef) -> LocatorResult<()> {
        if self.is_global() {
            return Err(LocatorError::ReservedScopeId(self.id.clone()));
        }

        let mut state = self.state.write();
        match &*state {
            ScopeState::Unregistered => {
                *state = ScopeState::Registered(owner);
                debug!(scope = %self, "scope registered");
                Ok(())
            }
            ScopeState::Registered(_) => Err(LocatorError::AlreadyRegistered(self.to_string())),
            ScopeState::Closed => Err(LocatorError::ClosedScope(self.to_string())),
        }
    }

    /// True iff an owner is attached.
    pub fn is_registered(&self) -> bool {
        matches!(&*self.state.read(), ScopeState::Registered(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(&*self.state.read(), ScopeState::Closed)
    }

    /// True once [`close`](Scope::close) has started, before the state flips.
    pub(crate) fn is_closing(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    /// The owner at this instant, or `ClosedScope`.
    fn owner(&self) -> LocatorResult<RegistryRef> {
        match &*self.state.read() {
            ScopeState::Registered(owner) => Ok(owner.clone()),
            _ => Err(LocatorError::ClosedScope(self.to_string())),
        }
    }

    /// Appends a close listener. No deduplication; order is notification order.
    ///
    /// Registering on a scope that may already be closing is the caller's
    /// responsibility: such a callback may never run.
    pub fn register_callback(&self, callback: Arc<dyn ScopeCallback>) {
        if self.is_closed() {
            debug!(scope = %self, "ignoring callback registered on closed scope");
            return;
        }
        self.callbacks.lock().push(callback);
    }

    /// Closes the scope.
    ///
    /// Runs under a per-scope lock: releases the scope from its set, asks the
    /// owner to forget it, clears the owner, then notifies callbacks in
    /// registration order. Further calls are no-ops. Panicking callbacks are
    /// logged and do not stop the remaining ones.
    pub fn close(&self) {
        if self.is_global() {
            warn!("ignoring close on the global scope");
            return;
        }

        let _guard = self.close_lock.lock();
        let owner = match &*self.state.read() {
            ScopeState::Closed => {
                trace!(scope = %self, "scope already closed");
                return;
            }
            ScopeState::Registered(owner) => Some(owner.clone()),
            ScopeState::Unregistered => None,
        };

        debug!(scope = %self, "closing scope");

        // Must be visible before the set lock is taken in release
        self.closing.store(true, Ordering::SeqCst);
        if let Some(set) = self.scope_set() {
            set.release(self);
        }
        if let Some(owner) = owner {
            owner.forget_scope(&self.id);
        }
        *self.state.write() = ScopeState::Closed;

        let callbacks = std::mem::take(&mut *self.callbacks.lock());
        for callback in &callbacks {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback.on_scope_close(self))) {
                warn!(
                    scope = %self,
                    "scope callback panicked: {}",
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    /// A [`DefinitionContext`] bound to this scope.
    ///
    /// Fails with `NotRegistered` when the scope has no owner.
    pub fn context(self: &Arc<Self>) -> LocatorResult<DefinitionContext> {
        match &*self.state.read() {
            ScopeState::Registered(owner) => Ok(DefinitionContext::scoped(owner.clone(), self.clone())),
            _ => Err(LocatorError::NotRegistered(self.to_string())),
        }
    }
}

impl Resolver for Arc<Scope> {
    fn resolve_key(
        &self,
        key: &Key,
        parameters: Option<&ParametersDefinition>,
    ) -> LocatorResult<AnyArc> {
        let owner = self.owner()?;
        owner.resolve_any(key, self, parameters)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.set_qualifier() {
            Some(q) => write!(f, "Scope[id:'{}',set:'{}']", self.id, q),
            None => write!(f, "Scope[id:'{}']", self.id),
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.read() {
            ScopeState::Unregistered => "unregistered",
            ScopeState::Registered(_) => "registered",
            ScopeState::Closed => "closed",
        };
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("set", &self.set_qualifier())
            .field("state", &state)
            .field("callbacks", &self.callbacks.lock().len())
            .finish()
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.set_qualifier() == other.set_qualifier()
    }
}

impl Eq for Scope {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::PropertyValue;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingRegistry {
        forgotten: AtomicUsize,
    }

    impl crate::traits::RegistryCore for CountingRegistry {
        fn resolve_any(
            &self,
            key: &Key,
            _scope: &Arc<Scope>,
            _parameters: Option<&ParametersDefinition>,
        ) -> LocatorResult<AnyArc> {
            Err(LocatorError::NotFound(key.to_string()))
        }

        fn forget_scope(&self, _scope_id: &str) {
            self.forgotten.fetch_add(1, Ordering::SeqCst);
        }

        fn lookup_scope(&self, scope_id: &str) -> LocatorResult<Arc<Scope>> {
            Err(LocatorError::UnknownScope(scope_id.to_string()))
        }

        fn lookup_property(&self, _key: &str) -> Option<PropertyValue> {
            None
        }
    }

    #[test]
    fn display_includes_set_qualifier() {
        let set = Arc::new(ScopeSet::new("session"));
        assert_eq!(Scope::new("a", None).to_string(), "Scope[id:'a']");
        assert_eq!(Scope::new("b", Some(&set)).to_string(), "Scope[id:'b',set:'session']");
    }

    #[test]
    fn close_forgets_once() {
        let registry = Arc::new(CountingRegistry::default());
        let scope = Scope::new("job", None);
        scope.register(registry.clone()).unwrap();

        scope.close();
        scope.close();

        assert_eq!(registry.forgotten.load(Ordering::SeqCst), 1);
        assert!(scope.is_closed());
        assert!(!scope.is_registered());
    }

    #[test]
    fn register_is_strict() {
        let registry = Arc::new(CountingRegistry::default());
        let scope = Scope::new("job", None);
        scope.register(registry.clone()).unwrap();

        assert!(matches!(
            scope.register(registry.clone()),
            Err(LocatorError::AlreadyRegistered(_))
        ));

        scope.close();
        assert!(matches!(
            scope.register(registry.clone()),
            Err(LocatorError::ClosedScope(_))
        ));
        assert!(matches!(
            Scope::global().register(registry),
            Err(LocatorError::ReservedScopeId(_))
        ));
    }

    #[test]
    fn callback_closing_its_own_scope_does_not_deadlock() {
        let registry = Arc::new(CountingRegistry::default());
        let scope = Scope::new("job", None);
        scope.register(registry.clone()).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        scope.register_callback(Arc::new(move |s: &Scope| {
            counter.fetch_add(1, Ordering::SeqCst);
            s.close();
        }));

        scope.close();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.forgotten.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unregistered_scope_cannot_mint_context() {
        let scope = Scope::new("orphan", None);
        assert!(matches!(scope.context(), Err(LocatorError::NotRegistered(_))));
        assert!(matches!(scope.get::<u8>(), Err(LocatorError::ClosedScope(_))));
    }

    #[test]
    fn scopes_sharing_an_id_have_distinct_tokens() {
        let first = Scope::new("job", None);
        let second = Scope::new("job", None);
        assert_ne!(first.token(), second.token());

        first.close();
        assert!(first.is_closing());
        assert!(!second.is_closing());
    }

    #[test]
    fn global_scope_ignores_close() {
        let global = Scope::global();
        global.close();
        assert!(!global.is_closed());
        assert!(global.is_global());
    }
}
