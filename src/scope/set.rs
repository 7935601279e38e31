//! Scope sets: the templates scopes are instantiated from.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::{Scope, ScopeId};
use crate::error::{LocatorError, LocatorResult};
use crate::internal::panic_message;
use crate::key::{AnyArc, Key, Qualifier};

/// Hook run on a scoped instance when its scope is released.
pub(crate) type ReleaseHook = Arc<dyn Fn(&AnyArc) + Send + Sync>;

struct ScopedInstance {
    key: Key,
    value: AnyArc,
    on_release: Option<ReleaseHook>,
}

impl ScopedInstance {
    fn release(self, scope: &Scope) {
        let Some(hook) = self.on_release else {
            return;
        };
        let value = self.value;
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| hook(&value))) {
            warn!(
                scope = %scope,
                key = %self.key,
                "release hook panicked: {}",
                panic_message(payload.as_ref())
            );
        }
    }
}

struct Slot {
    scope_id: ScopeId,
    instances: Vec<ScopedInstance>,
}

/// A qualifier-tagged scope template.
///
/// Every scope created from a set shares its scoped definitions; the set keeps
/// the scoped instances per scope instance and drops them in
/// [`ScopeSet::release`] when that scope closes. A scope reusing a closed
/// scope's id starts empty. Scopes only hold a weak link to their set.
pub struct ScopeSet {
    qualifier: Qualifier,
    slots: Mutex<HashMap<u64, Slot>>,
}

impl ScopeSet {
    pub fn new(qualifier: impl Into<Qualifier>) -> Self {
        Self {
            qualifier: qualifier.into(),
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn qualifier(&self) -> &Qualifier {
        &self.qualifier
    }

    /// Returns the instance cached for `(scope, key)`, creating it if needed.
    ///
    /// `create` runs without the set lock held so constructors can resolve
    /// other scoped definitions of the same set. If two threads race, the
    /// first stored instance wins and the loser is released at once. A value
    /// built while `scope` closes is released and the call fails with
    /// `ClosedScope`, so nothing outlives the release pass.
    pub(crate) fn get_or_create<F>(
        &self,
        scope: &Scope,
        key: &Key,
        on_release: Option<&ReleaseHook>,
        create: F,
    ) -> LocatorResult<AnyArc>
    where
        F: FnOnce() -> LocatorResult<AnyArc>,
    {
        if scope.is_closing() {
            return Err(LocatorError::ClosedScope(scope.to_string()));
        }
        if let Some(found) = self.cached(scope, key) {
            return Ok(found);
        }

        let fresh = ScopedInstance {
            key: key.clone(),
            value: create()?,
            on_release: on_release.cloned(),
        };

        let mut slots = self.slots.lock();
        // Checked under the lock: close flags the scope before release takes it
        if scope.is_closing() {
            drop(slots);
            trace!(scope = %scope, key = %key, "discarding instance built during close");
            fresh.release(scope);
            return Err(LocatorError::ClosedScope(scope.to_string()));
        }

        let slot = slots.entry(scope.token()).or_insert_with(|| Slot {
            scope_id: scope.id().to_string(),
            instances: Vec::new(),
        });
        if let Some(existing) = slot.instances.iter().find(|i| &i.key == key) {
            let winner = existing.value.clone();
            drop(slots);
            fresh.release(scope);
            return Ok(winner);
        }

        let value = fresh.value.clone();
        slot.instances.push(fresh);
        Ok(value)
    }

    fn cached(&self, scope: &Scope, key: &Key) -> Option<AnyArc> {
        self.slots
            .lock()
            .get(&scope.token())
            .and_then(|slot| slot.instances.iter().find(|i| &i.key == key))
            .map(|i| i.value.clone())
    }

    /// Drops every instance held for `scope`, newest first, running release hooks.
    ///
    /// Safe to call for a scope that never created anything.
    pub fn release(&self, scope: &Scope) {
        let released = self.slots.lock().remove(&scope.token());
        let Some(mut released) = released else {
            return;
        };

        debug!(scope = %scope, count = released.instances.len(), "releasing scoped instances");
        while let Some(instance) = released.instances.pop() {
            instance.release(scope);
        }
    }

    /// Number of instances currently held for live scopes named `scope_id`.
    pub fn instance_count(&self, scope_id: &str) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.scope_id == scope_id)
            .map(|slot| slot.instances.len())
            .sum()
    }

    /// Ids of scopes holding at least one instance.
    pub fn active_scope_ids(&self) -> Vec<ScopeId> {
        self.slots.lock().values().map(|slot| slot.scope_id.clone()).collect()
    }
}

impl fmt::Debug for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeSet")
            .field("qualifier", &self.qualifier)
            .field("scopes", &self.slots.lock().len())
            .finish()
    }
}
