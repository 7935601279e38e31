#![no_main]

use libfuzzer_sys::fuzz_target;
use ferrous_locator::{Locator, LocatorError, Module, Resolver, Scope};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Session {
    id: String,
}

fuzz_target!(|data: &[u8]| {
    let locator = Locator::builder()
        .module(Module::new().scope("session", |s| {
            s.scoped(|ctx, _| Ok(Session { id: ctx.current_scope().id().to_string() }))
        }))
        .build();

    let notified = Arc::new(AtomicUsize::new(0));
    let mut closed = 0usize;
    let mut scopes: Vec<Arc<Scope>> = Vec::new();

    // Each byte is one operation; the low bits pick a scope slot
    for &op in data {
        let slot = (op >> 3) as usize % 4;
        match op % 8 {
            0 | 1 => {
                if let Ok(scope) = locator.create_scope(format!("s{}", slot), Some(&"session".into())) {
                    let counter = notified.clone();
                    scope.register_callback(Arc::new(move |_: &Scope| {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }));
                    scopes.push(scope);
                }
            }
            2 | 3 => {
                if let Some(scope) = scopes.get(slot) {
                    match scope.get::<Session>() {
                        Ok(session) => {
                            assert!(scope.is_registered());
                            assert_eq!(session.id, scope.id());
                        }
                        Err(LocatorError::ClosedScope(_)) => assert!(scope.is_closed()),
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                }
            }
            4 | 5 => {
                if let Some(scope) = scopes.get(slot) {
                    if !scope.is_closed() {
                        closed += 1;
                    }
                    scope.close();
                }
            }
            6 => {
                let _ = locator.context().get_from_scope::<Session>(&format!("s{}", slot), None, None);
            }
            _ => {
                for scope in &scopes {
                    if !scope.is_closed() {
                        closed += 1;
                    }
                }
                locator.close();
            }
        }
        // Every close notifies exactly once
        assert_eq!(notified.load(Ordering::SeqCst), closed);
    }

    locator.close();
});
