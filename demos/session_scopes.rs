//! Session scopes with close callbacks and disposable scoped instances.
//!
//! Run with `cargo run --example session_scopes`.

use ferrous_locator::{Dispose, Locator, LocatorResult, LoggingObserver, Module, Resolver, Scope};
use std::sync::Arc;

struct Database {
    url: String,
}

struct Session {
    user: String,
    db: Arc<Database>,
}

impl Dispose for Session {
    fn dispose(&self) {
        println!("  disposing session for {}", self.user);
    }
}

// Built per call, in whichever scope asked for it
struct Handler {
    session: Arc<Session>,
}

fn main() -> LocatorResult<()> {
    let locator = Locator::builder()
        .property("db.url", "postgres://localhost/app")
        .observer(Arc::new(LoggingObserver::new()))
        .module(
            Module::new()
                .single(|ctx, _| {
                    Ok(Database {
                        url: ctx.get_property("db.url")?,
                    })
                })
                .factory(|ctx, _| Ok(Handler { session: ctx.get()? }))
                .scope("session", |s| {
                    s.scoped_disposable(|ctx, _| {
                        let scope = ctx.current_scope();
                        Ok(Session {
                            user: scope.properties().get_or("user", "anonymous".to_string())?,
                            db: ctx.get()?,
                        })
                    })
                }),
        )
        .build();

    for (id, user) in [("session-1", "ada"), ("session-2", "grace")] {
        let scope = locator.create_scope(id, Some(&"session".into()))?;
        scope.properties().set("user", user);
        scope.register_callback(Arc::new(|s: &Scope| println!("  {} closed", s)));
    }

    for id in locator.scope_ids() {
        let scope = locator.get_scope(&id)?;
        let handler = scope.get::<Handler>()?;
        println!(
            "{} -> user {} on {}",
            scope,
            handler.session.user,
            handler.session.db.url
        );
    }

    // Peek into another live session from the global context
    let other = locator
        .context()
        .get_from_scope::<Session>("session-2", None, None)?;
    println!("session-2 belongs to {}", other.user);

    println!("closing session-1");
    locator.delete_scope("session-1")?;

    println!("shutting down");
    locator.close();
    Ok(())
}
