use ferrous_locator::{
    parameters, Lifetime, Locator, LocatorError, LocatorObserver, MetricsObserver, Module, Parameters,
    Resolver,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_single_factory_lifetimes() {
    struct Config;
    struct Request;

    let locator = Locator::builder()
        .module(
            Module::new()
                .single(|_, _| Ok(Config))
                .factory(|_, _| Ok(Request)),
        )
        .build();

    assert!(Arc::ptr_eq(
        &locator.get::<Config>().unwrap(),
        &locator.get::<Config>().unwrap()
    ));
    assert!(!Arc::ptr_eq(
        &locator.get::<Request>().unwrap(),
        &locator.get::<Request>().unwrap()
    ));
}

#[test]
fn test_named_definitions() {
    let locator = Locator::builder()
        .module(
            Module::new()
                .single_named("primary", |_, _| Ok(String::from("db-1")))
                .single_named("replica", |_, _| Ok(String::from("db-2"))),
        )
        .build();

    assert_eq!(locator.get_named::<String>("primary").unwrap().as_str(), "db-1");
    assert_eq!(locator.get_named::<String>("replica").unwrap().as_str(), "db-2");
    assert_eq!(
        locator.get::<String>().unwrap_err(),
        LocatorError::NotFound("alloc::string::String".to_string())
    );
}

#[test]
fn test_not_found_names_qualifier() {
    let locator = Locator::builder().build();
    let err = locator.get_named::<u32>("port").unwrap_err();
    assert_eq!(err.to_string(), "No definition found for u32 (qualifier 'port')");
}

#[test]
fn test_parameters_reach_constructor() {
    struct Greeting(String);

    let locator = Locator::builder()
        .module(Module::new().factory(|_, params: &Parameters| {
            let name = params.get::<String>(0)?;
            Ok(Greeting(format!("hello {}", name)))
        }))
        .build();

    let params = parameters(|| Parameters::new().with(String::from("ada")));
    let greeting = locator.get_with::<Greeting>(None, Some(&params)).unwrap();
    assert_eq!(greeting.0, "hello ada");

    assert!(matches!(
        locator.get::<Greeting>(),
        Err(LocatorError::MissingParameter { index: 0, .. })
    ));
}

#[test]
fn test_later_definition_overrides() {
    let locator = Locator::builder()
        .module(Module::new().single(|_, _| Ok(1u8)))
        .module(Module::new().single(|_, _| Ok(2u8)))
        .build();

    assert_eq!(*locator.get::<u8>().unwrap(), 2);
}

#[test]
fn test_circular_dependency_detected() {
    struct A;
    struct B;

    let locator = Locator::builder()
        .module(
            Module::new()
                .factory(|ctx, _| {
                    ctx.get::<B>()?;
                    Ok(A)
                })
                .factory(|ctx, _| {
                    ctx.get::<A>()?;
                    Ok(B)
                }),
        )
        .build();

    match locator.get::<A>() {
        Err(LocatorError::Circular(path)) => {
            assert_eq!(path.len(), 3);
            assert_eq!(path.first(), path.last());
        }
        other => panic!("expected Circular, got {:?}", other.err()),
    }

    // The resolution stack is clean afterwards
    assert!(matches!(locator.get::<A>(), Err(LocatorError::Circular(_))));
}

#[test]
fn test_failed_single_is_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let locator = Locator::builder()
        .module(Module::new().single(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(LocatorError::Construction("not ready".to_string()))
            } else {
                Ok(7u64)
            }
        }))
        .build();

    assert_eq!(
        locator.get::<u64>().unwrap_err(),
        LocatorError::Construction("not ready".to_string())
    );
    assert_eq!(*locator.get::<u64>().unwrap(), 7);
    assert_eq!(*locator.get::<u64>().unwrap(), 7);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_inject_replays_first_outcome() {
    let locator = Locator::builder().build();
    let lazy = locator.inject::<u32>();

    assert!(!lazy.is_resolved());
    assert!(matches!(lazy.get(), Err(LocatorError::NotFound(_))));
    assert!(lazy.is_resolved());
    assert!(matches!(lazy.get(), Err(LocatorError::NotFound(_))));
}

#[test]
fn test_get_required_returns_instance() {
    let locator = Locator::builder()
        .module(Module::new().single(|_, _| Ok(7u32)))
        .build();

    assert_eq!(*locator.get_required::<u32>(), 7);
    assert!(Arc::ptr_eq(&locator.get_required::<u32>(), &locator.get::<u32>().unwrap()));
}

#[test]
#[should_panic(expected = "Failed to resolve u64")]
fn test_get_required_panics_when_missing() {
    let locator = Locator::builder().build();
    locator.get_required::<u64>();
}

#[test]
fn test_scope_inject_resolves_in_scope() {
    struct Session(String);

    let locator = Locator::builder()
        .module(Module::new().scope("session", |s| {
            s.scoped(|ctx, _| Ok(Session(ctx.current_scope().id().to_string())))
        }))
        .build();

    let scope = locator.create_scope("s7", Some(&"session".into())).unwrap();
    let lazy = scope.inject::<Session>();
    assert_eq!(lazy.get().unwrap().0, "s7");
}

#[test]
fn test_scope_management() {
    let locator = Locator::builder()
        .module(Module::new().scope("session", |s| s))
        .build();

    let a = locator.get_or_create_scope("a", Some(&"session".into())).unwrap();
    let again = locator.get_or_create_scope("a", Some(&"session".into())).unwrap();
    assert!(Arc::ptr_eq(&a, &again));
    assert_eq!(a.set_qualifier().map(|q| q.as_str()), Some("session"));

    let mut ids = {
        locator.create_scope("b", None).unwrap();
        locator.scope_ids()
    };
    ids.sort();
    assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);

    locator.delete_scope("a").unwrap();
    assert!(a.is_closed());
    assert_eq!(
        locator.delete_scope("a"),
        Err(LocatorError::UnknownScope("a".to_string()))
    );
}

#[test]
fn test_locator_close_closes_scopes() {
    let locator = Locator::builder().build();
    let scopes: Vec<_> = (0..4)
        .map(|i| locator.create_scope(format!("s{}", i), None).unwrap())
        .collect();

    locator.close();

    assert!(scopes.iter().all(|s| s.is_closed()));
    assert!(locator.scope_ids().is_empty());
}

#[test]
fn test_global_properties() {
    let locator = Locator::builder()
        .property("retries", 3)
        .properties([("name", "svc"), ("mode", "fast")])
        .build();

    assert_eq!(locator.get_property::<u32>("retries").unwrap(), 3);
    assert_eq!(locator.get_property::<String>("name").unwrap(), "svc");

    locator.set_property("retries", 5);
    assert_eq!(locator.get_property::<i64>("retries").unwrap(), 5);
    assert!(!locator.get_property_or("missing", false).unwrap());
}

#[test]
fn test_metrics_observer_counts() {
    let metrics = Arc::new(MetricsObserver::new());
    let locator = Locator::builder()
        .module(Module::new().single(|_, _| Ok(1u8)))
        .observer(metrics.clone())
        .build();

    locator.get::<u8>().unwrap();
    locator.get::<u16>().unwrap_err();

    let scope = locator.create_scope("s", None).unwrap();
    assert_eq!(metrics.live_scopes(), 1);
    scope.close();

    assert_eq!(metrics.resolution_count(), 1);
    assert_eq!(metrics.failure_count(), 1);
    assert_eq!(metrics.scopes_created(), 1);
    assert_eq!(metrics.scopes_closed(), 1);
    assert_eq!(metrics.live_scopes(), 0);
}

#[test]
fn test_custom_observer_sees_scope_of_resolution() {
    #[derive(Default)]
    struct Recorder {
        scopes: std::sync::Mutex<Vec<String>>,
    }

    impl LocatorObserver for Recorder {
        fn resolving(&self, _key: &ferrous_locator::Key, scope: &ferrous_locator::Scope) {
            self.scopes.lock().unwrap().push(scope.id().to_string());
        }
    }

    let recorder = Arc::new(Recorder::default());
    let locator = Locator::builder()
        .module(Module::new().factory(|_, _| Ok(0u8)))
        .observer(recorder.clone())
        .build();

    let scope = locator.create_scope("request-1", None).unwrap();
    scope.get::<u8>().unwrap();

    assert_eq!(*recorder.scopes.lock().unwrap(), vec!["request-1".to_string()]);
}

#[test]
fn test_lifetime_display() {
    assert_eq!(Lifetime::Single.to_string(), "single");
    assert_eq!(Lifetime::Scoped("session".into()).to_string(), "scoped(session)");
}

#[cfg(feature = "diagnostics")]
#[test]
fn test_debug_string_lists_definitions() {
    let locator = Locator::builder()
        .module(Module::new().single(|_, _| Ok(1u8)))
        .build();
    locator.create_scope("s1", None).unwrap();

    let dump = locator.to_debug_string();
    assert!(dump.contains("u8: single"));
    assert!(dump.contains("Scope[id:'s1']"));
}
