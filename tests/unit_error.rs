/// Unit tests for LocatorError and LocatorResult types

use ferrous_locator::{LocatorError, LocatorResult};
use std::error::Error;

#[test]
fn test_error_display_closed_scope() {
    let error = LocatorError::ClosedScope("Scope[id:'session-42']".to_string());
    assert_eq!(error.to_string(), "Scope Scope[id:'session-42'] is closed");
}

#[test]
fn test_error_display_unknown_scope() {
    let error = LocatorError::UnknownScope("job-7".to_string());
    assert_eq!(error.to_string(), "No scope found for id 'job-7'");
}

#[test]
fn test_error_display_missing_property() {
    let error = LocatorError::MissingProperty("db.url".to_string());
    assert_eq!(error.to_string(), "Property 'db.url' is missing");
}

#[test]
fn test_error_display_circular() {
    let error = LocatorError::Circular(vec!["A".into(), "B".into(), "A".into()]);
    let display_str = error.to_string();
    assert_eq!(display_str, "Circular dependency: A -> B -> A");
    assert!(display_str.contains("A -> B -> A"));
}

#[test]
fn test_error_display_depth_exceeded() {
    assert_eq!(LocatorError::DepthExceeded(1024).to_string(), "Max depth 1024 exceeded");
}

#[test]
fn test_error_display_wrong_scope() {
    let error = LocatorError::WrongScope {
        definition: "Cart".to_string(),
        expected: "session".to_string(),
        scope: "Scope[id:'job']".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Definition Cart requires a scope from set 'session', got Scope[id:'job']"
    );
}

#[test]
fn test_error_display_property_type() {
    let error = LocatorError::PropertyType {
        key: "port".to_string(),
        expected: "u16",
    };
    assert_eq!(error.to_string(), "Property 'port' is not a u16");
}

#[test]
fn test_error_display_registration() {
    assert_eq!(
        LocatorError::AlreadyRegistered("Scope[id:'a']".into()).to_string(),
        "Scope Scope[id:'a'] is already registered"
    );
    assert_eq!(
        LocatorError::ReservedScopeId("-GLOBAL-".into()).to_string(),
        "Scope id '-GLOBAL-' is reserved"
    );
    assert_eq!(
        LocatorError::DuplicateScope("a".into()).to_string(),
        "Scope with id 'a' already exists"
    );
}

#[test]
fn test_error_is_std_error() {
    let error = LocatorError::NotFound("u32".to_string());
    assert!(error.source().is_none());

    let boxed: Box<dyn Error + Send + Sync> = Box::new(error);
    assert_eq!(boxed.to_string(), "No definition found for u32");
}

#[test]
fn test_error_clone_and_eq() {
    let error = LocatorError::Construction("pool exhausted".to_string());
    assert_eq!(error.clone(), error);
    assert_ne!(error, LocatorError::Construction("other".to_string()));
}

#[test]
fn test_result_alias() {
    fn fails() -> LocatorResult<u8> {
        Err(LocatorError::Config("line 1: expected key=value".to_string()))
    }

    assert_eq!(
        fails().unwrap_err().to_string(),
        "Invalid configuration: line 1: expected key=value"
    );
}
