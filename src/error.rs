//! Error types for the service locator.

use thiserror::Error;

/// Service locator errors
///
/// Represents the error conditions that can occur while registering scopes,
/// resolving instances or reading properties. Scope lifecycle errors
/// (`ClosedScope`, `UnknownScope`, ...) are raised by the scope core itself;
/// the resolution family (`NotFound`, `Circular`, ...) is raised by the
/// registry and propagated unchanged.
///
/// Errors are `Clone` so a lazy [`Injected`](crate::Injected) handle can
/// replay a failed resolution on every read.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::LocatorError;
///
/// let closed = LocatorError::ClosedScope("Scope[id:'session-42']".to_string());
/// assert_eq!(closed.to_string(), "Scope Scope[id:'session-42'] is closed");
///
/// let missing = LocatorError::MissingProperty("db.url".to_string());
/// assert_eq!(missing.to_string(), "Property 'db.url' is missing");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocatorError {
    /// Resolution attempted through a scope with no owner (closed or never registered)
    #[error("Scope {0} is closed")]
    ClosedScope(String),
    /// No live scope with the given id
    #[error("No scope found for id '{0}'")]
    UnknownScope(String),
    /// Property not set and no default supplied
    #[error("Property '{0}' is missing")]
    MissingProperty(String),
    /// A context was requested for a scope that has no owner
    #[error("Scope {0} is not registered")]
    NotRegistered(String),
    /// `register` called on a scope that already has an owner
    #[error("Scope {0} is already registered")]
    AlreadyRegistered(String),
    /// The global scope id cannot be used for user scopes
    #[error("Scope id '{0}' is reserved")]
    ReservedScopeId(String),
    /// A live scope with the same id already exists
    #[error("Scope with id '{0}' already exists")]
    DuplicateScope(String),
    /// No scope set declared for the qualifier
    #[error("No scope set declared for '{0}'")]
    UnknownScopeSet(String),

    /// No definition for the requested type and qualifier
    #[error("No definition found for {0}")]
    NotFound(String),
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Scoped definition requested from the wrong scope
    #[error("Definition {definition} requires a scope from set '{expected}', got {scope}")]
    WrongScope {
        definition: String,
        expected: String,
        scope: String,
    },
    /// Stored property cannot be converted to the requested type
    #[error("Property '{key}' is not a {expected}")]
    PropertyType { key: String, expected: &'static str },
    /// Constructor argument missing or of the wrong type
    #[error("Parameter #{index} is missing or not a {expected}")]
    MissingParameter { index: usize, expected: &'static str },
    /// A definition's constructor reported a failure
    #[error("Could not create instance: {0}")]
    Construction(String),
    /// A property source could not be read or parsed
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for locator operations
///
/// A convenience alias for `Result<T, LocatorError>`.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{LocatorError, LocatorResult};
///
/// fn lookup(id: &str) -> LocatorResult<()> {
///     Err(LocatorError::UnknownScope(id.to_string()))
/// }
///
/// assert!(lookup("missing").is_err());
/// ```
pub type LocatorResult<T> = Result<T, LocatorError>;
