//! Constructor arguments passed through a resolution call.

use std::fmt;
use std::sync::Arc;

use crate::error::{LocatorError, LocatorResult};
use crate::key::AnyArc;

/// Ordered, type-erased constructor arguments.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::Parameters;
///
/// let params = Parameters::new().with(8080u16).with("localhost".to_string());
///
/// assert_eq!(params.len(), 2);
/// assert_eq!(*params.get::<u16>(0).unwrap(), 8080);
/// assert_eq!(params.get::<String>(1).unwrap().as_str(), "localhost");
/// assert!(params.get::<u16>(1).is_err());
/// ```
#[derive(Clone, Default)]
pub struct Parameters {
    values: Vec<AnyArc>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an argument.
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.values.push(Arc::new(value));
        self
    }

    /// Returns the argument at `index` as `T`.
    pub fn get<T: Send + Sync + 'static>(&self, index: usize) -> LocatorResult<Arc<T>> {
        self.values
            .get(index)
            .cloned()
            .and_then(|any| any.downcast::<T>().ok())
            .ok_or(LocatorError::MissingParameter {
                index,
                expected: std::any::type_name::<T>(),
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameters")
            .field("len", &self.values.len())
            .finish()
    }
}

/// Deferred parameter supplier, evaluated only when a definition is constructed.
pub type ParametersDefinition = Arc<dyn Fn() -> Parameters + Send + Sync>;

/// Wraps a closure into a [`ParametersDefinition`].
///
/// ```rust
/// use ferrous_locator::parameters;
///
/// let params = parameters(|| ferrous_locator::Parameters::new().with(1u8));
/// assert_eq!(params().len(), 1);
/// ```
pub fn parameters<F>(supplier: F) -> ParametersDefinition
where
    F: Fn() -> Parameters + Send + Sync + 'static,
{
    Arc::new(supplier)
}
