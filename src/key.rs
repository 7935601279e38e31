//! Type tokens and qualifiers used to look up definitions.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::{LocatorError, LocatorResult};

/// Type-erased instance as stored and returned by a registry.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Discriminator between several definitions of the same type.
///
/// Qualifiers also name scope sets: a scope created from the set `"session"`
/// carries that qualifier for display and release coordination.
///
/// ```rust
/// use ferrous_locator::Qualifier;
///
/// let q = Qualifier::from("primary");
/// assert_eq!(q.as_str(), "primary");
/// assert_eq!(q.to_string(), "primary");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Qualifier(Arc<str>);

impl Qualifier {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Qualifier {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Qualifier {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key for definition storage and lookup.
///
/// A key is the explicit type token every resolution call carries: the
/// `TypeId` of the requested type, its name for diagnostics and an optional
/// qualifier. Equality and hashing ignore the type name.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::{Key, Qualifier};
///
/// let plain = Key::of::<u32>();
/// let named = Key::named::<u32>(Qualifier::from("port"));
///
/// assert_ne!(plain, named);
/// assert_eq!(plain.display_name(), "u32");
/// assert_eq!(named.qualifier().map(|q| q.as_str()), Some("port"));
/// assert_eq!(named.to_string(), "u32 (qualifier 'port')");
/// ```
#[derive(Debug, Clone)]
pub struct Key {
    type_id: TypeId,
    type_name: &'static str,
    qualifier: Option<Qualifier>,
}

impl Key {
    #[inline]
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            qualifier: None,
        }
    }

    #[inline]
    pub fn named<T: 'static>(qualifier: Qualifier) -> Self {
        Self::of::<T>().with_qualifier(Some(&qualifier))
    }

    /// Replaces the qualifier, keeping the type token.
    pub fn with_qualifier(mut self, qualifier: Option<&Qualifier>) -> Self {
        self.qualifier = qualifier.cloned();
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The `std::any::type_name` of the requested type.
    pub fn display_name(&self) -> &'static str {
        self.type_name
    }

    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }
}

impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.qualifier == other.qualifier
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.qualifier.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{} (qualifier '{}')", self.type_name, q),
            None => f.write_str(self.type_name),
        }
    }
}

/// Recovers the concrete `Arc<T>` from a type-erased instance.
pub(crate) fn downcast<T: Send + Sync + 'static>(any: AnyArc) -> LocatorResult<Arc<T>> {
    any.downcast::<T>()
        .map_err(|_| LocatorError::TypeMismatch(std::any::type_name::<T>()))
}
