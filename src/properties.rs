//! Property values and property stores.
//!
//! The locator keeps one global [`Properties`] store and every [`Scope`](crate::Scope)
//! carries its own, independent store. Values are loosely typed
//! ([`PropertyValue`]) and converted on read through [`FromProperty`].

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{LocatorError, LocatorResult};

/// A stored property value.
///
/// `Null` is a real, present value: reading it as `Option<T>` yields `None`
/// without falling back to a caller-supplied default.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(untagged))]
pub enum PropertyValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    /// Parses raw text the way environment variables and property files are read.
    ///
    /// ```rust
    /// use ferrous_locator::PropertyValue;
    ///
    /// assert_eq!(PropertyValue::parse("42"), PropertyValue::Integer(42));
    /// assert_eq!(PropertyValue::parse("true"), PropertyValue::Boolean(true));
    /// assert_eq!(PropertyValue::parse("dark"), PropertyValue::String("dark".into()));
    /// ```
    pub fn parse(raw: &str) -> Self {
        if let Ok(int_val) = raw.parse::<i64>() {
            PropertyValue::Integer(int_val)
        } else if let Ok(float_val) = raw.parse::<f64>() {
            PropertyValue::Float(float_val)
        } else if let Ok(bool_val) = raw.parse::<bool>() {
            PropertyValue::Boolean(bool_val)
        } else {
            PropertyValue::String(raw.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Null => f.write_str("null"),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(x) => write!(f, "{}", x),
            PropertyValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Integer(value.into())
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropertyValue::Null, Into::into)
    }
}

/// Conversion from a stored [`PropertyValue`] into a typed value.
pub trait FromProperty: Sized {
    fn from_property(key: &str, value: &PropertyValue) -> LocatorResult<Self>;
}

fn type_error<T>(key: &str) -> LocatorError {
    LocatorError::PropertyType {
        key: key.to_string(),
        expected: std::any::type_name::<T>(),
    }
}

impl FromProperty for PropertyValue {
    fn from_property(_key: &str, value: &PropertyValue) -> LocatorResult<Self> {
        Ok(value.clone())
    }
}

impl FromProperty for String {
    fn from_property(key: &str, value: &PropertyValue) -> LocatorResult<Self> {
        match value {
            PropertyValue::Null => Err(type_error::<String>(key)),
            other => Ok(other.to_string()),
        }
    }
}

impl FromProperty for bool {
    fn from_property(key: &str, value: &PropertyValue) -> LocatorResult<Self> {
        match value {
            PropertyValue::Boolean(b) => Ok(*b),
            PropertyValue::String(s) => s.parse().map_err(|_| type_error::<bool>(key)),
            _ => Err(type_error::<bool>(key)),
        }
    }
}

impl FromProperty for f64 {
    fn from_property(key: &str, value: &PropertyValue) -> LocatorResult<Self> {
        match value {
            PropertyValue::Float(x) => Ok(*x),
            PropertyValue::Integer(i) => Ok(*i as f64),
            PropertyValue::String(s) => s.parse().map_err(|_| type_error::<f64>(key)),
            _ => Err(type_error::<f64>(key)),
        }
    }
}

macro_rules! integer_from_property {
    ($($ty:ty),*) => {$(
        impl FromProperty for $ty {
            fn from_property(key: &str, value: &PropertyValue) -> LocatorResult<Self> {
                let wide = match value {
                    PropertyValue::Integer(i) => *i,
                    PropertyValue::String(s) => s.parse::<i64>().map_err(|_| type_error::<$ty>(key))?,
                    _ => return Err(type_error::<$ty>(key)),
                };
                <$ty>::try_from(wide).map_err(|_| type_error::<$ty>(key))
            }
        }
    )*};
}

integer_from_property!(i64, i32, u64, u32, u16, usize);

impl<T: FromProperty> FromProperty for Option<T> {
    fn from_property(key: &str, value: &PropertyValue) -> LocatorResult<Self> {
        match value {
            PropertyValue::Null => Ok(None),
            other => T::from_property(key, other).map(Some),
        }
    }
}

/// Thread-safe string-keyed property store.
///
/// # Examples
///
/// ```rust
/// use ferrous_locator::Properties;
///
/// let props = Properties::new();
/// props.set("theme", "dark");
/// props.set("retries", 0i64);
///
/// assert_eq!(props.get_as::<String>("theme").unwrap(), "dark");
/// assert_eq!(props.get_or("retries", 3i64).unwrap(), 0);
/// assert_eq!(props.get_or("timeout", 30i64).unwrap(), 30);
/// assert!(props.get_as::<String>("missing").is_err());
/// ```
#[derive(Default)]
pub struct Properties {
    values: RwLock<HashMap<String, PropertyValue>>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.values.write().insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<PropertyValue> {
        self.values.read().get(key).cloned()
    }

    /// Reads and converts `key`; fails with `MissingProperty` when unset.
    pub fn get_as<T: FromProperty>(&self, key: &str) -> LocatorResult<T> {
        match self.get(key) {
            Some(value) => T::from_property(key, &value),
            None => Err(LocatorError::MissingProperty(key.to_string())),
        }
    }

    /// Reads and converts `key`, returning `default` only when unset.
    pub fn get_or<T: FromProperty>(&self, key: &str, default: T) -> LocatorResult<T> {
        match self.get(key) {
            Some(value) => T::from_property(key, &value),
            None => Ok(default),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<PropertyValue> {
        self.values.write().remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.values.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    pub fn extend<I, K, V>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        let mut values = self.values.write();
        for (k, v) in entries {
            values.insert(k.into(), v.into());
        }
    }

    pub fn clear(&self) {
        self.values.write().clear();
    }
}

impl fmt::Debug for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.values.read().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_present_not_absent() {
        let props = Properties::new();
        props.set("proxy", PropertyValue::Null);

        let proxy: Option<String> = props.get_or("proxy", Some("fallback".to_string())).unwrap();
        assert_eq!(proxy, None);

        let unset: Option<String> = props.get_or("other", Some("fallback".to_string())).unwrap();
        assert_eq!(unset.as_deref(), Some("fallback"));
    }

    #[test]
    fn zero_and_false_are_returned_over_defaults() {
        let props = Properties::new();
        props.set("count", 0i64);
        props.set("enabled", false);

        assert_eq!(props.get_or("count", 10i64).unwrap(), 0);
        assert!(!props.get_or("enabled", true).unwrap());
    }

    #[test]
    fn integer_conversion_checks_range() {
        let props = Properties::new();
        props.set("port", 70000i64);
        props.set("text_port", "8080");

        assert!(matches!(
            props.get_as::<u16>("port"),
            Err(LocatorError::PropertyType { .. })
        ));
        assert_eq!(props.get_as::<u16>("text_port").unwrap(), 8080);
        assert_eq!(props.get_as::<u32>("port").unwrap(), 70000);
    }

    #[test]
    fn scalar_values_render_as_strings() {
        let props = Properties::new();
        props.set("port", 8080i64);
        assert_eq!(props.get_as::<String>("port").unwrap(), "8080");
    }
}
