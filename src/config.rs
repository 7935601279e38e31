//! Property sources: environment variables, `key=value` text and JSON.
//!
//! Sources feed the locator's global property store through
//! [`LocatorBuilder::properties_from`](crate::LocatorBuilder::properties_from).
//!
//! ```rust
//! use ferrous_locator::config::{parse_properties, MapSource};
//! use ferrous_locator::Locator;
//!
//! let file = parse_properties("# server\nserver.port = 8080\nserver.host=localhost\n").unwrap();
//! let json = MapSource::from_json_str(r#"{"feature": {"beta": true}}"#).unwrap();
//!
//! let locator = Locator::builder()
//!     .properties_from(&file)
//!     .properties_from(&json)
//!     .build();
//!
//! assert_eq!(locator.get_property::<u16>("server.port").unwrap(), 8080);
//! assert!(locator.get_property::<bool>("feature.beta").unwrap());
//! ```

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::error::{LocatorError, LocatorResult};
use crate::properties::PropertyValue;

/// A read-only provider of property values.
pub trait PropertySource: Send + Sync + fmt::Debug {
    /// Get a property value by key
    fn get(&self, key: &str) -> Option<PropertyValue>;

    /// List all available keys
    fn keys(&self) -> Vec<String>;

    /// Every key with its value.
    fn entries(&self) -> Vec<(String, PropertyValue)> {
        self.keys()
            .into_iter()
            .filter_map(|key| self.get(&key).map(|value| (key, value)))
            .collect()
    }
}

/// Environment variables as properties.
///
/// Property keys map to variable names by upper-casing and replacing `.` with
/// `_`; with a prefix, `server.port` reads `PREFIX_SERVER_PORT`. Values are
/// typed with [`PropertyValue::parse`].
#[derive(Debug, Default)]
pub struct EnvironmentSource {
    prefix: Option<String>,
}

impl EnvironmentSource {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into().to_uppercase()),
        }
    }

    fn variable_name(&self, key: &str) -> String {
        let name = key.replace('.', "_").to_uppercase();
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, name),
            None => name,
        }
    }

    fn property_key(&self, variable: &str) -> Option<String> {
        let name = match &self.prefix {
            Some(prefix) => variable.strip_prefix(prefix.as_str())?.strip_prefix('_')?,
            None => variable,
        };
        Some(name.to_lowercase().replace('_', "."))
    }
}

impl PropertySource for EnvironmentSource {
    fn get(&self, key: &str) -> Option<PropertyValue> {
        env::var(self.variable_name(key))
            .ok()
            .map(|raw| PropertyValue::parse(&raw))
    }

    fn keys(&self) -> Vec<String> {
        env::vars()
            .filter_map(|(variable, _)| self.property_key(&variable))
            .collect()
    }
}

/// An in-memory source.
#[derive(Debug, Default, Clone)]
pub struct MapSource {
    values: HashMap<String, PropertyValue>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Loads a JSON object. Nested objects are flattened into dotted keys.
    pub fn from_json_str(json: &str) -> LocatorResult<Self> {
        let root: Value = serde_json::from_str(json)
            .map_err(|e| LocatorError::Config(format!("invalid JSON: {}", e)))?;
        let Value::Object(map) = root else {
            return Err(LocatorError::Config("JSON root must be an object".to_string()));
        };

        let mut source = Self::new();
        for (key, value) in map {
            flatten(&mut source, key, value)?;
        }
        Ok(source)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> LocatorResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LocatorError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }
}

fn flatten(source: &mut MapSource, key: String, value: Value) -> LocatorResult<()> {
    let property = match value {
        Value::Object(map) => {
            for (child, value) in map {
                flatten(source, format!("{}.{}", key, child), value)?;
            }
            return Ok(());
        }
        Value::Null => PropertyValue::Null,
        Value::Bool(b) => PropertyValue::Boolean(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => PropertyValue::Integer(i),
            None => PropertyValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => PropertyValue::String(s),
        Value::Array(_) => {
            return Err(LocatorError::Config(format!(
                "property '{}' is an array, which is not supported",
                key
            )))
        }
    };
    source.values.insert(key, property);
    Ok(())
}

impl PropertySource for MapSource {
    fn get(&self, key: &str) -> Option<PropertyValue> {
        self.values.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

/// Parses `key=value` lines. Blank lines and lines starting with `#` are skipped;
/// keys and values are trimmed and values typed with [`PropertyValue::parse`].
pub fn parse_properties(text: &str) -> LocatorResult<MapSource> {
    let mut source = MapSource::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| {
            LocatorError::Config(format!("line {}: expected key=value", number + 1))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(LocatorError::Config(format!("line {}: empty key", number + 1)));
        }
        source.insert(key, PropertyValue::parse(value.trim()));
    }
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_comments_and_blank_lines() {
        let source = parse_properties("# comment\n\n a = 1 \nb=text\nc=\n").unwrap();
        assert_eq!(source.get("a"), Some(PropertyValue::Integer(1)));
        assert_eq!(source.get("b"), Some(PropertyValue::String("text".into())));
        assert_eq!(source.get("c"), Some(PropertyValue::String(String::new())));
        assert_eq!(source.len(), 3);
    }

    #[test]
    fn parse_rejects_lines_without_separator() {
        let err = parse_properties("a=1\noops\n").unwrap_err();
        assert_eq!(err, LocatorError::Config("line 2: expected key=value".to_string()));
    }

    #[test]
    fn json_objects_are_flattened() {
        let source =
            MapSource::from_json_str(r#"{"db": {"url": "pg://", "pool": 4, "ratio": 0.5}, "debug": null}"#)
                .unwrap();
        assert_eq!(source.get("db.url"), Some(PropertyValue::String("pg://".into())));
        assert_eq!(source.get("db.pool"), Some(PropertyValue::Integer(4)));
        assert_eq!(source.get("db.ratio"), Some(PropertyValue::Float(0.5)));
        assert_eq!(source.get("debug"), Some(PropertyValue::Null));
    }

    #[test]
    fn json_arrays_and_scalars_are_rejected() {
        assert!(matches!(
            MapSource::from_json_str(r#"{"hosts": ["a"]}"#),
            Err(LocatorError::Config(_))
        ));
        assert!(matches!(MapSource::from_json_str("3"), Err(LocatorError::Config(_))));
    }

    #[test]
    fn environment_names_follow_prefix() {
        let source = EnvironmentSource::with_prefix("app");
        assert_eq!(source.variable_name("server.port"), "APP_SERVER_PORT");
        assert_eq!(source.property_key("APP_SERVER_PORT"), Some("server.port".to_string()));
        assert_eq!(source.property_key("OTHER_PORT"), None);
    }
}
