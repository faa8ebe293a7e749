//! Dynamic context payloads attached to log entries
//!
//! `ContextValue` is a small dynamic value model. Containers are shared
//! (`Arc<RwLock<..>>`), so one payload can be referenced from several places
//! and may even contain itself. Everything that leaves the process goes
//! through [`crate::core::serializer`], which is what makes that safe.

use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Shared, lockable container storage
pub type Shared<T> = Arc<RwLock<T>>;

/// Ordered key/value storage of a map node
pub type Entries = Vec<(String, ContextValue)>;

#[derive(Clone, Default)]
pub enum ContextValue {
    /// Absent value; dropped from maps when serialized
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Shared<Vec<ContextValue>>),
    Map(Shared<Entries>),
}

impl ContextValue {
    /// Create an empty map node
    #[must_use]
    pub fn map() -> Self {
        ContextValue::Map(Arc::new(RwLock::new(Vec::new())))
    }

    /// Create an empty list node
    #[must_use]
    pub fn list() -> Self {
        ContextValue::List(Arc::new(RwLock::new(Vec::new())))
    }

    /// Builder form of [`ContextValue::insert`]
    #[must_use]
    pub fn with<K, V>(self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<ContextValue>,
    {
        self.insert(key, value);
        self
    }

    /// Builder form of [`ContextValue::push`]
    #[must_use]
    pub fn with_item<V: Into<ContextValue>>(self, value: V) -> Self {
        self.push(value);
        self
    }

    /// Set `key` on a map node, replacing an existing entry in place.
    ///
    /// Returns `false` if this value is not a map.
    pub fn insert<K, V>(&self, key: K, value: V) -> bool
    where
        K: Into<String>,
        V: Into<ContextValue>,
    {
        let ContextValue::Map(entries) = self else {
            return false;
        };
        let key = key.into();
        let value = value.into();
        let mut entries = entries.write();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => entries.push((key, value)),
        }
        true
    }

    /// Append to a list node. Returns `false` if this value is not a list.
    pub fn push<V: Into<ContextValue>>(&self, value: V) -> bool {
        let ContextValue::List(items) = self else {
            return false;
        };
        let value = value.into();
        items.write().push(value);
        true
    }

    /// Look up a key on a map node
    pub fn get(&self, key: &str) -> Option<ContextValue> {
        match self {
            ContextValue::Map(entries) => entries
                .read_recursive()
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    /// Number of direct children of a container, `None` for scalars
    pub fn len(&self) -> Option<usize> {
        match self {
            ContextValue::List(items) => Some(items.read_recursive().len()),
            ContextValue::Map(entries) => Some(entries.read_recursive().len()),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, ContextValue::List(_) | ContextValue::Map(_))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, ContextValue::Undefined)
    }

    /// Identity of a container node (its allocation address)
    pub fn identity(&self) -> Option<usize> {
        match self {
            ContextValue::List(items) => Some(Arc::as_ptr(items) as *const () as usize),
            ContextValue::Map(entries) => Some(Arc::as_ptr(entries) as *const () as usize),
            _ => None,
        }
    }

    /// Capture any serializable value.
    ///
    /// Serialization failures are kept as a descriptive string instead of
    /// being raised, since this is used on logging paths.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => json.into(),
            Err(e) => ContextValue::String(format!("[Unserializable: {}]", e)),
        }
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Containers may be cyclic; never walk them with the derived impl.
        write!(f, "{}", crate::core::serializer::serialize_cycle_safe(self))
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        ContextValue::Bool(b)
    }
}

impl From<i32> for ContextValue {
    fn from(i: i32) -> Self {
        ContextValue::Int(i64::from(i))
    }
}

impl From<i64> for ContextValue {
    fn from(i: i64) -> Self {
        ContextValue::Int(i)
    }
}

impl From<u32> for ContextValue {
    fn from(i: u32) -> Self {
        ContextValue::Int(i64::from(i))
    }
}

impl From<u64> for ContextValue {
    fn from(i: u64) -> Self {
        match i64::try_from(i) {
            Ok(i) => ContextValue::Int(i),
            Err(_) => ContextValue::Float(i as f64),
        }
    }
}

impl From<usize> for ContextValue {
    fn from(i: usize) -> Self {
        ContextValue::from(i as u64)
    }
}

impl From<f64> for ContextValue {
    fn from(f: f64) -> Self {
        ContextValue::Float(f)
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        ContextValue::String(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        ContextValue::String(s)
    }
}

impl<T: Into<ContextValue>> From<Option<T>> for ContextValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ContextValue::Null, Into::into)
    }
}

impl<T: Into<ContextValue>> From<Vec<T>> for ContextValue {
    fn from(items: Vec<T>) -> Self {
        let items: Vec<ContextValue> = items.into_iter().map(Into::into).collect();
        ContextValue::List(Arc::new(RwLock::new(items)))
    }
}

impl From<serde_json::Value> for ContextValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ContextValue::Null,
            Value::Bool(b) => ContextValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ContextValue::Int(i),
                None => ContextValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ContextValue::String(s),
            Value::Array(items) => items.into(),
            Value::Object(map) => {
                let entries: Entries = map.into_iter().map(|(k, v)| (k, v.into())).collect();
                ContextValue::Map(Arc::new(RwLock::new(entries)))
            }
        }
    }
}
