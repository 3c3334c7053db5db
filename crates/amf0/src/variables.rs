use crate::define::{AMF0_DATE_SIZE, Amf0Marker};

/// A single metadata value.
///
/// Only the value types that appear in FLV `onMetaData` objects written by
/// common muxers are representable. Nested objects and arrays are rejected
/// by the decoder, so a [`Variables`] map can always be re-encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    /// Number Type defined section 2.2
    Number(f64),
    /// Boolean Type defined section 2.3
    Boolean(bool),
    /// String Type defined section 2.4
    String(String),
    /// Date Type defined section 2.13, kept as the raw 10 body bytes.
    Date([u8; AMF0_DATE_SIZE]),
    /// Null Type defined section 2.7
    Null,
    /// Undefined Type defined section 2.8
    Undefined,
    /// Unsupported Type defined section 2.15
    Unsupported,
}

impl ScriptValue {
    /// Get the marker of the value.
    #[inline]
    pub fn marker(&self) -> Amf0Marker {
        match self {
            Self::Number(_) => Amf0Marker::Number,
            Self::Boolean(_) => Amf0Marker::Boolean,
            Self::String(_) => Amf0Marker::String,
            Self::Date(_) => Amf0Marker::Date,
            Self::Null => Amf0Marker::Null,
            Self::Undefined => Amf0Marker::Undefined,
            Self::Unsupported => Amf0Marker::Unsupported,
        }
    }

    /// Returns the inner `f64` if this is a `Number`, or `None` otherwise.
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the inner `bool` if this is a `Boolean`, or `None` otherwise.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the inner string slice if this is a `String`, or `None` otherwise.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for ScriptValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ScriptValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<String> for ScriptValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// The container type the metadata map was stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootKind {
    /// ECMA ("mixed") array with a leading 32-bit count. Written by most muxers.
    #[default]
    EcmaArray,
    /// Anonymous object without a count.
    Object,
}

impl RootKind {
    pub fn marker(self) -> Amf0Marker {
        match self {
            RootKind::EcmaArray => Amf0Marker::EcmaArray,
            RootKind::Object => Amf0Marker::Object,
        }
    }
}

/// Insertion-ordered `onMetaData` key/value map.
///
/// Keys are unique. Setting an existing key replaces its value in place and
/// keeps the key's original position, so re-encoding preserves the layout
/// of the source object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Variables {
    root: RootKind,
    entries: Vec<(String, ScriptValue)>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: RootKind) -> Self {
        Self {
            root,
            entries: Vec::new(),
        }
    }

    pub fn root(&self) -> RootKind {
        self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ScriptValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ScriptValue::as_number)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ScriptValue::as_bool)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Sets `key` to `value`, returning the previous value if the key existed.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ScriptValue>,
    ) -> Option<ScriptValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Removes `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<ScriptValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScriptValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}
