use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// One element of a cache key.
///
/// Numbers are kept as their JSON text so keys stay `Eq + Hash`. Maps compare by
/// field name regardless of insertion order, and null fields inside maps are
/// dropped so `{ search: None }` and `{}` address the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Null,
    Bool(bool),
    Number(String),
    Text(String),
    List(Vec<KeyPart>),
    Map(BTreeMap<String, KeyPart>),
}

impl KeyPart {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => KeyPart::Null,
            Value::Bool(flag) => KeyPart::Bool(flag),
            Value::Number(number) => KeyPart::Number(number.to_string()),
            Value::String(text) => KeyPart::Text(text),
            Value::Array(items) => KeyPart::List(items.into_iter().map(Self::from_value).collect()),
            Value::Object(fields) => KeyPart::Map(
                fields
                    .into_iter()
                    .filter(|(_, value)| !value.is_null())
                    .map(|(name, value)| (name, Self::from_value(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Text(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Text(value)
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        KeyPart::Bool(value)
    }
}

macro_rules! number_key_part {
    ($($ty:ty),*) => {
        $(impl From<$ty> for KeyPart {
            fn from(value: $ty) -> Self {
                KeyPart::Number(value.to_string())
            }
        })*
    };
}

number_key_part!(u32, u64, i32, i64, usize);

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Null => f.write_str("null"),
            KeyPart::Bool(flag) => write!(f, "{flag}"),
            KeyPart::Number(number) => f.write_str(number),
            KeyPart::Text(text) => write!(f, "{text:?}"),
            KeyPart::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            KeyPart::Map(fields) => {
                f.write_str("{")?;
                for (index, (name, value)) in fields.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{name}:{value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Ordered cache identifier: a literal name followed by the call's parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    pub fn new(name: &str) -> Self {
        Self(vec![KeyPart::from(name)])
    }

    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    /// Append serialized parameters (filters, pagination) as one key part.
    pub fn with_params<P: Serialize + ?Sized>(mut self, params: &P) -> Self {
        let part = match serde_json::to_value(params) {
            Ok(value) => KeyPart::from_value(value),
            Err(err) => {
                tracing::warn!(error = %err, "cache key parameters failed to serialize");
                KeyPart::Null
            }
        };
        self.0.push(part);
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn name(&self) -> Option<&str> {
        match self.0.first() {
            Some(KeyPart::Text(name)) => Some(name),
            _ => None,
        }
    }

    /// True when `prefix` matches the leading parts of this key element by element.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", KeyPart::List(self.0.clone()))
    }
}
