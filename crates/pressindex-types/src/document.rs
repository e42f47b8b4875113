//! Prepared (flattened) documents ready for submission to the engine.
//!
//! A prepared document is an ordered list of `(field, value)` pairs rather
//! than a map: the engine's add command is positional and repeating.

use serde::{Deserialize, Serialize};

/// A single field value as sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(i64),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Number(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

/// Ordered field/value pairs for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreparedDocument {
    fields: Vec<(String, FieldValue)>,
}

impl PreparedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair. Repeated names are allowed.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Replace the first value for `name`, or append it if absent.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Remove every pair for `name`, returning how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.fields.len();
        self.fields.retain(|(n, _)| n != name);
        before - self.fields.len()
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn extend(&mut self, pairs: impl IntoIterator<Item = (String, FieldValue)>) {
        self.fields.extend(pairs);
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Flatten into alternating `name, value` command arguments.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.fields.len() * 2);
        for (name, value) in &self.fields {
            args.push(name.clone());
            args.push(value.to_string());
        }
        args
    }
}

impl FromIterator<(String, FieldValue)> for PreparedDocument {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A metadata value after normalization.
///
/// Index fields are flat text, so structured values are carried as their
/// JSON encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Scalar(String),
    Composite(String),
}

impl MetaValue {
    /// Resolve a raw repository value.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        use serde_json::Value;

        Ok(match value {
            Value::Array(_) | Value::Object(_) => {
                MetaValue::Composite(serde_json::to_string(value)?)
            }
            Value::String(s) => MetaValue::Scalar(s.clone()),
            Value::Number(n) => MetaValue::Scalar(n.to_string()),
            Value::Bool(true) => MetaValue::Scalar("1".to_string()),
            Value::Bool(false) | Value::Null => MetaValue::Scalar(String::new()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            MetaValue::Scalar(s) | MetaValue::Composite(s) => s,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, MetaValue::Composite(_))
    }
}

/// One allow-listed metadata entry for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaEntry {
    pub key: String,
    pub value: MetaValue,
}

impl MetaEntry {
    pub fn new(key: impl Into<String>, value: MetaValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}
