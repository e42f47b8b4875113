//! Index schema types.
//!
//! A schema is an ordered list of field specs. Order matters: the engine
//! receives fields positionally and prepared documents follow the same order.

use serde::{Deserialize, Serialize};

/// Field type understood by the index engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    /// Full-text field
    Text,
    /// Numeric field, range-queryable
    Numeric,
    /// Exact-match, comma-separated tag field
    Tag,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "TEXT",
            FieldType::Numeric => "NUMERIC",
            FieldType::Tag => "TAG",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field declaration in an index schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub sortable: bool,
}

impl FieldSpec {
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Numeric)
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Tag)
    }

    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            weight: None,
            sortable: false,
        }
    }

    /// Set the relevance weight (TEXT fields only in practice).
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Mark the field as sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Render as engine schema arguments: `name TYPE [WEIGHT w] [SORTABLE]`.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![self.name.clone(), self.field_type.as_str().to_string()];
        if let Some(weight) = self.weight {
            args.push("WEIGHT".to_string());
            args.push(format_weight(weight));
        }
        if self.sortable {
            args.push("SORTABLE".to_string());
        }
        args
    }
}

// Keeps "5.0" rather than "5" so the argument reads as a float.
fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{:.1}", weight)
    } else {
        weight.to_string()
    }
}

/// A complete index schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSchema {
    pub index_name: String,
    pub fields: Vec<FieldSpec>,
}

impl IndexSchema {
    pub fn new(index_name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            index_name: index_name.into(),
            fields,
        }
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
