//! Property filters
//!
//! Filters restrict feature collections and sampled tables by attribute
//! value. The service applies them; the client only describes them.

use serde::{Deserialize, Serialize};

/// A literal value a property can be compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Num(f64),
    Str(String),
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Num(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// A filter over a single named property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyFilter {
    /// Exact equality match.
    Eq {
        property: String,
        value: FilterValue,
    },
    /// Keep rows where the property is present and non-null.
    NotNull { property: String },
}

impl PropertyFilter {
    pub fn eq(property: &str, value: impl Into<FilterValue>) -> Self {
        Self::Eq {
            property: property.to_string(),
            value: value.into(),
        }
    }

    pub fn not_null(property: &str) -> Self {
        Self::NotNull {
            property: property.to_string(),
        }
    }

    /// The property this filter inspects.
    pub fn property(&self) -> &str {
        match self {
            Self::Eq { property, .. } | Self::NotNull { property } => property,
        }
    }
}
