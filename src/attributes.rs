//! Variant Attributes

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Selected variant values for a line, e.g. `{size: "M", color: "red"}`.
///
/// Attributes are part of line identity: two lines are the same iff their
/// product and their attributes are equal. Keys are held in sorted order so
/// equality and the canonical form are independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantAttributes(BTreeMap<String, String>);

impl VariantAttributes {
    /// An empty attribute set (the bare product).
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether no variant values are selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set a variant value, replacing any previous value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a variant value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Canonical `key=value;key=value` form, keys in sorted order.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl Display for VariantAttributes {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut first = true;

        for (key, value) in &self.0 {
            if !first {
                write!(f, ";")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }

        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariantAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
