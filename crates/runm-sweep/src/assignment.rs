use indexmap::map::{IntoIter, Iter};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping from dot-segmented parameter names to their values.
///
/// Insertion order drives job names and environment ordering. Inserting a key
/// that already exists replaces the value in place and keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterAssignment {
    values: IndexMap<String, String>,
}

impl ParameterAssignment {
    /// Creates an empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-parameter assignment as yielded by leaf nodes.
    pub fn single(parameter: impl Into<String>, value: impl Into<String>) -> Self {
        let mut assignment = Self::new();
        assignment.insert(parameter, value);
        assignment
    }

    /// Sets a parameter, overwriting any previous value.
    pub fn insert(&mut self, parameter: impl Into<String>, value: impl Into<String>) {
        self.values.insert(parameter.into(), value.into());
    }

    /// Unions `other` into `self`; keys from `other` win.
    pub fn merge(&mut self, other: ParameterAssignment) {
        self.values.extend(other.values);
    }

    /// Looks up a parameter value.
    pub fn get(&self, parameter: &str) -> Option<&str> {
        self.values.get(parameter).map(String::as_str)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> Iter<'_, String, String> {
        self.values.iter()
    }

    /// `name=value` pairs joined with `-`, used as the base job name.
    pub fn job_name(&self) -> String {
        self.values
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl<'a> IntoIterator for &'a ParameterAssignment {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl IntoIterator for ParameterAssignment {
    type Item = (String, String);
    type IntoIter = IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterAssignment {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut assignment = Self::new();
        for (name, value) in iter {
            assignment.insert(name, value);
        }
        assignment
    }
}
