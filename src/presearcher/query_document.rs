//! Indexed representation of a stored query.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Terms a stored query is indexed under, grouped by field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDocument {
    fields: BTreeMap<String, BTreeSet<String>>,
}

impl QueryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F: Into<String>, T: Into<String>>(&mut self, field: F, term: T) {
        self.fields.entry(field.into()).or_default().insert(term.into());
    }

    pub fn contains(&self, field: &str, term: &str) -> bool {
        self.fields.get(field).is_some_and(|t| t.contains(term))
    }

    pub fn terms(&self, field: &str) -> impl Iterator<Item = &str> {
        self.fields
            .get(field)
            .into_iter()
            .flat_map(|t| t.iter().map(|s| s.as_str()))
    }

    /// Every `(field, term)` pair, sorted.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .flat_map(|(f, terms)| terms.iter().map(move |t| (f.as_str(), t.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
