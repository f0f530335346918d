//! Extracted query terms.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How an extracted term is matched against document tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TermType {
    /// The text must equal a document token.
    Exact,
    /// The text must occur inside a document token.
    Wildcard,
    /// Every document selects the query.
    Any,
}

/// An atomic term extracted from a stored query.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueryTerm {
    /// Field the term belongs to. Empty for field-less `Any` terms.
    pub field: String,
    /// Term text. Empty for `Any` terms.
    pub text: String,
    /// Selectivity class of the term.
    pub term_type: TermType,
}

impl QueryTerm {
    pub fn new<F: Into<String>, T: Into<String>>(field: F, text: T, term_type: TermType) -> Self {
        QueryTerm {
            field: field.into(),
            text: text.into(),
            term_type,
        }
    }

    pub fn exact<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        Self::new(field, text, TermType::Exact)
    }

    pub fn wildcard<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        Self::new(field, text, TermType::Wildcard)
    }

    pub fn any<F: Into<String>>(field: F) -> Self {
        Self::new(field, "", TermType::Any)
    }

    pub fn is_any(&self) -> bool {
        self.term_type == TermType::Any
    }
}

impl fmt::Display for QueryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.term_type {
            TermType::Exact => write!(f, "{}:{}", self.field, self.text),
            TermType::Wildcard => write!(f, "{}:*{}*", self.field, self.text),
            TermType::Any => write!(f, "{}:ANY", self.field),
        }
    }
}
