//! Regular expression query.

use std::sync::Arc;

use regex::Regex;

use crate::document::{MemoryIndex, TermHit};
use crate::error::{MonitorError, Result};
use crate::query::query::Query;
use crate::query::wildcard::collect_term_hits;

/// A query that matches terms against a regular expression.
///
/// The expression must match the whole term.
#[derive(Debug, Clone)]
pub struct RegexpQuery {
    field: String,
    pattern: String,
    regex: Arc<Regex>,
    boost: f32,
}

impl RegexpQuery {
    /// Create a new regexp query. Fails if the pattern does not compile.
    pub fn new<F: Into<String>, P: Into<String>>(field: F, pattern: P) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|e| MonitorError::query(format!("Invalid regexp pattern: {e}")))?;

        Ok(RegexpQuery {
            field: field.into(),
            pattern,
            regex: Arc::new(regex),
            boost: 1.0,
        })
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the source pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check if a term matches the expression.
    pub fn matches_term(&self, term: &str) -> bool {
        self.regex.is_match(term)
    }
}

impl Query for RegexpQuery {
    fn matches(&self, index: &MemoryIndex) -> Result<bool> {
        Ok(!index
            .matching_terms(&self.field, |t| self.regex.is_match(t))
            .is_empty())
    }

    fn score(&self, index: &MemoryIndex) -> Result<f32> {
        Ok(if self.matches(index)? { self.boost } else { 0.0 })
    }

    fn hits(&self, index: &MemoryIndex, hits: &mut Vec<TermHit>) -> Result<()> {
        let terms = index.matching_terms(&self.field, |t| self.regex.is_match(t));
        collect_term_hits(index, &self.field, &terms, hits);
        Ok(())
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        format!("{}:/{}/", self.field, self.pattern)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn field(&self) -> Option<&str> {
        Some(&self.field)
    }
}
