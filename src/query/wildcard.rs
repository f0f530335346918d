//! Wildcard and prefix query implementations.

use std::sync::Arc;

use regex::Regex;

use crate::document::{MemoryIndex, TermHit};
use crate::error::{MonitorError, Result};
use crate::query::query::Query;

/// Append the postings of every term in `terms` to `hits`.
pub(crate) fn collect_term_hits(
    index: &MemoryIndex,
    field: &str,
    terms: &[&str],
    hits: &mut Vec<TermHit>,
) {
    for term in terms {
        if let Some(postings) = index.postings(field, term) {
            hits.extend(postings.iter().map(|p| TermHit {
                field: field.to_string(),
                start_position: p.position,
                end_position: p.position,
                start_offset: p.start_offset,
                end_offset: p.end_offset,
            }));
        }
    }
}

/// A query that matches terms using wildcard patterns.
///
/// `*` matches any sequence of characters, `?` matches exactly one.
/// Matching terms all receive the same constant score.
#[derive(Debug, Clone)]
pub struct WildcardQuery {
    /// The field to search in.
    field: String,
    /// The wildcard pattern.
    pattern: String,
    /// The compiled regex for matching.
    regex: Arc<Regex>,
    /// The boost factor for this query.
    boost: f32,
}

impl WildcardQuery {
    /// Create a new wildcard query.
    pub fn new<F: Into<String>, P: Into<String>>(field: F, pattern: P) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Self::compile_pattern(&pattern)?;

        Ok(WildcardQuery {
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

    /// Get the wildcard pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Compile a wildcard pattern into an anchored regex.
    fn compile_pattern(pattern: &str) -> Result<Regex> {
        let mut regex_pattern = String::from("^");

        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => regex_pattern.push_str(&regex::escape(&escaped.to_string())),
                    None => regex_pattern.push_str("\\\\"),
                },
                '*' => regex_pattern.push_str(".*"),
                '?' => regex_pattern.push('.'),
                c => regex_pattern.push_str(&regex::escape(&c.to_string())),
            }
        }

        regex_pattern.push('$');

        Regex::new(&regex_pattern)
            .map_err(|e| MonitorError::query(format!("Invalid wildcard pattern: {e}")))
    }

    /// Check if a term matches the wildcard pattern.
    pub fn matches_term(&self, term: &str) -> bool {
        self.regex.is_match(term)
    }
}

impl Query for WildcardQuery {
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
        format!("{}:{}", self.field, self.pattern)
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

/// A query that matches terms starting with a prefix.
#[derive(Debug, Clone)]
pub struct PrefixQuery {
    field: String,
    prefix: String,
    boost: f32,
}

impl PrefixQuery {
    /// Create a new prefix query.
    pub fn new<F: Into<String>, P: Into<String>>(field: F, prefix: P) -> Self {
        PrefixQuery {
            field: field.into(),
            prefix: prefix.into(),
            boost: 1.0,
        }
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

    /// Get the prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Query for PrefixQuery {
    fn matches(&self, index: &MemoryIndex) -> Result<bool> {
        Ok(!index
            .matching_terms(&self.field, |t| t.starts_with(&self.prefix))
            .is_empty())
    }

    fn score(&self, index: &MemoryIndex) -> Result<f32> {
        Ok(if self.matches(index)? { self.boost } else { 0.0 })
    }

    fn hits(&self, index: &MemoryIndex, hits: &mut Vec<TermHit>) -> Result<()> {
        let terms = index.matching_terms(&self.field, |t| t.starts_with(&self.prefix));
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
        format!("{}:{}*", self.field, self.prefix)
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
