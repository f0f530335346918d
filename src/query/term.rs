//! Term query implementation for exact term matching.

use crate::document::{MemoryIndex, TermHit};
use crate::error::Result;
use crate::query::query::Query;

/// A query that matches documents containing a specific term.
#[derive(Debug, Clone)]
pub struct TermQuery {
    /// The field to search in.
    field: String,
    /// The term to search for.
    term: String,
    /// The boost factor for this query.
    boost: f32,
}

impl TermQuery {
    /// Create a new term query.
    ///
    /// The term is not analyzed; it must already be in the normalized form
    /// produced by the document's analyzer (e.g., lowercased).
    pub fn new<F, T>(field: F, term: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        TermQuery {
            field: field.into(),
            term: term.into(),
            boost: 1.0,
        }
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the term.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl Query for TermQuery {
    fn matches(&self, index: &MemoryIndex) -> Result<bool> {
        Ok(index.term_freq(&self.field, &self.term) > 0)
    }

    fn score(&self, index: &MemoryIndex) -> Result<f32> {
        let freq = index.term_freq(&self.field, &self.term);
        Ok(index.frequency_score(&self.field, freq) * self.boost)
    }

    fn hits(&self, index: &MemoryIndex, hits: &mut Vec<TermHit>) -> Result<()> {
        if let Some(postings) = index.postings(&self.field, &self.term) {
            hits.extend(postings.iter().map(|p| TermHit {
                field: self.field.clone(),
                start_position: p.position,
                end_position: p.position,
                start_offset: p.start_offset,
                end_offset: p.end_offset,
            }));
        }
        Ok(())
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        if self.boost == 1.0 {
            format!("{}:{}", self.field, self.term)
        } else {
            format!("{}:{}^{}", self.field, self.term, self.boost)
        }
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
