//! Query matching every document.

use crate::document::MemoryIndex;
use crate::error::Result;
use crate::query::query::Query;

/// Matches every document with a constant score.
#[derive(Debug, Clone)]
pub struct MatchAllQuery {
    boost: f32,
}

impl MatchAllQuery {
    /// Create a new match-all query.
    pub fn new() -> Self {
        MatchAllQuery { boost: 1.0 }
    }
}

impl Default for MatchAllQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl Query for MatchAllQuery {
    fn matches(&self, _index: &MemoryIndex) -> Result<bool> {
        Ok(true)
    }

    fn score(&self, _index: &MemoryIndex) -> Result<f32> {
        Ok(self.boost)
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        "*:*".to_string()
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
