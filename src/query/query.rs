//! Base query trait.

use std::any::Any;
use std::fmt::Debug;

use crate::document::{MemoryIndex, TermHit};
use crate::error::Result;

/// Trait for queries evaluated against a single document.
///
/// Implementations must be cheap to evaluate repeatedly and safe to share
/// across matcher threads.
pub trait Query: Send + Sync + Debug {
    /// Whether the document matches. Implementations may stop at the first
    /// satisfying clause.
    fn matches(&self, index: &MemoryIndex) -> Result<bool> {
        Ok(self.score(index)? > 0.0)
    }

    /// The score of the document, `0.0` when it does not match.
    fn score(&self, index: &MemoryIndex) -> Result<f32>;

    /// Append the hits of this query to `hits`, for highlighting.
    fn hits(&self, _index: &MemoryIndex, _hits: &mut Vec<TermHit>) -> Result<()> {
        Ok(())
    }

    /// Get the boost factor for this query.
    fn boost(&self) -> f32;

    /// Set the boost factor for this query.
    fn set_boost(&mut self, boost: f32);

    /// Get a human-readable description of this query.
    fn description(&self) -> String;

    /// Clone this query.
    fn clone_box(&self) -> Box<dyn Query>;

    /// Get this query as Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Get the field name this query searches in, if applicable.
    /// Returns None for queries that don't target a specific field (e.g., BooleanQuery).
    fn field(&self) -> Option<&str> {
        None
    }
}

impl Clone for Box<dyn Query> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
