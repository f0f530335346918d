//! Per-query match results.

use std::collections::BTreeSet;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::document::TermHit;

/// The result of verifying one stored query against a document.
pub trait QueryMatch: Clone + Debug + Send + 'static {
    fn query_id(&self) -> &str;
}

/// A match without any further information.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimpleMatch {
    pub query_id: String,
}

impl SimpleMatch {
    pub fn new<S: Into<String>>(query_id: S) -> Self {
        SimpleMatch {
            query_id: query_id.into(),
        }
    }
}

impl QueryMatch for SimpleMatch {
    fn query_id(&self) -> &str {
        &self.query_id
    }
}

/// A match with the score of the document against the query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringMatch {
    pub query_id: String,
    pub score: f32,
}

impl ScoringMatch {
    pub fn new<S: Into<String>>(query_id: S, score: f32) -> Self {
        ScoringMatch {
            query_id: query_id.into(),
            score,
        }
    }
}

impl QueryMatch for ScoringMatch {
    fn query_id(&self) -> &str {
        &self.query_id
    }
}

/// A match with the positions and offsets the query hit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightsMatch {
    pub query_id: String,
    pub hits: BTreeSet<TermHit>,
}

impl HighlightsMatch {
    pub fn new<S: Into<String>>(query_id: S, hits: BTreeSet<TermHit>) -> Self {
        HighlightsMatch {
            query_id: query_id.into(),
            hits,
        }
    }

    /// Hits in one field, in position order.
    pub fn hits_in<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a TermHit> {
        self.hits.iter().filter(move |h| h.field == field)
    }
}

impl QueryMatch for HighlightsMatch {
    fn query_id(&self) -> &str {
        &self.query_id
    }
}
