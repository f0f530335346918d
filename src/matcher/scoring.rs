//! Scoring verification.

use std::sync::Arc;

use crate::document::InputDocument;
use crate::error::Result;
use crate::matcher::candidate::{CandidateMatcher, MatcherState};
use crate::matcher::query_match::ScoringMatch;
use crate::query::Query;

/// Scores the document against each query. A query matches when its score
/// is positive; when a query matches more than once the highest score is
/// kept.
#[derive(Debug)]
pub struct ScoringMatcher {
    state: MatcherState<ScoringMatch>,
}

impl ScoringMatcher {
    pub fn new(doc: Arc<InputDocument>) -> Self {
        ScoringMatcher {
            state: MatcherState::new(doc),
        }
    }
}

impl CandidateMatcher for ScoringMatcher {
    type Match = ScoringMatch;

    fn state(&self) -> &MatcherState<ScoringMatch> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut MatcherState<ScoringMatch> {
        &mut self.state
    }

    fn into_state(self) -> MatcherState<ScoringMatch> {
        self.state
    }

    fn do_match(
        &self,
        query_id: &str,
        match_query: &dyn Query,
        _highlight_query: Option<&dyn Query>,
    ) -> Result<Option<ScoringMatch>> {
        let score = match_query.score(self.state.doc().index())?;
        if score > 0.0 {
            Ok(Some(ScoringMatch::new(query_id, score)))
        } else {
            Ok(None)
        }
    }

    fn resolve(&self, existing: ScoringMatch, incoming: ScoringMatch) -> ScoringMatch {
        if incoming.score > existing.score {
            incoming
        } else {
            existing
        }
    }
}
