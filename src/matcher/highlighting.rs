//! Verification that reports where each query hit.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::document::InputDocument;
use crate::error::Result;
use crate::matcher::candidate::{CandidateMatcher, MatcherState};
use crate::matcher::query_match::HighlightsMatch;
use crate::query::Query;

/// Reports the hits of each matching query.
///
/// Hits come from the highlight query when one is given and it hits the
/// document, otherwise from the match query. Repeated matches for the same
/// query id are merged by taking the union of their hits.
#[derive(Debug)]
pub struct HighlightingMatcher {
    state: MatcherState<HighlightsMatch>,
}

impl HighlightingMatcher {
    pub fn new(doc: Arc<InputDocument>) -> Self {
        HighlightingMatcher {
            state: MatcherState::new(doc),
        }
    }
}

impl CandidateMatcher for HighlightingMatcher {
    type Match = HighlightsMatch;

    fn state(&self) -> &MatcherState<HighlightsMatch> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut MatcherState<HighlightsMatch> {
        &mut self.state
    }

    fn into_state(self) -> MatcherState<HighlightsMatch> {
        self.state
    }

    fn do_match(
        &self,
        query_id: &str,
        match_query: &dyn Query,
        highlight_query: Option<&dyn Query>,
    ) -> Result<Option<HighlightsMatch>> {
        let index = self.state.doc().index();
        if !match_query.matches(index)? {
            return Ok(None);
        }

        let mut hits = Vec::new();
        if let Some(highlight) = highlight_query {
            highlight.hits(index, &mut hits)?;
        }
        if hits.is_empty() {
            match_query.hits(index, &mut hits)?;
        }
        Ok(Some(HighlightsMatch::new(query_id, hits.into_iter().collect())))
    }

    fn resolve(&self, existing: HighlightsMatch, incoming: HighlightsMatch) -> HighlightsMatch {
        let mut hits: BTreeSet<_> = existing.hits;
        hits.extend(incoming.hits);
        HighlightsMatch::new(existing.query_id, hits)
    }
}
