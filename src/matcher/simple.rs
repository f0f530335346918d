//! Boolean verification.

use std::sync::Arc;

use crate::document::InputDocument;
use crate::error::Result;
use crate::matcher::candidate::{CandidateMatcher, MatcherState};
use crate::matcher::query_match::SimpleMatch;
use crate::query::Query;

/// Reports whether each query matches, without scoring. Query evaluation
/// stops at the first satisfying clause.
#[derive(Debug)]
pub struct SimpleMatcher {
    state: MatcherState<SimpleMatch>,
}

impl SimpleMatcher {
    pub fn new(doc: Arc<InputDocument>) -> Self {
        SimpleMatcher {
            state: MatcherState::new(doc),
        }
    }
}

impl CandidateMatcher for SimpleMatcher {
    type Match = SimpleMatch;

    fn state(&self) -> &MatcherState<SimpleMatch> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut MatcherState<SimpleMatch> {
        &mut self.state
    }

    fn into_state(self) -> MatcherState<SimpleMatch> {
        self.state
    }

    fn do_match(
        &self,
        query_id: &str,
        match_query: &dyn Query,
        _highlight_query: Option<&dyn Query>,
    ) -> Result<Option<SimpleMatch>> {
        if match_query.matches(self.state.doc().index())? {
            Ok(Some(SimpleMatch::new(query_id)))
        } else {
            Ok(None)
        }
    }
}
