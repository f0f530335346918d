//! Units of work handed to matcher workers.

use std::sync::Arc;

use log::warn;

use crate::error::Result;
use crate::matcher::candidate::CandidateMatcher;
use crate::matcher::matches::MatchError;
use crate::query::Query;

/// One candidate query to verify.
#[derive(Clone, Debug)]
pub struct MatchTask {
    pub query_id: String,
    pub match_query: Arc<dyn Query>,
    pub highlight_query: Option<Arc<dyn Query>>,
}

impl MatchTask {
    pub fn new<S: Into<String>>(
        query_id: S,
        match_query: Arc<dyn Query>,
        highlight_query: Option<Arc<dyn Query>>,
    ) -> Self {
        MatchTask {
            query_id: query_id.into(),
            match_query,
            highlight_query,
        }
    }

    /// Verify this task on `matcher`.
    ///
    /// A failure of the query is recorded as a [`MatchError`]. Fatal errors
    /// are returned so the worker can stop.
    pub fn run<M: CandidateMatcher>(&self, matcher: &mut M) -> Result<()> {
        match matcher.match_query(
            &self.query_id,
            &self.match_query,
            self.highlight_query.as_ref(),
        ) {
            Ok(_) => Ok(()),
            Err(e) if e.is_fatal() => {
                warn!("verifying query {} aborted: {e}", self.query_id);
                Err(e)
            }
            Err(e) => {
                matcher.report_error(MatchError::new(self.query_id.as_str(), e));
                Ok(())
            }
        }
    }
}

/// Messages on a parallel matcher's task queue.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Verify a candidate.
    Work(MatchTask),
    /// Return the accumulated state and exit.
    Shutdown,
}
