//! The verification contract shared by all matching strategies.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;

use crate::document::InputDocument;
use crate::error::Result;
use crate::matcher::matches::{MatchError, Matches, SlowLog};
use crate::matcher::query_match::QueryMatch;
use crate::query::Query;

/// Default slow log limit.
pub const DEFAULT_SLOW_LOG_LIMIT: Duration = Duration::from_secs(2);

/// Bookkeeping for one matching run, embedded by every matcher.
#[derive(Debug)]
pub struct MatcherState<T> {
    doc: Arc<InputDocument>,
    pub(crate) matches: HashMap<String, T>,
    pub(crate) errors: Vec<MatchError>,
    pub(crate) slow_log: SlowLog,
    slow_log_limit: Duration,
    started: Instant,
}

impl<T: QueryMatch> MatcherState<T> {
    /// Start a run against `doc`. The search timer starts now.
    pub fn new(doc: Arc<InputDocument>) -> Self {
        MatcherState {
            doc,
            matches: HashMap::new(),
            errors: Vec::new(),
            slow_log: SlowLog::new(),
            slow_log_limit: DEFAULT_SLOW_LOG_LIMIT,
            started: Instant::now(),
        }
    }

    pub fn doc(&self) -> &Arc<InputDocument> {
        &self.doc
    }

    pub fn matches(&self) -> &HashMap<String, T> {
        &self.matches
    }

    pub fn errors(&self) -> &[MatchError] {
        &self.errors
    }

    pub fn slow_log(&self) -> &SlowLog {
        &self.slow_log
    }

    pub fn slow_log_limit(&self) -> Duration {
        self.slow_log_limit
    }

    /// Record a verification time, logging it if it exceeds the limit.
    pub(crate) fn record_time(&mut self, query_id: &str, elapsed: Duration) {
        if elapsed > self.slow_log_limit {
            debug!(
                "slow query {} took {:?} against document {}",
                query_id,
                elapsed,
                self.doc.id()
            );
            self.slow_log.add(query_id, elapsed);
        }
    }

    /// Freeze the run into its result.
    pub fn into_matches(self, query_build_time: Duration, queries_run: usize) -> Matches<T> {
        Matches {
            doc_id: self.doc.id().to_string(),
            matches: self.matches,
            errors: self.errors,
            slow_log: self.slow_log,
            query_build_time,
            search_time: self.started.elapsed(),
            queries_run,
        }
    }
}

/// Verifies candidate queries against one document and accumulates the
/// results of a run.
///
/// Implementors provide [`do_match`](Self::do_match) and access to their
/// embedded [`MatcherState`]; timing, slow logging, conflict resolution and
/// error collection are provided.
///
/// [`resolve`](Self::resolve) must be commutative: parallel matchers merge
/// worker results in whatever order the workers finish.
pub trait CandidateMatcher: Send + 'static {
    type Match: QueryMatch;

    fn state(&self) -> &MatcherState<Self::Match>;

    fn state_mut(&mut self) -> &mut MatcherState<Self::Match>;

    fn into_state(self) -> MatcherState<Self::Match>
    where
        Self: Sized;

    /// Verify one query against the document, without any bookkeeping.
    /// Returns `None` when the query does not match.
    fn do_match(
        &self,
        query_id: &str,
        match_query: &dyn Query,
        highlight_query: Option<&dyn Query>,
    ) -> Result<Option<Self::Match>>;

    /// Verify one query, timing it and recording any match.
    ///
    /// Errors are returned to the caller, which is expected to record them
    /// with [`report_error`](Self::report_error).
    fn match_query(
        &mut self,
        query_id: &str,
        match_query: &Arc<dyn Query>,
        highlight_query: Option<&Arc<dyn Query>>,
    ) -> Result<Option<Self::Match>> {
        let start = Instant::now();
        let result = self.do_match(query_id, match_query.as_ref(), highlight_query.map(|q| q.as_ref()));
        self.state_mut().record_time(query_id, start.elapsed());

        let found = result?;
        if let Some(m) = &found {
            self.add_match(m.clone());
        }
        Ok(found)
    }

    /// Combine two matches for the same query id. Keeps `incoming` unless
    /// overridden.
    fn resolve(&self, _existing: Self::Match, incoming: Self::Match) -> Self::Match {
        incoming
    }

    fn add_match(&mut self, m: Self::Match) {
        let id = m.query_id().to_string();
        let resolved = match self.state_mut().matches.remove(&id) {
            Some(existing) => self.resolve(existing, m),
            None => m,
        };
        self.state_mut().matches.insert(id, resolved);
    }

    fn report_error(&mut self, error: MatchError) {
        debug!("{error}");
        self.state_mut().errors.push(error);
    }

    /// The match recorded so far for a query id.
    fn matches(&self, query_id: &str) -> Option<&Self::Match> {
        self.state().matches.get(query_id)
    }

    fn set_slow_log_limit(&mut self, limit: Duration) {
        self.state_mut().slow_log_limit = limit;
    }

    /// Merge another run's state into this one.
    fn merge(&mut self, other: MatcherState<Self::Match>) {
        for (_, m) in other.matches {
            self.add_match(m);
        }
        for error in other.errors {
            self.state_mut().errors.push(error);
        }
        self.state_mut().slow_log.append(other.slow_log);
    }

    /// End the run. Must be called once, after all candidates were passed
    /// to [`match_query`](Self::match_query).
    fn finish(self, query_build_time: Duration, queries_run: usize) -> Result<Matches<Self::Match>>
    where
        Self: Sized,
    {
        Ok(self.into_state().into_matches(query_build_time, queries_run))
    }
}
