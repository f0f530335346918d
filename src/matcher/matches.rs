//! The result of a matching run.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::MonitorError;

/// A non-fatal failure verifying one candidate query.
#[derive(Debug, Error)]
#[error("query {query_id} failed: {error}")]
pub struct MatchError {
    pub query_id: String,
    #[source]
    pub error: MonitorError,
}

impl MatchError {
    pub fn new<S: Into<String>>(query_id: S, error: MonitorError) -> Self {
        MatchError {
            query_id: query_id.into(),
            error,
        }
    }
}

/// A query whose verification exceeded the slow log limit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlowLogEntry {
    pub query_id: String,
    pub elapsed: Duration,
}

/// Queries whose verification exceeded the slow log limit.
///
/// Displays as space-separated `<id>:<elapsed>ms` entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlowLog {
    entries: Vec<SlowLogEntry>,
}

impl SlowLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<S: Into<String>>(&mut self, query_id: S, elapsed: Duration) {
        self.entries.push(SlowLogEntry {
            query_id: query_id.into(),
            elapsed,
        });
    }

    pub fn append(&mut self, other: SlowLog) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[SlowLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for SlowLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}:{}ms", entry.query_id, entry.elapsed.as_millis())?;
        }
        Ok(())
    }
}

/// Everything a matching run produced for one document.
#[derive(Debug)]
pub struct Matches<T> {
    pub(crate) doc_id: String,
    pub(crate) matches: HashMap<String, T>,
    pub(crate) errors: Vec<MatchError>,
    pub(crate) slow_log: SlowLog,
    pub(crate) query_build_time: Duration,
    pub(crate) search_time: Duration,
    pub(crate) queries_run: usize,
}

impl<T> Matches<T> {
    /// Id of the document the run matched.
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// The match for a query id, if the query matched.
    pub fn matches(&self, query_id: &str) -> Option<&T> {
        self.matches.get(query_id)
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Matches in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.matches.values()
    }

    /// Ids of the matching queries, sorted.
    pub fn query_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.matches.keys().map(|k| k.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn errors(&self) -> &[MatchError] {
        &self.errors
    }

    pub fn slow_log(&self) -> &SlowLog {
        &self.slow_log
    }

    /// Time spent building the selection query.
    pub fn query_build_time(&self) -> Duration {
        self.query_build_time
    }

    /// Time from the creation of the matcher to the end of the run.
    pub fn search_time(&self) -> Duration {
        self.search_time
    }

    /// Number of candidate queries verified.
    pub fn queries_run(&self) -> usize {
        self.queries_run
    }
}

impl<'a, T> IntoIterator for &'a Matches<T> {
    type Item = &'a T;
    type IntoIter = std::collections::hash_map::Values<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.values()
    }
}
