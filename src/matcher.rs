//! Candidate verification.
//!
//! A [`CandidateMatcher`] owns the state of one matching run: the document,
//! the matches found so far, the errors and the slow log. Strategies differ
//! in how they verify a query and in what they return for a match:
//!
//! - [`SimpleMatcher`] only checks that a query matches;
//! - [`ScoringMatcher`] scores the document and keeps the best score;
//! - [`HighlightingMatcher`] reports the hits of each matching query.
//!
//! [`ParallelMatcher`] and [`PartitionMatcher`] distribute verification
//! over worker threads, each running its own matcher built by a
//! [`MatcherFactory`], and merge the results when the run finishes.

pub mod candidate;
pub mod config;
pub mod highlighting;
pub mod matches;
pub mod parallel;
pub mod partition;
pub mod query_match;
pub mod scoring;
pub mod simple;
pub mod task;

use std::sync::Arc;

pub use candidate::{CandidateMatcher, MatcherState};
pub use config::{ParallelMatcherConfig, PartitionMatcherConfig};
pub use highlighting::HighlightingMatcher;
pub use matches::{MatchError, Matches, SlowLog, SlowLogEntry};
pub use parallel::{ParallelMatcher, ParallelMatcherFactory};
pub use partition::{PartitionMatcher, PartitionMatcherFactory};
pub use query_match::{HighlightsMatch, QueryMatch, ScoringMatch, SimpleMatch};
pub use scoring::ScoringMatcher;
pub use simple::SimpleMatcher;
pub use task::{MatchTask, WorkerMessage};

use crate::document::InputDocument;

/// Creates a fresh matcher for each matching run.
///
/// Any `Fn(Arc<InputDocument>) -> M` is a factory, so constructors such as
/// `SimpleMatcher::new` can be passed directly.
pub trait MatcherFactory: Send + Sync + 'static {
    type Matcher: CandidateMatcher;

    fn create_matcher(&self, doc: Arc<InputDocument>) -> Self::Matcher;
}

impl<M, F> MatcherFactory for F
where
    M: CandidateMatcher,
    F: Fn(Arc<InputDocument>) -> M + Send + Sync + 'static,
{
    type Matcher = M;

    fn create_matcher(&self, doc: Arc<InputDocument>) -> M {
        self(doc)
    }
}

/// The match type produced by a factory's matchers.
pub type MatchOf<F> = <<F as MatcherFactory>::Matcher as CandidateMatcher>::Match;
