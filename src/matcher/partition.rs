//! Fixed-partition parallel verification.
//!
//! Candidates are collected during the run and split into packages when it
//! finishes. Each package is verified by its own matcher on a rayon pool
//! sized to the number of packages, and the package results are merged in
//! package order.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::document::InputDocument;
use crate::error::{MonitorError, Result};
use crate::matcher::candidate::{CandidateMatcher, MatcherState};
use crate::matcher::config::PartitionMatcherConfig;
use crate::matcher::matches::Matches;
use crate::matcher::task::MatchTask;
use crate::matcher::{MatchOf, MatcherFactory};
use crate::query::Query;

/// Verifies a fully known candidate set in fixed-size packages.
pub struct PartitionMatcher<F: MatcherFactory> {
    state: MatcherState<MatchOf<F>>,
    collector: F::Matcher,
    factory: Arc<F>,
    config: PartitionMatcherConfig,
    tasks: Vec<MatchTask>,
}

impl<F: MatcherFactory> PartitionMatcher<F> {
    pub fn new(doc: Arc<InputDocument>, factory: Arc<F>, config: PartitionMatcherConfig) -> Self {
        let collector = factory.create_matcher(Arc::clone(&doc));
        PartitionMatcher {
            state: MatcherState::new(doc),
            collector,
            factory,
            config,
            tasks: Vec::new(),
        }
    }

    /// A factory creating partition matchers around `factory`.
    pub fn factory(
        factory: F,
        config: PartitionMatcherConfig,
    ) -> Result<PartitionMatcherFactory<F>> {
        PartitionMatcherFactory::new(factory, config)
    }

    fn run_package(
        factory: &F,
        doc: &Arc<InputDocument>,
        slow_log_limit: Duration,
        package: &[MatchTask],
    ) -> Result<MatcherState<MatchOf<F>>> {
        let mut matcher = factory.create_matcher(Arc::clone(doc));
        matcher.set_slow_log_limit(slow_log_limit);
        for task in package {
            task.run(&mut matcher)?;
        }
        Ok(matcher.into_state())
    }

    fn run_packages(&self, tasks: &[MatchTask]) -> Result<Vec<MatcherState<MatchOf<F>>>> {
        let packages: Vec<&[MatchTask]> = tasks.chunks(self.config.package_size).collect();
        let threads = self.config.threads_for(packages.len());
        debug!(
            "verifying {} candidates in {} packages on {} threads",
            tasks.len(),
            packages.len(),
            threads
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("monitor-partition-{i}"))
            .build()
            .map_err(|e| MonitorError::interrupted(format!("Failed to create thread pool: {e}")))?;

        let factory = self.factory.as_ref();
        let doc = self.state.doc();
        let slow_log_limit = self.state.slow_log_limit();
        let results: Vec<_> = pool.install(|| {
            packages
                .par_iter()
                .map(|package| {
                    panic::catch_unwind(AssertUnwindSafe(|| {
                        Self::run_package(factory, doc, slow_log_limit, package)
                    }))
                })
                .collect()
        });

        results
            .into_iter()
            .enumerate()
            .map(|(i, result)| {
                result
                    .map_err(|_| MonitorError::interrupted(format!("package {i} panicked")))
                    .and_then(|state| state)
            })
            .collect()
    }
}

impl<F: MatcherFactory> CandidateMatcher for PartitionMatcher<F> {
    type Match = MatchOf<F>;

    fn state(&self) -> &MatcherState<Self::Match> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut MatcherState<Self::Match> {
        &mut self.state
    }

    fn into_state(self) -> MatcherState<Self::Match> {
        self.state
    }

    fn do_match(
        &self,
        query_id: &str,
        match_query: &dyn Query,
        highlight_query: Option<&dyn Query>,
    ) -> Result<Option<Self::Match>> {
        self.collector.do_match(query_id, match_query, highlight_query)
    }

    fn match_query(
        &mut self,
        query_id: &str,
        match_query: &Arc<dyn Query>,
        highlight_query: Option<&Arc<dyn Query>>,
    ) -> Result<Option<Self::Match>> {
        self.tasks.push(MatchTask::new(
            query_id,
            Arc::clone(match_query),
            highlight_query.cloned(),
        ));
        Ok(None)
    }

    fn resolve(&self, existing: Self::Match, incoming: Self::Match) -> Self::Match {
        self.collector.resolve(existing, incoming)
    }

    fn finish(mut self, query_build_time: Duration, queries_run: usize) -> Result<Matches<Self::Match>> {
        let tasks = std::mem::take(&mut self.tasks);
        if !tasks.is_empty() {
            for state in self.run_packages(&tasks)? {
                self.merge(state);
            }
        }
        Ok(self.state.into_matches(query_build_time, queries_run))
    }
}

/// Creates [`PartitionMatcher`]s around an inner factory.
pub struct PartitionMatcherFactory<F: MatcherFactory> {
    inner: Arc<F>,
    config: PartitionMatcherConfig,
}

impl<F: MatcherFactory> PartitionMatcherFactory<F> {
    /// Fails with [`MonitorError::InvalidConfig`] for a zero package size or
    /// a zero thread cap.
    pub fn new(inner: F, config: PartitionMatcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(PartitionMatcherFactory {
            inner: Arc::new(inner),
            config,
        })
    }

    pub fn config(&self) -> &PartitionMatcherConfig {
        &self.config
    }
}

impl<F: MatcherFactory> MatcherFactory for PartitionMatcherFactory<F> {
    type Matcher = PartitionMatcher<F>;

    fn create_matcher(&self, doc: Arc<InputDocument>) -> PartitionMatcher<F> {
        PartitionMatcher::new(doc, Arc::clone(&self.inner), self.config.clone())
    }
}
