//! Queue-based parallel verification.
//!
//! The coordinator pushes one [`WorkerMessage::Work`] per candidate onto a
//! bounded channel, blocking while it is full. Each worker owns a matcher
//! built by the inner factory and drains the channel until it receives
//! [`WorkerMessage::Shutdown`]. Results only become visible at
//! [`finish`](CandidateMatcher::finish), which shuts the workers down and
//! merges their state.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded};
use log::{debug, trace};

use crate::document::InputDocument;
use crate::error::{MonitorError, Result};
use crate::matcher::candidate::{CandidateMatcher, MatcherState};
use crate::matcher::config::ParallelMatcherConfig;
use crate::matcher::matches::Matches;
use crate::matcher::task::{MatchTask, WorkerMessage};
use crate::matcher::{MatchOf, MatcherFactory};
use crate::query::Query;

type WorkerHandle<T> = JoinHandle<Result<MatcherState<T>>>;

/// Verifies candidates on a pool of worker threads.
///
/// Workers start on the first candidate, with the slow log limit in effect
/// at that point. [`match_query`](CandidateMatcher::match_query) never
/// returns a match.
pub struct ParallelMatcher<F: MatcherFactory> {
    state: MatcherState<MatchOf<F>>,
    collector: F::Matcher,
    factory: Arc<F>,
    config: ParallelMatcherConfig,
    sender: Option<Sender<WorkerMessage>>,
    workers: Vec<WorkerHandle<MatchOf<F>>>,
}

impl<F: MatcherFactory> ParallelMatcher<F> {
    pub fn new(doc: Arc<InputDocument>, factory: Arc<F>, config: ParallelMatcherConfig) -> Self {
        let collector = factory.create_matcher(Arc::clone(&doc));
        ParallelMatcher {
            state: MatcherState::new(doc),
            collector,
            factory,
            config,
            sender: None,
            workers: Vec::new(),
        }
    }

    /// A factory creating parallel matchers around `factory`.
    pub fn factory(factory: F, config: ParallelMatcherConfig) -> Result<ParallelMatcherFactory<F>> {
        ParallelMatcherFactory::new(factory, config)
    }

    fn start_workers(&mut self) -> Result<Sender<WorkerMessage>> {
        let (sender, receiver) = bounded(self.config.queue_capacity);
        for worker_id in 0..self.config.threads {
            let handle = self.spawn_worker(worker_id, receiver.clone())?;
            self.workers.push(handle);
        }
        debug!(
            "started {} matcher workers for document {}",
            self.workers.len(),
            self.state.doc().id()
        );
        Ok(sender)
    }

    fn spawn_worker(
        &self,
        worker_id: usize,
        receiver: Receiver<WorkerMessage>,
    ) -> Result<WorkerHandle<MatchOf<F>>> {
        let mut matcher = self.factory.create_matcher(Arc::clone(self.state.doc()));
        matcher.set_slow_log_limit(self.state.slow_log_limit());

        let handle = thread::Builder::new()
            .name(format!("monitor-matcher-{worker_id}"))
            .spawn(move || -> Result<MatcherState<MatchOf<F>>> {
                loop {
                    match receiver.recv() {
                        Ok(WorkerMessage::Work(task)) => task.run(&mut matcher)?,
                        // A closed queue means the coordinator is gone.
                        Ok(WorkerMessage::Shutdown) | Err(_) => break,
                    }
                }
                trace!("matcher worker {worker_id} shutting down");
                Ok(matcher.into_state())
            })?;

        Ok(handle)
    }

    /// Shut the workers down and merge their state. Returns the first
    /// error a worker stopped with.
    fn join_workers(&mut self) -> Result<()> {
        if let Some(sender) = self.sender.take() {
            for _ in 0..self.workers.len() {
                if sender.send(WorkerMessage::Shutdown).is_err() {
                    break;
                }
            }
        }

        let mut failure = None;
        let workers = std::mem::take(&mut self.workers);
        for (worker_id, handle) in workers.into_iter().enumerate() {
            match handle.join() {
                Ok(Ok(state)) => self.merge(state),
                Ok(Err(e)) => {
                    failure.get_or_insert(e);
                }
                Err(_) => {
                    failure.get_or_insert(MonitorError::interrupted(format!(
                        "matcher worker {worker_id} panicked"
                    )));
                }
            }
        }
        failure.map_or(Ok(()), Err)
    }
}

impl<F: MatcherFactory> CandidateMatcher for ParallelMatcher<F> {
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
        if self.sender.is_none() {
            let sender = self.start_workers().map_err(|e| {
                MonitorError::interrupted(format!("failed to start matcher workers: {e}"))
            })?;
            self.sender = Some(sender);
        }
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| MonitorError::interrupted("matcher workers are not running"))?;

        let task = MatchTask::new(query_id, Arc::clone(match_query), highlight_query.cloned());
        if sender.send(WorkerMessage::Work(task)).is_err() {
            self.join_workers()?;
            return Err(MonitorError::interrupted("all matcher workers have exited"));
        }
        Ok(None)
    }

    fn resolve(&self, existing: Self::Match, incoming: Self::Match) -> Self::Match {
        self.collector.resolve(existing, incoming)
    }

    fn finish(mut self, query_build_time: Duration, queries_run: usize) -> Result<Matches<Self::Match>> {
        self.join_workers()?;
        Ok(self.state.into_matches(query_build_time, queries_run))
    }
}

/// Creates [`ParallelMatcher`]s around an inner factory.
pub struct ParallelMatcherFactory<F: MatcherFactory> {
    inner: Arc<F>,
    config: ParallelMatcherConfig,
}

impl<F: MatcherFactory> ParallelMatcherFactory<F> {
    /// Fails with [`MonitorError::InvalidConfig`] for zero threads or a zero
    /// queue capacity.
    pub fn new(inner: F, config: ParallelMatcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(ParallelMatcherFactory {
            inner: Arc::new(inner),
            config,
        })
    }

    pub fn config(&self) -> &ParallelMatcherConfig {
        &self.config
    }
}

impl<F: MatcherFactory> MatcherFactory for ParallelMatcherFactory<F> {
    type Matcher = ParallelMatcher<F>;

    fn create_matcher(&self, doc: Arc<InputDocument>) -> ParallelMatcher<F> {
        ParallelMatcher::new(doc, Arc::clone(&self.inner), self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{ScoringMatcher, SimpleMatcher};
    use crate::query::TermQuery;

    fn doc() -> Arc<InputDocument> {
        Arc::new(
            InputDocument::builder("doc1")
                .add_text("body", "alpha beta gamma")
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_results_only_visible_after_finish() {
        let factory =
            ParallelMatcher::factory(SimpleMatcher::new, ParallelMatcherConfig::new().with_threads(2))
                .unwrap();
        let mut matcher = factory.create_matcher(doc());

        let terms = ["alpha", "beta", "delta"];
        for term in terms {
            let query: Arc<dyn Query> = Arc::new(TermQuery::new("body", term));
            assert!(matcher.match_query(term, &query, None).unwrap().is_none());
        }

        let matches = matcher.finish(Duration::ZERO, terms.len()).unwrap();
        assert_eq!(matches.query_ids(), vec!["alpha", "beta"]);
        assert_eq!(matches.queries_run(), 3);
    }

    #[test]
    fn test_small_queue_applies_backpressure() {
        let config = ParallelMatcherConfig::new()
            .with_threads(1)
            .with_queue_capacity(1);
        let factory = ParallelMatcher::factory(ScoringMatcher::new, config).unwrap();
        let mut matcher = factory.create_matcher(doc());

        let query: Arc<dyn Query> = Arc::new(TermQuery::new("body", "gamma"));
        for i in 0..50 {
            matcher
                .match_query(&format!("q{i}"), &query, None)
                .unwrap();
        }
        let matches = matcher.finish(Duration::ZERO, 50).unwrap();
        assert_eq!(matches.match_count(), 50);
    }

    #[test]
    fn test_finish_without_candidates() {
        let factory = ParallelMatcher::factory(SimpleMatcher::new, ParallelMatcherConfig::new()).unwrap();
        let matches = factory
            .create_matcher(doc())
            .finish(Duration::ZERO, 0)
            .unwrap();
        assert_eq!(matches.match_count(), 0);
    }

    #[test]
    fn test_zero_threads_is_rejected() {
        let result = ParallelMatcher::factory(SimpleMatcher::new, ParallelMatcherConfig::new().with_threads(0));
        assert!(matches!(result, Err(MonitorError::InvalidConfig(_))));
    }
}
