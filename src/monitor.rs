//! The monitor: a store of queries matched against incoming documents.
//!
//! Registering a query runs the presearcher once to decide which terms the
//! query is indexed under. Matching a document builds a selection query
//! from the document's tokens, looks up the candidate queries in the query
//! index, and verifies each candidate with a [`CandidateMatcher`].
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use sarissa_monitor::document::InputDocument;
//! use sarissa_monitor::matcher::SimpleMatcher;
//! use sarissa_monitor::monitor::{Monitor, MonitorQuery};
//! use sarissa_monitor::presearcher::TermFilteredPresearcher;
//! use sarissa_monitor::query::TermQuery;
//!
//! let monitor = Monitor::new(TermFilteredPresearcher::new());
//! monitor.register(MonitorQuery::new("q1", TermQuery::new("body", "fox"))).unwrap();
//! monitor.register(MonitorQuery::new("q2", TermQuery::new("body", "cat"))).unwrap();
//!
//! let doc = InputDocument::builder("doc1")
//!     .add_text("body", "The quick brown fox")
//!     .build()
//!     .unwrap();
//! let matches = monitor.match_document(Arc::new(doc), &SimpleMatcher::new).unwrap();
//!
//! assert_eq!(matches.query_ids(), vec!["q1"]);
//! assert_eq!(matches.queries_run(), 1);
//! ```

pub mod config;
pub mod monitor_query;
pub mod query_index;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, trace};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

pub use config::MonitorConfig;
pub use monitor_query::MonitorQuery;
pub use query_index::QueryIndex;

use crate::document::InputDocument;
use crate::error::{MonitorError, Result};
use crate::extraction::QueryTerm;
use crate::matcher::{CandidateMatcher, MatchError, MatchOf, MatcherFactory, Matches};
use crate::monitor::query_index::selection_terms;
use crate::presearcher::Presearcher;
use crate::query::Query;

/// Why the presearcher selected a stored query for a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresearcherMatch {
    pub query_id: String,
    /// Indexed `field:term` pairs of the query that the selection query hit.
    pub matching_terms: Vec<String>,
    /// Whether the query actually matches the document.
    pub matched: bool,
}

#[derive(Debug)]
struct StoredQuery {
    slot: u64,
    query: MonitorQuery,
    terms: BTreeSet<QueryTerm>,
}

#[derive(Debug, Default)]
struct MonitorState {
    queries: HashMap<String, StoredQuery>,
    slots: HashMap<u64, String>,
    index: QueryIndex,
    next_slot: u64,
}

impl MonitorState {
    fn remove(&mut self, id: &str) -> Option<StoredQuery> {
        let stored = self.queries.remove(id)?;
        self.slots.remove(&stored.slot);
        self.index.remove(stored.slot);
        Some(stored)
    }

    fn candidates(&self, selection: &dyn Query) -> Result<Vec<&StoredQuery>> {
        Ok(self
            .index
            .search(selection)?
            .into_iter()
            .filter_map(|slot| self.slots.get(&slot))
            .filter_map(|id| self.queries.get(id))
            .collect())
    }
}

/// Matches documents against a set of registered queries.
#[derive(Debug)]
pub struct Monitor {
    presearcher: Arc<dyn Presearcher>,
    config: MonitorConfig,
    state: RwLock<MonitorState>,
}

impl Monitor {
    pub fn new<P: Presearcher + 'static>(presearcher: P) -> Self {
        Self::with_config(presearcher, MonitorConfig::default())
    }

    pub fn with_config<P: Presearcher + 'static>(presearcher: P, config: MonitorConfig) -> Self {
        Monitor {
            presearcher: Arc::new(presearcher),
            config,
            state: RwLock::new(MonitorState::default()),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Register a query, replacing any query with the same id.
    pub fn register(&self, query: MonitorQuery) -> Result<()> {
        if query.id().is_empty() {
            return Err(MonitorError::index("query id must not be empty"));
        }

        let terms = self
            .presearcher
            .build_indexable_terms(query.match_query().as_ref())?;
        let doc = self
            .presearcher
            .index_query(query.match_query().as_ref(), query.metadata())?;
        trace!("indexing query {} under {:?}", query.id(), terms);

        let mut state = self.state.write();
        state.remove(query.id());
        let slot = state.next_slot;
        state.next_slot += 1;
        state.index.add(slot, doc);
        state.slots.insert(slot, query.id().to_string());
        state
            .queries
            .insert(query.id().to_string(), StoredQuery { slot, query, terms });
        Ok(())
    }

    /// Register several queries, stopping at the first failure.
    pub fn register_all<I>(&self, queries: I) -> Result<()>
    where
        I: IntoIterator<Item = MonitorQuery>,
    {
        for query in queries {
            self.register(query)?;
        }
        Ok(())
    }

    /// Remove a query. Returns whether it was registered.
    pub fn delete(&self, id: &str) -> bool {
        self.state.write().remove(id).is_some()
    }

    pub fn get_query(&self, id: &str) -> Option<MonitorQuery> {
        self.state.read().queries.get(id).map(|s| s.query.clone())
    }

    /// The terms a registered query is indexed under.
    pub fn indexed_terms(&self, id: &str) -> Option<BTreeSet<QueryTerm>> {
        self.state.read().queries.get(id).map(|s| s.terms.clone())
    }

    pub fn query_count(&self) -> usize {
        self.state.read().queries.len()
    }

    pub fn clear(&self) {
        let mut state = self.state.write();
        state.queries.clear();
        state.slots.clear();
        state.index.clear();
    }

    /// Match a document against the registered queries.
    ///
    /// Failures verifying a single query are recorded in the returned
    /// [`Matches`]. Fatal errors, such as an interrupted worker, abort the
    /// run.
    pub fn match_document<F: MatcherFactory>(
        &self,
        doc: Arc<InputDocument>,
        factory: &F,
    ) -> Result<Matches<MatchOf<F>>> {
        let start = Instant::now();
        let selection = self.presearcher.build_selection_query(&doc)?;
        let query_build_time = start.elapsed();

        let candidates: Vec<MonitorQuery> = {
            let state = self.state.read();
            state
                .candidates(selection.as_ref())?
                .into_iter()
                .map(|s| s.query.clone())
                .collect()
        };
        debug!(
            "document {} selected {} of {} queries",
            doc.id(),
            candidates.len(),
            self.query_count()
        );

        let mut matcher = factory.create_matcher(doc);
        matcher.set_slow_log_limit(self.config.slow_log_limit);
        for candidate in &candidates {
            if let Err(e) = matcher.match_query(
                candidate.id(),
                candidate.match_query(),
                candidate.highlight_query(),
            ) {
                if e.is_fatal() {
                    return Err(e);
                }
                matcher.report_error(MatchError::new(candidate.id(), e));
            }
        }

        matcher.finish(query_build_time, candidates.len())
    }

    /// For each candidate the presearcher selects for `doc`, the indexed
    /// terms that selected it and whether it really matches.
    pub fn debug_document(&self, doc: &InputDocument) -> Result<Vec<PresearcherMatch>> {
        let selection = self.presearcher.build_selection_query(doc)?;
        let selected = selection_terms(selection.as_ref());

        let state = self.state.read();
        let mut result = Vec::new();
        for stored in state.candidates(selection.as_ref())? {
            let matching_terms = state
                .index
                .document(stored.slot)
                .into_iter()
                .flat_map(|d| d.iter())
                .filter(|(field, term)| selected.contains(&(field.to_string(), term.to_string())))
                .map(|(field, term)| format!("{field}:{term}"))
                .collect();
            let matched = stored.query.match_query().matches(doc.index())?;
            result.push(PresearcherMatch {
                query_id: stored.query.id().to_string(),
                matching_terms,
                matched,
            });
        }
        result.sort_by(|a, b| a.query_id.cmp(&b.query_id));
        Ok(result)
    }
}
