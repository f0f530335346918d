//! Stored queries.

use std::collections::HashMap;
use std::sync::Arc;

use crate::query::Query;

/// A query registered with a [`Monitor`](crate::monitor::Monitor).
#[derive(Clone, Debug)]
pub struct MonitorQuery {
    id: String,
    match_query: Arc<dyn Query>,
    highlight_query: Option<Arc<dyn Query>>,
    metadata: HashMap<String, String>,
}

impl MonitorQuery {
    pub fn new<S: Into<String>, Q: Query + 'static>(id: S, query: Q) -> Self {
        Self::from_arc(id, Arc::new(query))
    }

    pub fn from_arc<S: Into<String>>(id: S, query: Arc<dyn Query>) -> Self {
        MonitorQuery {
            id: id.into(),
            match_query: query,
            highlight_query: None,
            metadata: HashMap::new(),
        }
    }

    /// Use a different query to compute highlights.
    pub fn with_highlight_query<Q: Query + 'static>(mut self, query: Q) -> Self {
        self.highlight_query = Some(Arc::new(query));
        self
    }

    pub fn with_metadata<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn match_query(&self) -> &Arc<dyn Query> {
        &self.match_query
    }

    pub fn highlight_query(&self) -> Option<&Arc<dyn Query>> {
        self.highlight_query.as_ref()
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }
}
