//! Presearchers narrow the stored queries down to candidates per document.
//!
//! At registration, a presearcher turns a stored query into a
//! [`QueryDocument`]: the terms it is indexed under. At match time, it turns
//! the incoming document into a selection query over those terms. The
//! selection is conservative: every stored query that matches the document
//! is selected, and false positives are removed later by verification.

pub mod component;
pub mod field_filter;
pub mod intervals;
pub mod query_document;
pub mod term_filtered;

use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;

pub use component::PresearcherComponent;
pub use field_filter::FieldFilterPresearcherComponent;
pub use intervals::IntervalsPresearcherComponent;
pub use query_document::QueryDocument;
pub use term_filtered::{TermFilteredPresearcher, TermFilteredPresearcherConfig};

use crate::document::InputDocument;
use crate::error::Result;
use crate::extraction::QueryTerm;
use crate::query::Query;

/// Builds the index representation of stored queries and the per-document
/// selection query run against it.
pub trait Presearcher: Send + Sync + Debug {
    /// Terms a stored query must be indexed under for any matching
    /// document to select it.
    fn build_indexable_terms(&self, query: &dyn Query) -> Result<BTreeSet<QueryTerm>>;

    /// The indexed representation of a stored query and its metadata.
    fn index_query(
        &self,
        query: &dyn Query,
        metadata: &HashMap<String, String>,
    ) -> Result<QueryDocument>;

    /// A query over indexed query documents selecting every stored query
    /// that may match `doc`.
    fn build_selection_query(&self, doc: &InputDocument) -> Result<Box<dyn Query>>;
}
