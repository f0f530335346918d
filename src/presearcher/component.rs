//! Pluggable presearcher extensions.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::analysis::token::TokenStream;
use crate::document::InputDocument;
use crate::extraction::QueryTreeBuilder;
use crate::presearcher::query_document::QueryDocument;
use crate::query::Query;

/// Extends a presearcher with extra tree builders, filter clauses and
/// token suppression. Every hook defaults to doing nothing.
pub trait PresearcherComponent: Send + Sync + Debug {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Builders registered with the presearcher's extractor.
    fn query_tree_builders(&self) -> Vec<Arc<dyn QueryTreeBuilder>> {
        Vec::new()
    }

    /// Rewrite the selection query built for `doc`.
    fn adjust_selection_query(&self, _doc: &InputDocument, query: Box<dyn Query>) -> Box<dyn Query> {
        query
    }

    /// Add terms derived from a stored query's metadata.
    fn adjust_query_document(
        &self,
        _doc: &mut QueryDocument,
        _metadata: &HashMap<String, String>,
    ) {
    }

    /// Filter the tokens of one document field before they are added to
    /// the selection query.
    fn filter_document_tokens(&self, _field: &str, tokens: TokenStream) -> TokenStream {
        tokens
    }
}
