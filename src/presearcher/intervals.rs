//! Term extraction for interval queries.

use std::sync::Arc;

use crate::error::Result;
use crate::extraction::{QueryTerm, QueryTermExtractor, QueryTree, QueryTreeBuilder, TypedQueryTreeBuilder};
use crate::presearcher::component::PresearcherComponent;
use crate::query::{IntervalQuery, IntervalsSource};

/// Registers a tree builder for [`IntervalQuery`]. Without this component
/// interval queries extract to `Any`.
#[derive(Clone, Debug, Default)]
pub struct IntervalsPresearcherComponent;

impl IntervalsPresearcherComponent {
    pub fn new() -> Self {
        IntervalsPresearcherComponent
    }
}

impl PresearcherComponent for IntervalsPresearcherComponent {
    fn name(&self) -> &str {
        "intervals"
    }

    fn query_tree_builders(&self) -> Vec<Arc<dyn QueryTreeBuilder>> {
        vec![Arc::new(TypedQueryTreeBuilder::<IntervalQuery>::new(
            "intervals",
            build_interval,
        ))]
    }
}

fn build_interval(query: &IntervalQuery, extractor: &QueryTermExtractor) -> Result<QueryTree> {
    Ok(source_tree(query.field(), query.source(), extractor))
}

fn source_tree(field: &str, source: &IntervalsSource, extractor: &QueryTermExtractor) -> QueryTree {
    let children = |sources: &[IntervalsSource]| -> Vec<QueryTree> {
        sources
            .iter()
            .map(|s| source_tree(field, s, extractor))
            .collect()
    };
    match source {
        IntervalsSource::Term(term) => {
            QueryTree::term(QueryTerm::exact(field, term.as_str()), extractor.weightor())
        }
        IntervalsSource::Ordered { sources, .. } | IntervalsSource::Unordered { sources, .. } => {
            if sources.is_empty() {
                return QueryTree::any(field);
            }
            QueryTree::conjunction(children(sources))
        }
        IntervalsSource::Or(sources) => {
            if sources.is_empty() {
                return QueryTree::any(field);
            }
            QueryTree::disjunction(children(sources))
        }
        // Only the minuend has to be present.
        IntervalsSource::NonOverlapping { minuend, .. } => source_tree(field, minuend, extractor),
    }
}
