//! Builder registry and tree construction.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::trace;

use crate::error::Result;
use crate::extraction::builder::{QueryTreeBuilder, default_builders};
use crate::extraction::term::QueryTerm;
use crate::extraction::tree::QueryTree;
use crate::extraction::weight::TermWeightor;
use crate::query::Query;

/// Builds [`QueryTree`]s by dispatching each query node to the registered
/// builders.
///
/// Every builder that accepts a node is tried and the cheapest resulting
/// tree is kept; on equal weights the earliest registered builder wins. A
/// node no builder accepts becomes `Any` on the query's field.
#[derive(Clone, Debug)]
pub struct QueryTermExtractor {
    builders: Vec<Arc<dyn QueryTreeBuilder>>,
    weightor: TermWeightor,
}

impl Default for QueryTermExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryTermExtractor {
    /// An extractor with the default builders and weightor.
    pub fn new() -> Self {
        QueryTermExtractor {
            builders: default_builders(),
            weightor: TermWeightor::default(),
        }
    }

    pub fn with_weightor(mut self, weightor: TermWeightor) -> Self {
        self.weightor = weightor;
        self
    }

    /// Register an additional builder after the existing ones.
    pub fn add_builder(&mut self, builder: Arc<dyn QueryTreeBuilder>) {
        self.builders.push(builder);
    }

    pub fn builders(&self) -> &[Arc<dyn QueryTreeBuilder>] {
        &self.builders
    }

    pub fn weightor(&self) -> &TermWeightor {
        &self.weightor
    }

    /// Build the tree for `query`, recursing into its children.
    pub fn build_tree(&self, query: &dyn Query) -> Result<QueryTree> {
        let mut best: Option<QueryTree> = None;
        for builder in self.builders.iter().filter(|b| b.accepts(query)) {
            let tree = builder.build(query, self)?;
            trace!("builder {} produced {} for {}", builder.name(), tree, query.description());
            if best.as_ref().is_none_or(|b| tree.weight() < b.weight()) {
                best = Some(tree);
            }
        }

        Ok(best.unwrap_or_else(|| {
            trace!("no builder accepts {}, extracting as any", query.description());
            QueryTree::any(query.field().unwrap_or(""))
        }))
    }

    /// The terms a query should be indexed under.
    pub fn extract(&self, query: &dyn Query) -> Result<BTreeSet<QueryTerm>> {
        Ok(self.build_tree(query)?.terms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::builder::TypedQueryTreeBuilder;
    use crate::query::{
        BooleanQuery, IntervalQuery, IntervalsSource, NumericRangeQuery, PhraseQuery,
        RegexpQuery, TermQuery, WildcardQuery,
    };

    fn extract(query: &dyn Query) -> Vec<QueryTerm> {
        QueryTermExtractor::new()
            .extract(query)
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_regexp_extracts_longest_literal() {
        let query = RegexpQuery::new("field", "super.*califragilistic").unwrap();
        assert_eq!(
            extract(&query),
            vec![QueryTerm::wildcard("field", "califragilistic")]
        );
    }

    #[test]
    fn test_range_queries_return_any_token() {
        let range = NumericRangeQuery::new("field", Some(0.0), Some(10.0));
        assert_eq!(extract(&range), vec![QueryTerm::any("field")]);

        let query = BooleanQuery::new()
            .must(range)
            .must(TermQuery::new("field", "term"));
        assert_eq!(extract(&query), vec![QueryTerm::exact("field", "term")]);
    }

    #[test]
    fn test_boolean_disjunction_and_negation() {
        let query = BooleanQuery::new()
            .should(TermQuery::new("f", "a"))
            .should(TermQuery::new("f", "b"))
            .must_not(TermQuery::new("f", "c"));
        assert_eq!(
            extract(&query),
            vec![QueryTerm::exact("f", "a"), QueryTerm::exact("f", "b")]
        );

        let query = BooleanQuery::new().must_not(TermQuery::new("f", "c"));
        assert_eq!(extract(&query), vec![QueryTerm::any("")]);
    }

    #[test]
    fn test_optional_shoulds_are_ignored_next_to_musts() {
        let query = BooleanQuery::new()
            .must(TermQuery::new("f", "required"))
            .should(TermQuery::new("f", "x"));
        assert_eq!(extract(&query), vec![QueryTerm::exact("f", "required")]);
    }

    #[test]
    fn test_phrase_selects_cheapest_term() {
        let query = PhraseQuery::from_phrase("f", "the elephant");
        assert_eq!(extract(&query), vec![QueryTerm::exact("f", "elephant")]);
    }

    #[test]
    fn test_wildcard_without_literal_is_any() {
        let query = WildcardQuery::new("f", "*").unwrap();
        assert_eq!(extract(&query), vec![QueryTerm::any("f")]);
    }

    #[test]
    fn test_unknown_query_falls_back_to_any() {
        let query = IntervalQuery::new("f", IntervalsSource::term("a"));
        assert_eq!(extract(&query), vec![QueryTerm::any("f")]);
    }

    #[test]
    fn test_cheapest_builder_wins() {
        let mut extractor = QueryTermExtractor::new();
        extractor.add_builder(Arc::new(TypedQueryTreeBuilder::<TermQuery>::new(
            "any_term",
            |q, _| Ok(QueryTree::any(q.field())),
        )));

        let terms: Vec<_> = extractor
            .extract(&TermQuery::new("f", "a"))
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(terms, vec![QueryTerm::exact("f", "a")]);
    }
}
