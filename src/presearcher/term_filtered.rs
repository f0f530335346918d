//! The default presearcher: stored queries are indexed under their
//! extracted terms, and documents select them through a disjunction of
//! their own tokens.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::DuplicateRemovalStream;
use crate::document::InputDocument;
use crate::error::{MonitorError, Result};
use crate::extraction::{QueryTerm, QueryTermExtractor, TermType, TermWeightor};
use crate::presearcher::Presearcher;
use crate::presearcher::component::PresearcherComponent;
use crate::presearcher::query_document::QueryDocument;
use crate::query::{BooleanQuery, Query, TermQuery};

/// Configuration for [`TermFilteredPresearcher`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermFilteredPresearcherConfig {
    /// Field that holds the always-selected token.
    pub any_token_field: String,
    /// Token indexed for queries that extract to `Any`.
    pub any_token: String,
    /// Suffix appended to a field name to hold wildcard n-grams.
    pub wildcard_field_suffix: String,
    /// Longest n-gram generated from document tokens for wildcard terms.
    pub max_ngram_length: usize,
}

impl Default for TermFilteredPresearcherConfig {
    fn default() -> Self {
        TermFilteredPresearcherConfig {
            any_token_field: "__anytokenfield".to_string(),
            any_token: "__ANYTOKEN__".to_string(),
            wildcard_field_suffix: "__wildcard".to_string(),
            max_ngram_length: 30,
        }
    }
}

impl TermFilteredPresearcherConfig {
    fn validate(&self) -> Result<()> {
        if self.max_ngram_length == 0 {
            return Err(MonitorError::invalid_config(
                "max_ngram_length must be greater than zero",
            ));
        }
        if self.any_token_field.is_empty() || self.any_token.is_empty() {
            return Err(MonitorError::invalid_config(
                "any_token_field and any_token must not be empty",
            ));
        }
        if self.wildcard_field_suffix.is_empty() {
            return Err(MonitorError::invalid_config(
                "wildcard_field_suffix must not be empty",
            ));
        }
        Ok(())
    }
}

/// Presearcher indexing stored queries under their extracted terms.
///
/// - exact terms are indexed in their own field;
/// - wildcard terms are indexed in `<field><wildcard_field_suffix>` and
///   matched against every n-gram of the document's tokens;
/// - queries that extract to `Any` are indexed under the any-token, which
///   every selection query contains.
#[derive(Clone, Debug)]
pub struct TermFilteredPresearcher {
    config: TermFilteredPresearcherConfig,
    extractor: QueryTermExtractor,
    components: Vec<Arc<dyn PresearcherComponent>>,
}

impl Default for TermFilteredPresearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TermFilteredPresearcher {
    pub fn new() -> Self {
        TermFilteredPresearcher {
            config: TermFilteredPresearcherConfig::default(),
            extractor: QueryTermExtractor::new(),
            components: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: TermFilteredPresearcherConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn with_weightor(mut self, weightor: TermWeightor) -> Self {
        self.extractor = self.extractor.with_weightor(weightor);
        self
    }

    /// Add a component and register its tree builders.
    pub fn with_component<C: PresearcherComponent + 'static>(mut self, component: C) -> Self {
        for builder in component.query_tree_builders() {
            self.extractor.add_builder(builder);
        }
        self.components.push(Arc::new(component));
        self
    }

    pub fn config(&self) -> &TermFilteredPresearcherConfig {
        &self.config
    }

    pub fn extractor(&self) -> &QueryTermExtractor {
        &self.extractor
    }

    fn wildcard_field(&self, field: &str) -> String {
        format!("{}{}", field, self.config.wildcard_field_suffix)
    }

    fn document_tokens(&self, doc: &InputDocument, field: &str) -> TokenStream {
        let mut tokens: TokenStream = Box::new(doc.index().tokens(field).to_vec().into_iter());
        for component in &self.components {
            tokens = component.filter_document_tokens(field, tokens);
        }
        tokens
    }
}

/// Every substring of `text` of at most `max` characters.
fn ngrams(text: &str, max: usize, out: &mut BTreeSet<String>) {
    let chars: Vec<char> = text.chars().collect();
    for start in 0..chars.len() {
        let end = (start + max).min(chars.len());
        for stop in start + 1..=end {
            out.insert(chars[start..stop].iter().collect());
        }
    }
}

impl Presearcher for TermFilteredPresearcher {
    fn build_indexable_terms(&self, query: &dyn Query) -> Result<BTreeSet<QueryTerm>> {
        self.extractor.extract(query)
    }

    fn index_query(
        &self,
        query: &dyn Query,
        metadata: &HashMap<String, String>,
    ) -> Result<QueryDocument> {
        let mut doc = QueryDocument::new();
        for term in self.build_indexable_terms(query)? {
            match term.term_type {
                TermType::Exact => doc.add(term.field, term.text),
                TermType::Wildcard => {
                    // Any substring of the literal is also an n-gram of the token.
                    let ngram: String = term
                        .text
                        .chars()
                        .take(self.config.max_ngram_length)
                        .collect();
                    doc.add(self.wildcard_field(&term.field), ngram);
                }
                TermType::Any => doc.add(
                    self.config.any_token_field.as_str(),
                    self.config.any_token.as_str(),
                ),
            }
        }

        for component in &self.components {
            component.adjust_query_document(&mut doc, metadata);
        }
        Ok(doc)
    }

    fn build_selection_query(&self, doc: &InputDocument) -> Result<Box<dyn Query>> {
        let mut selection = BooleanQuery::new();
        let mut dedup: Option<DuplicateRemovalStream<TokenStream>> = None;

        for field in doc.index().field_names() {
            let tokens = self.document_tokens(doc, field);
            let stream = match dedup.take() {
                Some(mut stream) => {
                    stream.reset(tokens);
                    stream
                }
                None => DuplicateRemovalStream::new(tokens),
            };
            let stream = dedup.insert(stream);

            let mut grams = BTreeSet::new();
            for token in stream.by_ref() {
                ngrams(&token.text, self.config.max_ngram_length, &mut grams);
                selection.add_should(Box::new(TermQuery::new(field, token.text)));
            }

            let wildcard_field = self.wildcard_field(field);
            for gram in grams {
                selection.add_should(Box::new(TermQuery::new(wildcard_field.as_str(), gram)));
            }
        }

        selection.add_should(Box::new(TermQuery::new(
            self.config.any_token_field.as_str(),
            self.config.any_token.as_str(),
        )));
        debug!(
            "selection query for document {} has {} clauses",
            doc.id(),
            selection.clauses().len()
        );

        let mut query: Box<dyn Query> = Box::new(selection);
        for component in &self.components {
            query = component.adjust_selection_query(doc, query);
        }
        Ok(query)
    }
}
