//! Restricts candidates to stored queries whose metadata agrees with a
//! document field.

use std::collections::{BTreeSet, HashMap};

use crate::analysis::token::TokenStream;
use crate::document::InputDocument;
use crate::presearcher::component::PresearcherComponent;
use crate::presearcher::query_document::QueryDocument;
use crate::query::{BooleanQuery, Query, TermQuery};

/// Requires a stored query's metadata value for `field` to equal one of the
/// document's space-separated values of that field.
///
/// Documents without the field are not filtered. When the document has the
/// field, stored queries without the metadata entry are not selected. The
/// field's tokens are kept out of the general term disjunction; otherwise
/// every query mentioning the value would be selected.
#[derive(Clone, Debug)]
pub struct FieldFilterPresearcherComponent {
    field: String,
}

impl FieldFilterPresearcherComponent {
    pub fn new<S: Into<String>>(field: S) -> Self {
        FieldFilterPresearcherComponent {
            field: field.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    fn filter_clause(&self, values: &BTreeSet<&str>) -> Box<dyn Query> {
        if values.len() == 1 {
            if let Some(value) = values.first() {
                return Box::new(TermQuery::new(self.field.as_str(), *value));
            }
        }
        let mut clause = BooleanQuery::new();
        for value in values {
            clause.add_should(Box::new(TermQuery::new(self.field.as_str(), *value)));
        }
        Box::new(clause)
    }
}

impl PresearcherComponent for FieldFilterPresearcherComponent {
    fn name(&self) -> &str {
        "field_filter"
    }

    fn adjust_selection_query(&self, doc: &InputDocument, query: Box<dyn Query>) -> Box<dyn Query> {
        let values: BTreeSet<&str> = doc
            .field_values(&self.field)
            .iter()
            .flat_map(|v| v.split(' '))
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            return query;
        }

        let mut adjusted = BooleanQuery::new();
        adjusted.add_must(query);
        adjusted.add_must(self.filter_clause(&values));
        Box::new(adjusted)
    }

    fn adjust_query_document(&self, doc: &mut QueryDocument, metadata: &HashMap<String, String>) {
        if let Some(value) = metadata.get(&self.field) {
            doc.add(self.field.as_str(), value.as_str());
        }
    }

    fn filter_document_tokens(&self, field: &str, tokens: TokenStream) -> TokenStream {
        if field == self.field {
            Box::new(std::iter::empty())
        } else {
            tokens
        }
    }
}
