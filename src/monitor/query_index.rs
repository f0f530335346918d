//! Inverted index over the terms stored queries are indexed under.

use std::collections::{BTreeSet, HashMap, HashSet};

use ahash::AHashMap;

use crate::error::{MonitorError, Result};
use crate::presearcher::QueryDocument;
use crate::query::{BooleanQuery, MatchAllQuery, Occur, Query, TermQuery};

/// Maps `(field, term)` pairs to the slots of the stored queries indexed
/// under them.
///
/// Selection queries are evaluated directly against the postings; only
/// term, boolean and match-all queries are supported.
#[derive(Debug, Default)]
pub struct QueryIndex {
    postings: AHashMap<String, AHashMap<String, BTreeSet<u64>>>,
    documents: HashMap<u64, QueryDocument>,
}

impl QueryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, slot: u64, doc: QueryDocument) {
        for (field, term) in doc.iter() {
            self.postings
                .entry(field.to_string())
                .or_default()
                .entry(term.to_string())
                .or_default()
                .insert(slot);
        }
        self.documents.insert(slot, doc);
    }

    pub fn remove(&mut self, slot: u64) -> Option<QueryDocument> {
        let doc = self.documents.remove(&slot)?;
        for (field, term) in doc.iter() {
            if let Some(terms) = self.postings.get_mut(field) {
                if let Some(slots) = terms.get_mut(term) {
                    slots.remove(&slot);
                    if slots.is_empty() {
                        terms.remove(term);
                    }
                }
                if terms.is_empty() {
                    self.postings.remove(field);
                }
            }
        }
        Some(doc)
    }

    pub fn document(&self, slot: u64) -> Option<&QueryDocument> {
        self.documents.get(&slot)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn clear(&mut self) {
        self.postings.clear();
        self.documents.clear();
    }

    /// Slots of the stored queries the selection query selects.
    pub fn search(&self, query: &dyn Query) -> Result<BTreeSet<u64>> {
        let any = query.as_any();
        if let Some(term) = any.downcast_ref::<TermQuery>() {
            return Ok(self.term_slots(term.field(), term.term()));
        }
        if any.is::<MatchAllQuery>() {
            return Ok(self.documents.keys().copied().collect());
        }
        if let Some(boolean) = any.downcast_ref::<BooleanQuery>() {
            return self.search_boolean(boolean);
        }
        Err(MonitorError::index(format!(
            "unsupported selection query: {}",
            query.description()
        )))
    }

    fn term_slots(&self, field: &str, term: &str) -> BTreeSet<u64> {
        self.postings
            .get(field)
            .and_then(|terms| terms.get(term))
            .cloned()
            .unwrap_or_default()
    }

    fn search_boolean(&self, query: &BooleanQuery) -> Result<BTreeSet<u64>> {
        if query.is_empty() {
            return Ok(BTreeSet::new());
        }

        let mut result: Option<BTreeSet<u64>> = None;
        for clause in query.clauses_by_occur(Occur::Must) {
            let slots = self.search(clause.query.as_ref())?;
            result = Some(match result {
                Some(acc) => acc.intersection(&slots).copied().collect(),
                None => slots,
            });
        }

        let required = query.required_should();
        if required > 0 {
            let mut counts: HashMap<u64, usize> = HashMap::new();
            for clause in query.clauses_by_occur(Occur::Should) {
                for slot in self.search(clause.query.as_ref())? {
                    *counts.entry(slot).or_default() += 1;
                }
            }
            let selected: BTreeSet<u64> = counts
                .into_iter()
                .filter(|(_, count)| *count >= required)
                .map(|(slot, _)| slot)
                .collect();
            result = Some(match result {
                Some(acc) => acc.intersection(&selected).copied().collect(),
                None => selected,
            });
        }

        let mut result = result.unwrap_or_else(|| self.documents.keys().copied().collect());
        for clause in query.clauses_by_occur(Occur::MustNot) {
            for slot in self.search(clause.query.as_ref())? {
                result.remove(&slot);
            }
        }
        Ok(result)
    }
}

/// Every `(field, term)` pair of the term queries inside a selection query.
pub fn selection_terms(query: &dyn Query) -> HashSet<(String, String)> {
    let mut terms = HashSet::new();
    collect_selection_terms(query, &mut terms);
    terms
}

fn collect_selection_terms(query: &dyn Query, terms: &mut HashSet<(String, String)>) {
    let any = query.as_any();
    if let Some(term) = any.downcast_ref::<TermQuery>() {
        terms.insert((term.field().to_string(), term.term().to_string()));
    } else if let Some(boolean) = any.downcast_ref::<BooleanQuery>() {
        for clause in boolean.clauses() {
            if clause.occur != Occur::MustNot {
                collect_selection_terms(clause.query.as_ref(), terms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> QueryIndex {
        let mut index = QueryIndex::new();
        let mut a = QueryDocument::new();
        a.add("body", "cat");
        a.add("lang", "en");
        index.add(1, a);

        let mut b = QueryDocument::new();
        b.add("body", "dog");
        index.add(2, b);
        index
    }

    #[test]
    fn test_term_and_boolean_search() {
        let index = index();
        assert_eq!(
            index.search(&TermQuery::new("body", "cat")).unwrap(),
            BTreeSet::from([1])
        );

        let either = BooleanQuery::new()
            .should(TermQuery::new("body", "cat"))
            .should(TermQuery::new("body", "dog"));
        assert_eq!(index.search(&either).unwrap(), BTreeSet::from([1, 2]));

        let filtered = BooleanQuery::new()
            .must(either)
            .must(TermQuery::new("lang", "en"));
        assert_eq!(index.search(&filtered).unwrap(), BTreeSet::from([1]));

        let excluded = BooleanQuery::new().must_not(TermQuery::new("body", "cat"));
        assert_eq!(index.search(&excluded).unwrap(), BTreeSet::from([2]));
    }

    #[test]
    fn test_remove() {
        let mut index = index();
        assert!(index.remove(1).is_some());
        assert!(index.remove(1).is_none());
        assert!(index.search(&TermQuery::new("body", "cat")).unwrap().is_empty());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_unsupported_selection_query() {
        let query = crate::query::PhraseQuery::from_phrase("body", "cat dog");
        assert!(index().search(&query).is_err());
    }

    #[test]
    fn test_selection_terms() {
        let query = BooleanQuery::new()
            .should(TermQuery::new("body", "cat"))
            .must_not(TermQuery::new("body", "dog"));
        let terms = selection_terms(&query);
        assert!(terms.contains(&("body".to_string(), "cat".to_string())));
        assert_eq!(terms.len(), 1);
    }
}
