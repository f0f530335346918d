//! Single-document in-memory index.
//!
//! The index keeps, per field, the analyzed tokens in position order and a
//! postings map from term text to its occurrences. It is built once by
//! [`InputDocumentBuilder::build`](crate::document::InputDocumentBuilder::build)
//! and never mutated afterwards, so it can be shared freely across threads.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::analysis::token::Token;

/// One occurrence of a term in a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TermPosting {
    /// Token position.
    pub position: usize,
    /// Byte offset where the occurrence starts.
    pub start_offset: usize,
    /// Byte offset where the occurrence ends.
    pub end_offset: usize,
}

/// A term occurrence reported for highlighting.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TermHit {
    /// The field the hit occurred in.
    pub field: String,
    /// First position covered by the hit.
    pub start_position: usize,
    /// Last position covered by the hit (inclusive).
    pub end_position: usize,
    /// Byte offset where the hit starts.
    pub start_offset: usize,
    /// Byte offset where the hit ends.
    pub end_offset: usize,
}

/// The indexed contents of one field.
#[derive(Clone, Debug, Default)]
pub struct FieldIndex {
    tokens: Vec<Token>,
    postings: AHashMap<String, Vec<TermPosting>>,
}

impl FieldIndex {
    fn add(&mut self, token: Token) {
        self.postings
            .entry(token.text.clone())
            .or_default()
            .push(TermPosting {
                position: token.position,
                start_offset: token.start_offset,
                end_offset: token.end_offset,
            });
        self.tokens.push(token);
    }

    /// Tokens of this field in position order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens in this field.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the field holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Occurrences of `term`, in position order.
    pub fn postings(&self, term: &str) -> Option<&[TermPosting]> {
        self.postings.get(term).map(|p| p.as_slice())
    }

    /// Distinct terms of this field, in no particular order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(|t| t.as_str())
    }

    /// The token at `position`, if any.
    pub fn token_at(&self, position: usize) -> Option<&Token> {
        self.tokens
            .binary_search_by_key(&position, |t| t.position)
            .ok()
            .map(|i| &self.tokens[i])
    }
}

/// An inverted index over a single document.
#[derive(Clone, Debug, Default)]
pub struct MemoryIndex {
    fields: BTreeMap<String, FieldIndex>,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append analyzed tokens to a field. Tokens must arrive in increasing
    /// position order.
    pub fn add_tokens<I>(&mut self, field: &str, tokens: I)
    where
        I: IntoIterator<Item = Token>,
    {
        let index = self.fields.entry(field.to_string()).or_default();
        for token in tokens {
            index.add(token);
        }
    }

    /// The index of one field.
    pub fn field(&self, field: &str) -> Option<&FieldIndex> {
        self.fields.get(field)
    }

    /// Names of all indexed fields, sorted.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|f| f.as_str())
    }

    /// Occurrences of a term in a field.
    pub fn postings(&self, field: &str, term: &str) -> Option<&[TermPosting]> {
        self.fields.get(field).and_then(|f| f.postings(term))
    }

    /// Number of occurrences of a term in a field.
    pub fn term_freq(&self, field: &str, term: &str) -> usize {
        self.postings(field, term).map_or(0, |p| p.len())
    }

    /// Number of tokens in a field.
    pub fn field_length(&self, field: &str) -> usize {
        self.fields.get(field).map_or(0, |f| f.len())
    }

    /// Tokens of a field in position order, empty if the field is absent.
    pub fn tokens(&self, field: &str) -> &[Token] {
        self.fields.get(field).map_or(&[], |f| f.tokens())
    }

    /// Distinct terms of a field matching `predicate`.
    pub fn matching_terms<'a, P>(&'a self, field: &str, predicate: P) -> Vec<&'a str>
    where
        P: Fn(&str) -> bool,
    {
        match self.fields.get(field) {
            Some(index) => index.terms().filter(|t| predicate(t)).collect(),
            None => Vec::new(),
        }
    }

    /// Length-normalized score of `freq` occurrences in a field.
    ///
    /// There is only one document, so there are no collection statistics;
    /// the score is `sqrt(freq) / sqrt(field_length)`.
    pub fn frequency_score(&self, field: &str, freq: usize) -> f32 {
        let length = self.field_length(field);
        if freq == 0 || length == 0 {
            return 0.0;
        }
        (freq as f32).sqrt() / (length as f32).sqrt()
    }

    /// Build a highlight hit spanning positions `start..=end` of a field.
    pub fn hit(&self, field: &str, start: usize, end: usize) -> Option<TermHit> {
        let index = self.fields.get(field)?;
        let first = index.token_at(start)?;
        let last = index.token_at(end)?;
        Some(TermHit {
            field: field.to_string(),
            start_position: start,
            end_position: end,
            start_offset: first.start_offset,
            end_offset: last.end_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        index.add_tokens(
            "body",
            vec![
                Token::with_offsets("the", 0, 0, 3),
                Token::with_offsets("cat", 1, 4, 7),
                Token::with_offsets("saw", 2, 8, 11),
                Token::with_offsets("the", 3, 12, 15),
                Token::with_offsets("dog", 4, 16, 19),
            ],
        );
        index
    }

    #[test]
    fn test_postings_and_frequencies() {
        let index = index();

        assert_eq!(index.term_freq("body", "the"), 2);
        assert_eq!(index.term_freq("body", "cow"), 0);
        assert_eq!(index.term_freq("title", "the"), 0);
        assert_eq!(index.field_length("body"), 5);

        let postings = index.postings("body", "the").unwrap();
        assert_eq!(postings[1].position, 3);
        assert_eq!(postings[1].start_offset, 12);
    }

    #[test]
    fn test_frequency_score() {
        let index = index();

        assert_eq!(index.frequency_score("body", 0), 0.0);
        assert_eq!(index.frequency_score("missing", 1), 0.0);
        let once = index.frequency_score("body", 1);
        let twice = index.frequency_score("body", 2);
        assert!(once > 0.0);
        assert!(twice > once);
    }

    #[test]
    fn test_hit_spans_offsets() {
        let index = index();

        let hit = index.hit("body", 1, 2).unwrap();
        assert_eq!(hit.start_offset, 4);
        assert_eq!(hit.end_offset, 11);
        assert!(index.hit("body", 9, 9).is_none());
    }

    #[test]
    fn test_matching_terms() {
        let index = index();

        let mut terms = index.matching_terms("body", |t| t.starts_with('d') || t == "cat");
        terms.sort();
        assert_eq!(terms, vec!["cat", "dog"]);
        assert_eq!(index.field_names().collect::<Vec<_>>(), vec!["body"]);
    }
}
