//! Phrase query implementation for matching sequences of terms.

use crate::document::{MemoryIndex, TermHit};
use crate::error::Result;
use crate::query::query::Query;

/// A query that matches terms appearing in order, with at most `slop`
/// extra positions between the first and the last term.
#[derive(Debug, Clone)]
pub struct PhraseQuery {
    /// The field to search in.
    field: String,
    /// The terms that make up the phrase, in order.
    terms: Vec<String>,
    /// The boost factor for this query.
    boost: f32,
    /// Maximum number of extra positions allowed inside the phrase (0 = exact phrase).
    slop: u32,
}

impl PhraseQuery {
    /// Create a new phrase query.
    pub fn new<S: Into<String>>(field: S, terms: Vec<String>) -> Self {
        PhraseQuery {
            field: field.into(),
            terms,
            boost: 1.0,
            slop: 0,
        }
    }

    /// Create a phrase query from a whitespace-separated phrase string.
    pub fn from_phrase<S: Into<String>>(field: S, phrase: &str) -> Self {
        let terms: Vec<String> = phrase.split_whitespace().map(|s| s.to_string()).collect();
        Self::new(field, terms)
    }

    /// Set the boost factor for this query.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Set the slop (maximum distance between terms).
    ///
    /// A slop of 0 means exact phrase match.
    /// A slop of 1 allows one word between phrase terms.
    pub fn with_slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the phrase terms.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Get the slop value.
    pub fn slop(&self) -> u32 {
        self.slop
    }

    /// All `(first, last)` position spans where the phrase occurs.
    fn spans(&self, index: &MemoryIndex) -> Vec<(usize, usize)> {
        let Some(first) = self.terms.first() else {
            return Vec::new();
        };
        let Some(starts) = index.postings(&self.field, first) else {
            return Vec::new();
        };

        let mut rest = Vec::with_capacity(self.terms.len() - 1);
        for term in &self.terms[1..] {
            match index.postings(&self.field, term) {
                Some(postings) => rest.push(postings),
                None => return Vec::new(),
            }
        }

        let gaps = self.terms.len() - 1;
        let mut spans = Vec::new();
        'starts: for start in starts {
            let mut last = start.position;
            for postings in &rest {
                // Earliest following occurrence keeps the span minimal.
                match postings.iter().find(|p| p.position > last) {
                    Some(p) => last = p.position,
                    None => continue 'starts,
                }
            }
            if last - start.position - gaps <= self.slop as usize {
                spans.push((start.position, last));
            }
        }
        spans
    }
}

impl Query for PhraseQuery {
    fn matches(&self, index: &MemoryIndex) -> Result<bool> {
        Ok(!self.spans(index).is_empty())
    }

    fn score(&self, index: &MemoryIndex) -> Result<f32> {
        let freq = self.spans(index).len();
        Ok(index.frequency_score(&self.field, freq) * self.boost)
    }

    fn hits(&self, index: &MemoryIndex, hits: &mut Vec<TermHit>) -> Result<()> {
        hits.extend(
            self.spans(index)
                .into_iter()
                .filter_map(|(start, end)| index.hit(&self.field, start, end)),
        );
        Ok(())
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        let mut description = format!("{}:\"{}\"", self.field, self.terms.join(" "));
        if self.slop > 0 {
            description.push_str(&format!("~{}", self.slop));
        }
        description
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn field(&self) -> Option<&str> {
        Some(&self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::InputDocument;

    fn doc() -> InputDocument {
        InputDocument::builder("d")
            .add_text("body", "the quick brown fox jumps")
            .build()
            .unwrap()
    }

    #[test]
    fn test_exact_phrase() {
        let doc = doc();
        assert!(
            PhraseQuery::from_phrase("body", "quick brown")
                .matches(doc.index())
                .unwrap()
        );
        assert!(
            !PhraseQuery::from_phrase("body", "brown quick")
                .matches(doc.index())
                .unwrap()
        );
        assert!(
            !PhraseQuery::from_phrase("body", "quick fox")
                .matches(doc.index())
                .unwrap()
        );
    }

    #[test]
    fn test_sloppy_phrase() {
        let doc = doc();
        let query = PhraseQuery::from_phrase("body", "quick fox").with_slop(1);
        assert!(query.matches(doc.index()).unwrap());
        assert!(query.score(doc.index()).unwrap() > 0.0);
    }

    #[test]
    fn test_phrase_hits_span_offsets() {
        let doc = doc();
        let mut hits = Vec::new();
        PhraseQuery::from_phrase("body", "brown fox")
            .hits(doc.index(), &mut hits)
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].start_position, 2);
        assert_eq!(hits[0].end_position, 3);
        assert_eq!(hits[0].start_offset, 10);
        assert_eq!(hits[0].end_offset, 19);
    }

    #[test]
    fn test_empty_phrase_matches_nothing() {
        assert!(
            !PhraseQuery::new("body", Vec::new())
                .matches(doc().index())
                .unwrap()
        );
    }
}
