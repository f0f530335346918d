//! The document evaluated by a matching run.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::analysis::analyzer::{Analyzer, StandardAnalyzer};
use crate::analysis::token::Token;
use crate::document::memory_index::MemoryIndex;
use crate::error::{MonitorError, Result};

/// Gap inserted between the positions of consecutive values of the same
/// field, so phrases and intervals never span two values.
const POSITION_INCREMENT_GAP: usize = 100;

/// A single document, analyzed into a [`MemoryIndex`].
///
/// # Examples
///
/// ```
/// use sarissa_monitor::document::InputDocument;
///
/// let doc = InputDocument::builder("doc1")
///     .add_text("body", "The quick brown fox")
///     .add_keyword("language", "en")
///     .build()
///     .unwrap();
///
/// assert_eq!(doc.id(), "doc1");
/// assert_eq!(doc.index().term_freq("body", "quick"), 1);
/// assert_eq!(doc.field_value("language"), Some("en"));
/// ```
#[derive(Clone, Debug)]
pub struct InputDocument {
    id: String,
    values: BTreeMap<String, Vec<String>>,
    index: MemoryIndex,
}

impl InputDocument {
    /// Start building a document with the given id.
    pub fn builder<S: Into<String>>(id: S) -> InputDocumentBuilder {
        InputDocumentBuilder::new(id)
    }

    /// The document id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The single-document index.
    pub fn index(&self) -> &MemoryIndex {
        &self.index
    }

    /// The first raw value of a field, if the field is present.
    pub fn field_value(&self, field: &str) -> Option<&str> {
        self.values
            .get(field)
            .and_then(|values| values.first())
            .map(|v| v.as_str())
    }

    /// All raw values of a field.
    pub fn field_values(&self, field: &str) -> &[String] {
        self.values.get(field).map_or(&[], |v| v.as_slice())
    }

    /// Names of all fields carrying raw values.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|f| f.as_str())
    }
}

enum PendingValue {
    Text {
        text: String,
        analyzer: Option<Arc<dyn Analyzer>>,
    },
    Keyword(String),
}

/// Builder for [`InputDocument`]. Analysis happens in [`build`](Self::build).
pub struct InputDocumentBuilder {
    id: String,
    analyzer: Option<Arc<dyn Analyzer>>,
    fields: Vec<(String, PendingValue)>,
}

impl InputDocumentBuilder {
    /// Create a builder for a document with the given id.
    pub fn new<S: Into<String>>(id: S) -> Self {
        InputDocumentBuilder {
            id: id.into(),
            analyzer: None,
            fields: Vec::new(),
        }
    }

    /// Set the analyzer used for text fields without their own analyzer.
    /// Defaults to [`StandardAnalyzer`].
    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Add a text value, analyzed with the default analyzer.
    pub fn add_text<F: Into<String>, T: Into<String>>(mut self, field: F, text: T) -> Self {
        self.fields.push((
            field.into(),
            PendingValue::Text {
                text: text.into(),
                analyzer: None,
            },
        ));
        self
    }

    /// Add a text value analyzed with a specific analyzer.
    pub fn add_text_with<F: Into<String>, T: Into<String>>(
        mut self,
        field: F,
        text: T,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        self.fields.push((
            field.into(),
            PendingValue::Text {
                text: text.into(),
                analyzer: Some(analyzer),
            },
        ));
        self
    }

    /// Add a value indexed verbatim as a single token.
    pub fn add_keyword<F: Into<String>, T: Into<String>>(mut self, field: F, value: T) -> Self {
        self.fields
            .push((field.into(), PendingValue::Keyword(value.into())));
        self
    }

    /// Analyze every value and build the document.
    pub fn build(self) -> Result<InputDocument> {
        if self.id.is_empty() {
            return Err(MonitorError::analysis("document id must not be empty"));
        }

        let default_analyzer: Arc<dyn Analyzer> = match self.analyzer {
            Some(analyzer) => analyzer,
            None => Arc::new(StandardAnalyzer::new()?),
        };

        let mut index = MemoryIndex::new();
        let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut next_position: BTreeMap<String, (usize, usize)> = BTreeMap::new();

        for (field, value) in self.fields {
            let (base_position, base_offset) =
                next_position.get(&field).copied().unwrap_or((0, 0));

            let (raw, tokens): (String, Vec<Token>) = match value {
                PendingValue::Text { text, analyzer } => {
                    let analyzer = analyzer.as_ref().unwrap_or(&default_analyzer);
                    let tokens = analyzer.analyze(&text)?.collect();
                    (text, tokens)
                }
                PendingValue::Keyword(value) => {
                    let token = Token::with_offsets(value.clone(), 0, 0, value.len());
                    (value, vec![token])
                }
            };

            let shifted: Vec<Token> = tokens
                .into_iter()
                .map(|mut token| {
                    token.position += base_position;
                    token.start_offset += base_offset;
                    token.end_offset += base_offset;
                    token
                })
                .collect();

            let last_position = shifted.last().map_or(base_position, |t| t.position);
            next_position.insert(
                field.clone(),
                (
                    last_position + POSITION_INCREMENT_GAP,
                    base_offset + raw.len() + 1,
                ),
            );

            index.add_tokens(&field, shifted);
            values.entry(field).or_default().push(raw);
        }

        Ok(InputDocument {
            id: self.id,
            values,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::PipelineAnalyzer;
    use crate::analysis::tokenizer::RegexTokenizer;

    #[test]
    fn test_build_document() {
        let doc = InputDocument::builder("doc1")
            .add_text("body", "Hello World hello")
            .build()
            .unwrap();

        assert_eq!(doc.id(), "doc1");
        assert_eq!(doc.index().term_freq("body", "hello"), 2);
        assert_eq!(doc.index().field_length("body"), 3);
        assert_eq!(doc.field_value("body"), Some("Hello World hello"));
    }

    #[test]
    fn test_multi_valued_fields_are_separated() {
        let doc = InputDocument::builder("doc1")
            .add_text("body", "first value")
            .add_text("body", "second value")
            .build()
            .unwrap();

        let postings = doc.index().postings("body", "second").unwrap();
        assert!(postings[0].position >= POSITION_INCREMENT_GAP);
        assert_eq!(postings[0].start_offset, "first value ".len());
        assert_eq!(doc.field_values("body").len(), 2);
    }

    #[test]
    fn test_keyword_field_is_not_analyzed() {
        let doc = InputDocument::builder("doc1")
            .add_keyword("lang", "EN us")
            .build()
            .unwrap();

        assert_eq!(doc.index().term_freq("lang", "EN us"), 1);
        assert_eq!(doc.index().term_freq("lang", "en"), 0);
    }

    #[test]
    fn test_custom_analyzer() {
        let analyzer = Arc::new(PipelineAnalyzer::new(Arc::new(
            RegexTokenizer::with_gaps(r"\s+").unwrap(),
        )));
        let doc = InputDocument::builder("doc1")
            .add_text_with("tags", "Rust-lang c++", analyzer)
            .build()
            .unwrap();

        assert_eq!(doc.index().term_freq("tags", "Rust-lang"), 1);
        assert_eq!(doc.index().term_freq("tags", "c++"), 1);
    }

    #[test]
    fn test_empty_id_is_rejected() {
        assert!(InputDocument::builder("").build().is_err());
    }
}
