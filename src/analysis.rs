//! Text analysis for monitored documents.
//!
//! Documents are analyzed field by field into token streams before they are
//! indexed into a [`MemoryIndex`](crate::document::MemoryIndex) and before
//! their terms are turned into a presearcher selection query.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{Analyzer, PipelineAnalyzer, StandardAnalyzer};
pub use token::{IntoTokenStream, Token, TokenStream};
pub use token_filter::{DuplicateRemovalFilter, Filter, LowercaseFilter};
pub use tokenizer::{RegexTokenizer, Tokenizer};
