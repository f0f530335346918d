//! Query-term extraction.
//!
//! Stored queries are reduced to a weighted boolean expression over
//! indexable terms, a [`QueryTree`]. The presearcher indexes each stored
//! query under the terms of its tree, and a document selects the query as a
//! candidate when it contains one of them.
//!
//! Extraction is conservative: a construct that cannot be reduced to
//! selective terms becomes [`QueryTree::Any`], which every document selects.
//!
//! # Examples
//!
//! ```
//! use sarissa_monitor::extraction::{QueryTerm, QueryTermExtractor};
//! use sarissa_monitor::query::{BooleanQuery, NumericRangeQuery, TermQuery};
//!
//! let extractor = QueryTermExtractor::new();
//! let query = BooleanQuery::new()
//!     .must(NumericRangeQuery::new("price", Some(0.0), Some(10.0)))
//!     .must(TermQuery::new("body", "term"));
//!
//! let terms = extractor.extract(&query).unwrap();
//! assert_eq!(terms.into_iter().collect::<Vec<_>>(), vec![QueryTerm::exact("body", "term")]);
//! ```

pub mod builder;
pub mod extractor;
pub mod term;
pub mod tree;
pub mod weight;

pub use builder::{QueryTreeBuilder, TypedQueryTreeBuilder, default_builders};
pub use extractor::QueryTermExtractor;
pub use term::{QueryTerm, TermType};
pub use tree::QueryTree;
pub use weight::TermWeightor;
