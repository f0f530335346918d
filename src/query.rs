//! Structured queries and their single-document evaluation.
//!
//! Stored queries arrive already parsed, as trees of [`Query`] trait objects.
//! Each query knows how to evaluate itself against the [`MemoryIndex`] of
//! one [`InputDocument`](crate::document::InputDocument). The same types are
//! used to express presearcher selection queries, which the query index
//! evaluates over its postings instead.
//!
//! [`MemoryIndex`]: crate::document::MemoryIndex

pub mod boolean;
pub mod interval;
pub mod match_all;
pub mod phrase;
#[allow(clippy::module_inception)]
pub mod query;
pub mod range;
pub mod regexp;
pub mod term;
pub mod wildcard;

pub use boolean::{BooleanClause, BooleanQuery, Occur};
pub use interval::{Interval, IntervalQuery, IntervalsSource};
pub use match_all::MatchAllQuery;
pub use phrase::PhraseQuery;
pub use query::Query;
pub use range::{Bound, NumericRangeQuery, RangeQuery};
pub use regexp::RegexpQuery;
pub use term::TermQuery;
pub use wildcard::{PrefixQuery, WildcardQuery};
