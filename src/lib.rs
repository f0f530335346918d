//! # Sarissa Monitor
//!
//! Reverse search for Rust: register a large set of queries once, then find
//! which of them match each incoming document.
//!
//! ## Features
//!
//! - Query-term extraction into weighted term trees
//! - Presearcher that narrows stored queries to a small candidate set
//! - Boolean, scoring and highlighting verification strategies
//! - Queue-based and partition-based parallel matching
//! - Per-query error isolation and slow query logging

pub mod analysis;
pub mod document;
pub mod error;
pub mod extraction;
pub mod matcher;
pub mod monitor;
pub mod presearcher;
pub mod query;

pub mod prelude {
    pub use crate::document::InputDocument;
    pub use crate::error::{MonitorError, Result};
    pub use crate::matcher::{
        CandidateMatcher, HighlightingMatcher, MatcherFactory, Matches, ParallelMatcher,
        ParallelMatcherConfig, PartitionMatcher, PartitionMatcherConfig, ScoringMatcher,
        SimpleMatcher,
    };
    pub use crate::monitor::{Monitor, MonitorConfig, MonitorQuery};
    pub use crate::presearcher::{
        FieldFilterPresearcherComponent, IntervalsPresearcherComponent, TermFilteredPresearcher,
    };
    pub use crate::query::Query;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
