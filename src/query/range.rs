//! Range query implementations for querying within value ranges.

use std::fmt::{Debug, Display};

use crate::document::{MemoryIndex, TermHit};
use crate::error::Result;
use crate::query::query::Query;
use crate::query::wildcard::collect_term_hits;

/// Bound type for range queries.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound<T> {
    /// Inclusive bound.
    Included(T),
    /// Exclusive bound.
    Excluded(T),
    /// Unbounded (no limit).
    Unbounded,
}

impl<T: PartialOrd> Bound<T> {
    /// Check if a value satisfies this bound as a lower bound.
    pub fn contains_lower(&self, value: &T) -> bool {
        match self {
            Bound::Included(bound) => value >= bound,
            Bound::Excluded(bound) => value > bound,
            Bound::Unbounded => true,
        }
    }

    /// Check if a value satisfies this bound as an upper bound.
    pub fn contains_upper(&self, value: &T) -> bool {
        match self {
            Bound::Included(bound) => value <= bound,
            Bound::Excluded(bound) => value < bound,
            Bound::Unbounded => true,
        }
    }
}

fn describe_range<T: Display>(field: &str, lower: &Bound<T>, upper: &Bound<T>) -> String {
    let lower = match lower {
        Bound::Included(v) => format!("[{v}"),
        Bound::Excluded(v) => format!("{{{v}"),
        Bound::Unbounded => "[*".to_string(),
    };
    let upper = match upper {
        Bound::Included(v) => format!("{v}]"),
        Bound::Excluded(v) => format!("{v}}}"),
        Bound::Unbounded => "*]".to_string(),
    };
    format!("{field}:{lower} TO {upper}")
}

/// A query that matches terms that sort lexicographically within a range.
#[derive(Debug, Clone)]
pub struct RangeQuery {
    /// The field to search in.
    field: String,
    /// Lower bound of the range.
    lower_bound: Bound<String>,
    /// Upper bound of the range.
    upper_bound: Bound<String>,
    /// The boost factor for this query.
    boost: f32,
}

impl RangeQuery {
    /// Create a new range query with both bounds inclusive.
    pub fn new<S: Into<String>>(field: S, lower: Option<String>, upper: Option<String>) -> Self {
        let lower_bound = lower.map_or(Bound::Unbounded, Bound::Included);
        let upper_bound = upper.map_or(Bound::Unbounded, Bound::Included);
        Self::with_bounds(field, lower_bound, upper_bound)
    }

    /// Create a range query with custom bound types.
    pub fn with_bounds<S: Into<String>>(
        field: S,
        lower_bound: Bound<String>,
        upper_bound: Bound<String>,
    ) -> Self {
        RangeQuery {
            field: field.into(),
            lower_bound,
            upper_bound,
            boost: 1.0,
        }
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the lower bound.
    pub fn lower_bound(&self) -> &Bound<String> {
        &self.lower_bound
    }

    /// Get the upper bound.
    pub fn upper_bound(&self) -> &Bound<String> {
        &self.upper_bound
    }

    /// Check if a term falls within the range.
    pub fn contains(&self, term: &str) -> bool {
        let term = term.to_string();
        self.lower_bound.contains_lower(&term) && self.upper_bound.contains_upper(&term)
    }
}

impl Query for RangeQuery {
    fn matches(&self, index: &MemoryIndex) -> Result<bool> {
        Ok(!index
            .matching_terms(&self.field, |t| self.contains(t))
            .is_empty())
    }

    fn score(&self, index: &MemoryIndex) -> Result<f32> {
        Ok(if self.matches(index)? { self.boost } else { 0.0 })
    }

    fn hits(&self, index: &MemoryIndex, hits: &mut Vec<TermHit>) -> Result<()> {
        let terms = index.matching_terms(&self.field, |t| self.contains(t));
        collect_term_hits(index, &self.field, &terms, hits);
        Ok(())
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        describe_range(&self.field, &self.lower_bound, &self.upper_bound)
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

/// A query that matches terms which parse as numbers within a range.
///
/// Terms that are not numeric are ignored.
#[derive(Debug, Clone)]
pub struct NumericRangeQuery {
    field: String,
    lower_bound: Bound<f64>,
    upper_bound: Bound<f64>,
    boost: f32,
}

impl NumericRangeQuery {
    /// Create a numeric range with inclusive bounds.
    pub fn new<S: Into<String>>(field: S, lower: Option<f64>, upper: Option<f64>) -> Self {
        NumericRangeQuery {
            field: field.into(),
            lower_bound: lower.map_or(Bound::Unbounded, Bound::Included),
            upper_bound: upper.map_or(Bound::Unbounded, Bound::Included),
            boost: 1.0,
        }
    }

    /// Create a numeric range with custom bound types.
    pub fn with_bounds<S: Into<String>>(
        field: S,
        lower_bound: Bound<f64>,
        upper_bound: Bound<f64>,
    ) -> Self {
        NumericRangeQuery {
            field: field.into(),
            lower_bound,
            upper_bound,
            boost: 1.0,
        }
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Check if a term is a number within the range.
    pub fn contains(&self, term: &str) -> bool {
        match term.parse::<f64>() {
            Ok(value) if !value.is_nan() => {
                self.lower_bound.contains_lower(&value) && self.upper_bound.contains_upper(&value)
            }
            _ => false,
        }
    }
}

impl Query for NumericRangeQuery {
    fn matches(&self, index: &MemoryIndex) -> Result<bool> {
        Ok(!index
            .matching_terms(&self.field, |t| self.contains(t))
            .is_empty())
    }

    fn score(&self, index: &MemoryIndex) -> Result<f32> {
        Ok(if self.matches(index)? { self.boost } else { 0.0 })
    }

    fn hits(&self, index: &MemoryIndex, hits: &mut Vec<TermHit>) -> Result<()> {
        let terms = index.matching_terms(&self.field, |t| self.contains(t));
        collect_term_hits(index, &self.field, &terms, hits);
        Ok(())
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        describe_range(&self.field, &self.lower_bound, &self.upper_bound)
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
