//! Boolean query implementation for combining multiple queries.

use crate::document::{MemoryIndex, TermHit};
use crate::error::Result;
use crate::query::query::Query;

/// Occurrence requirements for boolean clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// The clause must match (equivalent to AND).
    Must,
    /// The clause should match (equivalent to OR).
    Should,
    /// The clause must not match (equivalent to NOT).
    MustNot,
}

/// A clause in a boolean query.
#[derive(Debug, Clone)]
pub struct BooleanClause {
    /// The query for this clause.
    pub query: Box<dyn Query>,
    /// The occurrence requirement.
    pub occur: Occur,
}

impl BooleanClause {
    /// Create a new boolean clause.
    pub fn new(query: Box<dyn Query>, occur: Occur) -> Self {
        BooleanClause { query, occur }
    }

    /// Create a MUST clause.
    pub fn must(query: Box<dyn Query>) -> Self {
        BooleanClause::new(query, Occur::Must)
    }

    /// Create a SHOULD clause.
    pub fn should(query: Box<dyn Query>) -> Self {
        BooleanClause::new(query, Occur::Should)
    }

    /// Create a MUST_NOT clause.
    pub fn must_not(query: Box<dyn Query>) -> Self {
        BooleanClause::new(query, Occur::MustNot)
    }
}

/// A boolean query that combines multiple queries with boolean logic.
///
/// A query with SHOULD clauses but no MUST clauses requires at least one
/// SHOULD clause to match, unless `minimum_should_match` asks for more.
/// A query made only of MUST_NOT clauses matches every document that none
/// of them match.
#[derive(Debug, Clone)]
pub struct BooleanQuery {
    /// The clauses in this boolean query.
    clauses: Vec<BooleanClause>,
    /// The boost factor for this query.
    boost: f32,
    /// Minimum number of should clauses that must match.
    minimum_should_match: usize,
}

impl BooleanQuery {
    /// Create a new empty boolean query.
    pub fn new() -> Self {
        BooleanQuery {
            clauses: Vec::new(),
            boost: 1.0,
            minimum_should_match: 0,
        }
    }

    /// Add a clause to this boolean query.
    pub fn add_clause(&mut self, clause: BooleanClause) {
        self.clauses.push(clause);
    }

    /// Add a MUST clause.
    pub fn add_must(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::must(query));
    }

    /// Add a SHOULD clause.
    pub fn add_should(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::should(query));
    }

    /// Add a MUST_NOT clause.
    pub fn add_must_not(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::must_not(query));
    }

    /// Builder-style MUST clause.
    pub fn must(mut self, query: impl Query + 'static) -> Self {
        self.add_must(Box::new(query));
        self
    }

    /// Builder-style SHOULD clause.
    pub fn should(mut self, query: impl Query + 'static) -> Self {
        self.add_should(Box::new(query));
        self
    }

    /// Builder-style MUST_NOT clause.
    pub fn must_not(mut self, query: impl Query + 'static) -> Self {
        self.add_must_not(Box::new(query));
        self
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Set the minimum number of should clauses that must match.
    pub fn with_minimum_should_match(mut self, minimum: usize) -> Self {
        self.minimum_should_match = minimum;
        self
    }

    /// Get the clauses.
    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    /// Get the minimum should match value.
    pub fn minimum_should_match(&self) -> usize {
        self.minimum_should_match
    }

    /// Check if this query is empty.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Get clauses by occurrence type.
    pub fn clauses_by_occur(&self, occur: Occur) -> impl Iterator<Item = &BooleanClause> {
        self.clauses.iter().filter(move |c| c.occur == occur)
    }

    fn has(&self, occur: Occur) -> bool {
        self.clauses.iter().any(|c| c.occur == occur)
    }

    /// Number of SHOULD clauses that have to match.
    pub fn required_should(&self) -> usize {
        if self.minimum_should_match > 0 {
            self.minimum_should_match
        } else if !self.has(Occur::Must) && self.has(Occur::Should) {
            1
        } else {
            0
        }
    }

    fn excluded(&self, index: &MemoryIndex) -> Result<bool> {
        for clause in self.clauses_by_occur(Occur::MustNot) {
            if clause.query.matches(index)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Default for BooleanQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl Query for BooleanQuery {
    fn matches(&self, index: &MemoryIndex) -> Result<bool> {
        if self.clauses.is_empty() {
            return Ok(false);
        }

        for clause in self.clauses_by_occur(Occur::Must) {
            if !clause.query.matches(index)? {
                return Ok(false);
            }
        }

        let required = self.required_should();
        if required > 0 {
            let mut matched = 0;
            for clause in self.clauses_by_occur(Occur::Should) {
                if clause.query.matches(index)? {
                    matched += 1;
                    if matched >= required {
                        break;
                    }
                }
            }
            if matched < required {
                return Ok(false);
            }
        }

        Ok(!self.excluded(index)?)
    }

    fn score(&self, index: &MemoryIndex) -> Result<f32> {
        if self.clauses.is_empty() || self.excluded(index)? {
            return Ok(0.0);
        }

        let mut total = 0.0;
        for clause in self.clauses_by_occur(Occur::Must) {
            let score = clause.query.score(index)?;
            if score <= 0.0 {
                return Ok(0.0);
            }
            total += score;
        }

        let mut matched = 0;
        for clause in self.clauses_by_occur(Occur::Should) {
            let score = clause.query.score(index)?;
            if score > 0.0 {
                matched += 1;
                total += score;
            }
        }
        if matched < self.required_should() {
            return Ok(0.0);
        }

        if total == 0.0 {
            // Only MUST_NOT clauses: constant score for the survivors.
            total = 1.0;
        }
        Ok(total * self.boost)
    }

    fn hits(&self, index: &MemoryIndex, hits: &mut Vec<TermHit>) -> Result<()> {
        for clause in &self.clauses {
            match clause.occur {
                Occur::Must => clause.query.hits(index, hits)?,
                Occur::Should => {
                    if clause.query.matches(index)? {
                        clause.query.hits(index, hits)?;
                    }
                }
                Occur::MustNot => {}
            }
        }
        Ok(())
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        let parts: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| {
                let prefix = match clause.occur {
                    Occur::Must => "+",
                    Occur::Should => "",
                    Occur::MustNot => "-",
                };
                format!("{}{}", prefix, clause.query.description())
            })
            .collect();

        let mut description = format!("({})", parts.join(" "));
        if self.minimum_should_match > 0 {
            description.push_str(&format!("~{}", self.minimum_should_match));
        }
        if self.boost != 1.0 {
            description.push_str(&format!("^{}", self.boost));
        }
        description
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
