//! Term selectivity estimates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::extraction::term::{QueryTerm, TermType};

/// Estimates the cost of selecting on a term. Lower is more selective.
///
/// Longer terms are assumed rarer. Per-field and per-term multipliers let
/// callers penalise known-common terms (e.g. stop words) so that
/// conjunctions pick a different child.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TermWeightor {
    /// Cost multiplier per field name.
    #[serde(default)]
    pub field_weights: HashMap<String, f32>,
    /// Cost multiplier per term text.
    #[serde(default)]
    pub term_weights: HashMap<String, f32>,
    /// Cost multiplier applied to wildcard terms.
    pub wildcard_penalty: f32,
}

impl Default for TermWeightor {
    fn default() -> Self {
        TermWeightor {
            field_weights: HashMap::new(),
            term_weights: HashMap::new(),
            wildcard_penalty: 2.0,
        }
    }
}

impl TermWeightor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_weight<S: Into<String>>(mut self, field: S, weight: f32) -> Self {
        self.field_weights.insert(field.into(), weight);
        self
    }

    pub fn with_term_weight<S: Into<String>>(mut self, term: S, weight: f32) -> Self {
        self.term_weights.insert(term.into(), weight);
        self
    }

    pub fn with_wildcard_penalty(mut self, penalty: f32) -> Self {
        self.wildcard_penalty = penalty;
        self
    }

    /// Cost of a term.
    pub fn weigh(&self, term: &QueryTerm) -> f32 {
        if term.term_type == TermType::Any {
            return f32::INFINITY;
        }

        let length = term.text.chars().count() as f32;
        let mut cost = 1.0 / (length + 1.0).ln();
        cost *= self.field_weights.get(&term.field).copied().unwrap_or(1.0);
        cost *= self.term_weights.get(&term.text).copied().unwrap_or(1.0);
        if term.term_type == TermType::Wildcard {
            cost *= self.wildcard_penalty;
        }
        cost
    }
}
