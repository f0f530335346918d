//! Weighted term expressions.

use std::collections::BTreeSet;
use std::fmt;

use crate::extraction::term::QueryTerm;
use crate::extraction::weight::TermWeightor;

/// A weighted boolean expression over extracted terms.
///
/// Nodes are normalised on construction: nested conjunctions and
/// disjunctions are flattened, a conjunction ignores `Any` children and a
/// disjunction with an `Any` child becomes `Any`.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryTree {
    /// A single selective term.
    Term { term: QueryTerm, weight: f32 },
    /// All children must hold.
    Conjunction { children: Vec<QueryTree>, weight: f32 },
    /// At least one child must hold.
    Disjunction { children: Vec<QueryTree>, weight: f32 },
    /// Not reducible to selective terms; every document selects it.
    Any(QueryTerm),
}

impl QueryTree {
    /// A leaf for `term`, or `Any` when the term is an `Any` term.
    pub fn term(term: QueryTerm, weightor: &TermWeightor) -> Self {
        if term.is_any() {
            return QueryTree::Any(term);
        }
        let weight = weightor.weigh(&term);
        QueryTree::Term { term, weight }
    }

    pub fn any<S: Into<String>>(field: S) -> Self {
        QueryTree::Any(QueryTerm::any(field))
    }

    /// The conjunction of `children`.
    ///
    /// `Any` children constrain nothing and are dropped; if nothing else is
    /// left, the result is the first `Any` child.
    pub fn conjunction(children: Vec<QueryTree>) -> Self {
        let mut flattened: Vec<QueryTree> = Vec::with_capacity(children.len());
        let mut first_any = None;
        for child in children {
            match child {
                QueryTree::Conjunction { children, .. } => {
                    for grandchild in children {
                        if !flattened.contains(&grandchild) {
                            flattened.push(grandchild);
                        }
                    }
                }
                QueryTree::Any(term) => {
                    first_any.get_or_insert(term);
                }
                other => {
                    if !flattened.contains(&other) {
                        flattened.push(other);
                    }
                }
            }
        }

        match flattened.len() {
            0 => QueryTree::Any(first_any.unwrap_or_else(|| QueryTerm::any(""))),
            1 => flattened.remove(0),
            _ => {
                let weight = flattened
                    .iter()
                    .map(|c| c.weight())
                    .fold(f32::INFINITY, f32::min);
                QueryTree::Conjunction {
                    children: flattened,
                    weight,
                }
            }
        }
    }

    /// The disjunction of `children`. Any `Any` child, or no children at
    /// all, makes the whole disjunction `Any`.
    pub fn disjunction(children: Vec<QueryTree>) -> Self {
        let mut flattened: Vec<QueryTree> = Vec::with_capacity(children.len());
        for child in children {
            match child {
                QueryTree::Disjunction { children, .. } => {
                    for grandchild in children {
                        if !flattened.contains(&grandchild) {
                            flattened.push(grandchild);
                        }
                    }
                }
                QueryTree::Any(term) => return QueryTree::Any(term),
                other => {
                    if !flattened.contains(&other) {
                        flattened.push(other);
                    }
                }
            }
        }

        match flattened.len() {
            0 => QueryTree::any(""),
            1 => flattened.remove(0),
            _ => {
                // Only as selective as the least selective branch.
                let weight = flattened.iter().map(|c| c.weight()).fold(0.0, f32::max);
                QueryTree::Disjunction {
                    children: flattened,
                    weight,
                }
            }
        }
    }

    /// Estimated cost of selecting on this tree. Lower is more selective.
    pub fn weight(&self) -> f32 {
        match self {
            QueryTree::Term { weight, .. }
            | QueryTree::Conjunction { weight, .. }
            | QueryTree::Disjunction { weight, .. } => *weight,
            QueryTree::Any(_) => f32::INFINITY,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, QueryTree::Any(_))
    }

    /// The terms to index a query under.
    ///
    /// A conjunction contributes the terms of its cheapest child only,
    /// since every matching document contains that child's terms. A
    /// disjunction contributes the terms of all of its children.
    pub fn terms(&self) -> BTreeSet<QueryTerm> {
        let mut terms = BTreeSet::new();
        self.collect_terms(&mut terms);
        terms
    }

    fn collect_terms(&self, terms: &mut BTreeSet<QueryTerm>) {
        match self {
            QueryTree::Term { term, .. } | QueryTree::Any(term) => {
                terms.insert(term.clone());
            }
            QueryTree::Conjunction { children, .. } => {
                let mut best: Option<&QueryTree> = None;
                for child in children {
                    if best.is_none_or(|b| child.weight() < b.weight()) {
                        best = Some(child);
                    }
                }
                if let Some(child) = best {
                    child.collect_terms(terms);
                }
            }
            QueryTree::Disjunction { children, .. } => {
                for child in children {
                    child.collect_terms(terms);
                }
            }
        }
    }
}

impl fmt::Display for QueryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |f: &mut fmt::Formatter<'_>, name: &str, children: &[QueryTree]| {
            write!(f, "{name}(")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{child}")?;
            }
            write!(f, ")")
        };
        match self {
            QueryTree::Term { term, .. } | QueryTree::Any(term) => write!(f, "{term}"),
            QueryTree::Conjunction { children, .. } => join(f, "AND", children),
            QueryTree::Disjunction { children, .. } => join(f, "OR", children),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(text: &str) -> QueryTree {
        QueryTree::term(QueryTerm::exact("f", text), &TermWeightor::new())
    }

    #[test]
    fn test_conjunction_picks_cheapest_child() {
        let tree = QueryTree::conjunction(vec![leaf("cat"), leaf("elephant")]);
        let terms: Vec<_> = tree.terms().into_iter().collect();
        assert_eq!(terms, vec![QueryTerm::exact("f", "elephant")]);
    }

    #[test]
    fn test_disjunction_keeps_all_children() {
        let tree = QueryTree::disjunction(vec![leaf("cat"), leaf("elephant")]);
        assert_eq!(tree.terms().len(), 2);
    }

    #[test]
    fn test_any_handling() {
        let tree = QueryTree::conjunction(vec![QueryTree::any("price"), leaf("cat")]);
        assert_eq!(tree, leaf("cat"));

        let tree = QueryTree::conjunction(vec![QueryTree::any("price"), QueryTree::any("date")]);
        assert_eq!(tree, QueryTree::any("price"));

        let tree = QueryTree::disjunction(vec![leaf("cat"), QueryTree::any("price")]);
        assert!(tree.is_any());
        assert!(QueryTree::disjunction(Vec::new()).is_any());
    }

    #[test]
    fn test_flattening_and_dedup() {
        let inner = QueryTree::conjunction(vec![leaf("a"), leaf("bb")]);
        let tree = QueryTree::conjunction(vec![inner, leaf("a"), leaf("ccc")]);
        match &tree {
            QueryTree::Conjunction { children, .. } => assert_eq!(children.len(), 3),
            other => panic!("unexpected tree {other}"),
        }
        assert_eq!(tree.to_string(), "AND(f:a, f:bb, f:ccc)");
    }

    #[test]
    fn test_nested_disjunction_in_conjunction() {
        let either = QueryTree::disjunction(vec![leaf("a"), leaf("b")]);
        let tree = QueryTree::conjunction(vec![either, leaf("elephant")]);
        let terms: Vec<_> = tree.terms().into_iter().collect();
        assert_eq!(terms, vec![QueryTerm::exact("f", "elephant")]);
    }
}
