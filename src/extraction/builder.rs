//! Per-query-type tree builders.

use std::fmt::Debug;
use std::sync::Arc;

use log::debug;
use regex_syntax::Parser;
use regex_syntax::hir::{Hir, HirKind};

use crate::error::{MonitorError, Result};
use crate::extraction::extractor::QueryTermExtractor;
use crate::extraction::term::QueryTerm;
use crate::extraction::tree::QueryTree;
use crate::query::{
    BooleanQuery, MatchAllQuery, NumericRangeQuery, Occur, PhraseQuery, PrefixQuery, Query,
    RangeQuery, RegexpQuery, TermQuery, WildcardQuery,
};

/// Converts one kind of query node into a [`QueryTree`] fragment.
///
/// Builders recurse into child queries through the extractor they are
/// given, so children are handled by whichever builder accepts them.
pub trait QueryTreeBuilder: Send + Sync + Debug {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Whether this builder handles `query`.
    fn accepts(&self, query: &dyn Query) -> bool;

    /// Build the tree fragment for `query`.
    fn build(&self, query: &dyn Query, extractor: &QueryTermExtractor) -> Result<QueryTree>;
}

/// A builder for one concrete query type, dispatched by downcasting.
#[derive(Debug)]
pub struct TypedQueryTreeBuilder<Q: Query + 'static> {
    name: &'static str,
    build: fn(&Q, &QueryTermExtractor) -> Result<QueryTree>,
}

impl<Q: Query + 'static> TypedQueryTreeBuilder<Q> {
    pub fn new(name: &'static str, build: fn(&Q, &QueryTermExtractor) -> Result<QueryTree>) -> Self {
        TypedQueryTreeBuilder { name, build }
    }
}

impl<Q: Query + 'static> QueryTreeBuilder for TypedQueryTreeBuilder<Q> {
    fn name(&self) -> &str {
        self.name
    }

    fn accepts(&self, query: &dyn Query) -> bool {
        query.as_any().is::<Q>()
    }

    fn build(&self, query: &dyn Query, extractor: &QueryTermExtractor) -> Result<QueryTree> {
        let query = query.as_any().downcast_ref::<Q>().ok_or_else(|| {
            MonitorError::presearcher(format!(
                "{} cannot build a tree for {}",
                self.name,
                query.description()
            ))
        })?;
        (self.build)(query, extractor)
    }
}

/// The builders every extractor starts with.
pub fn default_builders() -> Vec<Arc<dyn QueryTreeBuilder>> {
    vec![
        Arc::new(TypedQueryTreeBuilder::<TermQuery>::new("term", build_term)),
        Arc::new(TypedQueryTreeBuilder::<BooleanQuery>::new(
            "boolean",
            build_boolean,
        )),
        Arc::new(TypedQueryTreeBuilder::<PhraseQuery>::new("phrase", build_phrase)),
        Arc::new(TypedQueryTreeBuilder::<WildcardQuery>::new(
            "wildcard",
            build_wildcard,
        )),
        Arc::new(TypedQueryTreeBuilder::<PrefixQuery>::new("prefix", build_prefix)),
        Arc::new(TypedQueryTreeBuilder::<RegexpQuery>::new("regexp", build_regexp)),
        Arc::new(TypedQueryTreeBuilder::<RangeQuery>::new("range", |q, _| {
            Ok(QueryTree::any(q.field()))
        })),
        Arc::new(TypedQueryTreeBuilder::<NumericRangeQuery>::new(
            "numeric_range",
            |q, _| Ok(QueryTree::any(q.field())),
        )),
        Arc::new(TypedQueryTreeBuilder::<MatchAllQuery>::new(
            "match_all",
            |_, _| Ok(QueryTree::any("")),
        )),
    ]
}

fn build_term(query: &TermQuery, extractor: &QueryTermExtractor) -> Result<QueryTree> {
    Ok(QueryTree::term(
        QueryTerm::exact(query.field(), query.term()),
        extractor.weightor(),
    ))
}

fn build_boolean(query: &BooleanQuery, extractor: &QueryTermExtractor) -> Result<QueryTree> {
    let mut musts = Vec::new();
    let mut shoulds = Vec::new();
    for clause in query.clauses() {
        match clause.occur {
            Occur::Must => musts.push(extractor.build_tree(clause.query.as_ref())?),
            Occur::Should => shoulds.push(extractor.build_tree(clause.query.as_ref())?),
            // Negations never make a document more likely to match.
            Occur::MustNot => {}
        }
    }

    if !musts.is_empty() {
        if query.minimum_should_match() > 0 && !shoulds.is_empty() {
            musts.push(QueryTree::disjunction(shoulds));
        }
        return Ok(QueryTree::conjunction(musts));
    }
    if !shoulds.is_empty() {
        return Ok(QueryTree::disjunction(shoulds));
    }
    Ok(QueryTree::any(""))
}

fn build_phrase(query: &PhraseQuery, extractor: &QueryTermExtractor) -> Result<QueryTree> {
    if query.terms().is_empty() {
        return Ok(QueryTree::any(query.field()));
    }
    Ok(QueryTree::conjunction(
        query
            .terms()
            .iter()
            .map(|t| QueryTree::term(QueryTerm::exact(query.field(), t.as_str()), extractor.weightor()))
            .collect(),
    ))
}

/// A wildcard term for `literal`, or `Any` when there is nothing to select on.
pub(crate) fn ngram_tree(field: &str, literal: &str, extractor: &QueryTermExtractor) -> QueryTree {
    if literal.is_empty() {
        QueryTree::any(field)
    } else {
        QueryTree::term(QueryTerm::wildcard(field, literal), extractor.weightor())
    }
}

fn build_wildcard(query: &WildcardQuery, extractor: &QueryTermExtractor) -> Result<QueryTree> {
    Ok(ngram_tree(
        query.field(),
        &longest_wildcard_literal(query.pattern()),
        extractor,
    ))
}

fn build_prefix(query: &PrefixQuery, extractor: &QueryTermExtractor) -> Result<QueryTree> {
    Ok(ngram_tree(query.field(), query.prefix(), extractor))
}

fn build_regexp(query: &RegexpQuery, extractor: &QueryTermExtractor) -> Result<QueryTree> {
    match longest_regexp_literal(query.pattern()) {
        Some(literal) => Ok(ngram_tree(query.field(), &literal, extractor)),
        None => Ok(QueryTree::any(query.field())),
    }
}

fn keep_longest(run: &mut String, best: &mut String) {
    if run.chars().count() > best.chars().count() {
        *best = run.clone();
    }
    run.clear();
}

/// Longest run of literal characters in a wildcard pattern.
pub fn longest_wildcard_literal(pattern: &str) -> String {
    let mut best = String::new();
    let mut run = String::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    run.push(escaped);
                }
            }
            '*' | '?' => keep_longest(&mut run, &mut best),
            c => run.push(c),
        }
    }
    keep_longest(&mut run, &mut best);
    best
}

/// Text a regex node is guaranteed to match.
struct RequiredText {
    /// The node only ever matches exactly this text.
    exact: Option<String>,
    /// Longest text contained in every match of the node.
    longest: String,
}

impl RequiredText {
    fn exact(text: String) -> Self {
        RequiredText {
            exact: Some(text.clone()),
            longest: text,
        }
    }

    fn nothing() -> Self {
        RequiredText {
            exact: None,
            longest: String::new(),
        }
    }
}

fn required_text(hir: &Hir) -> RequiredText {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => RequiredText::exact(String::new()),
        HirKind::Literal(literal) => match std::str::from_utf8(&literal.0) {
            Ok(text) => RequiredText::exact(text.to_string()),
            Err(_) => RequiredText::nothing(),
        },
        // Case-insensitive letters are parsed into classes and end up here.
        HirKind::Class(_) | HirKind::Alternation(_) => RequiredText::nothing(),
        HirKind::Capture(capture) => required_text(&capture.sub),
        HirKind::Repetition(repetition) if repetition.min == 0 => RequiredText::nothing(),
        HirKind::Repetition(repetition) => {
            let sub = required_text(&repetition.sub);
            if repetition.max == Some(1) {
                sub
            } else {
                RequiredText {
                    exact: None,
                    longest: sub.longest,
                }
            }
        }
        HirKind::Concat(children) => {
            let mut all_exact = true;
            let mut best = String::new();
            let mut run = String::new();
            for child in children {
                let mut child = required_text(child);
                match child.exact {
                    Some(text) => run.push_str(&text),
                    None => {
                        all_exact = false;
                        keep_longest(&mut run, &mut best);
                        keep_longest(&mut child.longest, &mut best);
                    }
                }
            }
            let exact = all_exact.then(|| run.clone());
            keep_longest(&mut run, &mut best);
            RequiredText {
                exact,
                longest: best,
            }
        }
    }
}

/// Longest text every term matching `pattern` must contain.
///
/// The pattern is parsed with the same syntax `regex` compiles, so escapes,
/// classes and inline flags are understood. An empty string means no text
/// is required; `None` means the pattern could not be parsed.
pub fn longest_regexp_literal(pattern: &str) -> Option<String> {
    match Parser::new().parse(pattern) {
        Ok(hir) => Some(required_text(&hir).longest),
        Err(e) => {
            debug!("cannot extract a literal from regexp {pattern:?}: {e}");
            None
        }
    }
}
