//! Integration tests for query-term extraction and candidate selection.

use std::collections::BTreeSet;
use std::sync::Arc;

use sarissa_monitor::analysis::Token;
use sarissa_monitor::analysis::token_filter::DuplicateRemovalStream;
use sarissa_monitor::document::InputDocument;
use sarissa_monitor::error::Result;
use sarissa_monitor::extraction::{QueryTerm, QueryTermExtractor, QueryTree, TermWeightor};
use sarissa_monitor::matcher::SimpleMatcher;
use sarissa_monitor::monitor::{Monitor, MonitorQuery};
use sarissa_monitor::presearcher::{
    FieldFilterPresearcherComponent, IntervalsPresearcherComponent, Presearcher,
    TermFilteredPresearcher,
};
use sarissa_monitor::query::*;

fn doc(id: &str, text: &str) -> Result<InputDocument> {
    InputDocument::builder(id).add_text("body", text).build()
}

fn stored_queries() -> Result<Vec<MonitorQuery>> {
    Ok(vec![
        MonitorQuery::new("term", TermQuery::new("body", "fox")),
        MonitorQuery::new(
            "and",
            BooleanQuery::new()
                .must(TermQuery::new("body", "quick"))
                .must(TermQuery::new("body", "fox")),
        ),
        MonitorQuery::new(
            "or",
            BooleanQuery::new()
                .should(TermQuery::new("body", "cat"))
                .should(TermQuery::new("body", "dog")),
        ),
        MonitorQuery::new(
            "not",
            BooleanQuery::new()
                .must(TermQuery::new("body", "brown"))
                .must_not(TermQuery::new("body", "cat")),
        ),
        MonitorQuery::new("phrase", PhraseQuery::from_phrase("body", "lazy dog")),
        MonitorQuery::new("wildcard", WildcardQuery::new("body", "*ump*")?),
        MonitorQuery::new("prefix", PrefixQuery::new("body", "qui")),
        MonitorQuery::new("regexp", RegexpQuery::new("body", "br.wn")?),
        MonitorQuery::new("range", RangeQuery::new("body", Some("a".into()), Some("b".into()))),
        MonitorQuery::new("all", MatchAllQuery::new()),
        MonitorQuery::new(
            "negated_only",
            BooleanQuery::new().must_not(TermQuery::new("body", "zebra")),
        ),
        MonitorQuery::new(
            "sloppy_phrase",
            PhraseQuery::from_phrase("body", "quick fox").with_slop(1),
        ),
        MonitorQuery::new("hex_escape", RegexpQuery::new("body", "\\x61pple")?),
        MonitorQuery::new("inline_flags", RegexpQuery::new("body", "(?si)APPLE")?),
        MonitorQuery::new("unicode_class", RegexpQuery::new("body", "\\pLpple")?),
        MonitorQuery::new("negated_class", RegexpQuery::new("body", "[^]]pple")?),
        MonitorQuery::new("case_insensitive", RegexpQuery::new("body", "(?i)QUICK.*")?),
        MonitorQuery::new(
            "ordered",
            IntervalQuery::new(
                "body",
                IntervalsSource::ordered(vec![
                    IntervalsSource::term("brown"),
                    IntervalsSource::term("jumps"),
                ])
                .with_max_gaps(1),
            ),
        ),
        MonitorQuery::new(
            "unordered",
            IntervalQuery::new(
                "body",
                IntervalsSource::unordered(vec![
                    IntervalsSource::term("dog"),
                    IntervalsSource::term("cat"),
                ]),
            ),
        ),
        MonitorQuery::new(
            "non_overlapping",
            IntervalQuery::new(
                "body",
                IntervalsSource::non_overlapping(
                    IntervalsSource::term("dog"),
                    IntervalsSource::ordered(vec![
                        IntervalsSource::term("lazy"),
                        IntervalsSource::term("dog"),
                    ]),
                ),
            ),
        ),
        MonitorQuery::new(
            "interval_or",
            IntervalQuery::new(
                "body",
                IntervalsSource::or(vec![
                    IntervalsSource::term("apple"),
                    IntervalsSource::term("cats"),
                ]),
            ),
        ),
        MonitorQuery::new("english_fox", TermQuery::new("body", "fox"))
            .with_metadata("language", "en"),
        MonitorQuery::new("german_dog", TermQuery::new("body", "dog"))
            .with_metadata("language", "de"),
    ])
}

/// Whether the field filter lets `query` through for a document in
/// `languages`.
fn language_agrees(query: &MonitorQuery, languages: Option<&str>) -> bool {
    match languages {
        None => true,
        Some(languages) => query
            .metadata()
            .get("language")
            .is_some_and(|l| languages.split(' ').any(|d| d == l)),
    }
}

#[test]
fn test_every_matching_query_is_selected() -> Result<()> {
    let presearcher = TermFilteredPresearcher::new()
        .with_component(IntervalsPresearcherComponent::new())
        .with_component(FieldFilterPresearcherComponent::new("language"));
    let monitor = Monitor::new(presearcher);
    let queries = stored_queries()?;
    monitor.register_all(queries.clone())?;

    let documents = [
        ("The quick brown fox jumps over the lazy dog", None),
        ("a cat and a dog", None),
        ("an apple a day", None),
        ("apple xyz", None),
        ("nothing relevant here", None),
        ("quickly brown cats", None),
        ("the dog chased a cat", Some("de")),
        ("The quick brown fox jumps over the lazy dog", Some("en fr")),
    ];

    for (i, (text, languages)) in documents.iter().enumerate() {
        let mut builder = InputDocument::builder(format!("doc{i}")).add_text("body", *text);
        if let Some(languages) = languages {
            builder = builder.add_keyword("language", *languages);
        }
        let document = builder.build()?;

        let selected: BTreeSet<String> = monitor
            .debug_document(&document)?
            .into_iter()
            .map(|m| m.query_id)
            .collect();

        for query in &queries {
            if query.match_query().matches(document.index())?
                && language_agrees(query, *languages)
            {
                assert!(
                    selected.contains(query.id()),
                    "{} matches {:?} but was not selected",
                    query.id(),
                    text
                );
            }
        }
    }

    Ok(())
}

#[test]
fn test_match_document_agrees_with_direct_evaluation() -> Result<()> {
    let monitor = Monitor::new(TermFilteredPresearcher::new());
    let queries = stored_queries()?;
    monitor.register_all(queries.clone())?;

    let document = Arc::new(doc(
        "fox",
        "The quick brown fox jumps over the lazy dog",
    )?);
    let matches = monitor.match_document(Arc::clone(&document), &SimpleMatcher::new)?;

    let mut expected = Vec::new();
    for query in &queries {
        if query.match_query().matches(document.index())? {
            expected.push(query.id());
        }
    }
    expected.sort();

    assert_eq!(matches.query_ids(), expected);
    assert!(matches.errors().is_empty());

    Ok(())
}

#[test]
fn test_presearcher_filters_unrelated_queries() -> Result<()> {
    let monitor = Monitor::new(TermFilteredPresearcher::new());
    for i in 0..100 {
        monitor.register(MonitorQuery::new(
            format!("q{i}"),
            TermQuery::new("body", format!("word{i}")),
        ))?;
    }

    let matches = monitor.match_document(
        Arc::new(doc("d", "word7 and word42")?),
        &SimpleMatcher::new,
    )?;

    assert_eq!(matches.queries_run(), 2);
    assert_eq!(matches.query_ids(), vec!["q42", "q7"]);

    Ok(())
}

#[test]
fn test_conjunction_is_indexed_under_most_selective_term() -> Result<()> {
    let presearcher = TermFilteredPresearcher::new();
    let query = BooleanQuery::new()
        .must(TermQuery::new("body", "a"))
        .must(TermQuery::new("body", "elephant"));

    let terms = presearcher.build_indexable_terms(&query)?;
    assert_eq!(
        terms.into_iter().collect::<Vec<_>>(),
        vec![QueryTerm::exact("body", "elephant")]
    );

    Ok(())
}

#[test]
fn test_field_weights_steer_term_selection() -> Result<()> {
    let query = BooleanQuery::new()
        .must(TermQuery::new("title", "database"))
        .must(TermQuery::new("body", "db"));

    let extractor = QueryTermExtractor::new();
    assert_eq!(
        extractor.extract(&query)?.into_iter().collect::<Vec<_>>(),
        vec![QueryTerm::exact("title", "database")]
    );

    let weighted = QueryTermExtractor::new()
        .with_weightor(TermWeightor::new().with_field_weight("title", 10.0));
    assert_eq!(
        weighted.extract(&query)?.into_iter().collect::<Vec<_>>(),
        vec![QueryTerm::exact("body", "db")]
    );

    Ok(())
}

#[test]
fn test_any_fallback_selects_every_document() -> Result<()> {
    let monitor = Monitor::new(TermFilteredPresearcher::new());
    monitor.register(MonitorQuery::new(
        "price",
        NumericRangeQuery::new("price", Some(10.0), Some(20.0)),
    ))?;

    assert_eq!(
        monitor.indexed_terms("price"),
        Some(BTreeSet::from([QueryTerm::any("price")]))
    );

    let cheap = InputDocument::builder("cheap")
        .add_keyword("price", "15")
        .build()?;
    let matches = monitor.match_document(Arc::new(cheap), &SimpleMatcher::new)?;
    assert_eq!(matches.queries_run(), 1);
    assert_eq!(matches.query_ids(), vec!["price"]);

    let unrelated = doc("unrelated", "no price at all")?;
    let matches = monitor.match_document(Arc::new(unrelated), &SimpleMatcher::new)?;
    assert_eq!(matches.queries_run(), 1);
    assert_eq!(matches.match_count(), 0);

    Ok(())
}

#[test]
fn test_regexp_escapes_select_matching_documents() -> Result<()> {
    let monitor = Monitor::new(TermFilteredPresearcher::new());
    for (id, pattern) in [
        ("hex_escape", "\\x61pple"),
        ("inline_flags", "(?si)APPLE"),
        ("unicode_class", "\\pLpple"),
        ("negated_class", "[^]]pple"),
    ] {
        monitor.register(MonitorQuery::new(id, RegexpQuery::new("body", pattern)?))?;
    }

    assert_eq!(
        monitor.indexed_terms("hex_escape"),
        Some(BTreeSet::from([QueryTerm::wildcard("body", "apple")]))
    );
    assert_eq!(
        monitor.indexed_terms("inline_flags"),
        Some(BTreeSet::from([QueryTerm::any("body")]))
    );

    let matches = monitor.match_document(Arc::new(doc("d", "apple xyz")?), &SimpleMatcher::new)?;
    assert_eq!(
        matches.query_ids(),
        vec!["hex_escape", "inline_flags", "negated_class", "unicode_class"]
    );

    Ok(())
}

#[test]
fn test_query_tree_rendering() -> Result<()> {
    let extractor = QueryTermExtractor::new();
    let query = BooleanQuery::new()
        .should(TermQuery::new("f", "a"))
        .should(
            BooleanQuery::new()
                .must(TermQuery::new("f", "b"))
                .must(TermQuery::new("f", "c")),
        );

    let tree = extractor.build_tree(&query)?;
    assert!(matches!(tree, QueryTree::Disjunction { .. }));
    assert_eq!(tree.to_string(), "OR(f:a, AND(f:b, f:c))");

    Ok(())
}

#[test]
fn test_duplicate_removal_stream_reset() {
    let tokens = |words: &[&str]| -> Vec<Token> {
        words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(*w, i))
            .collect()
    };

    let mut stream = DuplicateRemovalStream::new(tokens(&["a", "b", "a", "c", "b"]).into_iter());
    let first: Vec<String> = stream.by_ref().map(|t| t.text).collect();
    assert_eq!(first, vec!["a", "b", "c"]);
    assert_eq!(stream.seen_count(), 3);

    stream.reset(tokens(&["b", "d", "b"]).into_iter());
    assert_eq!(stream.seen_count(), 0);
    let second: Vec<String> = stream.map(|t| t.text).collect();
    assert_eq!(second, vec!["b", "d"]);
}
