//! Interval queries: positional constraints between terms of one field.
//!
//! An [`IntervalsSource`] describes a set of position intervals over the
//! tokens of a field. Sources compose: term occurrences are the leaves,
//! and ordered, unordered, disjunctive and non-overlapping combinators
//! build larger intervals out of them.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::document::{MemoryIndex, TermHit};
use crate::error::Result;
use crate::query::query::Query;

/// A closed range of token positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    /// First position.
    pub start: usize,
    /// Last position (inclusive).
    pub end: usize,
}

impl Interval {
    /// Create a new interval.
    pub fn new(start: usize, end: usize) -> Self {
        Interval { start, end }
    }

    /// Number of positions covered.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Intervals always cover at least one position.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check if two intervals share a position.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Check if this interval fully contains another.
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A composable source of intervals.
#[derive(Clone, Debug, PartialEq)]
pub enum IntervalsSource {
    /// Every occurrence of a term.
    Term(String),
    /// All sources occur in order without overlapping.
    Ordered {
        sources: Vec<IntervalsSource>,
        max_gaps: Option<usize>,
    },
    /// All sources occur in any order. Their intervals may overlap.
    Unordered {
        sources: Vec<IntervalsSource>,
        max_gaps: Option<usize>,
    },
    /// Any of the sources.
    Or(Vec<IntervalsSource>),
    /// Intervals of `minuend` that overlap no interval of `subtrahend`.
    NonOverlapping {
        minuend: Box<IntervalsSource>,
        subtrahend: Box<IntervalsSource>,
    },
}

impl IntervalsSource {
    pub fn term<S: Into<String>>(term: S) -> Self {
        IntervalsSource::Term(term.into())
    }

    pub fn ordered(sources: Vec<IntervalsSource>) -> Self {
        IntervalsSource::Ordered {
            sources,
            max_gaps: None,
        }
    }

    pub fn unordered(sources: Vec<IntervalsSource>) -> Self {
        IntervalsSource::Unordered {
            sources,
            max_gaps: None,
        }
    }

    pub fn or(sources: Vec<IntervalsSource>) -> Self {
        IntervalsSource::Or(sources)
    }

    pub fn non_overlapping(minuend: IntervalsSource, subtrahend: IntervalsSource) -> Self {
        IntervalsSource::NonOverlapping {
            minuend: Box::new(minuend),
            subtrahend: Box::new(subtrahend),
        }
    }

    /// Limit the number of unmatched positions inside an ordered or
    /// unordered interval. Has no effect on other sources.
    pub fn with_max_gaps(mut self, gaps: usize) -> Self {
        match &mut self {
            IntervalsSource::Ordered { max_gaps, .. }
            | IntervalsSource::Unordered { max_gaps, .. } => *max_gaps = Some(gaps),
            _ => {}
        }
        self
    }

    /// Intervals of this source in a field, sorted and deduplicated.
    pub fn intervals(&self, index: &MemoryIndex, field: &str) -> Vec<Interval> {
        let mut intervals = match self {
            IntervalsSource::Term(term) => index
                .postings(field, term)
                .map(|postings| {
                    postings
                        .iter()
                        .map(|p| Interval::new(p.position, p.position))
                        .collect()
                })
                .unwrap_or_default(),
            IntervalsSource::Ordered { sources, max_gaps } => {
                let lists = Self::collect(sources, index, field);
                ordered_intervals(&lists, *max_gaps)
            }
            IntervalsSource::Unordered { sources, max_gaps } => {
                let lists = Self::collect(sources, index, field);
                unordered_intervals(&lists, *max_gaps)
            }
            IntervalsSource::Or(sources) => sources
                .iter()
                .flat_map(|s| s.intervals(index, field))
                .collect(),
            IntervalsSource::NonOverlapping {
                minuend,
                subtrahend,
            } => {
                let excluded = subtrahend.intervals(index, field);
                minuend
                    .intervals(index, field)
                    .into_iter()
                    .filter(|i| !excluded.iter().any(|e| e.overlaps(i)))
                    .collect()
            }
        };
        intervals.sort();
        intervals.dedup();
        intervals
    }

    fn collect(sources: &[IntervalsSource], index: &MemoryIndex, field: &str) -> Vec<Vec<Interval>> {
        sources.iter().map(|s| s.intervals(index, field)).collect()
    }

    fn describe(&self) -> String {
        let join = |sources: &[IntervalsSource]| {
            sources
                .iter()
                .map(|s| s.describe())
                .collect::<Vec<_>>()
                .join(",")
        };
        let gaps = |max_gaps: &Option<usize>| match max_gaps {
            Some(g) => format!("~{g}"),
            None => String::new(),
        };
        match self {
            IntervalsSource::Term(term) => term.clone(),
            IntervalsSource::Ordered { sources, max_gaps } => {
                format!("ORDERED({}){}", join(sources), gaps(max_gaps))
            }
            IntervalsSource::Unordered { sources, max_gaps } => {
                format!("UNORDERED({}){}", join(sources), gaps(max_gaps))
            }
            IntervalsSource::Or(sources) => format!("OR({})", join(sources)),
            IntervalsSource::NonOverlapping {
                minuend,
                subtrahend,
            } => format!(
                "NON_OVERLAPPING({},{})",
                minuend.describe(),
                subtrahend.describe()
            ),
        }
    }
}

fn gaps_within(span: Interval, parts: &[Interval], max_gaps: Option<usize>) -> bool {
    let covered: usize = parts.iter().map(|i| i.len()).sum();
    match max_gaps {
        Some(max) => span.len().saturating_sub(covered) <= max,
        None => true,
    }
}

fn ordered_intervals(lists: &[Vec<Interval>], max_gaps: Option<usize>) -> Vec<Interval> {
    let Some((first, rest)) = lists.split_first() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    'starts: for start in first {
        let mut parts = vec![*start];
        let mut last = *start;
        for list in rest {
            // Earliest end leaves the most room for the parts that follow.
            match list
                .iter()
                .filter(|i| i.start > last.end)
                .min_by_key(|i| i.end)
            {
                Some(next) => {
                    parts.push(*next);
                    last = *next;
                }
                None => continue 'starts,
            }
        }
        let span = Interval::new(start.start, last.end);
        if gaps_within(span, &parts, max_gaps) {
            out.push(span);
        }
    }
    out
}

/// Minimal intervals covering one interval of every list.
///
/// Keeps the current interval of each list in a heap ordered by start. The
/// earliest one bounds a candidate span together with the latest end, then
/// its list advances; the sweep stops once any list is exhausted.
fn unordered_intervals(lists: &[Vec<Interval>], max_gaps: Option<usize>) -> Vec<Interval> {
    let mut heap = BinaryHeap::with_capacity(lists.len());
    let mut heads = Vec::with_capacity(lists.len());
    for (i, list) in lists.iter().enumerate() {
        let Some(first) = list.first() else {
            return Vec::new();
        };
        heap.push(Reverse((*first, i)));
        heads.push(*first);
    }
    let mut cursors = vec![0; lists.len()];

    let mut out = Vec::new();
    while let Some(Reverse((earliest, i))) = heap.pop() {
        let end = heads.iter().map(|h| h.end).max().unwrap_or(earliest.end);
        let span = Interval::new(earliest.start, end);
        if gaps_within(span, &heads, max_gaps) {
            out.push(span);
        }

        cursors[i] += 1;
        match lists[i].get(cursors[i]) {
            Some(next) => {
                heads[i] = *next;
                heap.push(Reverse((*next, i)));
            }
            None => break,
        }
    }
    out
}

/// A query that matches when an [`IntervalsSource`] produces at least one
/// interval in a field.
#[derive(Debug, Clone)]
pub struct IntervalQuery {
    field: String,
    source: IntervalsSource,
    boost: f32,
}

impl IntervalQuery {
    /// Create a new interval query.
    pub fn new<S: Into<String>>(field: S, source: IntervalsSource) -> Self {
        IntervalQuery {
            field: field.into(),
            source,
            boost: 1.0,
        }
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the intervals source.
    pub fn source(&self) -> &IntervalsSource {
        &self.source
    }
}

impl Query for IntervalQuery {
    fn matches(&self, index: &MemoryIndex) -> Result<bool> {
        Ok(!self.source.intervals(index, &self.field).is_empty())
    }

    fn score(&self, index: &MemoryIndex) -> Result<f32> {
        let freq = self.source.intervals(index, &self.field).len();
        Ok(index.frequency_score(&self.field, freq) * self.boost)
    }

    fn hits(&self, index: &MemoryIndex, hits: &mut Vec<TermHit>) -> Result<()> {
        hits.extend(
            self.source
                .intervals(index, &self.field)
                .into_iter()
                .filter_map(|i| index.hit(&self.field, i.start, i.end)),
        );
        Ok(())
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        format!("{}:{}", self.field, self.source.describe())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::InputDocument;

    fn doc() -> InputDocument {
        InputDocument::builder("d")
            .add_text("body", "the quick brown fox jumps over the lazy dog")
            .build()
            .unwrap()
    }

    #[test]
    fn test_interval_relations() {
        let a = Interval::new(2, 5);
        assert!(a.overlaps(&Interval::new(5, 7)));
        assert!(!a.overlaps(&Interval::new(6, 7)));
        assert!(a.contains(&Interval::new(3, 4)));
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn test_ordered() {
        let doc = doc();
        let source = IntervalsSource::ordered(vec![
            IntervalsSource::term("quick"),
            IntervalsSource::term("fox"),
        ]);
        assert_eq!(
            source.intervals(doc.index(), "body"),
            vec![Interval::new(1, 3)]
        );
        assert!(
            IntervalsSource::ordered(vec![
                IntervalsSource::term("fox"),
                IntervalsSource::term("quick"),
            ])
            .intervals(doc.index(), "body")
            .is_empty()
        );
    }

    #[test]
    fn test_max_gaps() {
        let doc = doc();
        let source = IntervalsSource::ordered(vec![
            IntervalsSource::term("quick"),
            IntervalsSource::term("fox"),
        ]);
        assert!(
            source
                .clone()
                .with_max_gaps(0)
                .intervals(doc.index(), "body")
                .is_empty()
        );
        assert!(
            !source
                .with_max_gaps(1)
                .intervals(doc.index(), "body")
                .is_empty()
        );
    }

    #[test]
    fn test_unordered_and_or() {
        let doc = doc();
        let source = IntervalsSource::unordered(vec![
            IntervalsSource::term("dog"),
            IntervalsSource::term("lazy"),
        ]);
        assert_eq!(
            source.intervals(doc.index(), "body"),
            vec![Interval::new(7, 8)]
        );

        let source = IntervalsSource::or(vec![
            IntervalsSource::term("cat"),
            IntervalsSource::term("dog"),
        ]);
        assert_eq!(
            source.intervals(doc.index(), "body"),
            vec![Interval::new(8, 8)]
        );
    }

    #[test]
    fn test_ordered_prefers_earliest_ending_part() {
        let doc = InputDocument::builder("d")
            .add_text("body", "one two three four")
            .build()
            .unwrap();
        let middle = IntervalsSource::or(vec![
            IntervalsSource::ordered(vec![
                IntervalsSource::term("two"),
                IntervalsSource::term("four"),
            ]),
            IntervalsSource::term("three"),
        ]);
        let source = IntervalsSource::ordered(vec![
            IntervalsSource::term("one"),
            middle,
            IntervalsSource::term("four"),
        ])
        .with_max_gaps(1);

        assert_eq!(
            source.intervals(doc.index(), "body"),
            vec![Interval::new(0, 3)]
        );
    }

    #[test]
    fn test_unordered_allows_overlap() {
        let doc = doc();
        let source = IntervalsSource::unordered(vec![
            IntervalsSource::ordered(vec![
                IntervalsSource::term("quick"),
                IntervalsSource::term("brown"),
            ]),
            IntervalsSource::ordered(vec![
                IntervalsSource::term("brown"),
                IntervalsSource::term("fox"),
            ]),
        ]);
        assert_eq!(
            source.intervals(doc.index(), "body"),
            vec![Interval::new(1, 3)]
        );
    }

    #[test]
    fn test_unordered_is_a_linear_sweep() {
        let words = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot"];
        let text = vec![words.join(" "); 200].join(" ");
        let doc = InputDocument::builder("d")
            .add_text("body", text)
            .build()
            .unwrap();

        let source = IntervalsSource::unordered(
            words.iter().map(|w| IntervalsSource::term(*w)).collect(),
        );
        let intervals = source.intervals(doc.index(), "body");

        assert_eq!(intervals.len(), 1195);
        assert!(intervals.iter().all(|i| i.len() == 6));
    }

    #[test]
    fn test_non_overlapping() {
        let doc = doc();
        let source = IntervalsSource::non_overlapping(
            IntervalsSource::term("the"),
            IntervalsSource::ordered(vec![
                IntervalsSource::term("the"),
                IntervalsSource::term("lazy"),
            ])
            .with_max_gaps(0),
        );
        assert_eq!(
            source.intervals(doc.index(), "body"),
            vec![Interval::new(0, 0)]
        );
    }

    #[test]
    fn test_interval_query_hits() {
        let doc = doc();
        let query = IntervalQuery::new(
            "body",
            IntervalsSource::ordered(vec![
                IntervalsSource::term("brown"),
                IntervalsSource::term("fox"),
            ]),
        );
        assert!(query.matches(doc.index()).unwrap());

        let mut hits = Vec::new();
        query.hits(doc.index(), &mut hits).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].start_offset, 10);
        assert_eq!(hits[0].end_offset, 19);
        assert_eq!(query.description(), "body:ORDERED(brown,fox)");
    }
}
