//! Duplicate token removal.
//!
//! Drops every token whose surface form has already been seen earlier in the
//! same stream, keeping the first occurrence. The seen-set is scoped to one
//! stream: each call to [`Filter::filter`] starts empty, and
//! [`DuplicateRemovalStream::reset`] clears it when a stream is reused for
//! the next field.

use ahash::AHashSet;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that removes tokens already seen in the token stream.
#[derive(Clone, Debug, Default)]
pub struct DuplicateRemovalFilter;

impl DuplicateRemovalFilter {
    /// Create a new duplicate removal filter.
    pub fn new() -> Self {
        DuplicateRemovalFilter
    }
}

impl Filter for DuplicateRemovalFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(DuplicateRemovalStream::new(tokens)))
    }

    fn name(&self) -> &'static str {
        "duplicate_removal"
    }
}

/// Iterator adapter that yields each distinct token text once, in
/// first-occurrence order.
pub struct DuplicateRemovalStream<I> {
    input: I,
    seen: AHashSet<String>,
}

impl<I: Iterator<Item = Token>> DuplicateRemovalStream<I> {
    /// Wrap a token iterator.
    pub fn new(input: I) -> Self {
        DuplicateRemovalStream {
            input,
            seen: AHashSet::with_capacity(1024),
        }
    }

    /// Switch to a new input and forget every token seen so far.
    pub fn reset(&mut self, input: I) {
        self.input = input;
        self.seen.clear();
    }

    /// Number of distinct surface forms seen since the last reset.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

impl<I: Iterator<Item = Token>> Iterator for DuplicateRemovalStream<I> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        for token in self.input.by_ref() {
            if token.is_stopped() {
                continue;
            }
            if !self.seen.contains(token.text.as_str()) {
                self.seen.insert(token.text.clone());
                return Some(token);
            }
        }
        None
    }
}
