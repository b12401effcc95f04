/*
 * measure.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Size measurement for truncation budgets.
//!
//! Character and token limits share one abstraction so the eviction and
//! truncation logic is written once. The token measure is a deliberate
//! approximation (word and punctuation runs); it makes no claim of parity
//! with any model tokenizer and can be swapped out behind the trait.

use once_cell::sync::Lazy;
use regex::Regex;

/// A pluggable size function over rendered text.
pub trait Measure {
    /// Number of units in `text`.
    fn count(&self, text: &str) -> usize;
    /// The prefix of `text` holding the first `n` units.
    fn take_start(&self, text: &str, n: usize) -> String;
    /// The suffix of `text` holding the last `n` units.
    fn take_end(&self, text: &str, n: usize) -> String;
}

/// Unit = one `char`.
pub struct CharMeasure;

impl Measure for CharMeasure {
    fn count(&self, text: &str) -> usize {
        text.chars().count()
    }

    fn take_start(&self, text: &str, n: usize) -> String {
        match text.char_indices().nth(n) {
            Some((idx, _)) => text[..idx].to_string(),
            None => text.to_string(),
        }
    }

    fn take_end(&self, text: &str, n: usize) -> String {
        let total = text.chars().count();
        if n >= total {
            return text.to_string();
        }
        match text.char_indices().nth(total - n) {
            Some((idx, _)) => text[idx..].to_string(),
            None => String::new(),
        }
    }
}

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+|[^\w\s]").expect("token pattern is valid"));

/// Unit = one approximate token: a word run or a single punctuation mark.
pub struct TokenMeasure;

impl Measure for TokenMeasure {
    fn count(&self, text: &str) -> usize {
        TOKEN_RE.find_iter(text).count()
    }

    fn take_start(&self, text: &str, n: usize) -> String {
        if n == 0 {
            return String::new();
        }
        match TOKEN_RE.find_iter(text).nth(n - 1) {
            Some(m) => text[..m.end()].trim_end().to_string(),
            None => text.to_string(),
        }
    }

    fn take_end(&self, text: &str, n: usize) -> String {
        if n == 0 {
            return String::new();
        }
        let matches: Vec<_> = TOKEN_RE.find_iter(text).collect();
        if n >= matches.len() {
            return text.to_string();
        }
        let start = matches[matches.len() - n].start();
        text[start..].trim_start().to_string()
    }
}
