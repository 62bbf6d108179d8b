// segments/text.rs
//! Delimited keyword segments (TEXT and ANALYSIS).
//!
//! Both segments are a flat list `D key D value D key D value ... D` where the
//! delimiter `D` is whatever character opens the segment. A delimiter that
//! appears inside a key or value is written twice.

use crate::{
    Error, Result,
    keywords::Keywords,
    segments::common::decode_segment_text,
};
use tracing::debug;

/// Parse the raw bytes of a delimited segment into a [`Keywords`] mapping.
///
/// # Arguments
/// * `bytes` - Segment contents, starting with the delimiter.
/// * `segment` - Segment name used in error messages (`"TEXT"`, `"ANALYSIS"`).
///
/// # Returns
/// The mapping with lower-cased keys, or [`Error::OddKeywordCount`] when the
/// tokens do not pair up into keys and values.
pub fn parse_delimited(bytes: &[u8], segment: &'static str) -> Result<Keywords> {
    let text = decode_segment_text(bytes);
    let Some(delimiter) = text.chars().next() else {
        return Ok(Keywords::default());
    };

    let body = &text[delimiter.len_utf8()..];
    let body = body.strip_suffix(delimiter).unwrap_or(body);
    if body.is_empty() {
        return Ok(Keywords::default());
    }

    // Every `$` is removed, including inside values. Files in the wild are
    // read this way, so a value that legitimately contains `$` loses it.
    let body: String = body.chars().filter(|&c| c != '$').collect();

    let tokens = split_tokens(&body, delimiter);
    if tokens.len() % 2 != 0 {
        return Err(Error::OddKeywordCount {
            segment,
            count: tokens.len(),
        });
    }

    let mut keywords = Keywords::default();
    let mut pairs = tokens.into_iter();
    while let (Some(key), Some(value)) = (pairs.next(), pairs.next()) {
        keywords.insert(key.to_lowercase(), value);
    }
    debug!(segment, delimiter = %delimiter, count = keywords.len(), "parsed keyword segment");
    Ok(keywords)
}

/// Split `body` on isolated delimiters.
///
/// A run of exactly one delimiter separates tokens. A longer run is literal
/// text: each pair collapses to one character and an odd leftover is kept,
/// so `DD` reads as `D` and `DDD` as `DD`.
pub fn split_tokens(body: &str, delimiter: char) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != delimiter {
            current.push(c);
            continue;
        }

        let mut run = 1;
        while chars.next_if_eq(&delimiter).is_some() {
            run += 1;
        }

        if run == 1 {
            tokens.push(core::mem::take(&mut current));
        } else {
            for _ in 0..(run / 2 + run % 2) {
                current.push(delimiter);
            }
        }
    }
    tokens.push(current);
    tokens
}

/// Serialize tokens the way [`split_tokens`] expects them, doubling every
/// delimiter inside a token.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S], delimiter: char) -> String {
    let doubled: String = [delimiter, delimiter].iter().collect();
    let mut out = String::new();
    out.push(delimiter);
    for token in tokens {
        out.push_str(&token.as_ref().replace(delimiter, &doubled));
        out.push(delimiter);
    }
    out
}
