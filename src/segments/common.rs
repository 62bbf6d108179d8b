// segments/common.rs
//! Common helper functions for FCS segment parsing.
//!
//! This module provides:
//! - Buffer validation helpers shared by the header and data decoders
//! - Offset conversion helpers
//! - ASCII field extraction for the fixed-layout header

use crate::{Error, Result};

// ============================================================================
// Validation Helpers
// ============================================================================

/// Validate that a buffer has at least `expected` bytes.
///
/// Returns `Err(TooShortBuffer)` if the buffer is too small.
#[inline]
pub fn validate_buffer_size(bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() < expected {
        return Err(Error::TooShortBuffer {
            actual: bytes.len(),
            expected,
            file: file!(),
            line: line!(),
        });
    }
    Ok(())
}

/// Safely convert a u64 offset to usize for indexing.
///
/// On 64-bit systems, this is always safe. On 32-bit systems, returns an error
/// if the value exceeds `usize::MAX`.
///
/// # Arguments
/// * `value` - The u64 value to convert (typically a file offset or length).
/// * `context` - Description of what the value represents (for error messages).
#[inline]
pub fn u64_to_usize(value: u64, context: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::InvalidKeyword {
        key: context.to_string(),
        value: value.to_string(),
    })
}

// ============================================================================
// ASCII Field Helpers
// ============================================================================

/// Extract an inclusive byte range as trimmed ASCII text.
///
/// Non-ASCII bytes are replaced rather than rejected so the caller can report
/// the raw field contents in its error.
#[inline]
pub fn ascii_field(bytes: &[u8], first: usize, last: usize) -> String {
    String::from_utf8_lossy(&bytes[first..=last])
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string()
}

/// Decode raw segment bytes as text: UTF-8 first, ISO-8859-1 otherwise.
///
/// ISO-8859-1 maps every byte to the code point of the same value, so the
/// fallback never fails.
pub fn decode_segment_text(bytes: &[u8]) -> String {
    match core::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
