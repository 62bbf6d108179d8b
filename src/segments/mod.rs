// src/segments/mod.rs

// ============================================================================
// Segment Size Constants
// ============================================================================

/// Header size (58 bytes) - fixed ASCII preamble at the start of a dataset.
pub(crate) const HEADER_SIZE: usize = 58;

// ============================================================================
// Submodules
// ============================================================================

mod common;
mod header;
mod text;

pub use header::{Header, NO_ANALYSIS};
pub use text::{join_tokens, parse_delimited, split_tokens};

// Internal-only exports used by the decoder and index
pub(crate) use common::{u64_to_usize, validate_buffer_size};
