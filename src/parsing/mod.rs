pub mod decoder;

mod fcs_file;

// Internal-only types (used by Fcs and FcsIndex)
pub(crate) use fcs_file::{FcsFile, FcsMetadata};
