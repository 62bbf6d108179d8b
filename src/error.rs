//! Error types for FCS decoding.
//!
//! This module defines the [`Error`] enum which represents all possible failures
//! that can occur when reading or decoding an FCS file.
//!
//! The variants are grouped so a caller can tell apart a file that is not FCS
//! at all ([`Error::HeaderUnreadable`]), a corrupt FCS file
//! ([`Error::SegmentSizeMismatch`], [`Error::DataExceedsFileSize`], ...) and a
//! valid file using a feature this crate does not decode
//! ([`Error::UnsupportedMode`], [`Error::UnsupportedDataType`]).
//!
//! # Example
//!
//! ```no_run
//! use fcs_rs::{Error, Fcs, Result};
//!
//! fn process_file(path: &str) -> Result<()> {
//!     match Fcs::from_file(path) {
//!         Ok(fcs) => {
//!             println!("Loaded {} events", fcs.event_count());
//!             Ok(())
//!         }
//!         Err(Error::HeaderUnreadable(magic)) => {
//!             eprintln!("Not an FCS file: {magic}");
//!             Err(Error::HeaderUnreadable(magic))
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use core::fmt;

/// Errors that can occur during FCS file operations.
#[derive(Debug)]
pub enum Error {
    /// Buffer provided for parsing was too small.
    ///
    /// This typically indicates a truncated file or an incomplete read.
    TooShortBuffer {
        /// Actual number of bytes available
        actual: usize,
        /// Minimum number of bytes required
        expected: usize,
        /// Source file where the error was detected
        file: &'static str,
        /// Line number where the error was detected
        line: u32,
    },

    /// The header does not start with the `FCS` magic, so the source is not
    /// an FCS file.
    HeaderUnreadable(String),

    /// A required header field could not be parsed.
    InvalidHeaderField {
        /// Name of the header field (e.g. `"text_start"`)
        field: &'static str,
        /// The raw text found at the field's fixed position
        value: String,
    },

    /// The TEXT or ANALYSIS segment did not split into key/value pairs.
    OddKeywordCount {
        /// Segment name (`"TEXT"` or `"ANALYSIS"`)
        segment: &'static str,
        /// Number of tokens after splitting on the delimiter
        count: usize,
    },

    /// A keyword required for decoding is absent from the TEXT segment.
    MissingKeyword(String),

    /// A keyword is present but its value cannot be interpreted.
    InvalidKeyword {
        /// Keyword name without the `$` sigil
        key: String,
        /// Raw keyword value
        value: String,
    },

    /// `$MODE` names a histogram mode (`c` or `u`); only list mode is decoded.
    UnsupportedMode(String),

    /// `$DATATYPE` is not one of `I`, `F`, `D` or `A`.
    UnsupportedDataType(String),

    /// The DATA segment ends beyond the physical end of the source.
    DataExceedsFileSize {
        /// Inclusive end offset of the DATA segment
        data_end: u64,
        /// Length of the source in bytes
        file_size: u64,
    },

    /// The DATA segment length is not a whole number of values, and the
    /// difference is not the one-byte stop offset slip some writers produce.
    SegmentSizeMismatch {
        /// First byte of the segment
        start: u64,
        /// Last byte of the segment (inclusive)
        stop: u64,
        /// Size of one value in bytes
        value_size: usize,
    },

    /// An ASCII (`$DATATYPE/A`) field in the DATA segment is not a number.
    InvalidAsciiValue(String),

    /// An I/O error occurred while reading the source.
    IOError(std::io::Error),

    /// Serializing or deserializing an [`crate::FcsIndex`] failed.
    #[cfg(feature = "serde")]
    IndexError(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TooShortBuffer {
                actual,
                expected,
                file,
                line,
            } => write!(
                f,
                "Buffer too small at {file}:{line}: need at least {expected} bytes, got {actual}"
            ),
            Error::HeaderUnreadable(magic) => {
                write!(f, r#"Invalid FCS header: Expected "FCS", found {magic:?}"#)
            }
            Error::InvalidHeaderField { field, value } => {
                write!(f, "Invalid header field {field}: {value:?}")
            }
            Error::OddKeywordCount { segment, count } => write!(
                f,
                "{segment} segment has {count} tokens; keys and values must pair up"
            ),
            Error::MissingKeyword(key) => write!(f, "Missing required keyword ${key}"),
            Error::InvalidKeyword { key, value } => {
                write!(f, "Invalid value for keyword ${key}: {value:?}")
            }
            Error::UnsupportedMode(mode) => write!(
                f,
                "Unsupported $MODE {mode:?}: only list mode (L) is supported"
            ),
            Error::UnsupportedDataType(dt) => write!(f, "Unsupported $DATATYPE {dt:?}"),
            Error::DataExceedsFileSize {
                data_end,
                file_size,
            } => write!(
                f,
                "Data section exceeds file size: ends at byte {data_end}, file is {file_size} bytes"
            ),
            Error::SegmentSizeMismatch {
                start,
                stop,
                value_size,
            } => write!(
                f,
                "Data section [{start}, {stop}] is {} bytes, not a multiple of the {value_size}-byte value size",
                (stop + 1).saturating_sub(*start)
            ),
            Error::InvalidAsciiValue(v) => write!(f, "Invalid ASCII data value: {v:?}"),
            Error::IOError(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "serde")]
            Error::IndexError(e) => write!(f, "Index serialization error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError(e) => Some(e),
            #[cfg(feature = "serde")]
            Error::IndexError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IOError(err)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::IndexError(err)
    }
}

/// A specialized Result type for FCS operations.
///
/// This is defined as `core::result::Result<T, Error>` for convenience.
pub type Result<T> = core::result::Result<T, Error>;
