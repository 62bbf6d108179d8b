//! Shared types used across the library.
//!
//! This module contains the small enums describing how the DATA segment is
//! laid out, the decoded event container and the non-fatal warnings raised
//! while decoding.

use crate::{Error, Result};

/// Value encoding declared by `$DATATYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    /// `I`: unsigned integers of 8, 16 or 32 bits.
    Integer,
    /// `F`: IEEE 754 single precision.
    Float,
    /// `D`: IEEE 754 double precision.
    Double,
    /// `A`: ASCII encoded decimal numbers.
    Ascii,
}

impl DataType {
    /// Parse a `$DATATYPE` value (case-insensitive).
    pub fn from_keyword(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "i" => Ok(DataType::Integer),
            "f" => Ok(DataType::Float),
            "d" => Ok(DataType::Double),
            "a" => Ok(DataType::Ascii),
            _ => Err(Error::UnsupportedDataType(value.to_string())),
        }
    }
}

/// Acquisition mode declared by `$MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// `L`: one record per event.
    List,
    /// `C`: correlated histogram.
    Correlated,
    /// `U`: uncorrelated histograms.
    Uncorrelated,
}

impl Mode {
    /// Parse a `$MODE` value (case-insensitive).
    ///
    /// Returns `None` for anything other than `l`, `c` or `u`.
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "l" => Some(Mode::List),
            "c" => Some(Mode::Correlated),
            "u" => Some(Mode::Uncorrelated),
            _ => None,
        }
    }
}

/// Byte order of multi-byte values in the DATA segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Byte order of the machine running the decoder.
    pub const NATIVE: ByteOrder = if cfg!(target_endian = "big") {
        ByteOrder::Big
    } else {
        ByteOrder::Little
    };

    /// Interpret a `$BYTEORD` value.
    ///
    /// Returns `None` for anything other than the four standard spellings;
    /// the caller decides how to fall back.
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.trim() {
            "1,2,3,4" | "1,2" => Some(ByteOrder::Little),
            "4,3,2,1" | "2,1" => Some(ByteOrder::Big),
            _ => None,
        }
    }
}

/// Non-fatal conditions met while decoding.
///
/// Each warning is also emitted through `tracing` at the point it occurs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Warning {
    /// `$BYTEORD` was not a standard value; the native order was used.
    UnrecognizedByteOrder(String),
    /// `$MODE` was not `L`, `C` or `U`; the data was read as list mode.
    UnrecognizedMode(String),
    /// Integer data used bit widths other than 8, 16 or 32; no events decoded.
    UnsupportedBitWidths(Vec<u32>),
    /// The DATA segment held fewer values than `$TOT` x `$PAR`.
    MissingEvents { expected: usize, actual: usize },
}

/// Flat, row-major event values (channel varies fastest).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventData {
    /// `$DATATYPE/I`, every width widened to 32 bits.
    Integer(Vec<u32>),
    /// `$DATATYPE/F`
    Float(Vec<f32>),
    /// `$DATATYPE/D`
    Double(Vec<f64>),
    /// `$DATATYPE/A`
    Ascii(Vec<f64>),
}

impl EventData {
    /// Number of values (events x channels).
    pub fn len(&self) -> usize {
        match self {
            EventData::Integer(v) => v.len(),
            EventData::Float(v) => v.len(),
            EventData::Double(v) | EventData::Ascii(v) => v.len(),
        }
    }

    /// Returns true if no values were decoded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value at flat position `index`, widened to f64.
    pub fn get(&self, index: usize) -> Option<f64> {
        match self {
            EventData::Integer(v) => v.get(index).map(|&x| f64::from(x)),
            EventData::Float(v) => v.get(index).map(|&x| f64::from(x)),
            EventData::Double(v) | EventData::Ascii(v) => v.get(index).copied(),
        }
    }

    /// All values widened to f64.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }

    /// Values of one event, given the channel count.
    pub fn row(&self, event: usize, channels: usize) -> Option<Vec<f64>> {
        let start = event.checked_mul(channels)?;
        let end = start.checked_add(channels)?;
        if channels == 0 || end > self.len() {
            return None;
        }
        Some((start..end).filter_map(|i| self.get(i)).collect())
    }

    /// Values of one channel (0-based column) across all events.
    pub fn column(&self, channel: usize, channels: usize) -> Vec<f64> {
        if channel >= channels {
            return Vec::new();
        }
        (channel..self.len())
            .step_by(channels)
            .filter_map(|i| self.get(i))
            .collect()
    }

    /// Drop values past `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        match self {
            EventData::Integer(v) => v.truncate(len),
            EventData::Float(v) => v.truncate(len),
            EventData::Double(v) | EventData::Ascii(v) => v.truncate(len),
        }
    }
}
