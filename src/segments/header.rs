// segments/header.rs
use super::HEADER_SIZE;
use crate::{
    Error, Result,
    segments::common::{ascii_field, validate_buffer_size},
};

/// Sentinel stored in the analysis offsets when the header leaves them blank.
pub const NO_ANALYSIS: i64 = -1;

/// FCS header - the fixed 58 byte ASCII preamble of every dataset.
///
/// Offsets are byte positions relative to the start of the dataset and are
/// inclusive at both ends, as written by the instrument.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    /// Format version (e.g. 3.1 for "FCS3.1").
    pub version: f32,
    /// First byte of the TEXT segment.
    pub text_start: u64,
    /// Last byte of the TEXT segment.
    pub text_stop: u64,
    /// First byte of the DATA segment (0 when only given in TEXT).
    pub data_start: u64,
    /// Last byte of the DATA segment (0 when only given in TEXT).
    pub data_end: u64,
    /// First byte of the ANALYSIS segment, or [`NO_ANALYSIS`].
    pub analysis_start: i64,
    /// Last byte of the ANALYSIS segment, or [`NO_ANALYSIS`].
    pub analysis_end: i64,
}

impl Header {
    /// Parses a header from the first 58 bytes of `bytes`.
    ///
    /// # Layout (inclusive byte positions):
    /// - 0..=2: `FCS` magic
    /// - 3..=5: version, e.g. `3.1`
    /// - 10..=17 / 18..=25: TEXT start / stop
    /// - 26..=33 / 34..=41: DATA start / end
    /// - 42..=49 / 50..=57: ANALYSIS start / end (optional)
    ///
    /// # Returns
    /// A [`Header`] on success, [`Error::HeaderUnreadable`] when the magic is
    /// missing, or [`Error::InvalidHeaderField`] when a required offset is not
    /// a number.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        validate_buffer_size(bytes, HEADER_SIZE)?;

        if &bytes[0..3] != b"FCS" {
            return Err(Error::HeaderUnreadable(
                String::from_utf8_lossy(&bytes[0..6]).into_owned(),
            ));
        }

        let version_text = ascii_field(bytes, 3, 5);
        let version = version_text
            .parse::<f32>()
            .map_err(|_| Error::InvalidHeaderField {
                field: "version",
                value: version_text.clone(),
            })?;

        Ok(Self {
            version,
            text_start: Self::required_offset(bytes, "text_start", 10)?,
            text_stop: Self::required_offset(bytes, "text_stop", 18)?,
            data_start: Self::required_offset(bytes, "data_start", 26)?,
            data_end: Self::required_offset(bytes, "data_end", 34)?,
            analysis_start: Self::optional_offset(bytes, 42),
            analysis_end: Self::optional_offset(bytes, 50),
        })
    }

    /// Parse the eight byte offset field starting at `first`.
    fn required_offset(bytes: &[u8], field: &'static str, first: usize) -> Result<u64> {
        let text = ascii_field(bytes, first, first + 7);
        text.parse::<u64>()
            .map_err(|_| Error::InvalidHeaderField { field, value: text })
    }

    /// Parse an optional offset field, falling back to [`NO_ANALYSIS`].
    fn optional_offset(bytes: &[u8], first: usize) -> i64 {
        ascii_field(bytes, first, first + 7)
            .parse::<i64>()
            .unwrap_or(NO_ANALYSIS)
    }

    /// The ANALYSIS segment range from the header, if both offsets are set.
    pub fn analysis_range(&self) -> Option<(u64, u64)> {
        match (
            u64::try_from(self.analysis_start),
            u64::try_from(self.analysis_end),
        ) {
            (Ok(start), Ok(end)) => Some((start, end)),
            _ => None,
        }
    }
}
