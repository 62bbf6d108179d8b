use super::decoder::{DataLayout, decode_events};
use crate::{
    Error, Result,
    keywords::Keywords,
    reader::ByteRangeReader,
    segments::{HEADER_SIZE, Header, parse_delimited},
    types::{EventData, Warning},
};
use tracing::debug;

/// Header and keyword segments of one dataset, read without touching DATA.
#[derive(Debug, Clone)]
pub struct FcsMetadata {
    pub header: Header,
    pub text: Keywords,
    pub analysis: Keywords,
    /// Length of the whole source in bytes.
    pub file_size: u64,
}

impl FcsMetadata {
    /// Read the header, TEXT and ANALYSIS segments of the dataset at
    /// `base_offset`.
    pub fn read<R: ByteRangeReader<Error = Error>>(reader: &mut R, base_offset: u64) -> Result<Self> {
        let file_size = reader.size()?;
        let available = file_size.saturating_sub(base_offset);
        if available < HEADER_SIZE as u64 {
            return Err(Error::TooShortBuffer {
                actual: available as usize,
                expected: HEADER_SIZE,
                file: file!(),
                line: line!(),
            });
        }

        let header_bytes = reader.read_range(base_offset, HEADER_SIZE as u64)?;
        let header = Header::from_bytes(&header_bytes)?;
        debug!(version = header.version, base_offset, "read FCS header");

        if header.text_stop < header.text_start {
            return Err(Error::InvalidHeaderField {
                field: "text_stop",
                value: header.text_stop.to_string(),
            });
        }
        let text = read_segment(reader, base_offset, header.text_start, header.text_stop, "TEXT")?;

        // Offsets in TEXT win over the header; a reversed range reads as absent.
        let analysis = match text.analysis_offsets()?.or_else(|| header.analysis_range()) {
            Some((start, stop)) if stop >= start => {
                read_segment(reader, base_offset, start, stop, "ANALYSIS")?
            }
            _ => Keywords::default(),
        };

        Ok(Self {
            header,
            text,
            analysis,
            file_size,
        })
    }
}

/// Read and parse the delimited segment spanning `[start, stop]`.
///
/// A segment whose start equals its stop is treated as absent.
fn read_segment<R: ByteRangeReader<Error = Error>>(
    reader: &mut R,
    base_offset: u64,
    start: u64,
    stop: u64,
    segment: &'static str,
) -> Result<Keywords> {
    if start == stop {
        return Ok(Keywords::default());
    }
    let bytes = reader.read_range(base_offset + start, stop - start + 1)?;
    parse_delimited(&bytes, segment)
}

/// Fully decoded dataset: metadata, DATA layout and events.
#[derive(Debug, Clone)]
pub struct FcsFile {
    pub metadata: FcsMetadata,
    pub layout: DataLayout,
    /// Decoded events; `None` when the integer widths are unsupported.
    pub events: Option<EventData>,
    pub warnings: Vec<Warning>,
}

impl FcsFile {
    /// Run every decoding stage over `reader`.
    ///
    /// Errors from any stage are returned as-is.
    pub fn parse<R: ByteRangeReader<Error = Error>>(reader: &mut R, base_offset: u64) -> Result<Self> {
        let metadata = FcsMetadata::read(reader, base_offset)?;

        let mut warnings = Vec::new();
        let layout = DataLayout::resolve(
            &metadata.header,
            &metadata.text,
            base_offset,
            metadata.file_size,
            &mut warnings,
        )?;
        let events = decode_events(reader, base_offset, &metadata.text, &layout, &mut warnings)?;

        Ok(Self {
            metadata,
            layout,
            events,
            warnings,
        })
    }
}
