use crate::{
    Result,
    channel::{Channel, ChannelDirectory},
    keywords::Keywords,
    parsing::{FcsFile, decoder::DataLayout},
    reader::{ByteRangeReader, FileRangeReader},
    segments::Header,
    types::{EventData, Warning},
};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Display name used when the source has no file-system name.
pub const UNNAMED_SOURCE: &str = "<in-memory>";

#[derive(Debug, Clone)]
/// High level representation of a decoded FCS file.
///
/// Everything is decoded up front; the byte source is released before the
/// constructor returns, whether decoding succeeded or not.
pub struct Fcs {
    raw: FcsFile,
    channels: ChannelDirectory,
    name: String,
}

impl Fcs {
    /// Decode an FCS file from disk.
    ///
    /// # Arguments
    /// * `path` - Path to the `.fcs` file.
    ///
    /// # Returns
    /// A new [`Fcs`] on success or [`crate::Error`] on failure.
    pub fn from_file(path: &str) -> Result<Self> {
        let mut reader = FileRangeReader::new(path)?;
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Self::from_range_reader(&mut reader, name.as_deref())
    }

    /// Decode from an already open, seekable handle.
    ///
    /// The handle is consumed and dropped before returning.
    pub fn from_reader<R: Read + Seek>(handle: R) -> Result<Self> {
        Self::from_range_reader(&mut FileRangeReader::from_handle(handle), None)
    }

    /// Decode from a complete in-memory copy of the file.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    /// Decode the dataset at offset 0 of any [`ByteRangeReader`].
    ///
    /// `name` is the display name; [`UNNAMED_SOURCE`] is used when `None`.
    pub fn from_range_reader<R: ByteRangeReader<Error = crate::Error>>(
        reader: &mut R,
        name: Option<&str>,
    ) -> Result<Self> {
        Self::from_range_reader_at(reader, name, 0)
    }

    /// Decode the dataset whose header starts at `base_offset`.
    pub fn from_range_reader_at<R: ByteRangeReader<Error = crate::Error>>(
        reader: &mut R,
        name: Option<&str>,
        base_offset: u64,
    ) -> Result<Self> {
        let raw = FcsFile::parse(reader, base_offset)?;
        let channels = ChannelDirectory::from_keywords(&raw.metadata.text);
        Ok(Fcs {
            raw,
            channels,
            name: name.unwrap_or(UNNAMED_SOURCE).to_string(),
        })
    }

    /// Display name: the source file name, or [`UNNAMED_SOURCE`].
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &Header {
        &self.raw.metadata.header
    }

    /// TEXT segment keywords.
    pub fn text(&self) -> &Keywords {
        &self.raw.metadata.text
    }

    /// ANALYSIS segment keywords; empty when the segment is absent.
    pub fn analysis(&self) -> &Keywords {
        &self.raw.metadata.analysis
    }

    /// Resolved DATA segment layout.
    pub fn layout(&self) -> &DataLayout {
        &self.raw.layout
    }

    /// Flat event values, row-major with the channel varying fastest.
    ///
    /// `None` when integer data used bit widths this crate does not decode;
    /// see [`Fcs::warnings`].
    pub fn events(&self) -> Option<&EventData> {
        self.raw.events.as_ref()
    }

    pub fn channels(&self) -> &ChannelDirectory {
        &self.channels
    }

    /// Declared channel count (`$PAR`).
    pub fn channel_count(&self) -> usize {
        self.raw.layout.channel_count
    }

    /// Declared event count (`$TOT`).
    pub fn event_count(&self) -> usize {
        self.raw.layout.event_count
    }

    /// Non-fatal conditions met while decoding.
    pub fn warnings(&self) -> &[Warning] {
        &self.raw.warnings
    }

    /// Size of the source in bytes.
    pub fn file_size(&self) -> u64 {
        self.raw.metadata.file_size
    }

    /// Values of the 1-based channel `n` across all events.
    pub fn channel_values(&self, n: usize) -> Option<Vec<f64>> {
        if n == 0 || n > self.channel_count() {
            return None;
        }
        self.events()
            .map(|events| events.column(n - 1, self.channel_count()))
    }

    /// Values of the channel whose `$PnN` or `$PnS` is `name`.
    pub fn channel_values_by_name(&self, name: &str) -> Option<Vec<f64>> {
        self.channels
            .find(name)
            .and_then(|n| self.channel_values(n))
    }

    /// Look up a channel by `$PnN` or `$PnS`.
    pub fn channel_by_name(&self, name: &str) -> Option<&Channel> {
        self.channels.find(name).and_then(|n| self.channels.get(n))
    }
}
