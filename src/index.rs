//! FCS File Indexing System
//!
//! This module provides functionality to create lightweight indexes of FCS
//! files. An index holds the header, keyword segments, channel directory and
//! resolved DATA layout, and can be serialized to JSON and used later to read
//! events or a single channel without parsing the TEXT segment again.
//!
//! ```no_run
//! use fcs_rs::{BufferedRangeReader, FcsIndex, Result};
//!
//! fn read_efficiently() -> Result<()> {
//!     // Only the header and TEXT segment are read here
//!     let index = FcsIndex::from_file("sample.fcs")?;
//!     index.save_to_file("sample.fcs.index")?;
//!
//!     // Later: load the index and read the channel you need
//!     let index = FcsIndex::load_from_file("sample.fcs.index")?;
//!     let mut reader = BufferedRangeReader::new("sample.fcs")?;
//!     if let Some(values) = index.read_channel_values_by_name("FSC-A", &mut reader)? {
//!         println!("Read {} values", values.len());
//!     }
//!     Ok(())
//! }
//! ```

use crate::{
    Error, Result,
    channel::ChannelDirectory,
    keywords::Keywords,
    parsing::{
        FcsMetadata,
        decoder::{DataLayout, decode_events},
    },
    reader::{BufferedRangeReader, ByteRangeReader},
    segments::Header,
    types::{EventData, Warning},
};
use std::path::Path;

/// Complete FCS file index
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FcsIndex {
    /// Display name of the indexed source
    pub name: String,
    /// File size for validation
    pub file_size: u64,
    /// Offset of the dataset header within the source
    pub base_offset: u64,
    pub header: Header,
    pub text: Keywords,
    pub analysis: Keywords,
    pub channels: ChannelDirectory,
    pub layout: DataLayout,
    /// Warnings raised while resolving the layout
    pub warnings: Vec<Warning>,
}

impl FcsIndex {
    /// Create an index from an FCS file, reading only header and keyword
    /// segments.
    pub fn from_file(file_path: &str) -> Result<Self> {
        let mut reader = BufferedRangeReader::new(file_path)?;
        let name = Path::new(file_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Self::from_reader(&mut reader, name.as_deref(), 0)
    }

    /// Create an index from any byte range reader.
    ///
    /// # Arguments
    /// * `reader` - Any implementation of `ByteRangeReader`
    /// * `name` - Display name, [`crate::UNNAMED_SOURCE`] when `None`
    /// * `base_offset` - Offset of the dataset header
    pub fn from_reader<R: ByteRangeReader<Error = Error>>(
        reader: &mut R,
        name: Option<&str>,
        base_offset: u64,
    ) -> Result<Self> {
        let metadata = FcsMetadata::read(reader, base_offset)?;
        let mut warnings = Vec::new();
        let layout = DataLayout::resolve(
            &metadata.header,
            &metadata.text,
            base_offset,
            metadata.file_size,
            &mut warnings,
        )?;
        let channels = ChannelDirectory::from_keywords(&metadata.text);

        Ok(FcsIndex {
            name: name.unwrap_or(crate::UNNAMED_SOURCE).to_string(),
            file_size: metadata.file_size,
            base_offset,
            header: metadata.header,
            text: metadata.text,
            analysis: metadata.analysis,
            channels,
            layout,
            warnings,
        })
    }

    /// Decode all events using the indexed layout.
    ///
    /// Returns the events together with the warnings raised while decoding
    /// them (e.g. [`Warning::MissingEvents`]); the events are `None` when the
    /// integer widths are unsupported. Fails with
    /// [`Error::DataExceedsFileSize`] if the source is shorter than the file
    /// the index was built from.
    pub fn read_events<R: ByteRangeReader<Error = Error>>(
        &self,
        reader: &mut R,
    ) -> Result<(Option<EventData>, Vec<Warning>)> {
        let size = reader.size()?;
        if size < self.file_size {
            return Err(Error::DataExceedsFileSize {
                data_end: self.base_offset + self.layout.stop,
                file_size: size,
            });
        }
        let mut warnings = Vec::new();
        let events = decode_events(reader, self.base_offset, &self.text, &self.layout, &mut warnings)?;
        Ok((events, warnings))
    }

    /// Read the values of the 1-based channel `n`.
    ///
    /// `None` when the events could not be decoded (unsupported integer
    /// widths); call [`FcsIndex::read_events`] to see the warnings.
    pub fn read_channel_values<R: ByteRangeReader<Error = Error>>(
        &self,
        n: usize,
        reader: &mut R,
    ) -> Result<Option<Vec<f64>>> {
        let par = self.layout.channel_count;
        if n == 0 || n > par {
            return Err(Error::InvalidKeyword {
                key: "par".to_string(),
                value: format!("channel {n} of {par}"),
            });
        }
        let (events, _) = self.read_events(reader)?;
        Ok(events.map(|events| events.column(n - 1, par)))
    }

    /// Read the values of the channel whose `$PnN` or `$PnS` is `name`.
    pub fn read_channel_values_by_name<R: ByteRangeReader<Error = Error>>(
        &self,
        name: &str,
        reader: &mut R,
    ) -> Result<Option<Vec<f64>>> {
        let n = self
            .channels
            .find(name)
            .ok_or_else(|| Error::MissingKeyword(format!("PnN={name}")))?;
        self.read_channel_values(n, reader)
    }

    /// Serialize the index to a JSON string.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize an index from a JSON string.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save the index to a JSON file.
    #[cfg(feature = "serde")]
    pub fn save_to_file(&self, index_path: &str) -> Result<()> {
        std::fs::write(index_path, self.to_json()?)?;
        Ok(())
    }

    /// Load an index from a JSON file.
    #[cfg(feature = "serde")]
    pub fn load_from_file(index_path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(index_path)?;
        Self::from_json(&json)
    }
}
