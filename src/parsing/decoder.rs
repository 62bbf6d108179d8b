//! DATA segment decoding.
//!
//! [`DataLayout`] collects everything the TEXT segment says about the DATA
//! segment (where it is, how values are encoded) and rejects files this crate
//! cannot decode before any data byte is read. [`decode_events`] then turns
//! the segment into a flat [`EventData`] sequence.

use crate::{
    Error, Result,
    keywords::{BitWidth, Keywords},
    reader::ByteRangeReader,
    segments::{Header, u64_to_usize, validate_buffer_size},
    types::{ByteOrder, DataType, EventData, Mode, Warning},
};
use tracing::{debug, warn};

/// Integer widths the decoder accepts for `$DATATYPE/I`.
const SUPPORTED_INT_WIDTHS: [u32; 3] = [8, 16, 32];

/// Everything needed to locate and decode the DATA segment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataLayout {
    /// First byte of the DATA segment, relative to the dataset.
    pub start: u64,
    /// Last byte of the DATA segment (inclusive), relative to the dataset.
    pub stop: u64,
    pub datatype: DataType,
    pub byte_order: ByteOrder,
    /// `$PAR`
    pub channel_count: usize,
    /// `$TOT`
    pub event_count: usize,
    /// `$PnB` per channel; only filled for integer and ASCII data.
    pub bit_widths: Vec<BitWidth>,
}

impl DataLayout {
    /// Resolve the DATA segment layout from the header and TEXT keywords.
    ///
    /// Checks run in this order, all before any DATA byte is read:
    /// 1. `$MODE` must not be a histogram mode. An unknown value is read as
    ///    list mode with a [`Warning`].
    /// 2. The segment end must lie within the source.
    /// 3. `$DATATYPE`, `$PAR`, `$TOT` and `$BYTEORD` must be readable.
    ///
    /// `$BEGINDATA`/`$ENDDATA` take precedence over the header offsets. An
    /// unrecognised `$BYTEORD` falls back to the native order and records a
    /// [`Warning`].
    pub fn resolve(
        header: &Header,
        keywords: &Keywords,
        base_offset: u64,
        file_size: u64,
        warnings: &mut Vec<Warning>,
    ) -> Result<Self> {
        let raw_mode = keywords.get("mode").unwrap_or_default();
        match keywords.mode() {
            Some(Mode::List) => {}
            Some(Mode::Correlated | Mode::Uncorrelated) => {
                return Err(Error::UnsupportedMode(raw_mode.to_string()));
            }
            None => {
                warn!(mode = %raw_mode, "unrecognized $MODE; reading as list mode");
                warnings.push(Warning::UnrecognizedMode(raw_mode.to_string()));
            }
        }

        let (start, stop) = keywords
            .data_offsets()?
            .unwrap_or((header.data_start, header.data_end));
        let data_end = base_offset.saturating_add(stop);
        if data_end > file_size {
            return Err(Error::DataExceedsFileSize {
                data_end,
                file_size,
            });
        }

        let datatype = keywords.datatype()?;
        let channel_count = keywords.par()?;
        let event_count = keywords.tot()?;

        let byte_order = match keywords.byte_order()? {
            Some(order) => order,
            None => {
                let raw = keywords.byteord()?.to_string();
                warn!(byteord = %raw, fallback = ?ByteOrder::NATIVE, "unrecognized $BYTEORD");
                warnings.push(Warning::UnrecognizedByteOrder(raw));
                ByteOrder::NATIVE
            }
        };

        let bit_widths = match datatype {
            DataType::Integer | DataType::Ascii => (1..=channel_count)
                .map(|n| keywords.bit_width(n))
                .collect::<Result<Vec<_>>>()?,
            DataType::Float | DataType::Double => Vec::new(),
        };

        Ok(Self {
            start,
            stop,
            datatype,
            byte_order,
            channel_count,
            event_count,
            bit_widths,
        })
    }

    /// Number of values `$TOT` x `$PAR` promise.
    pub fn expected_values(&self) -> usize {
        self.event_count.saturating_mul(self.channel_count)
    }

    /// Both offsets zero: the file gives no location for the DATA segment.
    fn has_no_segment(&self) -> bool {
        self.start == 0 && self.stop == 0
    }

    fn empty_events(&self) -> EventData {
        match self.datatype {
            DataType::Integer => EventData::Integer(Vec::new()),
            DataType::Float => EventData::Float(Vec::new()),
            DataType::Double => EventData::Double(Vec::new()),
            DataType::Ascii => EventData::Ascii(Vec::new()),
        }
    }
}

/// Apply the one-byte stop offset correction.
///
/// Some writers record the DATA end as exclusive, leaving the inclusive size
/// one byte larger than a whole number of values. A remainder of exactly one
/// byte is corrected by moving `stop` back; any other remainder is an error.
///
/// # Returns
/// The corrected `(stop, size)` pair.
pub fn correct_section(start: u64, stop: u64, value_size: usize) -> Result<(u64, u64)> {
    if stop < start {
        return Err(Error::SegmentSizeMismatch {
            start,
            stop,
            value_size,
        });
    }
    let size = stop - start + 1;
    match size % value_size as u64 {
        0 => Ok((stop, size)),
        1 => {
            debug!(start, stop, value_size, "DATA end offset is one byte long; correcting");
            Ok((stop - 1, size - 1))
        }
        _ => Err(Error::SegmentSizeMismatch {
            start,
            stop,
            value_size,
        }),
    }
}

/// Decode the DATA segment described by `layout`.
///
/// Returns `None` when integer data uses bit widths other than 8, 16 or 32;
/// a [`Warning::UnsupportedBitWidths`] is recorded in that case.
pub fn decode_events<R: ByteRangeReader<Error = Error>>(
    reader: &mut R,
    base_offset: u64,
    keywords: &Keywords,
    layout: &DataLayout,
    warnings: &mut Vec<Warning>,
) -> Result<Option<EventData>> {
    let expected = layout.expected_values();
    if expected == 0 {
        return Ok(Some(layout.empty_events()));
    }
    if layout.has_no_segment() {
        warn!(expected, "DATA segment offsets are both zero; no events read");
        warnings.push(Warning::MissingEvents {
            expected,
            actual: 0,
        });
        return Ok(Some(layout.empty_events()));
    }

    let mut events = match layout.datatype {
        DataType::Integer => match decode_integer(reader, base_offset, keywords, layout, warnings)? {
            Some(values) => EventData::Integer(values),
            None => return Ok(None),
        },
        DataType::Float => {
            let bytes = read_fixed(reader, base_offset, layout, 4)?;
            EventData::Float(
                bytes
                    .chunks_exact(4)
                    .map(|c| {
                        let b = [c[0], c[1], c[2], c[3]];
                        match layout.byte_order {
                            ByteOrder::Little => f32::from_le_bytes(b),
                            ByteOrder::Big => f32::from_be_bytes(b),
                        }
                    })
                    .collect(),
            )
        }
        DataType::Double => {
            let bytes = read_fixed(reader, base_offset, layout, 8)?;
            EventData::Double(
                bytes
                    .chunks_exact(8)
                    .map(|c| {
                        let mut b = [0u8; 8];
                        b.copy_from_slice(c);
                        match layout.byte_order {
                            ByteOrder::Little => f64::from_le_bytes(b),
                            ByteOrder::Big => f64::from_be_bytes(b),
                        }
                    })
                    .collect(),
            )
        }
        DataType::Ascii => EventData::Ascii(decode_ascii(reader, base_offset, layout)?),
    };

    if events.len() > expected {
        debug!(
            decoded = events.len(),
            expected, "DATA segment holds trailing values; ignoring them"
        );
        events.truncate(expected);
    } else if events.len() < expected {
        warn!(
            decoded = events.len(),
            expected, "DATA segment holds fewer values than $TOT x $PAR"
        );
        warnings.push(Warning::MissingEvents {
            expected,
            actual: events.len(),
        });
    }

    Ok(Some(events))
}

/// Read the whole segment after the off-by-one correction for `value_size`.
fn read_fixed<R: ByteRangeReader<Error = Error>>(
    reader: &mut R,
    base_offset: u64,
    layout: &DataLayout,
    value_size: usize,
) -> Result<Vec<u8>> {
    let (stop, size) = correct_section(layout.start, layout.stop, value_size)?;
    ensure_within_source(reader, base_offset, stop)?;
    reader.read_range(base_offset + layout.start, size)
}

/// The inclusive end `base_offset + stop` must be a byte of the source.
///
/// The layout guard lets `stop == file_size` through for the one-byte
/// correction; this check catches the widths where no correction applies.
fn ensure_within_source<R: ByteRangeReader<Error = Error>>(
    reader: &mut R,
    base_offset: u64,
    stop: u64,
) -> Result<()> {
    let file_size = reader.size()?;
    let data_end = base_offset.saturating_add(stop);
    if data_end >= file_size {
        return Err(Error::DataExceedsFileSize {
            data_end,
            file_size,
        });
    }
    Ok(())
}

fn integer_widths(layout: &DataLayout) -> Vec<u32> {
    layout
        .bit_widths
        .iter()
        .map(|w| match w {
            BitWidth::Bits(b) => *b,
            BitWidth::Delimited => 0,
        })
        .collect()
}

fn decode_integer<R: ByteRangeReader<Error = Error>>(
    reader: &mut R,
    base_offset: u64,
    keywords: &Keywords,
    layout: &DataLayout,
    warnings: &mut Vec<Warning>,
) -> Result<Option<Vec<u32>>> {
    let widths = integer_widths(layout);
    if widths.iter().any(|w| !SUPPORTED_INT_WIDTHS.contains(w)) {
        warn!(?widths, "non-standard integer bit widths; no events decoded");
        warnings.push(Warning::UnsupportedBitWidths(widths));
        return Ok(None);
    }

    let first = widths[0];
    if widths.iter().all(|&w| w == first) {
        let value_size = (first / 8) as usize;
        let bytes = read_fixed(reader, base_offset, layout, value_size)?;
        return Ok(Some(decode_uniform_integers(&bytes, value_size, layout.byte_order)));
    }

    let ranges = (1..=layout.channel_count)
        .map(|n| keywords.range(n))
        .collect::<Result<Vec<_>>>()?;
    let record_size: u64 = widths.iter().map(|&w| u64::from(w / 8)).sum();
    let needed = record_size.saturating_mul(layout.event_count as u64);
    let available = layout.stop.saturating_sub(layout.start) + 1;
    if available < needed {
        return Err(Error::TooShortBuffer {
            actual: u64_to_usize(available, "data section size")?,
            expected: u64_to_usize(needed, "data section size")?,
            file: file!(),
            line: line!(),
        });
    }
    ensure_within_source(reader, base_offset, layout.start + needed - 1)?;
    let bytes = reader.read_range(base_offset + layout.start, needed)?;
    decode_integer_masked(&bytes, &widths, &ranges, layout.byte_order, layout.event_count)
        .map(Some)
}

/// Read one unsigned integer of `size` bytes (1, 2 or 4).
#[inline]
fn read_uint(bytes: &[u8], size: usize, order: ByteOrder) -> u32 {
    match (size, order) {
        (1, _) => u32::from(bytes[0]),
        (2, ByteOrder::Little) => u32::from(u16::from_le_bytes([bytes[0], bytes[1]])),
        (2, ByteOrder::Big) => u32::from(u16::from_be_bytes([bytes[0], bytes[1]])),
        (_, ByteOrder::Little) => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        (_, ByteOrder::Big) => u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    }
}

/// Decode a buffer of same-width unsigned integers in one pass.
pub fn decode_uniform_integers(bytes: &[u8], value_size: usize, order: ByteOrder) -> Vec<u32> {
    bytes
        .chunks_exact(value_size)
        .map(|c| read_uint(c, value_size, order))
        .collect()
}

/// Bit mask keeping the bits needed for values up to `range`.
///
/// The used width is `floor(log2(range))`. No mask is applied when `range`
/// is 0 or 1, or when the used width reaches the storage width.
pub fn range_mask(range: u64, storage_bits: u32) -> u32 {
    let full = if storage_bits >= 32 {
        u32::MAX
    } else {
        (1u32 << storage_bits) - 1
    };
    if range <= 1 {
        return full;
    }
    let used = range.ilog2();
    if used >= storage_bits {
        full
    } else {
        (1u32 << used) - 1
    }
}

/// Decode event by event, channel by channel, masking each value to the bits
/// its `$PnR` needs.
///
/// This is the path for files whose channels have different `$PnB`; it also
/// accepts uniform widths, giving the same values as
/// [`decode_uniform_integers`] whenever every value fits its range.
pub fn decode_integer_masked(
    bytes: &[u8],
    widths: &[u32],
    ranges: &[u64],
    order: ByteOrder,
    events: usize,
) -> Result<Vec<u32>> {
    let sizes: Vec<usize> = widths.iter().map(|&w| (w / 8) as usize).collect();
    let masks: Vec<u32> = widths
        .iter()
        .zip(ranges)
        .map(|(&w, &r)| range_mask(r, w))
        .collect();
    let record_size: usize = sizes.iter().sum();
    validate_buffer_size(bytes, record_size * events)?;

    let mut values = Vec::with_capacity(events * widths.len());
    let mut offset = 0;
    for _ in 0..events {
        for (&size, &mask) in sizes.iter().zip(&masks) {
            values.push(read_uint(&bytes[offset..], size, order) & mask);
            offset += size;
        }
    }
    Ok(values)
}

fn decode_ascii<R: ByteRangeReader<Error = Error>>(
    reader: &mut R,
    base_offset: u64,
    layout: &DataLayout,
) -> Result<Vec<f64>> {
    if layout.bit_widths.contains(&BitWidth::Delimited) {
        ensure_within_source(reader, base_offset, layout.stop)?;
        let size = layout.stop.saturating_sub(layout.start) + 1;
        let bytes = reader.read_range(base_offset + layout.start, size)?;
        return decode_delimited_ascii(&bytes);
    }

    let widths = integer_widths(layout);
    let first = widths[0];
    let uniform = widths.iter().all(|&w| w == first);
    let value_size = if uniform {
        first as usize
    } else {
        widths.iter().map(|&w| w as usize).sum()
    };
    if value_size == 0 {
        return Err(Error::InvalidKeyword {
            key: "p1b".to_string(),
            value: "0".to_string(),
        });
    }
    let bytes = read_fixed(reader, base_offset, layout, value_size)?;
    decode_fixed_ascii(&bytes, &widths)
}

/// Parse fixed-width ASCII fields, cycling through `widths` per event.
pub fn decode_fixed_ascii(bytes: &[u8], widths: &[u32]) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    if widths.is_empty() {
        return Ok(values);
    }
    let mut offset = 0;
    'events: loop {
        for &w in widths {
            let end = offset + w as usize;
            if end > bytes.len() || w == 0 {
                break 'events;
            }
            values.push(parse_ascii_value(&bytes[offset..end])?);
            offset = end;
        }
    }
    Ok(values)
}

/// Parse delimited ASCII values separated by whitespace or commas.
pub fn decode_delimited_ascii(bytes: &[u8]) -> Result<Vec<f64>> {
    bytes
        .split(|b| b.is_ascii_whitespace() || *b == b',')
        .filter(|field| !field.is_empty())
        .map(parse_ascii_value)
        .collect()
}

fn parse_ascii_value(field: &[u8]) -> Result<f64> {
    let text = String::from_utf8_lossy(field);
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| Error::InvalidAsciiValue(trimmed.to_string()))
}
