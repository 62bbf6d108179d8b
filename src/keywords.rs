//! Keyword mapping parsed from the TEXT and ANALYSIS segments.
//!
//! FCS stores every keyword value as text. [`Keywords`] keeps the raw strings
//! and layers typed accessors on top, so the fallbacks needed for real-world
//! files live in one place instead of at every call site.

use crate::{
    Error, Result,
    types::{ByteOrder, DataType, Mode},
};
use std::collections::BTreeMap;

/// A keyword value classified by how it parses.
#[derive(Debug, Clone, PartialEq)]
pub enum KeywordValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Bits reserved per value by `$PnB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BitWidth {
    /// A fixed number of bits (characters for ASCII data).
    Bits(u32),
    /// `*`: the value is delimited ASCII.
    Delimited,
}

/// Lower-cased keyword names mapped to their raw values.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Keywords {
    entries: BTreeMap<String, String>,
}

impl Keywords {
    /// Insert a keyword, replacing any earlier value under the same key.
    pub(crate) fn insert(&mut self, key: String, value: String) {
        self.entries.insert(key, value);
    }

    /// Raw value of `key` (lower-case, without `$`).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Classify the value of `key`: integer, then float, then plain text.
    pub fn value(&self, key: &str) -> Option<KeywordValue> {
        let raw = self.get(key)?.trim();
        if let Ok(i) = raw.parse::<i64>() {
            return Some(KeywordValue::Integer(i));
        }
        if let Ok(f) = raw.parse::<f64>() {
            return Some(KeywordValue::Float(f));
        }
        Some(KeywordValue::Text(raw.to_string()))
    }

    fn required(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| Error::MissingKeyword(key.to_string()))
    }

    fn invalid(key: &str, value: &str) -> Error {
        Error::InvalidKeyword {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// Parse `key` as an unsigned integer, if present.
    pub fn integer(&self, key: &str) -> Result<Option<u64>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| Self::invalid(key, raw)),
        }
    }

    /// Parse a required unsigned integer keyword.
    pub fn required_integer(&self, key: &str) -> Result<u64> {
        let raw = self.required(key)?;
        raw.trim()
            .parse::<u64>()
            .map_err(|_| Self::invalid(key, raw))
    }

    /// `$PAR`: number of channels per event.
    pub fn par(&self) -> Result<usize> {
        self.required_count("par")
    }

    /// `$TOT`: number of events.
    pub fn tot(&self) -> Result<usize> {
        self.required_count("tot")
    }

    fn required_count(&self, key: &str) -> Result<usize> {
        let n = self.required_integer(key)?;
        usize::try_from(n).map_err(|_| Self::invalid(key, &n.to_string()))
    }

    /// `$DATATYPE`
    pub fn datatype(&self) -> Result<DataType> {
        DataType::from_keyword(self.required("datatype")?)
    }

    /// `$MODE`; list mode when absent, `None` when present but not a known
    /// mode.
    pub fn mode(&self) -> Option<Mode> {
        self.get("mode").map_or(Some(Mode::List), Mode::from_keyword)
    }

    /// Raw `$BYTEORD` value.
    pub fn byteord(&self) -> Result<&str> {
        self.required("byteord")
    }

    /// `$BYTEORD` resolved to a byte order, if it is one of the standard values.
    pub fn byte_order(&self) -> Result<Option<ByteOrder>> {
        Ok(ByteOrder::from_keyword(self.byteord()?))
    }

    /// `$PnB` for the 1-based channel `n`.
    pub fn bit_width(&self, n: usize) -> Result<BitWidth> {
        let key = format!("p{n}b");
        let raw = self.required(&key)?.trim();
        if raw == "*" {
            return Ok(BitWidth::Delimited);
        }
        raw.parse::<u32>()
            .map(BitWidth::Bits)
            .map_err(|_| Self::invalid(&key, raw))
    }

    /// `$PnR` for the 1-based channel `n`.
    ///
    /// Parsed as an integer first; float ranges (e.g. `262144.0`) are
    /// truncated.
    pub fn range(&self, n: usize) -> Result<u64> {
        let key = format!("p{n}r");
        let raw = self.required(&key)?.trim();
        if let Ok(r) = raw.parse::<u64>() {
            return Ok(r);
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() && f >= 0.0 => Ok(f as u64),
            _ => Err(Self::invalid(&key, raw)),
        }
    }

    /// `$PnN` for the 1-based channel `n`.
    pub fn channel_name(&self, n: usize) -> Option<&str> {
        self.get(&format!("p{n}n"))
    }

    /// `$PnS` for the 1-based channel `n`.
    pub fn channel_short_name(&self, n: usize) -> Option<&str> {
        self.get(&format!("p{n}s"))
    }

    /// `$BEGINDATA` / `$ENDDATA`, if both are present.
    pub fn data_offsets(&self) -> Result<Option<(u64, u64)>> {
        self.offset_pair("begindata", "enddata")
    }

    /// `$BEGINANALYSIS` / `$ENDANALYSIS`, if both are present.
    pub fn analysis_offsets(&self) -> Result<Option<(u64, u64)>> {
        self.offset_pair("beginanalysis", "endanalysis")
    }

    fn offset_pair(&self, begin: &str, end: &str) -> Result<Option<(u64, u64)>> {
        match (self.integer(begin)?, self.integer(end)?) {
            (Some(b), Some(e)) => Ok(Some((b, e))),
            _ => Ok(None),
        }
    }

    /// `$DATE`
    pub fn date(&self) -> Option<&str> {
        self.get("date")
    }

    /// `$CYT`: cytometer type.
    pub fn cytometer(&self) -> Option<&str> {
        self.get("cyt")
    }

    /// Compensation matrix from `$SPILL` or `$SPILLOVER`, if present.
    pub fn spillover(&self) -> Result<Option<Spillover>> {
        let (key, raw) = match (self.get("spill"), self.get("spillover")) {
            (Some(raw), _) => ("spill", raw),
            (None, Some(raw)) => ("spillover", raw),
            (None, None) => return Ok(None),
        };
        Spillover::parse(raw)
            .map(Some)
            .ok_or_else(|| Self::invalid(key, raw))
    }
}

/// Compensation (spillover) matrix.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spillover {
    /// Channel names, in matrix order.
    pub channels: Vec<String>,
    /// Row-major `n x n` coefficients.
    pub matrix: Vec<f64>,
}

impl Spillover {
    /// Parse `n,name1,...,namen,v11,v12,...,vnn`.
    fn parse(raw: &str) -> Option<Self> {
        let mut fields = raw.split(',').map(str::trim);
        let n = fields.next()?.parse::<usize>().ok()?;
        let channels: Vec<String> = fields.by_ref().take(n).map(String::from).collect();
        let matrix = fields
            .map(|f| f.parse::<f64>().ok())
            .collect::<Option<Vec<f64>>>()?;
        if channels.len() != n || matrix.len() != n.checked_mul(n)? {
            return None;
        }
        Some(Self { channels, matrix })
    }

    /// Coefficient at `(row, col)`.
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        let n = self.channels.len();
        if row >= n || col >= n {
            return None;
        }
        self.matrix.get(row * n + col).copied()
    }
}
