#![forbid(unsafe_code)]

//! # fcs-rs
//!
//! A Rust library for reading Flow Cytometry Standard (FCS) files.
//!
//! An FCS dataset is a fixed 58 byte ASCII header followed by segments it
//! points to: a TEXT segment of delimited keywords, a DATA segment of packed
//! event values and an optional ANALYSIS segment. Decoding runs five stages
//! in order:
//!
//! 1. **Header**: segment offsets from fixed byte positions
//! 2. **TEXT**: the keyword mapping, split on the segment's own delimiter
//! 3. **ANALYSIS**: the same parser, when the segment is present
//! 4. **DATA**: a flat value sequence according to `$DATATYPE`, `$BYTEORD`
//!    and the per-channel `$PnB`/`$PnR`
//! 5. **Channels**: the `$PnN`/`$PnS` directory
//!
//! ## Supported Data
//!
//! - List mode (`$MODE/L`) only; histogram modes are rejected
//! - Integer data with 8, 16 or 32 bit channels, uniform or mixed widths
//! - Single and double precision floats
//! - Fixed-width and delimited ASCII
//!
//! Files written with the DATA end offset one byte past the last value are
//! corrected silently. Non-standard `$BYTEORD` values and integer widths are
//! reported as [`Warning`]s rather than errors.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fcs_rs::{Fcs, Result};
//!
//! fn main() -> Result<()> {
//!     let fcs = Fcs::from_file("sample.fcs")?;
//!     println!("{}: {} events x {} channels", fcs.name(), fcs.event_count(), fcs.channel_count());
//!
//!     for (n, channel) in fcs.channels().iter() {
//!         let values = fcs.channel_values(n).unwrap_or_default();
//!         println!("  P{n} {}: {} values", channel.pnn, values.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`segments`] | Header and delimited keyword segment parsing |
//! | [`parsing`] | DATA segment decoding |
//! | [`reader`] | Byte range sources (files, handles, buffers) |
//! | [`index`] | Serializable file indexes for deferred reads |
//! | [`error`] | Error types and [`Result`] alias |
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], which is an alias for
//! `std::result::Result<T, Error>`. No stage catches errors from another;
//! the first failure is returned to the caller.

pub mod parsing;
pub mod reader;
pub mod segments;

mod channel;
mod fcs;
mod keywords;
mod types;

pub mod error;
pub mod index;

// Re-export commonly used types at the crate root
pub use channel::{Channel, ChannelDirectory};
pub use error::{Error, Result};
pub use fcs::{Fcs, UNNAMED_SOURCE};
pub use index::FcsIndex;
pub use keywords::{BitWidth, KeywordValue, Keywords, Spillover};
pub use parsing::decoder::DataLayout;
pub use reader::{BufferedRangeReader, ByteRangeReader, FileRangeReader};
pub use segments::Header;
pub use types::{ByteOrder, DataType, EventData, Mode, Warning};
