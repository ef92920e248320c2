//! Oric cassette images.
//!
//! Two formats are handled:
//!
//! - **`.tap`**: the block image. Each block is a sync run (`$16` at least
//!   three times, then `$24`), a 9-byte header, a zero-terminated name and
//!   the payload. Header bytes 4-5 hold the end address and bytes 6-7 the
//!   start address, high byte first, as the Oric ROM writes them.
//! - **wave**: a self-clocking bit-stream the emulated tape deck plays back
//!   one cell at a time. A 4-byte little-endian header gives the number of
//!   body bytes; each body byte packs eight cells, first cell in bit 7.
//!
//! The wave signal toggles level at the end of every half-period. A logical
//! `1` is two one-cell half-periods, a `0` is one cell followed by two.
//! Every byte is framed as a one-cell sync half-period, a start bit (`0`),
//! eight data bits LSB first, an odd-sum parity bit and three stop bits.

mod block;
mod cursor;
mod decoder;
mod encoder;

use std::fmt;
use std::io;

pub use block::{SYNC_BYTE, SYNC_END, TapBlock};
pub use cursor::WaveCursor;
pub use decoder::{FramedByte, decode_blocks, decode_bytes, decode_wave, half_periods};
pub use encoder::{TapReader, WaveSummary, WaveWriter, convert_tap_to_wave, encode};

/// Size of the wave image header.
pub const WAVE_HEADER_LEN: u64 = 4;

/// Part of a block that ran out of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Header,
    Name,
    Payload,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Header => write!(f, "header"),
            Field::Name => write!(f, "name"),
            Field::Payload => write!(f, "payload"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TapeError {
    #[error("tape I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("empty tape image path")]
    EmptyPath,
    #[error("block end address ${end:04X} is below its start address ${start:04X}")]
    InvertedRange { start: u16, end: u16 },
    #[error("tape image ended inside the block {0}")]
    Truncated(Field),
}
