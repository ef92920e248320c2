//! Wave bit-stream back to bytes and blocks.
//!
//! Used to check conversions; the emulated machine decodes the signal
//! itself through the ROM loader.

use std::io::Cursor;

use crate::block::{SYNC_BYTE, SYNC_END};
use crate::{TapBlock, TapeError, WaveCursor};

/// A byte recovered from the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramedByte {
    pub value: u8,
    /// Parity bit matched the odd-sum rule.
    pub parity_ok: bool,
}

/// Split cells into half-period lengths. The signal toggles after every
/// half-period, so each run of equal cells is one half-period.
#[must_use]
pub fn half_periods(cells: &[bool]) -> Vec<u32> {
    let mut runs = Vec::new();
    let mut iter = cells.iter();
    let Some(&first) = iter.next() else {
        return runs;
    };
    let (mut level, mut len) = (first, 1u32);
    for &cell in iter {
        if cell == level {
            len += 1;
        } else {
            runs.push(len);
            level = cell;
            len = 1;
        }
    }
    runs.push(len);
    runs
}

/// Recover framed bytes.
///
/// A byte starts at the first two-cell half-period after the previous
/// byte, which is the second half of its start bit. Trailing cells that do
/// not complete a byte are dropped.
#[must_use]
pub fn decode_bytes(cells: &[bool]) -> Vec<FramedByte> {
    let halves = half_periods(cells);
    let mut bytes = Vec::new();
    let mut i = 0;

    while i < halves.len() {
        if halves[i] != 2 {
            i += 1;
            continue;
        }
        // Data bits and parity are pairs after the start bit.
        let first = i + 1;
        let needed = 9 * 2 + 3 * 2;
        if first + needed > halves.len() {
            break;
        }
        let bit = |n: usize| halves[first + 2 * n + 1] == 1;
        let mut value = 0u8;
        let mut sum = 1u8;
        for n in 0..8 {
            if bit(n) {
                value |= 1 << n;
                sum = sum.wrapping_add(1);
            }
        }
        bytes.push(FramedByte {
            value,
            parity_ok: bit(8) == (sum & 1 == 1),
        });
        i = first + needed;
    }
    bytes
}

/// Recover blocks: sync run, header, name, then the payload length the
/// header declares. Incomplete blocks at the end are dropped.
#[must_use]
pub fn decode_blocks(cells: &[bool]) -> Vec<TapBlock> {
    let bytes: Vec<u8> = decode_bytes(cells).iter().map(|b| b.value).collect();
    let mut blocks = Vec::new();
    let mut i = 0;
    let mut run = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        i += 1;
        if byte == SYNC_BYTE {
            run = (run + 1).min(3);
            continue;
        }
        if byte != SYNC_END || run < 3 {
            run = 0;
            continue;
        }
        run = 0;

        let Some(header) = bytes.get(i..i + 9) else {
            break;
        };
        let mut block = TapBlock {
            header: <[u8; 9]>::try_from(header).unwrap_or_default(),
            name: Vec::new(),
            data: Vec::new(),
        };
        i += 9;
        let Some(terminator) = bytes[i..].iter().position(|&b| b == 0) else {
            break;
        };
        block.name = bytes[i..i + terminator].to_vec();
        i += terminator + 1;

        let Some(len) = block.declared_len() else {
            break;
        };
        let Some(data) = bytes.get(i..i + len) else {
            break;
        };
        block.data = data.to_vec();
        i += len;
        blocks.push(block);
    }
    blocks
}

/// Decode a complete wave image, header included.
pub fn decode_wave(wave: &[u8]) -> Result<Vec<TapBlock>, TapeError> {
    let mut cursor = WaveCursor::open(Cursor::new(wave))?;
    Ok(decode_blocks(&cursor.read_all()?))
}
