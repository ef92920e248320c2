//! Bit-level playback of a wave image.

use std::io::{Read, Seek, SeekFrom};

use crate::{TapeError, WAVE_HEADER_LEN};

/// Reads a wave image one cell at a time, most significant bit first.
///
/// Holds one byte of read-ahead so the source is touched once per eight
/// cells.
pub struct WaveCursor<R: Read> {
    inner: R,
    size: u32,
    position: u32,
    bit_position: u8,
    cached: Option<u8>,
}

impl<R: Read> WaveCursor<R> {
    /// Read the header and position the cursor on the first cell.
    pub fn open(mut inner: R) -> Result<Self, TapeError> {
        let mut header = [0u8; 4];
        inner.read_exact(&mut header)?;
        Ok(Self {
            inner,
            size: u32::from_le_bytes(header),
            position: 0,
            bit_position: 7,
            cached: None,
        })
    }

    /// Next cell, or `None` once every body byte has been played.
    ///
    /// A source shorter than its header claims is an error.
    pub fn next_bit(&mut self) -> Result<Option<bool>, TapeError> {
        if self.position >= self.size {
            return Ok(None);
        }
        let byte = match self.cached {
            Some(byte) => byte,
            None => {
                let mut buf = [0u8; 1];
                self.inner.read_exact(&mut buf)?;
                self.cached = Some(buf[0]);
                buf[0]
            }
        };
        let bit = (byte >> self.bit_position) & 1 != 0;
        if self.bit_position == 0 {
            self.bit_position = 7;
            self.position += 1;
            self.cached = None;
        } else {
            self.bit_position -= 1;
        }
        Ok(Some(bit))
    }

    /// Play every remaining cell. A source shorter than the header claims
    /// fails rather than growing the result to the claimed size.
    pub fn read_all(&mut self) -> Result<Vec<bool>, TapeError> {
        let mut bits = Vec::new();
        while let Some(bit) = self.next_bit()? {
            bits.push(bit);
        }
        Ok(bits)
    }

    /// Body length in bytes, from the header.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Index of the body byte being played.
    #[must_use]
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Next cell within the current byte, 7 down to 0.
    #[must_use]
    pub fn bit_position(&self) -> u8 {
        self.bit_position
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.position >= self.size
    }
}

impl<R: Read + Seek> WaveCursor<R> {
    /// Move to a cell, e.g. when restoring a snapshot. Positions past the
    /// end are clamped to it.
    pub fn seek_to(&mut self, position: u32, bit_position: u8) -> Result<(), TapeError> {
        let position = position.min(self.size);
        self.inner
            .seek(SeekFrom::Start(WAVE_HEADER_LEN + u64::from(position)))?;
        self.position = position;
        self.bit_position = bit_position & 7;
        self.cached = None;
        Ok(())
    }
}
