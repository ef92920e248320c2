//! `.tap` to wave conversion.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::Instant;

use log::{debug, info};

use crate::block::{SYNC_BYTE, SYNC_END};
use crate::{Field, TapeError};

/// Sync bytes in the preamble written before every block.
const PREAMBLE_SYNC_BYTES: usize = 259;

/// Input bytes between progress messages.
const PROGRESS_INTERVAL: u64 = 4096;

/// Half-periods of silence at the start of the tape.
const LEADING_GAP: usize = 5;

/// Half-periods between a block's name and its payload.
const NAME_GAP: usize = 6;

/// Half-periods after a block's payload.
const TRAILING_GAP: usize = 2;

const READ_BUFFER_LEN: usize = 256;

/// Result of a successful conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveSummary {
    /// Blocks found and encoded.
    pub blocks: usize,
    /// Body bytes after the header, as written into the header.
    pub body_len: u32,
}

/// Packs half-periods into wave body bytes.
pub struct WaveWriter<W: Write> {
    out: W,
    level: u8,
    shifter: u8,
    shift_count: u8,
    bytes_written: u32,
    cells: u64,
}

impl<W: Write> WaveWriter<W> {
    /// Start a body with the signal low.
    pub fn new(out: W) -> Self {
        Self {
            out,
            level: 0,
            shifter: 0,
            shift_count: 0,
            bytes_written: 0,
            cells: 0,
        }
    }

    /// Hold the current level for `len` cells, then toggle it.
    pub fn half_period(&mut self, len: u8) -> io::Result<()> {
        for _ in 0..len {
            self.push_cell(self.level)?;
        }
        self.level ^= 1;
        Ok(())
    }

    fn push_cell(&mut self, level: u8) -> io::Result<()> {
        self.shifter = (self.shifter << 1) | level;
        self.shift_count += 1;
        self.cells += 1;
        if self.shift_count == 8 {
            self.out.write_all(&[self.shifter])?;
            self.bytes_written += 1;
            self.shifter = 0;
            self.shift_count = 0;
        }
        Ok(())
    }

    fn write_bit(&mut self, one: bool) -> io::Result<()> {
        self.half_period(1)?;
        self.half_period(if one { 1 } else { 2 })
    }

    /// Write one framed byte: sync half-period, start bit, data bits LSB
    /// first, parity, three stop bits.
    pub fn write_byte(&mut self, value: u8) -> io::Result<()> {
        self.half_period(1)?;
        self.write_bit(false)?;
        let mut parity = 1u8;
        for i in 0..8 {
            let bit = (value >> i) & 1;
            parity = parity.wrapping_add(bit);
            self.write_bit(bit == 1)?;
        }
        self.write_bit(parity & 1 == 1)?;
        for _ in 0..3 {
            self.write_bit(true)?;
        }
        Ok(())
    }

    /// Write the sync run the ROM loader locks onto.
    pub fn write_preamble(&mut self) -> io::Result<()> {
        for _ in 0..PREAMBLE_SYNC_BYTES {
            self.write_byte(SYNC_BYTE)?;
        }
        self.write_byte(SYNC_END)
    }

    /// Cells emitted so far, including any not yet packed into a byte.
    #[must_use]
    pub fn cells(&self) -> u64 {
        self.cells
    }

    /// Pad the last byte with high cells and write it. A byte is always
    /// written, so an aligned stream gains a full `$FF`. Returns the body
    /// length in bytes.
    pub fn finish(mut self) -> io::Result<u32> {
        for _ in self.shift_count..8 {
            self.shifter = (self.shifter << 1) | 1;
        }
        self.out.write_all(&[self.shifter])?;
        self.bytes_written += 1;
        self.out.flush()?;
        Ok(self.bytes_written)
    }
}

/// Buffered sequential reader bounded by a declared length.
pub struct TapReader<R: Read> {
    inner: R,
    buffer: [u8; READ_BUFFER_LEN],
    buf_pos: usize,
    buf_len: usize,
    position: u64,
    len: u64,
}

impl<R: Read> TapReader<R> {
    pub fn new(inner: R, len: u64) -> Self {
        Self {
            inner,
            buffer: [0; READ_BUFFER_LEN],
            buf_pos: 0,
            buf_len: 0,
            position: 0,
            len,
        }
    }

    /// Next byte, or `None` at the declared end or when the source runs dry.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.position >= self.len {
            return Ok(None);
        }
        if self.buf_pos >= self.buf_len {
            let n = self.inner.read(&mut self.buffer)?;
            if n == 0 {
                return Ok(None);
            }
            self.buf_len = n;
            self.buf_pos = 0;
        }
        let value = self.buffer[self.buf_pos];
        self.buf_pos += 1;
        self.position += 1;
        Ok(Some(value))
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.position < self.len
    }
}

/// Skip to just past the next sync run. False if the input ends first.
fn find_sync<R: Read>(reader: &mut TapReader<R>) -> io::Result<bool> {
    let mut run = 0u8;
    while let Some(byte) = reader.read_byte()? {
        if byte == SYNC_BYTE {
            run = (run + 1).min(3);
        } else if byte == SYNC_END && run == 3 {
            return Ok(true);
        } else {
            run = 0;
        }
    }
    Ok(false)
}

fn copy_block<R: Read, W: Write>(
    reader: &mut TapReader<R>,
    writer: &mut WaveWriter<W>,
) -> Result<(), TapeError> {
    let mut header = [0u8; 9];
    for slot in &mut header {
        *slot = reader.read_byte()?.ok_or(TapeError::Truncated(Field::Header))?;
        writer.write_byte(*slot)?;
    }

    loop {
        let byte = reader.read_byte()?.ok_or(TapeError::Truncated(Field::Name))?;
        writer.write_byte(byte)?;
        if byte == 0 {
            break;
        }
    }

    for _ in 0..NAME_GAP {
        writer.half_period(1)?;
    }

    let start = u16::from_be_bytes([header[6], header[7]]);
    let end = u16::from_be_bytes([header[4], header[5]]);
    if end < start {
        return Err(TapeError::InvertedRange { start, end });
    }
    for _ in 0..=u32::from(end - start) {
        let byte = reader.read_byte()?.ok_or(TapeError::Truncated(Field::Payload))?;
        writer.write_byte(byte)?;
    }

    for _ in 0..TRAILING_GAP {
        writer.half_period(1)?;
    }
    Ok(())
}

/// Encode a `.tap` stream of `input_len` bytes as a wave image.
///
/// Bytes after the last block that do not start with a sync run are
/// ignored. A block cut short anywhere is an error.
pub fn encode<R: Read, W: Write + Seek>(
    input: R,
    input_len: u64,
    mut output: W,
) -> Result<WaveSummary, TapeError> {
    let started = Instant::now();
    output.write_all(&[0; 4])?;

    let mut reader = TapReader::new(input, input_len);
    let mut writer = WaveWriter::new(&mut output);
    for _ in 0..LEADING_GAP {
        writer.half_period(1)?;
    }

    let mut blocks = 0;
    let mut next_report = PROGRESS_INTERVAL;
    while reader.has_more() {
        if !find_sync(&mut reader)? {
            break;
        }
        writer.write_preamble()?;
        copy_block(&mut reader, &mut writer)?;
        blocks += 1;

        if reader.position() >= next_report {
            debug!("tape conversion: {}/{} bytes", reader.position(), input_len);
            next_report = (reader.position() / PROGRESS_INTERVAL + 1) * PROGRESS_INTERVAL;
        }
    }

    let body_len = writer.finish()?;
    output.seek(SeekFrom::Start(0))?;
    output.write_all(&body_len.to_le_bytes())?;
    output.flush()?;

    info!(
        "tape converted: {blocks} blocks, {body_len} bytes in {} ms",
        started.elapsed().as_millis()
    );
    Ok(WaveSummary { blocks, body_len })
}

/// Convert the `.tap` file at `tap` into a wave file at `wave`.
///
/// On failure the partially written wave file is left for the caller to
/// remove.
pub fn convert_tap_to_wave(tap: &Path, wave: &Path) -> Result<WaveSummary, TapeError> {
    if tap.as_os_str().is_empty() || wave.as_os_str().is_empty() {
        return Err(TapeError::EmptyPath);
    }
    let input = File::open(tap)?;
    let input_len = fs::metadata(tap)?.len();
    let output = BufWriter::new(File::create(wave)?);
    debug!("converting {} -> {}", tap.display(), wave.display());
    encode(input, input_len, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn cells_for(value: u8) -> u64 {
        let mut sink = Vec::new();
        let mut writer = WaveWriter::new(&mut sink);
        writer.write_byte(value).expect("write to Vec");
        writer.cells()
    }

    #[test]
    fn half_period_packs_msb_first() {
        let mut sink = Vec::new();
        let mut writer = WaveWriter::new(&mut sink);
        // 0 0 0 1 1 0 1 0
        for len in [3, 2, 1, 1] {
            writer.half_period(len).expect("write");
        }
        writer.half_period(1).expect("write");
        // The full byte is out; finish still appends a padding byte.
        assert_eq!(writer.finish().expect("finish"), 2);
        assert_eq!(sink, vec![0b0001_1010, 0xFF]);
    }

    #[test]
    fn finish_pads_with_ones_and_always_writes() {
        let mut sink = Vec::new();
        let mut writer = WaveWriter::new(&mut sink);
        writer.half_period(2).expect("write");
        assert_eq!(writer.finish().expect("finish"), 1);
        assert_eq!(sink, vec![0b0011_1111]);

        let mut sink = Vec::new();
        let mut writer = WaveWriter::new(&mut sink);
        writer.half_period(8).expect("write");
        assert_eq!(writer.finish().expect("finish"), 2);
        assert_eq!(sink, vec![0x00, 0xFF]);
    }

    #[test]
    fn framed_byte_cell_counts() {
        // sync 1 + start 3 + data + parity + stop 6
        assert_eq!(cells_for(0x00), 1 + 3 + 8 * 3 + 2 + 6);
        assert_eq!(cells_for(0xFF), 1 + 3 + 8 * 2 + 2 + 6);
        assert_eq!(cells_for(0x01), 1 + 3 + (2 + 7 * 3) + 3 + 6);
    }

    #[test]
    fn reader_stops_at_declared_length() {
        let mut reader = TapReader::new(Cursor::new(vec![1, 2, 3, 4]), 2);
        assert_eq!(reader.read_byte().expect("read"), Some(1));
        assert_eq!(reader.read_byte().expect("read"), Some(2));
        assert_eq!(reader.read_byte().expect("read"), None);
        assert!(!reader.has_more());
    }

    #[test]
    fn reader_soft_fails_on_short_source() {
        let mut reader = TapReader::new(Cursor::new(vec![9]), 10);
        assert_eq!(reader.read_byte().expect("read"), Some(9));
        assert_eq!(reader.read_byte().expect("read"), None);
    }

    #[test]
    fn sync_needs_three_markers() {
        let mut reader = TapReader::new(Cursor::new(vec![0x16, 0x16, 0x24, 0x16, 0x16, 0x16, 0x16, 0x24, 0xAB]), 9);
        assert!(find_sync(&mut reader).expect("scan"));
        assert_eq!(reader.read_byte().expect("read"), Some(0xAB));

        let mut reader = TapReader::new(Cursor::new(vec![0x16, 0x16, 0x24]), 3);
        assert!(!find_sync(&mut reader).expect("scan"));
    }

    #[test]
    fn empty_input_still_produces_a_body() {
        let mut out = Cursor::new(Vec::new());
        let summary = encode(Cursor::new(Vec::new()), 0, &mut out).expect("encode");
        assert_eq!(summary.blocks, 0);
        assert_eq!(summary.body_len, 1);
        // Five one-cell half-periods 0 1 0 1 0, padded with ones.
        assert_eq!(out.into_inner(), vec![1, 0, 0, 0, 0b0101_0111]);
    }
}
