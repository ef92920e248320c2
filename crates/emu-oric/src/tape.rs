//! Oric cassette deck.
//!
//! Plays a wave image (see `format_oric_tap`) one cell per tick into the
//! VIA CB1 input. Block `.tap` images are converted to a wave file next to
//! them the first time their slot is inserted.
//!
//! The drive is *empty* until a tape is inserted and returns to *empty* on
//! removal, at the end of the tape, or when the image can no longer be
//! read.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

use format_oric_tap::{TapeError, WaveCursor, convert_tap_to_wave};
use log::{debug, info, warn};

use crate::media::MediaLibrary;

/// Port bit: motor relay closed.
pub const MOTOR: u8 = 0x01;
/// Port bit: playback signal level.
pub const READ: u8 = 0x02;
/// Port bit: recording signal level.
pub const WRITE: u8 = 0x04;
/// Port bit: play key down.
pub const PLAY: u8 = 0x08;
/// Port bit: record key down.
pub const RECORD: u8 = 0x10;

/// Bytes between progress log lines.
const PROGRESS_INTERVAL: u32 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum TapeLoadError {
    #[error("no tape image {} or {}", wave.display(), tap.display())]
    NotFound { wave: PathBuf, tap: PathBuf },
    #[error("cannot convert {}: {source}", path.display())]
    Convert {
        path: PathBuf,
        #[source]
        source: TapeError,
    },
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: TapeError,
    },
}

type Cursor = WaveCursor<BufReader<File>>;

/// Playback position saved in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TapeState {
    pub position: u32,
    pub bit_position: u8,
    pub size: u32,
}

pub struct TapeDrive {
    port: u8,
    cursor: Option<Cursor>,
    slot: Option<u8>,
}

impl TapeDrive {
    #[must_use]
    pub fn new() -> Self {
        Self {
            port: 0,
            cursor: None,
            slot: None,
        }
    }

    /// Clear the port and take the tape out.
    pub fn reset(&mut self) {
        self.port = 0;
        self.remove();
    }

    /// Insert the tape for slot `index`, replacing the current one.
    ///
    /// Opens `f<n>.wav`, converting `f<n>.tap` into it first when the wave
    /// file does not exist. Returns the body size in bytes.
    pub fn insert(&mut self, index: u8, library: &MediaLibrary) -> Result<u32, TapeLoadError> {
        self.remove();
        let (wave, tap) = library.tape_paths(index);

        let file = match File::open(&wave) {
            Ok(file) => file,
            Err(_) => {
                if !tap.is_file() {
                    return Err(TapeLoadError::NotFound { wave, tap });
                }
                match convert_tap_to_wave(&tap, &wave) {
                    Ok(summary) => info!(
                        "tape: converted {} ({} blocks, {} bytes)",
                        tap.display(),
                        summary.blocks,
                        summary.body_len
                    ),
                    Err(source) => {
                        if let Err(e) = fs::remove_file(&wave) {
                            debug!("tape: no partial {} to remove: {e}", wave.display());
                        }
                        return Err(TapeLoadError::Convert { path: tap, source });
                    }
                }
                File::open(&wave).map_err(|e| TapeLoadError::Open {
                    path: wave.clone(),
                    source: e.into(),
                })?
            }
        };

        let cursor = WaveCursor::open(BufReader::new(file)).map_err(|source| {
            TapeLoadError::Open {
                path: wave.clone(),
                source,
            }
        })?;
        let size = cursor.size();
        info!("tape: inserted {} ({size} bytes)", wave.display());
        self.cursor = Some(cursor);
        self.slot = Some(index);
        Ok(size)
    }

    /// Take the tape out. Does nothing when the drive is empty.
    pub fn remove(&mut self) {
        if self.cursor.take().is_some() {
            debug!("tape: removed");
        }
        self.slot = None;
    }

    /// Play one cell into the `READ` line.
    pub fn tick(&mut self) {
        if self.port & MOTOR == 0 {
            return;
        }
        let Some(cursor) = self.cursor.as_mut() else {
            return;
        };
        match cursor.next_bit() {
            Ok(Some(bit)) => {
                if bit {
                    self.port |= READ;
                } else {
                    self.port &= !READ;
                }
                let position = cursor.position();
                if cursor.bit_position() == 7 && position % PROGRESS_INTERVAL == 0 {
                    debug!("tape: {position}/{} bytes", cursor.size());
                }
                if cursor.is_finished() {
                    info!("tape: end of tape");
                    self.remove();
                }
            }
            Ok(None) => self.remove(),
            Err(e) => {
                warn!("tape: read failed at byte {}: {e}", cursor.position());
                self.remove();
            }
        }
    }

    pub fn set_motor(&mut self, on: bool) {
        if on {
            self.port |= MOTOR;
        } else {
            self.port &= !MOTOR;
        }
    }

    #[must_use]
    pub fn is_motor_on(&self) -> bool {
        self.port & MOTOR != 0
    }

    /// Current playback level.
    #[must_use]
    pub fn read_line(&self) -> bool {
        self.port & READ != 0
    }

    /// Packed port bits.
    #[must_use]
    pub fn port(&self) -> u8 {
        self.port
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cursor.is_some()
    }

    /// Slot of the inserted tape.
    #[must_use]
    pub fn slot(&self) -> Option<u8> {
        self.slot
    }

    #[must_use]
    pub fn position(&self) -> u32 {
        self.cursor.as_ref().map_or(0, WaveCursor::position)
    }

    #[must_use]
    pub fn bit_position(&self) -> u8 {
        self.cursor.as_ref().map_or(7, WaveCursor::bit_position)
    }

    #[must_use]
    pub fn size(&self) -> u32 {
        self.cursor.as_ref().map_or(0, WaveCursor::size)
    }

    #[must_use]
    pub fn state(&self) -> TapeState {
        TapeState {
            position: self.position(),
            bit_position: self.bit_position(),
            size: self.size(),
        }
    }

    /// Move to a saved position. Only applies when the inserted tape has
    /// the saved size; returns whether it did.
    pub fn restore(&mut self, state: TapeState) -> bool {
        let Some(cursor) = self.cursor.as_mut() else {
            return false;
        };
        if cursor.size() != state.size {
            debug!(
                "tape: snapshot is for a {} byte tape, keeping position",
                state.size
            );
            return false;
        }
        match cursor.seek_to(state.position, state.bit_position) {
            Ok(()) => true,
            Err(e) => {
                warn!("tape: seek failed: {e}");
                self.remove();
                false
            }
        }
    }
}

impl Default for TapeDrive {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library_with_wave(body: &[u8]) -> (tempfile::TempDir, MediaLibrary) {
        let dir = tempfile::tempdir().unwrap();
        let mut image = (body.len() as u32).to_le_bytes().to_vec();
        image.extend_from_slice(body);
        fs::write(dir.path().join("f1.wav"), image).unwrap();
        let lib = MediaLibrary::new(dir.path());
        (dir, lib)
    }

    #[test]
    fn empty_drive_ignores_ticks() {
        let mut drive = TapeDrive::new();
        drive.set_motor(true);
        drive.tick();
        assert_eq!(drive.port(), MOTOR);
        assert_eq!(drive.size(), 0);
        assert_eq!(drive.bit_position(), 7);
    }

    #[test]
    fn plays_cells_msb_first() {
        let (_dir, lib) = library_with_wave(&[0b1010_0000, 0xFF]);
        let mut drive = TapeDrive::new();
        assert_eq!(drive.insert(0, &lib).unwrap(), 2);

        // Motor off: nothing moves.
        drive.tick();
        assert_eq!(drive.position(), 0);
        assert_eq!(drive.bit_position(), 7);

        drive.set_motor(true);
        let mut levels = Vec::new();
        for _ in 0..8 {
            drive.tick();
            levels.push(drive.read_line());
        }
        assert_eq!(levels, [true, false, true, false, false, false, false, false]);
        assert_eq!(drive.position(), 1);
        assert_eq!(drive.bit_position(), 7);
    }

    #[test]
    fn end_of_tape_ejects() {
        let (_dir, lib) = library_with_wave(&[0x00, 0x00, 0x00]);
        let mut drive = TapeDrive::new();
        drive.insert(0, &lib).unwrap();
        drive.set_motor(true);
        let mut last = 0;
        for _ in 0..3 * 8 - 1 {
            drive.tick();
            assert!(drive.position() >= last);
            last = drive.position();
        }
        assert!(drive.is_loaded());
        drive.tick();
        assert!(!drive.is_loaded());
        assert_eq!(drive.size(), 0);
        assert!(drive.is_motor_on());
    }

    #[test]
    fn truncated_image_empties_the_drive() {
        let dir = tempfile::tempdir().unwrap();
        // Header claims 10 bytes, body has 1.
        fs::write(dir.path().join("f1.wav"), [10, 0, 0, 0, 0xFF]).unwrap();
        let lib = MediaLibrary::new(dir.path());
        let mut drive = TapeDrive::new();
        drive.insert(0, &lib).unwrap();
        drive.set_motor(true);
        for _ in 0..9 {
            drive.tick();
        }
        assert!(!drive.is_loaded());
    }

    #[test]
    fn missing_slot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let lib = MediaLibrary::new(dir.path());
        let mut drive = TapeDrive::new();
        assert!(matches!(
            drive.insert(3, &lib),
            Err(TapeLoadError::NotFound { .. })
        ));
        assert!(!drive.is_loaded());
    }

    #[test]
    fn failed_conversion_leaves_no_wave() {
        let dir = tempfile::tempdir().unwrap();
        // Sync run and header declaring 4 bytes, only one present.
        let mut tap = vec![0x16, 0x16, 0x16, 0x24, 0, 0, 0, 0, 0x05, 0x03, 0x05, 0x00, 0];
        tap.extend_from_slice(b"X\0");
        tap.push(0xAA);
        fs::write(dir.path().join("f1.tap"), tap).unwrap();
        let lib = MediaLibrary::new(dir.path());
        let mut drive = TapeDrive::new();
        assert!(matches!(
            drive.insert(0, &lib),
            Err(TapeLoadError::Convert { .. })
        ));
        assert!(!dir.path().join("f1.wav").exists());
        assert!(!drive.is_loaded());
    }

    #[test]
    fn restore_needs_matching_size() {
        let (_dir, lib) = library_with_wave(&[0xF0; 16]);
        let mut drive = TapeDrive::new();
        drive.insert(0, &lib).unwrap();
        let state = TapeState {
            position: 5,
            bit_position: 3,
            size: 16,
        };
        assert!(drive.restore(state));
        assert_eq!(drive.state(), state);
        assert!(!drive.restore(TapeState { size: 99, ..state }));
        assert_eq!(drive.position(), 5);
    }

    #[test]
    fn reset_clears_port_and_tape() {
        let (_dir, lib) = library_with_wave(&[0xFF]);
        let mut drive = TapeDrive::new();
        drive.insert(0, &lib).unwrap();
        drive.set_motor(true);
        drive.tick();
        drive.reset();
        assert_eq!(drive.port(), 0);
        assert!(!drive.is_loaded());
        drive.remove();
        assert_eq!(drive.port(), 0);
    }
}
