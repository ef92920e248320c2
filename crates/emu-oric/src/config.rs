//! Oric configuration: ROM images and optional peripherals.

use std::path::PathBuf;

/// System ROM size (BASIC 1.1, mapped at `$C000`).
pub const ROM_SIZE: usize = 0x4000;
/// Disk boot ROM size (two 256-byte banks).
pub const BOOT_ROM_SIZE: usize = 0x200;
/// RAM visible below the ROM.
pub const RAM_SIZE: usize = 0xC000;

/// Configuration for constructing an Oric instance.
pub struct OricConfig {
    /// System ROM (16,384 bytes).
    pub rom: Vec<u8>,
    /// Disk boot ROM (512 bytes). Without it the floppy controller is left
    /// out.
    pub boot_rom: Option<Vec<u8>>,
    /// Attach the cassette deck.
    pub tape_enabled: bool,
    /// Attach the Disk II controller (needs `boot_rom`).
    pub fdc_enabled: bool,
    /// Folder holding `rom.img`, disk images and tapes.
    pub media_folder: PathBuf,
}

impl OricConfig {
    /// Both peripherals enabled, media in `folder`.
    #[must_use]
    pub fn new(rom: Vec<u8>, boot_rom: Option<Vec<u8>>, folder: impl Into<PathBuf>) -> Self {
        Self {
            rom,
            boot_rom,
            tape_enabled: true,
            fdc_enabled: true,
            media_folder: folder.into(),
        }
    }
}
