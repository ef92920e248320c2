//! Oric bus: memory and I/O routing.
//!
//! Everything between `$0300` and `$03FF` is I/O; the rest below `$C000`
//! is RAM and the top 16K is the system ROM.
//!
//! | Range | Device |
//! |---|---|
//! | `$0300-$030F` | 6522 VIA |
//! | `$0310-$031F` | Disk II controller |
//! | `$0320-$03FF` | disk boot ROM window |
//! | `$C000-$FFFF` | system ROM |

use drive_disk2::Disk2;
use emu_core::Bus;
use mos_via_6522::Via6522;

use crate::config::{BOOT_ROM_SIZE, RAM_SIZE, ROM_SIZE};

/// First address whose write can change the picture (hires charset).
const VIDEO_START: u16 = 0x9800;
/// Last such address. The top 32 bytes of RAM are never displayed.
const VIDEO_END: u16 = 0xBFDF;

/// Where an address lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Ram,
    Via(u8),
    Floppy(u8),
    /// Offset within the 256-byte boot ROM bank.
    BootRom(u8),
    /// Offset into the system ROM.
    Rom(u16),
}

/// Decode an address. Pure function of the address alone.
#[must_use]
pub fn decode(address: u16) -> Region {
    match address {
        0x0300..=0x030F => Region::Via((address & 0x0F) as u8),
        0x0310..=0x031F => Region::Floppy((address & 0x0F) as u8),
        0x0320..=0x03FF => Region::BootRom((address & 0xFF) as u8),
        0xC000..=0xFFFF => Region::Rom(address - 0xC000),
        _ => Region::Ram,
    }
}

/// The Oric bus, implementing `emu_core::Bus`.
pub struct OricBus {
    pub ram: Vec<u8>,
    rom: Vec<u8>,
    boot_rom: Vec<u8>,
    pub via: Via6522,
    /// Disk II controller, present when enabled with a boot ROM.
    pub fdc: Option<Disk2>,
    /// Boot ROM bank offset, `0x000` or `0x100`.
    boot_extension: u16,
    screen_dirty: bool,
}

impl OricBus {
    /// ROM images shorter than their slot are padded with `$FF`.
    #[must_use]
    pub fn new(rom: &[u8], boot_rom: Option<&[u8]>, fdc: Option<Disk2>) -> Self {
        let mut rom_image = vec![0xFF; ROM_SIZE];
        let n = rom.len().min(ROM_SIZE);
        rom_image[..n].copy_from_slice(&rom[..n]);

        let mut boot_image = vec![0xFF; BOOT_ROM_SIZE];
        if let Some(boot) = boot_rom {
            let n = boot.len().min(BOOT_ROM_SIZE);
            boot_image[..n].copy_from_slice(&boot[..n]);
        }

        Self {
            ram: vec![0; RAM_SIZE],
            rom: rom_image,
            boot_rom: boot_image,
            via: Via6522::new(),
            fdc,
            boot_extension: 0,
            screen_dirty: true,
        }
    }

    /// Read without side effects. I/O registers read as 0.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        match decode(address) {
            Region::Ram => self.ram[address as usize],
            Region::Rom(offset) => self.rom[offset as usize],
            Region::BootRom(offset) if self.fdc.is_some() => {
                self.boot_rom[usize::from(offset) + usize::from(self.boot_extension)]
            }
            _ => 0,
        }
    }

    /// Consume the screen-dirty flag.
    pub fn take_screen_dirty(&mut self) -> bool {
        std::mem::take(&mut self.screen_dirty)
    }

    pub fn mark_screen_dirty(&mut self) {
        self.screen_dirty = true;
    }

    #[must_use]
    pub fn boot_extension(&self) -> u16 {
        self.boot_extension
    }

    pub fn set_boot_extension(&mut self, extension: u16) {
        self.boot_extension = extension & 0x100;
    }

    /// Bus-side power-on state. RAM survives.
    pub fn reset(&mut self) {
        self.via.reset();
        if let Some(fdc) = self.fdc.as_mut() {
            fdc.reset();
        }
        self.boot_extension = 0;
        self.screen_dirty = true;
    }
}

impl Bus for OricBus {
    fn read(&mut self, address: u16) -> u8 {
        match decode(address) {
            Region::Ram => self.ram[address as usize],
            Region::Via(reg) => self.via.read(reg),
            Region::Floppy(reg) => self.fdc.as_mut().map_or(0, |fdc| fdc.read(reg)),
            Region::BootRom(_) | Region::Rom(_) => self.peek(address),
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match decode(address) {
            Region::Ram => {
                self.ram[address as usize] = value;
                if (VIDEO_START..=VIDEO_END).contains(&address) {
                    self.screen_dirty = true;
                }
            }
            Region::Via(reg) => self.via.write(reg, value),
            Region::Floppy(reg) => {
                if let Some(fdc) = self.fdc.as_mut() {
                    fdc.write(reg, value);
                }
            }
            Region::BootRom(_) => match address {
                0x0380 | 0x0381 => self.boot_extension = 0,
                0x0382 | 0x0383 => self.boot_extension = 0x100,
                _ => {}
            },
            Region::Rom(_) => {}
        }
    }
}
