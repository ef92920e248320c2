//! Disk II floppy controller.
//!
//! Sixteen soft switches, selected by the low four address bits. Reads and
//! writes both flip the switch; even addresses also return the data bus.
//!
//! | Register | Function |
//! |---|---|
//! | `0x0-0x7` | stepper phase 0-3 off/on |
//! | `0x8/0x9` | motor off/on |
//! | `0xA/0xB` | select drive 1/2 |
//! | `0xC/0xD` | Q6 low/high (shift/load) |
//! | `0xE/0xF` | Q7 low/high (read/write) |
//!
//! The head moves one nibble per [`Disk2::tick`]. Track position is kept in
//! half-tracks; energising the phase next to the current one pulls the head
//! half a track towards it.

mod nib;

use emu_core::{Observable, Value};
use log::{debug, info};

pub use nib::{NIB_LEN, NibImage, TRACK_LEN, TRACKS};

/// Highest half-track the head reaches.
const MAX_HALF_TRACK: u8 = (TRACKS as u8 - 1) * 2;

#[derive(Debug, thiserror::Error)]
pub enum DiskError {
    #[error("invalid nibble image size: {0} bytes (expected {NIB_LEN})")]
    InvalidSize(usize),
    #[error("disk I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Default)]
struct Drive {
    disk: Option<NibImage>,
    half_track: u8,
    head: usize,
}

impl Drive {
    fn track(&self) -> usize {
        usize::from(self.half_track / 2)
    }

    fn step(&mut self, phase: u8) {
        let current = self.half_track & 3;
        if phase == (current + 1) & 3 {
            if self.half_track < MAX_HALF_TRACK {
                self.half_track += 1;
            }
        } else if phase == (current + 3) & 3 && self.half_track > 0 {
            self.half_track -= 1;
        }
    }
}

pub struct Disk2 {
    drives: [Drive; 2],
    selected: usize,
    phases: u8,
    motor_on: bool,
    q6: bool,
    q7: bool,
    latch: u8,
}

impl Disk2 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            drives: [Drive::default(), Drive::default()],
            selected: 0,
            phases: 0,
            motor_on: false,
            q6: false,
            q7: false,
            latch: 0,
        }
    }

    /// Power-on state. Inserted disks and head positions survive.
    pub fn reset(&mut self) {
        self.selected = 0;
        self.phases = 0;
        self.motor_on = false;
        self.q6 = false;
        self.q7 = false;
        self.latch = 0;
    }

    pub fn insert_disk(&mut self, drive: usize, image: NibImage) {
        let slot = &mut self.drives[drive & 1];
        slot.disk = Some(image);
        slot.head = 0;
        info!("disk inserted in drive {}", (drive & 1) + 1);
    }

    /// Remove and return the disk, with any writes applied.
    pub fn eject_disk(&mut self, drive: usize) -> Option<NibImage> {
        let image = self.drives[drive & 1].disk.take();
        if image.is_some() {
            info!("disk ejected from drive {}", (drive & 1) + 1);
        }
        image
    }

    #[must_use]
    pub fn has_disk(&self, drive: usize) -> bool {
        self.drives[drive & 1].disk.is_some()
    }

    fn switch(&mut self, reg: u8) {
        let on = reg & 1 != 0;
        match reg & 0x0F {
            0x0..=0x7 => {
                let phase = (reg >> 1) & 3;
                if on {
                    self.phases |= 1 << phase;
                    if self.motor_on {
                        self.drives[self.selected].step(phase);
                    }
                } else {
                    self.phases &= !(1 << phase);
                }
            }
            0x8 | 0x9 => {
                if self.motor_on != on {
                    debug!("disk motor {}", if on { "on" } else { "off" });
                }
                self.motor_on = on;
            }
            0xA | 0xB => self.selected = usize::from(on),
            0xC | 0xD => self.q6 = on,
            _ => self.q7 = on,
        }
    }

    /// CPU read of register `reg` (0-15).
    pub fn read(&mut self, reg: u8) -> u8 {
        self.switch(reg);
        if reg & 1 != 0 {
            return 0;
        }
        match (self.q6, self.q7) {
            (false, false) => {
                let value = self.latch;
                self.latch &= 0x7F;
                value
            }
            (true, false) => {
                let protected = self.drives[self.selected]
                    .disk
                    .as_ref()
                    .is_some_and(NibImage::is_write_protected);
                if protected { 0x80 } else { 0x00 }
            }
            _ => 0,
        }
    }

    /// CPU write of register `reg`. With Q6 and Q7 high the value loads the
    /// write latch.
    pub fn write(&mut self, reg: u8, value: u8) {
        self.switch(reg);
        if self.q6 && self.q7 {
            self.latch = value;
        }
    }

    /// Advance the selected drive by one nibble.
    pub fn tick(&mut self) {
        if !self.motor_on {
            return;
        }
        let write_mode = self.q7;
        let latch = self.latch;
        let drive = &mut self.drives[self.selected];
        let (track, head) = (drive.track(), drive.head);
        let Some(disk) = drive.disk.as_mut() else {
            return;
        };
        if write_mode {
            disk.set_nibble(track, head, latch);
        } else {
            self.latch = disk.nibble(track, head);
        }
        drive.head = (head + 1) % TRACK_LEN;
    }

    #[must_use]
    pub fn motor_on(&self) -> bool {
        self.motor_on
    }

    #[must_use]
    pub fn selected_drive(&self) -> usize {
        self.selected
    }

    /// Current half-track of a drive's head, 0 to 68.
    #[must_use]
    pub fn half_track(&self, drive: usize) -> u8 {
        self.drives[drive & 1].half_track
    }

    #[must_use]
    pub fn latch(&self) -> u8 {
        self.latch
    }
}

impl Default for Disk2 {
    fn default() -> Self {
        Self::new()
    }
}

impl Observable for Disk2 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "motor" => Some(self.motor_on.into()),
            "drive" => Some((self.selected as u8).into()),
            "track" => Some((self.drives[self.selected].half_track / 2).into()),
            "half_track" => Some(self.drives[self.selected].half_track.into()),
            "phases" => Some(self.phases.into()),
            "latch" => Some(self.latch.into()),
            "q6" => Some(self.q6.into()),
            "q7" => Some(self.q7.into()),
            "disk" => Some(self.drives[self.selected].disk.is_some().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "motor",
            "drive",
            "track",
            "half_track",
            "phases",
            "latch",
            "q6",
            "q7",
            "disk",
        ]
    }
}
