//! Oric-1/Atmos emulator.
//!
//! The machine runs at 1 MHz; one tick is one CPU cycle and a frame is
//! 19,968 ticks. A 6522 VIA connects the AY-3-8912 sound chip (which also
//! scans the keyboard) and the cassette deck. An optional Disk II style
//! controller lives in the I/O page with its boot ROM.
//!
//! The crate is split along the threads of a running system: the
//! emulation thread owns an [`Oric`] and a [`FrameRunner`], the render
//! thread owns the video decoder (see [`display`]), and the host transport
//! owns an [`EventSender`].

mod bus;
#[cfg(feature = "native")]
pub mod capture;
pub mod config;
pub mod display;
pub mod events;
pub mod frame;
pub mod halt;
mod keyboard;
pub mod keymap;
pub mod media;
mod oric;
pub mod overlay;
pub mod palette;
pub mod psg_queue;
pub mod scancode;
pub mod settings;
pub mod snapshot;
pub mod tape;
pub mod video;

pub use bus::{OricBus, Region, decode};
pub use config::OricConfig;
pub use display::{DisplayHandle, FrameSink, NullSink, spawn_renderer};
pub use events::{EventReceiver, EventSender, event_queue};
pub use frame::{FrameReport, FrameRunner, Pacer};
pub use halt::NoRomHalt;
pub use keyboard::KeyboardMatrix;
pub use media::{MediaLibrary, RomLoadError};
pub use oric::{KeyAction, Oric};
pub use psg_queue::PsgWriteQueue;
pub use settings::{Settings, SettingsError};
pub use snapshot::{Snapshot, SnapshotError};
pub use tape::{TapeDrive, TapeLoadError};
pub use video::Screen;

use crate::config::ROM_SIZE;

#[derive(Debug, thiserror::Error)]
pub enum OricError {
    #[error("system ROM is {0} bytes, expected {ROM_SIZE}")]
    RomSize(usize),
    #[error("tape deck not attached")]
    NoTape,
    #[error("floppy controller not attached")]
    NoFloppy,
    #[error(transparent)]
    Tape(#[from] TapeLoadError),
    #[error(transparent)]
    Disk(#[from] drive_disk2::DiskError),
    #[error(transparent)]
    Rom(#[from] RomLoadError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
