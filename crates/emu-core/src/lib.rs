//! Core traits and types shared by the emulator crates.
//!
//! Everything is driven by one master clock. Slower devices derive their
//! rate from it by dividing the tick count, never by keeping their own time.

mod bus;
mod cpu;
mod observable;
mod tickable;
mod ticks;

pub use bus::{Bus, SimpleBus};
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use tickable::Tickable;
pub use ticks::Ticks;
