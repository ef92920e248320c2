//! NMOS 6502 CPU core.
//!
//! Each instruction runs to completion on its first cycle and the core then
//! idles for the remaining cycles of the documented count, so the caller
//! still sees one `tick()` per clock. Bus accesses therefore happen at the
//! start of an instruction rather than spread across its cycles, which is
//! close enough for machines that do not race the beam.

mod cpu;
pub mod flags;
mod registers;

pub use cpu::Mos6502;
pub use flags::Status;
pub use registers::Registers;
