//! CPU core trait.

use crate::Bus;

/// A CPU core.
///
/// CPUs take the bus by reference in `tick` rather than owning it, so the
/// machine can keep the bus alongside its other devices.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Advance the CPU by one clock cycle.
    fn tick<B: Bus>(&mut self, bus: &mut B);

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a copy of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// Drive the level-sensitive IRQ input. `true` means asserted.
    fn set_irq(&mut self, asserted: bool);

    /// Request a non-maskable interrupt (edge).
    fn nmi(&mut self);

    /// Reset the CPU. The reset vector is fetched on the next tick.
    fn reset(&mut self);
}
