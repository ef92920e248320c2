//! Trait for components that can be advanced by clock ticks.

use crate::Ticks;

/// A component advanced by master clock ticks.
pub trait Tickable {
    /// Advance the component by one master clock tick.
    fn tick(&mut self);

    /// Advance the component by multiple ticks.
    ///
    /// The default calls `tick()` in a loop. Overrides must produce
    /// identical results.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}
