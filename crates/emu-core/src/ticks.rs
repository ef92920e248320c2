//! Master clock tick counts.

use std::fmt;

/// A count of master clock ticks since power-on.
///
/// Devices slower than the master clock run on the ticks where
/// [`Ticks::is_aligned`] holds for their divider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// True when the low bits selected by `mask` are all clear. `mask` is a
    /// power of two minus one, e.g. `3` for every fourth tick.
    #[must_use]
    pub const fn is_aligned(self, mask: u64) -> bool {
        self.0 & mask == 0
    }

    /// The next tick count, wrapping at `u64::MAX`.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_selects_divided_ticks() {
        let hits = (0..16).filter(|&t| Ticks::new(t).is_aligned(3)).count();
        assert_eq!(hits, 4);
        assert!(Ticks::new(256).is_aligned(127));
        assert!(!Ticks::new(129).is_aligned(127));
    }

    #[test]
    fn next_and_display() {
        assert_eq!(Ticks::new(41).next(), Ticks::new(42));
        assert_eq!(Ticks::new(u64::MAX).next(), Ticks::ZERO);
        assert_eq!(Ticks::new(19_968).to_string(), "19968");
    }
}
