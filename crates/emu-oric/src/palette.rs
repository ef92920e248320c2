//! Oric colour palette.
//!
//! Eight colours as ARGB32. The colour index is the RGB bit triple of the
//! ULA output: bit 0 red, bit 1 green, bit 2 blue.

/// Oric palette: 8 colours indexed 0-7 in ARGB32 format.
pub const PALETTE: [u32; 8] = [
    0xFF00_0000, // 0: Black
    0xFFFF_0000, // 1: Red
    0xFF00_FF00, // 2: Green
    0xFFFF_FF00, // 3: Yellow
    0xFF00_00FF, // 4: Blue
    0xFFFF_00FF, // 5: Magenta
    0xFF00_FFFF, // 6: Cyan
    0xFFFF_FFFF, // 7: White
];

/// Look up a colour index, ignoring bits above the low three.
#[must_use]
pub fn argb(index: u8) -> u32 {
    PALETTE[usize::from(index & 7)]
}
