//! The Oric keyboard layout.
//!
//! Rows of the tables are matrix lines, characters within a row are
//! columns. Shift sits at column 4 line 4 and control at column 4 line 2.

use crate::keyboard::KeyboardMatrix;
use crate::scancode::{KEY_DOWN, KEY_LEFT, KEY_RIGHT, KEY_UP};

/// Frames a released key stays down.
pub const STICKY_FRAMES: u64 = 2;

pub const MOD_SHIFT: u8 = 1;
pub const MOD_CTRL: u8 = 2;

/// Key code for the CTRL key itself.
pub const KEY_CTRL: u16 = 0x146;
/// Key code for the SHIFT key itself.
pub const KEY_SHIFT: u16 = 0x147;

const UNSHIFTED: [&[u8; 8]; 8] = [
    b"7N5V 1X3",
    b"JTRF  QD",
    b"M6B4 Z2C",
    b"K9;-  \\'",
    b" <>     ",
    b"UIOP  ][",
    b"YHGE ASW",
    b"8L0/   =",
];

const SHIFTED: [&[u8; 8]; 8] = [
    b"&n%v !x#",
    b"jtrf  qd",
    b"m^b$ z@c",
    b"k(:_  |\"",
    b" ,.     ",
    b"uiop  }{",
    b"yhge asw",
    b"*l)?   +",
];

/// Keys outside the character tables: `(code, column, line)`.
const SPECIAL: [(u16, u8, u8); 9] = [
    (0x20, 0, 4),
    (KEY_LEFT, 5, 4),
    (KEY_RIGHT, 7, 4),
    (KEY_DOWN, 6, 4),
    (KEY_UP, 3, 4),
    (0x08, 5, 5),
    (0x0D, 5, 7),
    (KEY_CTRL, 4, 2),
    (KEY_SHIFT, 4, 4),
];

/// Control combinations the ROM gives a meaning to.
const CONTROL: [(u8, u8, u8); 8] = [
    (0x14, 1, 1), // T: toggle caps
    (0x10, 3, 5), // P: printer
    (0x06, 3, 1), // F: key click
    (0x04, 7, 1), // D: auto double height
    (0x11, 6, 1), // Q: cursor
    (0x13, 6, 6), // S: screen
    (0x0C, 1, 7), // L: clear screen
    (0x0E, 1, 0), // N: clear line
];

/// A keyboard matrix with the Oric layout registered.
#[must_use]
pub fn oric_keyboard() -> KeyboardMatrix {
    let mut kbd = KeyboardMatrix::new(STICKY_FRAMES);
    kbd.register_modifier(0, 4, 4);
    kbd.register_modifier(1, 4, 2);

    for (line, (plain, shifted)) in UNSHIFTED.iter().zip(SHIFTED.iter()).enumerate() {
        for column in 0..8 {
            let (a, b) = (plain[column], shifted[column]);
            if a != b' ' {
                kbd.register_key(u16::from(a), column as u8, line as u8, 0);
            }
            if b != b' ' {
                kbd.register_key(u16::from(b), column as u8, line as u8, MOD_SHIFT);
            }
        }
    }
    for (code, column, line) in SPECIAL {
        kbd.register_key(code, column, line, 0);
    }
    for (code, column, line) in CONTROL {
        kbd.register_key(u16::from(code), column, line, MOD_CTRL);
    }
    kbd
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines_for(code: u16, columns: u8) -> u8 {
        let mut kbd = oric_keyboard();
        kbd.key_down(code);
        kbd.set_active_columns(columns);
        kbd.scan_lines()
    }

    #[test]
    fn plain_letter() {
        // 'A' is column 5 of line 6.
        assert_eq!(lines_for(u16::from(b'A'), 1 << 5), 1 << 6);
        assert_eq!(lines_for(u16::from(b'A'), !(1 << 5)), 0);
    }

    #[test]
    fn shifted_symbol_holds_shift() {
        // '!' shares the '1' key (column 5, line 0) and adds shift (4, 4).
        assert_eq!(lines_for(u16::from(b'!'), 1 << 5), 1);
        assert_eq!(lines_for(u16::from(b'!'), 1 << 4), 1 << 4);
    }

    #[test]
    fn control_combination_holds_ctrl() {
        assert_eq!(lines_for(0x0C, 1 << 1), 1 << 7);
        assert_eq!(lines_for(0x0C, 1 << 4), 1 << 2);
    }

    #[test]
    fn special_keys() {
        assert_eq!(lines_for(0x0D, 1 << 5), 1 << 7);
        assert_eq!(lines_for(KEY_UP, 1 << 3), 1 << 4);
        assert_eq!(lines_for(0x20, 1), 1 << 4);
    }

    #[test]
    fn function_keys_are_not_matrix_keys() {
        let kbd = oric_keyboard();
        assert!(!kbd.is_registered(0x13A));
        assert!(kbd.is_registered(u16::from(b'Z')));
        assert!(kbd.is_registered(u16::from(b'z')));
    }
}
