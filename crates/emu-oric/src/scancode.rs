//! Atari ST scan codes to host key codes.
//!
//! Inbound key events carry ST keyboard scan codes. They are translated to
//! the key codes the Oric keyboard matrix is registered with: ASCII for
//! printable keys, `0x13A` upwards for function and cursor keys.

pub const KEY_F1: u16 = 0x13A;
pub const KEY_F10: u16 = 0x143;
/// F11: NMI button.
pub const KEY_NMI: u16 = 0x144;
/// F12: reset button.
pub const KEY_RESET: u16 = 0x145;
pub const KEY_RIGHT: u16 = 0x14F;
pub const KEY_LEFT: u16 = 0x150;
pub const KEY_DOWN: u16 = 0x151;
pub const KEY_UP: u16 = 0x152;

pub const SCAN_CTRL: u16 = 0x1D;
pub const SCAN_LEFT_SHIFT: u16 = 0x2A;
pub const SCAN_RIGHT_SHIFT: u16 = 0x36;

/// `(unshifted, shifted)` per scan code. Zero means no key.
static TABLE: [(u16, u16); 128] = build_table();

const fn build_table() -> [(u16, u16); 128] {
    let mut t = [(0u16, 0u16); 128];

    t[0x01] = (0x1B, 0x1B);
    let digits = b"1234567890";
    let shifted = b"!@#$%^&*()";
    let mut i = 0;
    while i < 10 {
        t[0x02 + i] = (digits[i] as u16, shifted[i] as u16);
        i += 1;
    }
    t[0x0C] = (b'-' as u16, 0xA3);
    t[0x0D] = (b'=' as u16, b'+' as u16);
    t[0x0E] = (0x08, 0x08);
    t[0x0F] = (b'\t' as u16, b'\t' as u16);

    let rows: [(usize, &[u8]); 3] = [(0x10, b"qwertyuiop"), (0x1E, b"asdfghjkl"), (0x2C, b"zxcvbnm")];
    let mut r = 0;
    while r < rows.len() {
        let (base, letters) = rows[r];
        let mut j = 0;
        while j < letters.len() {
            t[base + j] = (letters[j] as u16, letters[j].to_ascii_uppercase() as u16);
            j += 1;
        }
        r += 1;
    }

    t[0x1A] = (b'[' as u16, b'{' as u16);
    t[0x1B] = (b']' as u16, b'}' as u16);
    t[0x1C] = (b'\r' as u16, b'\r' as u16);
    t[0x27] = (b';' as u16, b':' as u16);
    t[0x28] = (b'\'' as u16, b'"' as u16);
    t[0x29] = (b'`' as u16, b'~' as u16);
    t[0x2B] = (b'\\' as u16, b'|' as u16);
    t[0x33] = (b',' as u16, b'<' as u16);
    t[0x34] = (b'.' as u16, b'>' as u16);
    t[0x35] = (b'/' as u16, b'?' as u16);
    t[0x39] = (b' ' as u16, b' ' as u16);

    // Function keys, UNDO and HELP ignore shift.
    let mut f = 0;
    while f < 10 {
        t[0x3B + f] = (KEY_F1 + f as u16, KEY_F1 + f as u16);
        f += 1;
    }
    t[0x61] = (KEY_NMI, KEY_NMI);
    t[0x62] = (KEY_RESET, KEY_RESET);
    t[0x48] = (KEY_UP, KEY_UP);
    t[0x4B] = (KEY_LEFT, KEY_LEFT);
    t[0x4D] = (KEY_RIGHT, KEY_RIGHT);
    t[0x50] = (KEY_DOWN, KEY_DOWN);

    // Keypad.
    t[0x4A] = (b'-' as u16, b'-' as u16);
    t[0x4E] = (b'+' as u16, b'+' as u16);
    t[0x53] = (0x7F, 0x7F);
    let keypad = b"(/**7894561230.";
    let mut k = 0;
    while k < keypad.len() {
        t[0x63 + k] = (keypad[k] as u16, keypad[k] as u16);
        k += 1;
    }
    t[0x72] = (b'\r' as u16, b'\r' as u16);
    t
}

/// Translate a scan code. Codes above `0x7F` and modifier keys give 0.
#[must_use]
pub fn to_key_code(scan_code: u16, shift: bool) -> u16 {
    let Some(&(plain, shifted)) = TABLE.get(scan_code as usize) else {
        return 0;
    };
    if shift { shifted } else { plain }
}

/// Translate with the control key taken into account: letters become
/// their control codes.
#[must_use]
pub fn to_key_code_with_ctrl(scan_code: u16, shift: bool, ctrl: bool) -> u16 {
    let code = to_key_code(scan_code, shift);
    if ctrl && u8::try_from(code).is_ok_and(|c| c.is_ascii_alphabetic()) {
        code & 0x1F
    } else {
        code
    }
}

#[must_use]
pub fn is_shift(scan_code: u16) -> bool {
    scan_code == SCAN_LEFT_SHIFT || scan_code == SCAN_RIGHT_SHIFT
}

#[must_use]
pub fn is_ctrl(scan_code: u16) -> bool {
    scan_code == SCAN_CTRL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_shift() {
        assert_eq!(to_key_code(0x10, false), u16::from(b'q'));
        assert_eq!(to_key_code(0x10, true), u16::from(b'Q'));
        assert_eq!(to_key_code(0x32, false), u16::from(b'm'));
        assert_eq!(to_key_code(0x26, true), u16::from(b'L'));
    }

    #[test]
    fn digits_and_symbols() {
        assert_eq!(to_key_code(0x02, false), u16::from(b'1'));
        assert_eq!(to_key_code(0x07, true), u16::from(b'^'));
        assert_eq!(to_key_code(0x0B, true), u16::from(b')'));
        assert_eq!(to_key_code(0x0C, true), 0xA3);
        assert_eq!(to_key_code(0x28, true), u16::from(b'"'));
    }

    #[test]
    fn function_and_cursor_keys() {
        assert_eq!(to_key_code(0x3B, false), KEY_F1);
        assert_eq!(to_key_code(0x41, false), 0x140);
        assert_eq!(to_key_code(0x44, true), KEY_F10);
        assert_eq!(to_key_code(0x61, false), KEY_NMI);
        assert_eq!(to_key_code(0x62, false), KEY_RESET);
        assert_eq!(to_key_code(0x4B, false), KEY_LEFT);
        assert_eq!(to_key_code(0x48, true), KEY_UP);
    }

    #[test]
    fn keypad() {
        assert_eq!(to_key_code(0x63, false), u16::from(b'('));
        assert_eq!(to_key_code(0x66, false), u16::from(b'*'));
        assert_eq!(to_key_code(0x67, false), u16::from(b'7'));
        assert_eq!(to_key_code(0x70, false), u16::from(b'0'));
        assert_eq!(to_key_code(0x71, false), u16::from(b'.'));
        assert_eq!(to_key_code(0x72, false), u16::from(b'\r'));
    }

    #[test]
    fn modifiers_and_out_of_range_map_to_zero() {
        for scan in [0x1D, 0x2A, 0x36, 0x38, 0x3A, 0x47, 0x52, 0x60, 0x80, 0xFFFF] {
            assert_eq!(to_key_code(scan, false), 0, "{scan:#X}");
        }
        assert!(is_shift(0x2A) && is_shift(0x36) && !is_shift(0x1D));
        assert!(is_ctrl(0x1D));
    }

    #[test]
    fn control_latch_makes_control_codes() {
        assert_eq!(to_key_code_with_ctrl(0x14, false, true), 0x14);
        assert_eq!(to_key_code_with_ctrl(0x19, true, true), 0x10);
        assert_eq!(to_key_code_with_ctrl(0x02, false, true), u16::from(b'1'));
        assert_eq!(to_key_code_with_ctrl(0x3B, false, true), KEY_F1);
    }
}
