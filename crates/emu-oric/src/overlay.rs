//! Status message overlay.
//!
//! A tiny 6x8 font covering the characters the machine's own messages use
//! ("NO ROM FOUND", "LOADING F3 FILE..."). Bit 5 of each row is the
//! leftmost pixel. Unknown characters draw as blanks.

use crate::video::{HEIGHT, WIDTH};

const GLYPH_WIDTH: usize = 6;
const GLYPH_HEIGHT: usize = 8;
const MESSAGE_Y: usize = 108;
const MESSAGE_COLOUR: u8 = 7;

#[rustfmt::skip]
const GLYPHS: &[(u8, [u8; 8])] = &[
    (b'A', [0b011100, 0b100010, 0b100010, 0b111110, 0b100010, 0b100010, 0b100010, 0]),
    (b'D', [0b111100, 0b100010, 0b100010, 0b100010, 0b100010, 0b100010, 0b111100, 0]),
    (b'E', [0b111110, 0b100000, 0b100000, 0b111100, 0b100000, 0b100000, 0b111110, 0]),
    (b'F', [0b111110, 0b100000, 0b100000, 0b111100, 0b100000, 0b100000, 0b100000, 0]),
    (b'G', [0b011100, 0b100010, 0b100000, 0b101110, 0b100010, 0b100010, 0b011110, 0]),
    (b'I', [0b011100, 0b001000, 0b001000, 0b001000, 0b001000, 0b001000, 0b011100, 0]),
    (b'L', [0b100000, 0b100000, 0b100000, 0b100000, 0b100000, 0b100000, 0b111110, 0]),
    (b'M', [0b100010, 0b110110, 0b101010, 0b101010, 0b100010, 0b100010, 0b100010, 0]),
    (b'N', [0b100010, 0b110010, 0b101010, 0b100110, 0b100010, 0b100010, 0b100010, 0]),
    (b'O', [0b011100, 0b100010, 0b100010, 0b100010, 0b100010, 0b100010, 0b011100, 0]),
    (b'R', [0b111100, 0b100010, 0b100010, 0b111100, 0b101000, 0b100100, 0b100010, 0]),
    (b'U', [0b100010, 0b100010, 0b100010, 0b100010, 0b100010, 0b100010, 0b011100, 0]),
    (b'0', [0b011100, 0b100010, 0b100110, 0b101010, 0b110010, 0b100010, 0b011100, 0]),
    (b'1', [0b001000, 0b011000, 0b001000, 0b001000, 0b001000, 0b001000, 0b011100, 0]),
    (b'2', [0b011100, 0b100010, 0b000010, 0b001100, 0b010000, 0b100000, 0b111110, 0]),
    (b'3', [0b111110, 0b000100, 0b001000, 0b000100, 0b000010, 0b100010, 0b011100, 0]),
    (b'4', [0b000100, 0b001100, 0b010100, 0b100100, 0b111110, 0b000100, 0b000100, 0]),
    (b'5', [0b111110, 0b100000, 0b111100, 0b000010, 0b000010, 0b100010, 0b011100, 0]),
    (b'6', [0b001100, 0b010000, 0b100000, 0b111100, 0b100010, 0b100010, 0b011100, 0]),
    (b'7', [0b111110, 0b000010, 0b000100, 0b001000, 0b010000, 0b010000, 0b010000, 0]),
    (b'8', [0b011100, 0b100010, 0b100010, 0b011100, 0b100010, 0b100010, 0b011100, 0]),
    (b'9', [0b011100, 0b100010, 0b100010, 0b011110, 0b000010, 0b000100, 0b011000, 0]),
    (b'.', [0, 0, 0, 0, 0, 0b011000, 0b011000, 0]),
];

fn glyph(ch: u8) -> [u8; 8] {
    GLYPHS
        .iter()
        .find(|(c, _)| *c == ch)
        .map_or([0; 8], |(_, rows)| *rows)
}

/// Clear `fb` and draw `text` centred on the message line.
///
/// `fb` must hold `WIDTH * HEIGHT` pixels; a shorter buffer is left
/// untouched.
pub fn show_message(fb: &mut [u8], text: &str) {
    if fb.len() < WIDTH * HEIGHT {
        return;
    }
    fb.fill(0);

    let text = text.to_ascii_uppercase();
    let max_chars = WIDTH / GLYPH_WIDTH;
    let chars = &text.as_bytes()[..text.len().min(max_chars)];
    let start_x = WIDTH.saturating_sub(chars.len() * GLYPH_WIDTH) / 2;

    for (i, &ch) in chars.iter().enumerate() {
        let rows = glyph(ch);
        let x0 = start_x + i * GLYPH_WIDTH;
        for (dy, bits) in rows.iter().enumerate() {
            let line = (MESSAGE_Y + dy) * WIDTH;
            for dx in 0..GLYPH_WIDTH {
                if bits & (0x20 >> dx) != 0 {
                    fb[line + x0 + dx] = MESSAGE_COLOUR;
                }
            }
        }
    }
    debug_assert!(MESSAGE_Y + GLYPH_HEIGHT <= HEIGHT);
}

/// The message shown while an F-key media slot loads.
#[must_use]
pub fn loading_message(slot: u8) -> String {
    format!("Loading F{slot} file...")
}
