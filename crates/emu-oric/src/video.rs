//! Oric video decode.
//!
//! The ULA reads 40 bytes per raster line. A byte with bits 5 and 6 clear is
//! a serial attribute: it changes the foreground, background, character set
//! or display mode for the rest of the line and draws as a background cell.
//! Any other byte is six pixels, either a bitmap (hires) or a character row.
//! Bit 7 inverts both colours of the cell.
//!
//! The output is an indexed framebuffer of `WIDTH * HEIGHT` colour numbers
//! (0-7), see [`crate::palette`].

/// Visible pixels per line.
pub const WIDTH: usize = 240;
/// Visible lines.
pub const HEIGHT: usize = 224;

/// Mode attribute: 50 Hz refresh.
pub const PATTR_50HZ: u8 = 0x02;
/// Mode attribute: hires bitmap.
pub const PATTR_HIRES: u8 = 0x04;

/// Line attribute: alternate character set.
pub const LATTR_ALT: u8 = 0x01;
/// Line attribute: double height characters.
pub const LATTR_DSIZE: u8 = 0x02;
/// Line attribute: blinking characters.
pub const LATTR_BLINK: u8 = 0x04;

const TEXT_BASE: usize = 0xBB80;
const HIRES_BASE: usize = 0xA000;
const HIRES_LINES: usize = 200;
const BYTES_PER_LINE: usize = 40;

const CHARSET_TEXT: usize = 0xB400;
const CHARSET_TEXT_ALT: usize = 0xB800;
const CHARSET_HIRES: usize = 0x9800;
const CHARSET_HIRES_ALT: usize = 0x9C00;

/// Bit of the blink counter that selects the blink phase.
const BLINK_PHASE: u8 = 0x20;

pub struct Screen {
    pixels: Vec<u8>,
    /// Mode attribute, persistent across frames.
    pattr: u8,
    /// 6-bit frame counter driving blink.
    blink: u8,
    blink_phase: bool,
    frames: u64,
}

struct LineState {
    fg: u8,
    bg: u8,
    lattr: u8,
}

impl Screen {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pixels: vec![0; WIDTH * HEIGHT],
            pattr: PATTR_50HZ,
            blink: 0,
            blink_phase: false,
            frames: 0,
        }
    }

    /// Advance the blink counter and redraw from `ram` if anything visible
    /// changed. `ram` is addressed from `$0000`.
    ///
    /// Returns `true` when a new frame was produced.
    pub fn update(&mut self, ram: &[u8], dirty: bool) -> bool {
        self.blink = (self.blink + 1) & 0x3F;
        let phase = self.blink & BLINK_PHASE != 0;
        let flipped = phase != self.blink_phase;
        self.blink_phase = phase;

        if !dirty && !flipped {
            return false;
        }
        self.render(ram);
        self.frames += 1;
        true
    }

    /// Redraw unconditionally.
    pub fn render(&mut self, ram: &[u8]) {
        for y in 0..HEIGHT {
            self.render_line(ram, y);
        }
    }

    fn render_line(&mut self, ram: &[u8], y: usize) {
        let mut line = LineState {
            fg: 7,
            bg: 0,
            lattr: 0,
        };
        let hires = self.pattr & PATTR_HIRES != 0;
        let bitmap = hires && y < HIRES_LINES;
        let row_base = if bitmap {
            HIRES_BASE + y * BYTES_PER_LINE
        } else {
            TEXT_BASE + (y / 8) * BYTES_PER_LINE
        };

        for column in 0..BYTES_PER_LINE {
            let ch = peek(ram, row_base + column);
            let pattern = if ch & 0x60 == 0 {
                self.apply_attribute(&mut line, ch);
                0
            } else if bitmap {
                ch & 0x3F
            } else {
                let base = match (hires, line.lattr & LATTR_ALT != 0) {
                    (false, false) => CHARSET_TEXT,
                    (false, true) => CHARSET_TEXT_ALT,
                    (true, false) => CHARSET_HIRES,
                    (true, true) => CHARSET_HIRES_ALT,
                };
                let row = if line.lattr & LATTR_DSIZE != 0 {
                    ((y >> 3) & 1) * 4 + ((y & 7) >> 1)
                } else {
                    y & 7
                };
                peek(ram, base + usize::from(ch & 0x7F) * 8 + row) & 0x3F
            };
            let pattern = if line.lattr & LATTR_BLINK != 0 && self.blink_phase {
                0
            } else {
                pattern
            };

            let (mut fg, mut bg) = (line.fg, line.bg);
            if ch & 0x80 != 0 {
                fg ^= 7;
                bg ^= 7;
            }
            let start = y * WIDTH + column * 6;
            for (bit, pixel) in self.pixels[start..start + 6].iter_mut().enumerate() {
                *pixel = if pattern & (0x20 >> bit) != 0 { fg } else { bg };
            }
        }
    }

    fn apply_attribute(&mut self, line: &mut LineState, ch: u8) {
        let value = ch & 7;
        match ch & 0x18 {
            0x00 => line.fg = value,
            0x08 => line.lattr = value,
            0x10 => line.bg = value,
            _ => self.pattr = value,
        }
    }

    /// Indexed framebuffer, `WIDTH * HEIGHT` bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    #[must_use]
    pub fn mode(&self) -> u8 {
        self.pattr
    }

    #[must_use]
    pub fn is_hires(&self) -> bool {
        self.pattr & PATTR_HIRES != 0
    }

    /// Frames produced so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

fn peek(ram: &[u8], address: usize) -> u8 {
    ram.get(address).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_ram() -> Vec<u8> {
        // Text mode screen filled with spaces, blank charset.
        let mut ram = vec![0; 0xC000];
        ram[TEXT_BASE..TEXT_BASE + 28 * 40].fill(0x20);
        ram
    }

    #[test]
    fn clean_screen_skips_work() {
        let mut screen = Screen::new();
        let ram = blank_ram();
        assert!(screen.update(&ram, true));
        assert!(!screen.update(&ram, false));
        assert_eq!(screen.frames(), 1);
    }

    #[test]
    fn text_glyph_row_is_drawn() {
        let mut ram = blank_ram();
        // 'A' row 0 = 0b001100 in the standard charset.
        ram[CHARSET_TEXT + usize::from(b'A') * 8] = 0x0C;
        ram[TEXT_BASE] = b'A';
        let mut screen = Screen::new();
        screen.render(&ram);
        assert_eq!(&screen.pixels()[0..6], &[0, 0, 7, 7, 0, 0]);
        // Row 1 of the glyph is empty.
        assert_eq!(&screen.pixels()[WIDTH..WIDTH + 6], &[0; 6]);
    }

    #[test]
    fn attributes_change_colours() {
        let mut ram = blank_ram();
        ram[CHARSET_TEXT + 0x7F * 8] = 0x3F;
        ram[TEXT_BASE] = 0x01; // foreground red
        ram[TEXT_BASE + 1] = 0x14; // background blue
        ram[TEXT_BASE + 2] = 0x7F; // solid block
        ram[TEXT_BASE + 3] = 0x20; // space
        ram[TEXT_BASE + 4] = 0xFF; // inverted solid block
        let mut screen = Screen::new();
        screen.render(&ram);
        let px = screen.pixels();
        assert_eq!(px[0], 0, "attribute cell draws in the old background");
        assert_eq!(px[6], 4, "background attribute cell draws in the new one");
        assert_eq!(px[12], 1);
        assert_eq!(px[18], 4);
        assert_eq!(px[24], 1 ^ 7);
    }

    #[test]
    fn hires_attribute_switches_mode() {
        let mut ram = blank_ram();
        ram[TEXT_BASE] = 0x1C; // mode attribute: 50 Hz hires
        let mut screen = Screen::new();
        screen.render(&ram);
        assert!(screen.is_hires());

        ram[HIRES_BASE + 40] = 0x40 | 0x21; // pixels 0 and 5 of line 1
        screen.render(&ram);
        assert_eq!(&screen.pixels()[WIDTH..WIDTH + 6], &[7, 0, 0, 0, 0, 7]);
    }

    #[test]
    fn blink_phase_flip_forces_redraw() {
        let mut screen = Screen::new();
        let ram = blank_ram();
        let redraws = (0..64).filter(|_| screen.update(&ram, false)).count();
        assert_eq!(redraws, 2);
    }

    #[test]
    fn double_height_row_selection() {
        let mut ram = blank_ram();
        // Row 2 of 'B' lit; with double height it shows on lines 4 and 5.
        ram[CHARSET_TEXT + usize::from(b'B') * 8 + 2] = 0x3F;
        ram[TEXT_BASE] = 0x0A; // line attribute: double height
        ram[TEXT_BASE + 1] = b'B';
        let mut screen = Screen::new();
        screen.render(&ram);
        let lit = |y: usize| screen.pixels()[y * WIDTH + 6] == 7;
        assert!(!lit(2));
        assert!(lit(4));
        assert!(lit(5));
        assert!(!lit(6));
    }
}
