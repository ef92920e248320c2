//! Oric keyboard matrix.
//!
//! Eight columns are selected through the PSG's port A and one of eight
//! lines through VIA port B bits 0-2. PB3 reads back whether the selected
//! line is the only one active in the selected columns.
//!
//! Keys are registered by host key code with their matrix position and the
//! modifier keys they need. Released keys stay down for a minimum number of
//! frames so short taps survive until the ROM's next keyboard scan.

/// Key codes live below this bound.
const KEY_CODE_LIMIT: usize = 0x200;

/// Keys that can be held at once.
const MAX_PRESSED: usize = 4;

/// Modifier layers a key can require.
const MAX_MODIFIERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    column: u8,
    line: u8,
}

#[derive(Debug, Clone, Copy)]
struct KeyDef {
    position: Position,
    /// Bit `n` set = modifier `n` is pressed with the key.
    modifiers: u8,
}

#[derive(Debug, Clone, Copy)]
struct PressedKey {
    code: u16,
    pressed_frame: u64,
    released: bool,
}

/// 8x8 keyboard matrix with sticky key release.
pub struct KeyboardMatrix {
    keys: Vec<Option<KeyDef>>,
    modifiers: [Option<Position>; MAX_MODIFIERS],
    pressed: Vec<PressedKey>,
    active_columns: u8,
    frame: u64,
    sticky_frames: u64,
}

impl KeyboardMatrix {
    /// Empty matrix. Keys are held at least `sticky_frames` frames.
    #[must_use]
    pub fn new(sticky_frames: u64) -> Self {
        Self {
            keys: vec![None; KEY_CODE_LIMIT],
            modifiers: [None; MAX_MODIFIERS],
            pressed: Vec::with_capacity(MAX_PRESSED),
            active_columns: 0,
            frame: 0,
            sticky_frames,
        }
    }

    /// Declare the matrix position of modifier `layer` (0 or 1).
    pub fn register_modifier(&mut self, layer: usize, column: u8, line: u8) {
        if layer < MAX_MODIFIERS && column < 8 && line < 8 {
            self.modifiers[layer] = Some(Position { column, line });
        }
    }

    /// Map key `code` to a matrix position, pressed together with the
    /// modifiers in `modifiers` (bit per layer).
    pub fn register_key(&mut self, code: u16, column: u8, line: u8, modifiers: u8) {
        if let Some(slot) = self.keys.get_mut(code as usize) {
            if column < 8 && line < 8 {
                *slot = Some(KeyDef {
                    position: Position { column, line },
                    modifiers,
                });
            }
        }
    }

    #[must_use]
    pub fn is_registered(&self, code: u16) -> bool {
        self.keys.get(code as usize).is_some_and(Option::is_some)
    }

    /// Press a key. Unregistered codes are ignored. When the matrix is full
    /// the oldest key is dropped.
    pub fn key_down(&mut self, code: u16) {
        if !self.is_registered(code) {
            return;
        }
        if let Some(key) = self.pressed.iter_mut().find(|k| k.code == code) {
            key.pressed_frame = self.frame;
            key.released = false;
            return;
        }
        if self.pressed.len() == MAX_PRESSED {
            self.pressed.remove(0);
        }
        self.pressed.push(PressedKey {
            code,
            pressed_frame: self.frame,
            released: false,
        });
    }

    /// Release a key. It leaves the matrix once it has been down for the
    /// sticky period.
    pub fn key_up(&mut self, code: u16) {
        if let Some(key) = self.pressed.iter_mut().find(|k| k.code == code) {
            key.released = true;
        }
        self.expire();
    }

    /// Advance one frame and drop released keys whose sticky time is up.
    pub fn update(&mut self) {
        self.frame += 1;
        self.expire();
    }

    fn expire(&mut self) {
        let (frame, sticky) = (self.frame, self.sticky_frames);
        self.pressed
            .retain(|k| !(k.released && frame >= k.pressed_frame + sticky));
    }

    /// Release everything immediately.
    pub fn release_all(&mut self) {
        self.pressed.clear();
    }

    /// Columns being scanned, bit per column (1 = selected).
    pub fn set_active_columns(&mut self, columns: u8) {
        self.active_columns = columns;
    }

    #[must_use]
    pub fn active_columns(&self) -> u8 {
        self.active_columns
    }

    /// Lines with a pressed key (or a modifier it holds) in an active column.
    #[must_use]
    pub fn scan_lines(&self) -> u8 {
        let mut lines = 0;
        let mut add = |pos: Position| {
            if self.active_columns & (1 << pos.column) != 0 {
                lines |= 1 << pos.line;
            }
        };
        for key in &self.pressed {
            let Some(def) = self.keys[key.code as usize] else {
                continue;
            };
            add(def.position);
            for (layer, modifier) in self.modifiers.iter().enumerate() {
                if let Some(pos) = modifier {
                    if def.modifiers & (1 << layer) != 0 {
                        add(*pos);
                    }
                }
            }
        }
        lines
    }

    /// Whether `code` is currently held (including sticky time).
    #[must_use]
    pub fn is_pressed(&self, code: u16) -> bool {
        self.pressed.iter().any(|k| k.code == code)
    }
}
