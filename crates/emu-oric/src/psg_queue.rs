//! PSG register write log.
//!
//! Every PSG register write is logged as `(register << 8) | value` into a
//! ring of 256 words for the audio consumer. A `0xFFFF` marker always
//! follows the newest entry so a reader can find the end without a shared
//! head pointer.

/// Ring length in words.
pub const PSG_QUEUE_WORDS: usize = 256;

/// End-of-data marker.
pub const END_MARKER: u16 = 0xFFFF;

pub struct PsgWriteQueue {
    words: Box<[u16; PSG_QUEUE_WORDS]>,
    head: usize,
    /// Entries written since the last drain, capped at the ring size less
    /// the marker slot.
    pending: usize,
}

impl PsgWriteQueue {
    #[must_use]
    pub fn new() -> Self {
        let mut words = Box::new([0; PSG_QUEUE_WORDS]);
        words[0] = END_MARKER;
        Self {
            words,
            head: 0,
            pending: 0,
        }
    }

    /// Log a write and move the end marker past it.
    pub fn push(&mut self, value: u16) {
        self.words[self.head] = value;
        self.head = (self.head + 1) & (PSG_QUEUE_WORDS - 1);
        self.words[self.head] = END_MARKER;
        self.pending = (self.pending + 1).min(PSG_QUEUE_WORDS - 1);
    }

    /// Writes logged since the last drain, oldest first.
    pub fn drain(&mut self) -> Vec<u16> {
        let start = (self.head + PSG_QUEUE_WORDS - self.pending) & (PSG_QUEUE_WORDS - 1);
        let out = (0..self.pending)
            .map(|i| self.words[(start + i) & (PSG_QUEUE_WORDS - 1)])
            .collect();
        self.pending = 0;
        out
    }

    /// Raw ring contents, as the audio consumer sees them.
    #[must_use]
    pub fn words(&self) -> &[u16; PSG_QUEUE_WORDS] {
        &self.words
    }

    #[must_use]
    pub fn head(&self) -> usize {
        self.head
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
        self.head = 0;
        self.words[0] = END_MARKER;
        self.pending = 0;
    }
}

impl Default for PsgWriteQueue {
    fn default() -> Self {
        Self::new()
    }
}
