//! Tape block contents.

/// Sync run byte.
pub const SYNC_BYTE: u8 = 0x16;
/// Byte that ends a sync run.
pub const SYNC_END: u8 = 0x24;

/// One block of a `.tap` image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapBlock {
    /// Raw 9-byte header.
    pub header: [u8; 9],
    /// File name without its terminating zero.
    pub name: Vec<u8>,
    /// Payload, `end - start + 1` bytes.
    pub data: Vec<u8>,
}

impl TapBlock {
    /// Build a block loading `data` at `start`.
    ///
    /// `file_type` is `0x00` for BASIC and `0x80` for machine code. An
    /// empty payload is stored as a single zero byte, since the format
    /// cannot describe zero-length blocks.
    #[must_use]
    pub fn new(name: &[u8], start: u16, data: &[u8], file_type: u8, autorun: bool) -> Self {
        let data = if data.is_empty() { vec![0] } else { data.to_vec() };
        let end = start.wrapping_add((data.len() - 1) as u16);
        let [end_hi, end_lo] = end.to_be_bytes();
        let [start_hi, start_lo] = start.to_be_bytes();
        Self {
            header: [
                0x00,
                0x00,
                file_type,
                if autorun { 0xC7 } else { 0x00 },
                end_hi,
                end_lo,
                start_hi,
                start_lo,
                0x00,
            ],
            name: name.iter().copied().filter(|&b| b != 0).collect(),
            data,
        }
    }

    #[must_use]
    pub fn start(&self) -> u16 {
        u16::from_be_bytes([self.header[6], self.header[7]])
    }

    #[must_use]
    pub fn end(&self) -> u16 {
        u16::from_be_bytes([self.header[4], self.header[5]])
    }

    #[must_use]
    pub fn file_type(&self) -> u8 {
        self.header[2]
    }

    #[must_use]
    pub fn autorun(&self) -> bool {
        self.header[3] != 0
    }

    /// Payload length the header describes, or `None` if end < start.
    #[must_use]
    pub fn declared_len(&self) -> Option<usize> {
        let (start, end) = (self.start(), self.end());
        (end >= start).then(|| usize::from(end - start) + 1)
    }

    /// Serialise as `.tap` bytes with a minimal three-byte sync run.
    #[must_use]
    pub fn to_tap_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + 9 + self.name.len() + 1 + self.data.len());
        out.extend_from_slice(&[SYNC_BYTE, SYNC_BYTE, SYNC_BYTE, SYNC_END]);
        out.extend_from_slice(&self.header);
        out.extend_from_slice(&self.name);
        out.push(0);
        out.extend_from_slice(&self.data);
        out
    }
}
