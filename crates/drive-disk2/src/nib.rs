//! Nibble disk images.
//!
//! A `.nib` file is the raw GCR nibble stream of every track: 35 tracks of
//! 6656 bytes = 232,960 bytes. No sector structure is interpreted here.

use std::fs;
use std::path::Path;

use crate::DiskError;

pub const TRACKS: usize = 35;
pub const TRACK_LEN: usize = 6656;
pub const NIB_LEN: usize = TRACKS * TRACK_LEN;

pub struct NibImage {
    data: Vec<u8>,
    write_protected: bool,
    modified: bool,
}

impl NibImage {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, DiskError> {
        if data.len() != NIB_LEN {
            return Err(DiskError::InvalidSize(data.len()));
        }
        Ok(Self {
            data,
            write_protected: false,
            modified: false,
        })
    }

    pub fn load(path: &Path) -> Result<Self, DiskError> {
        Self::from_bytes(fs::read(path)?)
    }

    /// A blank, formatted-looking image: every nibble is the `$FF` sync byte.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            data: vec![0xFF; NIB_LEN],
            write_protected: false,
            modified: false,
        }
    }

    #[must_use]
    pub fn nibble(&self, track: usize, offset: usize) -> u8 {
        self.data[track * TRACK_LEN + offset]
    }

    /// Store a nibble. Ignored on a protected image.
    pub fn set_nibble(&mut self, track: usize, offset: usize, value: u8) {
        if self.write_protected {
            return;
        }
        self.data[track * TRACK_LEN + offset] = value;
        self.modified = true;
    }

    #[must_use]
    pub fn track(&self, track: usize) -> &[u8] {
        &self.data[track * TRACK_LEN..(track + 1) * TRACK_LEN]
    }

    #[must_use]
    pub fn is_write_protected(&self) -> bool {
        self.write_protected
    }

    pub fn set_write_protected(&mut self, protected: bool) {
        self.write_protected = protected;
    }

    /// True once any nibble has been written since the image was loaded.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_checked() {
        assert!(NibImage::from_bytes(vec![0; NIB_LEN]).is_ok());
        assert!(matches!(
            NibImage::from_bytes(vec![0; 143_360]),
            Err(DiskError::InvalidSize(143_360))
        ));
    }

    #[test]
    fn tracks_are_contiguous() {
        let mut data = vec![0; NIB_LEN];
        data[TRACK_LEN] = 0xD5;
        let image = NibImage::from_bytes(data).expect("valid");
        assert_eq!(image.track(1)[0], 0xD5);
        assert_eq!(image.nibble(1, 0), 0xD5);
        assert_eq!(image.track(34).len(), TRACK_LEN);
    }

    #[test]
    fn protected_image_ignores_writes() {
        let mut image = NibImage::blank();
        image.set_write_protected(true);
        image.set_nibble(0, 0, 0x96);
        assert_eq!(image.nibble(0, 0), 0xFF);
        assert!(!image.is_modified());

        image.set_write_protected(false);
        image.set_nibble(0, 0, 0x96);
        assert_eq!(image.nibble(0, 0), 0x96);
        assert!(image.is_modified());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("d1.nib");
        fs::write(&path, vec![0xAA; NIB_LEN]).expect("write");
        let image = NibImage::load(&path).expect("load");
        assert_eq!(image.nibble(34, TRACK_LEN - 1), 0xAA);
        assert!(matches!(
            NibImage::load(&dir.path().join("missing.nib")),
            Err(DiskError::Io(_))
        ));
    }
}
