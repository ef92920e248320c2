//! Media folder: system ROM, disk boot ROM, disk images and tapes.
//!
//! Everything lives flat in one folder:
//!
//! | File | Content |
//! |---|---|
//! | `rom.img` | 16K system ROM |
//! | `boot.rom` | 512-byte disk boot ROM (optional) |
//! | `d1.nib`, `d2.nib`, ... | nibble disk images, consecutive from 1 |
//! | `f<n>.tap` / `f<n>.wav` | tape for function key slot `n` |

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::{BOOT_ROM_SIZE, ROM_SIZE};

pub const ROM_FILE: &str = "rom.img";
pub const BOOT_ROM_FILE: &str = "boot.rom";

/// Longest ROM path accepted, in bytes.
const MAX_PATH_LEN: usize = 255;

#[derive(Debug, thiserror::Error)]
pub enum RomLoadError {
    #[error("ROM path is {0} bytes long")]
    Path(usize),
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read ROM image: {0}")]
    Read(#[source] io::Error),
    #[error("ROM image is {0} bytes, expected {ROM_SIZE}")]
    Short(usize),
}

impl RomLoadError {
    /// Numeric status as reported on the debug console.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::Path(_) => -1,
            Self::Open { .. } => -2,
            Self::Read(_) => -3,
            Self::Short(_) => -4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaLibrary {
    folder: PathBuf,
}

impl MediaLibrary {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Create the folder if it does not exist yet.
    pub fn ensure_folder(&self) -> io::Result<()> {
        if !self.folder.is_dir() {
            fs::create_dir_all(&self.folder)?;
            info!("media: created {}", self.folder.display());
        }
        Ok(())
    }

    /// Path of the system ROM image.
    pub fn rom_path(&self) -> Result<PathBuf, RomLoadError> {
        let mut path = self.folder.to_string_lossy().into_owned();
        if !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(ROM_FILE);
        if path.len() > MAX_PATH_LEN {
            return Err(RomLoadError::Path(path.len()));
        }
        Ok(PathBuf::from(path))
    }

    /// Load the 16K system ROM. Extra bytes past 16K are ignored.
    pub fn load_rom(&self) -> Result<Vec<u8>, RomLoadError> {
        let path = self.rom_path()?;
        let file = File::open(&path).map_err(|source| RomLoadError::Open {
            path: path.clone(),
            source,
        })?;
        let mut rom = Vec::with_capacity(ROM_SIZE);
        file.take(ROM_SIZE as u64)
            .read_to_end(&mut rom)
            .map_err(RomLoadError::Read)?;
        if rom.len() < ROM_SIZE {
            return Err(RomLoadError::Short(rom.len()));
        }
        info!("media: loaded {}", path.display());
        Ok(rom)
    }

    /// Load the disk boot ROM, if there is a complete one.
    #[must_use]
    pub fn load_boot_rom(&self) -> Option<Vec<u8>> {
        let path = self.folder.join(BOOT_ROM_FILE);
        match fs::read(&path) {
            Ok(mut data) if data.len() >= BOOT_ROM_SIZE => {
                data.truncate(BOOT_ROM_SIZE);
                info!("media: loaded {}", path.display());
                Some(data)
            }
            Ok(data) => {
                debug!("media: {} is only {} bytes", path.display(), data.len());
                None
            }
            Err(e) => {
                debug!("media: no boot ROM ({e})");
                None
            }
        }
    }

    /// Disk images `d1.nib`, `d2.nib`, ... up to the first gap.
    #[must_use]
    pub fn disk_images(&self) -> Vec<PathBuf> {
        (1..)
            .map(|n| self.folder.join(format!("d{n}.nib")))
            .take_while(|path| path.is_file())
            .collect()
    }

    #[must_use]
    pub fn disk_count(&self) -> usize {
        self.disk_images().len()
    }

    /// Wave and block image paths for tape slot `index` (0-based).
    #[must_use]
    pub fn tape_paths(&self, index: u8) -> (PathBuf, PathBuf) {
        let n = u32::from(index) + 1;
        (
            self.folder.join(format!("f{n}.wav")),
            self.folder.join(format!("f{n}.tap")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rom_path_adds_one_separator() {
        let lib = MediaLibrary::new("/oric");
        assert_eq!(lib.rom_path().ok(), Some(PathBuf::from("/oric/rom.img")));
        let lib = MediaLibrary::new("/oric/");
        assert_eq!(lib.rom_path().ok(), Some(PathBuf::from("/oric/rom.img")));
    }

    #[test]
    fn overlong_path_is_rejected() {
        let lib = MediaLibrary::new(format!("/{}", "a".repeat(300)));
        let err = lib.rom_path().unwrap_err();
        assert_eq!(err.code(), -1);
    }

    #[test]
    fn rom_errors_carry_codes() {
        let dir = tempfile::tempdir().unwrap();
        let lib = MediaLibrary::new(dir.path());
        assert_eq!(lib.load_rom().unwrap_err().code(), -2);

        fs::write(dir.path().join(ROM_FILE), [0xEA; 100]).unwrap();
        let err = lib.load_rom().unwrap_err();
        assert_eq!(err.code(), -4);
        assert!(matches!(err, RomLoadError::Short(100)));

        fs::write(dir.path().join(ROM_FILE), vec![0xEA; ROM_SIZE + 10]).unwrap();
        assert_eq!(lib.load_rom().unwrap().len(), ROM_SIZE);
    }

    #[test]
    fn boot_rom_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let lib = MediaLibrary::new(dir.path());
        assert!(lib.load_boot_rom().is_none());
        fs::write(dir.path().join(BOOT_ROM_FILE), [1; 10]).unwrap();
        assert!(lib.load_boot_rom().is_none());
        fs::write(dir.path().join(BOOT_ROM_FILE), [1; BOOT_ROM_SIZE]).unwrap();
        assert_eq!(lib.load_boot_rom().map(|r| r.len()), Some(BOOT_ROM_SIZE));
    }

    #[test]
    fn disk_images_stop_at_first_gap() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["d1.nib", "d2.nib", "d4.nib"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let lib = MediaLibrary::new(dir.path());
        assert_eq!(lib.disk_count(), 2);
        assert!(lib.disk_images()[1].ends_with("d2.nib"));
    }

    #[test]
    fn tape_slots_are_one_based() {
        let lib = MediaLibrary::new("/m");
        let (wav, tap) = lib.tape_paths(0);
        assert_eq!(wav, PathBuf::from("/m/f1.wav"));
        assert_eq!(tap, PathBuf::from("/m/f1.tap"));
    }

    #[test]
    fn ensure_folder_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let lib = MediaLibrary::new(dir.path().join("media"));
        lib.ensure_folder().unwrap();
        assert!(lib.folder().is_dir());
        lib.ensure_folder().unwrap();
    }
}
