//! Headless capture: PNG screenshots and frame dumps.

use std::error::Error;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::warn;

use crate::Oric;
use crate::display::FrameSink;
use crate::palette;
use crate::video::{HEIGHT, Screen, WIDTH};

/// Save an indexed framebuffer as a PNG file.
pub fn save_pixels(pixels: &[u8], path: &Path) -> Result<(), Box<dyn Error>> {
    let file = fs::File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), WIDTH as u32, HEIGHT as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    // Colour index → RGBA bytes
    let mut rgba = Vec::with_capacity(pixels.len() * 4);
    for &index in pixels {
        let argb = palette::argb(index);
        rgba.extend_from_slice(&[(argb >> 16) as u8, (argb >> 8) as u8, argb as u8, 0xFF]);
    }

    writer.write_image_data(&rgba)?;
    Ok(())
}

/// Decode the current screen and save it as a PNG file.
pub fn save_screenshot(oric: &Oric, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut screen = Screen::new();
    screen.render(oric.video_ram());
    save_pixels(screen.pixels(), path)
}

/// Writes every presented frame to `<dir>/<n>.png`.
pub struct PngSink {
    dir: PathBuf,
    count: u64,
}

impl PngSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, Box<dyn Error>> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, count: 0 })
    }
}

impl FrameSink for PngSink {
    fn present(&mut self, pixels: &[u8], _buffer: u8) {
        self.count += 1;
        let path = self.dir.join(format!("{:06}.png", self.count));
        if let Err(e) = save_pixels(pixels, &path) {
            warn!("capture: {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_png_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PngSink::new(dir.path().join("frames")).unwrap();
        let pixels = vec![3; WIDTH * HEIGHT];
        sink.present(&pixels, 0);
        sink.present(&pixels, 1);
        let first = fs::read(dir.path().join("frames/000001.png")).unwrap();
        assert_eq!(&first[1..4], b"PNG");
        assert!(dir.path().join("frames/000002.png").exists());
    }
}
