//! Terminal state when the system ROM cannot be loaded.

use std::time::Duration;

use log::error;

use crate::display::FrameSink;
use crate::media::RomLoadError;
use crate::overlay;
use crate::video::{HEIGHT, WIDTH};

/// Time between display toggles.
pub const BLINK_INTERVAL: Duration = Duration::from_millis(1000);

pub const NO_ROM_MESSAGE: &str = "NO ROM FOUND";

/// Shows "NO ROM FOUND" and flips the display buffer once a second,
/// forever.
pub struct NoRomHalt {
    fb: Vec<u8>,
    sink: Box<dyn FrameSink>,
    toggle: bool,
}

impl NoRomHalt {
    pub fn new(error: &RomLoadError, sink: Box<dyn FrameSink>) -> Self {
        error!("rom.img load error: {} ({error})", error.code());
        let mut fb = vec![0; WIDTH * HEIGHT];
        overlay::show_message(&mut fb, NO_ROM_MESSAGE);
        Self {
            fb,
            sink,
            toggle: false,
        }
    }

    /// Flip the toggle and present the message. Returns the new toggle.
    pub fn step(&mut self) -> bool {
        self.toggle = !self.toggle;
        self.sink.present(&self.fb, u8::from(self.toggle));
        self.toggle
    }

    pub fn run(mut self) -> ! {
        loop {
            self.step();
            spin_sleep::sleep(BLINK_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl FrameSink for Shared {
        fn present(&mut self, pixels: &[u8], buffer: u8) {
            assert!(pixels.contains(&7));
            self.0.lock().unwrap().push(buffer);
        }
    }

    #[test]
    fn toggles_each_step() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut halt = NoRomHalt::new(&RomLoadError::Short(3), Box::new(Shared(seen.clone())));
        assert!(halt.step());
        assert!(!halt.step());
        assert!(halt.step());
        assert_eq!(*seen.lock().unwrap(), [1, 0, 1]);
    }
}
