//! Render thread.
//!
//! The emulation thread publishes copies of RAM whenever the screen area
//! changed; the render thread wakes once per frame period, decodes the
//! newest copy (or draws the active status message instead) and hands the
//! pixels to a [`FrameSink`]. Both directions are lock-free SPSC rings.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::config::RAM_SIZE;
use crate::overlay;
use crate::video::Screen;

/// Refresh period of the render thread.
pub const REFRESH: Duration = Duration::from_micros(19_968);

/// Video frames in flight: one being decoded, one waiting.
const VIDEO_SLOTS: usize = 2;
const MESSAGE_SLOTS: usize = 4;

/// Receives finished frames.
pub trait FrameSink: Send {
    /// `pixels` holds `video::WIDTH * video::HEIGHT` colour indices.
    /// `buffer` alternates between 0 and 1 on every frame.
    fn present(&mut self, pixels: &[u8], buffer: u8);
}

/// Discards frames.
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _pixels: &[u8], _buffer: u8) {}
}

struct Message {
    text: String,
    duration: Duration,
}

/// Render-side state, stepped once per refresh.
struct Renderer {
    screen: Screen,
    ram: Vec<u8>,
    video: HeapCons<Vec<u8>>,
    messages: HeapCons<Message>,
    message: Option<(String, Instant)>,
    buffer: u8,
    presented: u64,
}

impl Renderer {
    fn new(video: HeapCons<Vec<u8>>, messages: HeapCons<Message>) -> Self {
        Self {
            screen: Screen::new(),
            ram: vec![0; RAM_SIZE],
            video,
            messages,
            message: None,
            buffer: 0,
            presented: 0,
        }
    }

    /// One refresh. Returns whether a frame went to the sink.
    fn refresh(&mut self, now: Instant, sink: &mut dyn FrameSink) -> bool {
        let mut dirty = false;
        while let Some(ram) = self.video.try_pop() {
            self.ram = ram;
            dirty = true;
        }
        while let Some(msg) = self.messages.try_pop() {
            self.message = Some((msg.text, now + msg.duration));
        }

        let expired = self
            .message
            .as_ref()
            .is_some_and(|(_, until)| now >= *until);
        if expired {
            self.message = None;
        }

        let produced = if let Some((text, _)) = &self.message {
            overlay::show_message(self.screen.pixels_mut(), text);
            true
        } else if expired {
            self.screen.render(&self.ram);
            true
        } else {
            self.screen.update(&self.ram, dirty)
        };

        if produced {
            self.buffer ^= 1;
            sink.present(self.screen.pixels(), self.buffer);
            self.presented += 1;
        }
        produced
    }
}

/// Emulation-side handle to the render thread.
pub struct DisplayHandle {
    video: HeapProd<Vec<u8>>,
    messages: HeapProd<Message>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<u64>>,
}

/// Start the render thread.
pub fn spawn_renderer(mut sink: Box<dyn FrameSink>) -> io::Result<DisplayHandle> {
    let (video_tx, video_rx) = HeapRb::<Vec<u8>>::new(VIDEO_SLOTS).split();
    let (msg_tx, msg_rx) = HeapRb::<Message>::new(MESSAGE_SLOTS).split();
    let running = Arc::new(AtomicBool::new(true));

    let flag = Arc::clone(&running);
    let thread = thread::Builder::new()
        .name("oric-render".into())
        .spawn(move || {
            let mut renderer = Renderer::new(video_rx, msg_rx);
            let mut next = Instant::now();
            while flag.load(Ordering::Acquire) {
                renderer.refresh(Instant::now(), sink.as_mut());
                next += REFRESH;
                spin_sleep::sleep(next.saturating_duration_since(Instant::now()));
            }
            renderer.presented
        })?;

    Ok(DisplayHandle {
        video: video_tx,
        messages: msg_tx,
        running,
        thread: Some(thread),
    })
}

impl DisplayHandle {
    /// Hand a copy of RAM to the renderer. Returns false when both slots
    /// are still queued; the caller should try again next frame.
    pub fn publish_video(&mut self, ram: &[u8]) -> bool {
        self.video.try_push(ram.to_vec()).is_ok()
    }

    /// Show `text` instead of the screen for `duration`.
    pub fn show_message(&mut self, text: &str, duration: Duration) {
        let msg = Message {
            text: text.to_owned(),
            duration,
        };
        if self.messages.try_push(msg).is_err() {
            debug!("display: message dropped: {text}");
        }
    }

    /// Stop the thread and wait for it. Returns the number of frames it
    /// presented.
    pub fn stop(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        self.running.store(false, Ordering::Release);
        match self.thread.take().map(JoinHandle::join) {
            Some(Ok(frames)) => frames,
            Some(Err(_)) => {
                warn!("display: render thread panicked");
                0
            }
            None => 0,
        }
    }
}

impl Drop for DisplayHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
