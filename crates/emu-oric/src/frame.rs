//! Frame loop: a frame of ticks, at most one host event, pacing.

use std::time::{Duration, Instant};

use emu_core::{Tickable, Ticks};
use log::debug;

use crate::display::DisplayHandle;
use crate::events::EventReceiver;
use crate::oric::{KeyAction, Oric};
use crate::overlay;
use crate::scancode;

/// CPU cycles per frame.
pub const TICKS_PER_FRAME: u64 = 19_968;
/// Wall-clock length of a frame at 1 MHz.
pub const FRAME_DURATION: Duration = Duration::from_micros(TICKS_PER_FRAME);

/// Host command: key pressed, scan code follows.
pub const CMD_KEYPRESS: u16 = 0x0BCD;
/// Host command: key released, scan code follows.
pub const CMD_KEYRELEASE: u16 = 0x0CBA;
/// Host command reserved for speed control. Ignored.
pub const CMD_BOOSTER: u16 = 0x0DEF;

const COMMAND_MASK: u16 = 0x0FFF;
const SCAN_CODE_MASK: u16 = 0x7F;

/// How long the "Loading" message stays up.
pub const MESSAGE_DURATION: Duration = Duration::from_secs(3);

/// What the frame did with the event it popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    KeyDown(u16),
    KeyUp(u16),
    /// Shift scan code: only the shift latch changed.
    Shift(bool),
    /// Control scan code: only the control latch changed.
    Ctrl(bool),
    Booster,
    /// A key command with no scan code behind it.
    MissingScanCode(u16),
    Unknown(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub dispatched: Option<Dispatched>,
    pub action: Option<KeyAction>,
    /// Video RAM went to the render thread.
    pub published: bool,
    pub exec_time: Duration,
}

pub struct FrameRunner {
    events: EventReceiver,
    display: Option<DisplayHandle>,
    shift: bool,
    ctrl: bool,
    frames: u64,
}

impl FrameRunner {
    #[must_use]
    pub fn new(events: EventReceiver) -> Self {
        Self {
            events,
            display: None,
            shift: false,
            ctrl: false,
            frames: 0,
        }
    }

    #[must_use]
    pub fn with_display(mut self, display: DisplayHandle) -> Self {
        self.display = Some(display);
        self
    }

    pub fn take_display(&mut self) -> Option<DisplayHandle> {
        self.display.take()
    }

    pub fn run_frame(&mut self, oric: &mut Oric) -> FrameReport {
        let start = Instant::now();

        oric.tick_n(Ticks::new(TICKS_PER_FRAME));

        let (dispatched, action) = self.process_event(oric);
        if let (Some(KeyAction::Media { slot }), Some(display)) = (action, self.display.as_mut()) {
            display.show_message(&overlay::loading_message(slot), MESSAGE_DURATION);
        }

        // Modifier-only frames age sticky keys too. Pacing stays with the caller.
        oric.update_keyboard();

        let mut published = false;
        if oric.take_screen_dirty() {
            if let Some(display) = self.display.as_mut() {
                published = display.publish_video(oric.video_ram());
                if !published {
                    oric.mark_screen_dirty();
                }
            }
        }

        self.frames += 1;
        FrameReport {
            dispatched,
            action,
            published,
            exec_time: start.elapsed(),
        }
    }

    fn process_event(&mut self, oric: &mut Oric) -> (Option<Dispatched>, Option<KeyAction>) {
        let Some(value) = self.events.pop() else {
            return (None, None);
        };

        let command = value & COMMAND_MASK;
        let dispatched = match command {
            CMD_KEYPRESS | CMD_KEYRELEASE => {
                let pressed = command == CMD_KEYPRESS;
                let Some(key) = self.events.pop() else {
                    debug!("frame: key command {value:#06x} without scan code");
                    return (Some(Dispatched::MissingScanCode(value)), None);
                };
                let scan = key & SCAN_CODE_MASK;
                if scancode::is_shift(scan) {
                    self.shift = pressed;
                    return (Some(Dispatched::Shift(pressed)), None);
                }
                if scancode::is_ctrl(scan) {
                    self.ctrl = pressed;
                    return (Some(Dispatched::Ctrl(pressed)), None);
                }
                debug!(
                    "scan_code: ${scan:02x}, {}, shift: {}",
                    if pressed { "DOWN" } else { "UP" },
                    if self.shift { 'Y' } else { 'N' }
                );
                let code = scancode::to_key_code_with_ctrl(scan, self.shift, self.ctrl);
                if pressed {
                    let action = oric.raw_key_down(code);
                    return (Some(Dispatched::KeyDown(code)), Some(action));
                }
                oric.raw_key_up(code);
                Dispatched::KeyUp(code)
            }
            CMD_BOOSTER => Dispatched::Booster,
            _ => Dispatched::Unknown(value),
        };
        (Some(dispatched), None)
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub fn shift_held(&self) -> bool {
        self.shift
    }

    #[must_use]
    pub fn ctrl_held(&self) -> bool {
        self.ctrl
    }
}

/// Sleeps away what is left of each frame.
pub struct Pacer {
    frame: Duration,
    overruns: u64,
}

impl Pacer {
    #[must_use]
    pub fn new(frame: Duration) -> Self {
        Self { frame, overruns: 0 }
    }

    /// Sleep for `frame - exec_time`. Returns the time slept, or `None`
    /// when the frame overran.
    pub fn pace(&mut self, exec_time: Duration) -> Option<Duration> {
        match self.frame.checked_sub(exec_time) {
            Some(rest) if !rest.is_zero() => {
                spin_sleep::sleep(rest);
                Some(rest)
            }
            _ => {
                let over = exec_time - self.frame;
                debug!("oric: frame overrun by {} us", over.as_micros());
                self.overruns += 1;
                None
            }
        }
    }

    #[must_use]
    pub fn overruns(&self) -> u64 {
        self.overruns
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(FRAME_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OricConfig, ROM_SIZE};
    use crate::events::event_queue;

    fn make_oric() -> Oric {
        let mut rom = vec![0xEA; ROM_SIZE];
        rom[0x3FFC] = 0x00;
        rom[0x3FFD] = 0xC0;
        let mut config = OricConfig::new(rom, None, "/nonexistent-oric-media");
        config.tape_enabled = false;
        Oric::new(config).unwrap()
    }

    #[test]
    fn runs_a_frame_of_ticks() {
        let (_tx, rx) = event_queue();
        let mut runner = FrameRunner::new(rx);
        let mut oric = make_oric();
        let report = runner.run_frame(&mut oric);
        assert_eq!(oric.ticks(), TICKS_PER_FRAME);
        assert_eq!(report.dispatched, None);
        assert!(!report.published);
    }

    #[test]
    fn one_event_per_frame() {
        let (mut tx, rx) = event_queue();
        let mut runner = FrameRunner::new(rx);
        let mut oric = make_oric();
        tx.push(CMD_BOOSTER);
        tx.push(0x0123);
        assert_eq!(runner.run_frame(&mut oric).dispatched, Some(Dispatched::Booster));
        assert_eq!(
            runner.run_frame(&mut oric).dispatched,
            Some(Dispatched::Unknown(0x0123))
        );
    }

    #[test]
    fn key_events_dispatch_mapped_codes() {
        let (mut tx, rx) = event_queue();
        let mut runner = FrameRunner::new(rx);
        let mut oric = make_oric();

        // Scan code 0x1E is 'a'; the Oric sees it as 'A'.
        tx.push(0xF000 | CMD_KEYPRESS);
        tx.push(0x1E);
        let report = runner.run_frame(&mut oric);
        assert_eq!(report.dispatched, Some(Dispatched::KeyDown(u16::from(b'a'))));
        assert_eq!(report.action, Some(KeyAction::Matrix));
        assert!(oric.keyboard().is_pressed(u16::from(b'A')));

        tx.push(CMD_KEYRELEASE);
        tx.push(0x9E);
        let report = runner.run_frame(&mut oric);
        assert_eq!(report.dispatched, Some(Dispatched::KeyUp(u16::from(b'a'))));
    }

    #[test]
    fn modifiers_only_latch() {
        let (mut tx, rx) = event_queue();
        let mut runner = FrameRunner::new(rx);
        let mut oric = make_oric();
        tx.push(CMD_KEYPRESS);
        tx.push(0x2A);
        assert_eq!(runner.run_frame(&mut oric).dispatched, Some(Dispatched::Shift(true)));
        assert!(runner.shift_held());

        tx.push(CMD_KEYPRESS);
        tx.push(0x1D);
        assert_eq!(runner.run_frame(&mut oric).dispatched, Some(Dispatched::Ctrl(true)));
        assert!(runner.ctrl_held());

        // Ctrl+L clears the screen on the Oric.
        tx.push(CMD_KEYPRESS);
        tx.push(0x26);
        assert_eq!(runner.run_frame(&mut oric).dispatched, Some(Dispatched::KeyDown(0x0C)));
    }

    #[test]
    fn key_command_without_scan_code_is_dropped() {
        let (mut tx, rx) = event_queue();
        let mut runner = FrameRunner::new(rx);
        let mut oric = make_oric();
        tx.push(CMD_KEYPRESS);
        assert_eq!(
            runner.run_frame(&mut oric).dispatched,
            Some(Dispatched::MissingScanCode(CMD_KEYPRESS))
        );
    }

    #[test]
    fn pacer_sleeps_the_remainder() {
        let mut pacer = Pacer::new(Duration::from_millis(2));
        assert_eq!(
            pacer.pace(Duration::from_millis(1)),
            Some(Duration::from_millis(1))
        );
        assert_eq!(pacer.pace(Duration::from_millis(3)), None);
        assert_eq!(pacer.pace(Duration::from_millis(2)), None);
        assert_eq!(pacer.overruns(), 2);
    }
}
