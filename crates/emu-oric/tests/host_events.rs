//! Host events through the frame loop.

use emu_oric::config::ROM_SIZE;
use emu_oric::frame::{CMD_KEYPRESS, CMD_KEYRELEASE, Dispatched};
use emu_oric::scancode::KEY_F1;
use emu_oric::{FrameRunner, KeyAction, Oric, OricConfig, event_queue};
use tempfile::TempDir;

/// The media folder lives as long as the returned guard.
fn make_oric() -> (Oric, TempDir) {
    let mut rom = vec![0xEA; ROM_SIZE];
    rom[0x3FFC] = 0x00;
    rom[0x3FFD] = 0xC0;
    let dir = tempfile::tempdir().unwrap();
    let oric = Oric::new(OricConfig::new(rom, None, dir.path())).unwrap();
    (oric, dir)
}

#[test]
fn f7_scan_code_selects_media_slot_seven() {
    let (mut tx, rx) = event_queue();
    let mut runner = FrameRunner::new(rx);
    let (mut oric, dir) = make_oric();

    assert!(tx.push(CMD_KEYPRESS));
    assert!(tx.push(0x0041));
    let report = runner.run_frame(&mut oric);
    assert_eq!(report.dispatched, Some(Dispatched::KeyDown(KEY_F1 + 6)));
    assert_eq!(report.action, Some(KeyAction::Media { slot: 7 }));
    // No f7 tape in the folder: nothing is loaded.
    assert!(dir.path().is_dir());
    assert!(!oric.tape().unwrap().is_loaded());
}

#[test]
fn shift_only_latches() {
    let (mut tx, rx) = event_queue();
    let mut runner = FrameRunner::new(rx);
    let (mut oric, _dir) = make_oric();

    tx.push(CMD_KEYPRESS);
    tx.push(0x36);
    let report = runner.run_frame(&mut oric);
    assert_eq!(report.dispatched, Some(Dispatched::Shift(true)));
    assert_eq!(report.action, None);

    // Shifted '1' is '!'.
    tx.push(CMD_KEYPRESS);
    tx.push(0x02);
    let report = runner.run_frame(&mut oric);
    assert_eq!(report.dispatched, Some(Dispatched::KeyDown(u16::from(b'!'))));
    assert!(oric.keyboard().is_pressed(u16::from(b'!')));

    tx.push(CMD_KEYRELEASE);
    tx.push(0x36);
    assert_eq!(runner.run_frame(&mut oric).dispatched, Some(Dispatched::Shift(false)));
}

#[test]
fn snooped_addresses_carry_commands() {
    let (mut tx, rx) = event_queue();
    let mut runner = FrameRunner::new(rx);
    let (mut oric, _dir) = make_oric();

    // The transport sees ROM reads in the $F000 page.
    assert!(!tx.snoop(0x0BCD));
    assert!(tx.snoop(0xF000 | CMD_KEYPRESS));
    assert!(tx.snoop(0xF01E));
    let report = runner.run_frame(&mut oric);
    assert_eq!(report.dispatched, Some(Dispatched::KeyDown(u16::from(b'a'))));
    assert!(oric.keyboard().is_pressed(u16::from(b'A')));
}

#[test]
fn tapped_key_stays_down_for_two_frames() {
    let (mut oric, _dir) = make_oric();
    let a = u16::from(b'A');
    oric.key_down(a);
    oric.key_up(a);
    assert!(oric.keyboard().is_pressed(a));
    oric.update_keyboard();
    assert!(oric.keyboard().is_pressed(a));
    oric.update_keyboard();
    assert!(!oric.keyboard().is_pressed(a));
}

#[test]
fn modifier_frames_still_age_sticky_keys() {
    let (mut tx, rx) = event_queue();
    let mut runner = FrameRunner::new(rx);
    let (mut oric, _dir) = make_oric();
    let a = u16::from(b'A');
    oric.key_down(a);
    oric.key_up(a);

    tx.push(CMD_KEYPRESS);
    tx.push(0x2A);
    assert_eq!(runner.run_frame(&mut oric).dispatched, Some(Dispatched::Shift(true)));
    assert!(oric.keyboard().is_pressed(a));

    tx.push(CMD_KEYRELEASE);
    tx.push(0x2A);
    assert_eq!(runner.run_frame(&mut oric).dispatched, Some(Dispatched::Shift(false)));
    assert!(!oric.keyboard().is_pressed(a));
    assert_eq!(runner.frames(), 2);
}
