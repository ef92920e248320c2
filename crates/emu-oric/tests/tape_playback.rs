//! Tape insertion and playback through the machine.

use std::fs;

use emu_core::{Bus, Observable, Tickable, Value};
use emu_oric::config::ROM_SIZE;
use emu_oric::{MediaLibrary, Oric, OricConfig, TapeDrive};
use format_oric_tap::{TapBlock, decode_wave};

fn nop_rom() -> Vec<u8> {
    let mut rom = vec![0xEA; ROM_SIZE];
    rom[0x3FFC] = 0x00;
    rom[0x3FFD] = 0xC0;
    rom
}

fn write_tap(dir: &std::path::Path, slot: u8) -> TapBlock {
    let block = TapBlock::new(b"HELLO", 0x0400, &[0xA9, 0x01, 0x60, 0x00], 0x80, false);
    fs::write(dir.join(format!("f{slot}.tap")), block.to_tap_bytes()).unwrap();
    block
}

#[test]
fn tap_is_converted_on_insert() {
    let dir = tempfile::tempdir().unwrap();
    let block = write_tap(dir.path(), 1);
    assert_eq!(block.start(), 0x0400);
    assert_eq!(block.end(), 0x0403);

    let lib = MediaLibrary::new(dir.path());
    let mut drive = TapeDrive::new();
    let size = drive.insert(0, &lib).unwrap();
    assert!(size > 0);

    let wave = fs::read(dir.path().join("f1.wav")).unwrap();
    assert_eq!(u32::from_le_bytes([wave[0], wave[1], wave[2], wave[3]]), size);
    let blocks = decode_wave(&wave).unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].start(), 0x0400);
    assert_eq!(blocks[0].end(), 0x0403);
    assert_eq!(blocks[0].data, block.data);
}

#[test]
fn size_times_eight_ticks_drain_the_tape() {
    let dir = tempfile::tempdir().unwrap();
    write_tap(dir.path(), 1);
    let lib = MediaLibrary::new(dir.path());
    let mut drive = TapeDrive::new();
    let size = drive.insert(0, &lib).unwrap();
    drive.set_motor(true);

    let mut last = 0;
    for _ in 0..u64::from(size) * 8 {
        assert!(drive.position() <= drive.size());
        assert!(drive.position() >= last);
        last = drive.position();
        drive.tick();
    }
    assert!(!drive.is_loaded());
    assert_eq!(drive.size(), 0);

    // Removing from an empty drive changes nothing.
    let port = drive.port();
    drive.remove();
    assert_eq!(drive.port(), port);
    assert_eq!(drive.position(), 0);
}

#[test]
fn wave_file_is_reused() {
    let dir = tempfile::tempdir().unwrap();
    write_tap(dir.path(), 2);
    let lib = MediaLibrary::new(dir.path());
    let mut drive = TapeDrive::new();
    let first = drive.insert(1, &lib).unwrap();
    fs::remove_file(dir.path().join("f2.tap")).unwrap();
    assert_eq!(drive.insert(1, &lib).unwrap(), first);
    assert_eq!(drive.slot(), Some(1));
}

#[test]
fn machine_plays_tape_when_the_motor_runs() {
    let dir = tempfile::tempdir().unwrap();
    write_tap(dir.path(), 1);
    let mut oric = Oric::new(OricConfig::new(nop_rom(), None, dir.path())).unwrap();
    oric.insert_tape(0).unwrap();

    // Motor off: the tape stays put.
    for _ in 0..10_000 {
        oric.tick();
    }
    assert_eq!(oric.query("tape.position"), Some(Value::U32(0)));
    assert_eq!(oric.query("tape.bit"), Some(Value::U8(7)));

    // PB6 high starts the motor; one cell every 208 cycles.
    oric.bus_mut().write(0x0302, 0x40);
    oric.bus_mut().write(0x0300, 0x40);
    for _ in 0..208 * 8 {
        oric.tick();
    }
    assert_eq!(oric.query("tape.motor"), Some(Value::Bool(true)));
    assert_eq!(oric.query("tape.position"), Some(Value::U32(1)));
}
