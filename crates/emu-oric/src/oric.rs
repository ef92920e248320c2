//! Top-level Oric system.
//!
//! One tick is one CPU cycle at 1 MHz. Slower devices run off the tick
//! counter:
//!
//! | Divisor | Device |
//! |---|---|
//! | 1 | 6502 |
//! | 4 | VIA (4 cycles at once), PSG bus, keyboard sense, tape motor |
//! | 128 | Disk II nibble |
//! | 208 | tape bit cell (every 52nd VIA pass) |
//!
//! The PSG sits behind VIA port A: CB2 is BDIR and CA2 is BC1. PSG port A
//! drives the keyboard columns; VIA PB0-2 select the row and PB3 senses it.

use std::path::{Path, PathBuf};

use drive_disk2::{Disk2, NibImage};
use emu_core::{Cpu, Observable, Tickable, Ticks, Value};
use gi_ay_3_8912::{Ay38912, SOUND_REGISTERS};
use log::{debug, info, warn};
use mos_6502::Mos6502;

use crate::OricError;
use crate::bus::OricBus;
use crate::config::{OricConfig, ROM_SIZE};
use crate::keyboard::KeyboardMatrix;
use crate::keymap;
use crate::media::MediaLibrary;
use crate::psg_queue::PsgWriteQueue;
use crate::scancode::{KEY_F1, KEY_F10, KEY_NMI, KEY_RESET};
use crate::snapshot::{CpuState, Snapshot};
use crate::tape::TapeDrive;

/// VIA passes per tape bit cell.
pub const TAPE_DIVIDER: u8 = 52;

const DEVICE_TICK_MASK: u64 = 3;
const FDC_TICK_MASK: u64 = 127;
const VIA_CYCLES_PER_PASS: u32 = 4;

/// PB3: keyboard row sense.
const PB_KEY_SENSE: u8 = 0x08;
/// PB6: cassette motor relay.
const PB_TAPE_MOTOR: u8 = 0x40;

/// What a raw key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Passed to the keyboard matrix.
    Matrix,
    /// A function key selected media slot `slot` (1-based).
    Media { slot: u8 },
    Nmi,
    Reset,
}

pub struct Oric {
    cpu: Mos6502,
    bus: OricBus,
    psg: Ay38912,
    kbd: KeyboardMatrix,
    tape: Option<TapeDrive>,
    psg_queue: PsgWriteQueue,
    ticks: Ticks,
    tape_divider: u8,
    motor_latch: bool,
    media: MediaLibrary,
    disk_images: Vec<PathBuf>,
}

impl Oric {
    /// Build a machine. The CPU fetches the reset vector on the first tick.
    pub fn new(config: OricConfig) -> Result<Self, OricError> {
        if config.rom.len() != ROM_SIZE {
            return Err(OricError::RomSize(config.rom.len()));
        }

        let fdc = match (&config.boot_rom, config.fdc_enabled) {
            (Some(_), true) => Some(Disk2::new()),
            (None, true) => {
                info!("oric: no boot ROM, floppy controller disabled");
                None
            }
            (_, false) => None,
        };
        let bus = OricBus::new(&config.rom, config.boot_rom.as_deref(), fdc);

        let mut cpu = Mos6502::new();
        cpu.reset();

        let media = MediaLibrary::new(config.media_folder);
        let disk_images = media.disk_images();
        info!(
            "oric: tape {}, floppy {}, {} disk images",
            if config.tape_enabled { "on" } else { "off" },
            if bus.fdc.is_some() { "on" } else { "off" },
            disk_images.len()
        );

        Ok(Self {
            cpu,
            bus,
            psg: Ay38912::new(),
            kbd: keymap::oric_keyboard(),
            tape: config.tape_enabled.then(TapeDrive::new),
            psg_queue: PsgWriteQueue::new(),
            ticks: Ticks::ZERO,
            tape_divider: 0,
            motor_latch: false,
            media,
            disk_images,
        })
    }

    /// Reset button: devices to power-on state, CPU through the vector.
    /// RAM and inserted disks survive; the tape is taken out.
    pub fn reset(&mut self) {
        info!("oric: reset");
        self.bus.reset();
        self.psg.reset();
        if let Some(tape) = self.tape.as_mut() {
            tape.reset();
        }
        self.kbd.release_all();
        self.kbd.set_active_columns(0);
        self.motor_latch = false;
        self.tape_divider = 0;
        self.cpu.reset();
    }

    pub fn nmi(&mut self) {
        debug!("oric: NMI");
        self.cpu.nmi();
    }

    /// Shut the machine down, closing the tape and ejecting disks.
    pub fn discard(mut self) {
        if let Some(tape) = self.tape.as_mut() {
            tape.remove();
        }
        if let Some(fdc) = self.bus.fdc.as_mut() {
            fdc.eject_disk(0);
            fdc.eject_disk(1);
        }
        info!("oric: discarded after {} ticks", self.ticks);
    }

    fn tick_devices(&mut self) {
        let irq = self.bus.via.tick(VIA_CYCLES_PER_PASS);
        self.cpu.set_irq(irq);

        let via = &mut self.bus.via;
        if via.cb2() {
            let data = via.pa();
            if via.ca2() {
                self.psg.latch_address(data);
            } else {
                let address = self.psg.address();
                if address < SOUND_REGISTERS {
                    self.psg_queue
                        .push((u16::from(address) << 8) | u16::from(data));
                }
                if let Some(out) = self.psg.write(data) {
                    self.kbd.set_active_columns(out ^ 0xFF);
                }
            }
        } else {
            via.set_pa(self.psg.read());
        }

        let pb = via.pb();
        let line_mask = 1u8 << (pb & 7);
        if self.kbd.scan_lines() == line_mask {
            via.set_pb(pb | PB_KEY_SENSE);
        } else {
            via.set_pb(pb & !PB_KEY_SENSE);
        }
        // Floating PB6 reads high after reset; only a driven bit runs the motor.
        let motor = via.pb_driven() & PB_TAPE_MOTOR != 0;

        if let Some(tape) = self.tape.as_mut() {
            if motor != self.motor_latch {
                tape.set_motor(motor);
                debug!("oric: motor {}", if motor { "on" } else { "off" });
                self.motor_latch = motor;
            }

            self.tape_divider += 1;
            if self.tape_divider == TAPE_DIVIDER {
                tape.tick();
                self.tape_divider = 0;
            }
            self.bus.via.set_cb1(tape.read_line());
        }
    }

    /// Key code pressed on the host, before the Oric layout applies.
    ///
    /// Letter case is swapped first: the Oric types capitals unshifted.
    pub fn raw_key_down(&mut self, code: u16) -> KeyAction {
        let code = swap_case(code);
        match code {
            KEY_F1..=KEY_F10 => {
                let index = (code - KEY_F1) as u8;
                self.select_media(index);
                KeyAction::Media { slot: index + 1 }
            }
            KEY_NMI => {
                self.nmi();
                KeyAction::Nmi
            }
            KEY_RESET => {
                self.reset();
                KeyAction::Reset
            }
            _ => {
                self.kbd.key_down(code);
                KeyAction::Matrix
            }
        }
    }

    pub fn raw_key_up(&mut self, code: u16) {
        self.kbd.key_up(swap_case(code));
    }

    /// Function key slots list the disk images first, then the tapes.
    fn select_media(&mut self, index: u8) {
        let disks = self.disk_images.len();
        if usize::from(index) < disks {
            if self.bus.fdc.is_none() {
                return;
            }
            let path = self.disk_images[usize::from(index)].clone();
            match self.insert_disk(0, &path) {
                Ok(()) => info!("oric: disk image {} inserted", path.display()),
                Err(e) => warn!("oric: failed to insert disk image {}: {e}", path.display()),
            }
        } else {
            let index = index - disks as u8;
            if self.tape.is_none() {
                return;
            }
            match self.insert_tape(index) {
                Ok(_) => info!("oric: tape image {index} inserted"),
                Err(e) => warn!("oric: failed to insert tape image {index}: {e}"),
            }
        }
    }

    pub fn key_down(&mut self, code: u16) {
        self.kbd.key_down(code);
    }

    pub fn key_up(&mut self, code: u16) {
        self.kbd.key_up(code);
    }

    /// Age sticky keys by one frame.
    pub fn update_keyboard(&mut self) {
        self.kbd.update();
    }

    /// Insert tape slot `index` (0-based). Returns the wave body size.
    pub fn insert_tape(&mut self, index: u8) -> Result<u32, OricError> {
        let tape = self.tape.as_mut().ok_or(OricError::NoTape)?;
        Ok(tape.insert(index, &self.media)?)
    }

    pub fn eject_tape(&mut self) {
        if let Some(tape) = self.tape.as_mut() {
            tape.remove();
        }
    }

    /// Load a `.nib` file into `drive` (0 or 1).
    pub fn insert_disk(&mut self, drive: usize, path: &Path) -> Result<(), OricError> {
        let fdc = self.bus.fdc.as_mut().ok_or(OricError::NoFloppy)?;
        let image = NibImage::load(path)?;
        fdc.insert_disk(drive, image);
        Ok(())
    }

    pub fn insert_disk_image(&mut self, drive: usize, image: NibImage) -> Result<(), OricError> {
        let fdc = self.bus.fdc.as_mut().ok_or(OricError::NoFloppy)?;
        fdc.insert_disk(drive, image);
        Ok(())
    }

    /// PSG register writes since the last call, `(register << 8) | value`.
    pub fn take_psg_writes(&mut self) -> Vec<u16> {
        self.psg_queue.drain()
    }

    #[must_use]
    pub fn psg_queue(&self) -> &PsgWriteQueue {
        &self.psg_queue
    }

    /// RAM from `$0000`, as the video decoder reads it.
    #[must_use]
    pub fn video_ram(&self) -> &[u8] {
        &self.bus.ram
    }

    pub fn take_screen_dirty(&mut self) -> bool {
        self.bus.take_screen_dirty()
    }

    pub fn mark_screen_dirty(&mut self) {
        self.bus.mark_screen_dirty();
    }

    #[must_use]
    pub fn cpu(&self) -> &Mos6502 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Mos6502 {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &OricBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut OricBus {
        &mut self.bus
    }

    #[must_use]
    pub fn psg(&self) -> &Ay38912 {
        &self.psg
    }

    #[must_use]
    pub fn keyboard(&self) -> &KeyboardMatrix {
        &self.kbd
    }

    #[must_use]
    pub fn tape(&self) -> Option<&TapeDrive> {
        self.tape.as_ref()
    }

    #[must_use]
    pub fn media(&self) -> &MediaLibrary {
        &self.media
    }

    #[must_use]
    pub fn disk_count(&self) -> usize {
        self.disk_images.len()
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    /// Capture the machine. See [`Snapshot`] for what is left out.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let regs = self.cpu.regs;
        Snapshot {
            cpu: CpuState {
                a: regs.a,
                x: regs.x,
                y: regs.y,
                s: regs.s,
                p: regs.p.0,
                pc: regs.pc,
            },
            ticks: self.ticks.get(),
            tape_divider: self.tape_divider,
            motor: self.motor_latch,
            via: self.bus.via.save_state(),
            psg_registers: *self.psg.registers(),
            psg_address: self.psg.address(),
            keyboard_columns: self.kbd.active_columns(),
            boot_extension: self.bus.boot_extension(),
            tape: self.tape.as_ref().map(TapeDrive::state),
            ram: self.bus.ram.clone(),
        }
    }

    /// Put the machine back to `snapshot`. Tape signal lines stay as they
    /// are; the tape position is applied only to a tape of the same size.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        let cpu = snapshot.cpu;
        self.cpu.regs.a = cpu.a;
        self.cpu.regs.x = cpu.x;
        self.cpu.regs.y = cpu.y;
        self.cpu.regs.s = cpu.s;
        self.cpu.regs.p.0 = cpu.p;
        self.cpu.regs.pc = cpu.pc;

        let n = snapshot.ram.len().min(self.bus.ram.len());
        self.bus.ram[..n].copy_from_slice(&snapshot.ram[..n]);
        self.bus.via.load_state(&snapshot.via);
        self.bus.set_boot_extension(snapshot.boot_extension);
        self.bus.mark_screen_dirty();
        self.psg
            .load_registers(&snapshot.psg_registers, snapshot.psg_address);
        self.kbd.set_active_columns(snapshot.keyboard_columns);

        self.ticks = Ticks::new(snapshot.ticks);
        self.tape_divider = snapshot.tape_divider % TAPE_DIVIDER;
        self.motor_latch = snapshot.motor;
        if let (Some(tape), Some(state)) = (self.tape.as_mut(), snapshot.tape) {
            tape.restore(state);
        }
        info!("oric: snapshot restored at tick {}", self.ticks);
    }
}

fn swap_case(code: u16) -> u16 {
    match u8::try_from(code) {
        Ok(c) if c.is_ascii_alphabetic() => u16::from(c ^ 0x20),
        _ => code,
    }
}

impl Tickable for Oric {
    fn tick(&mut self) {
        self.cpu.tick(&mut self.bus);

        if self.ticks.is_aligned(FDC_TICK_MASK) {
            if let Some(fdc) = self.bus.fdc.as_mut() {
                fdc.tick();
            }
        }

        if self.ticks.is_aligned(DEVICE_TICK_MASK) {
            self.tick_devices();
        }

        self.ticks = self.ticks.next();
    }
}

fn parse_address(text: &str) -> Option<u16> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).ok()
    } else if let Some(hex) = text.strip_prefix('$') {
        u16::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

impl Observable for Oric {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("via.") {
            self.bus.via.query(rest)
        } else if let Some(rest) = path.strip_prefix("psg.") {
            self.psg.query(rest)
        } else if let Some(rest) = path.strip_prefix("fdc.") {
            self.bus.fdc.as_ref().and_then(|fdc| fdc.query(rest))
        } else if let Some(rest) = path.strip_prefix("tape.") {
            let tape = self.tape.as_ref()?;
            match rest {
                "motor" => Some(tape.is_motor_on().into()),
                "read" => Some(tape.read_line().into()),
                "port" => Some(tape.port().into()),
                "loaded" => Some(tape.is_loaded().into()),
                "position" => Some(tape.position().into()),
                "bit" => Some(tape.bit_position().into()),
                "size" => Some(tape.size().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("keyboard.") {
            match rest {
                "columns" => Some(self.kbd.active_columns().into()),
                "lines" => Some(self.kbd.scan_lines().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("memory.") {
            parse_address(rest).map(|a| Value::U8(self.bus.peek(a)))
        } else {
            match path {
                "ticks" => Some(self.ticks.get().into()),
                "boot_bank" => Some(self.bus.boot_extension().into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<6502_paths>",
            "via.<6522_paths>",
            "psg.<ay_paths>",
            "fdc.<disk2_paths>",
            "tape.motor",
            "tape.read",
            "tape.port",
            "tape.loaded",
            "tape.position",
            "tape.bit",
            "tape.size",
            "keyboard.columns",
            "keyboard.lines",
            "memory.<address>",
            "ticks",
            "boot_bank",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::Bus;

    /// ROM whose reset vector points at `$C000`, filled with NOPs.
    fn nop_rom() -> Vec<u8> {
        let mut rom = vec![0xEA; ROM_SIZE];
        rom[0x3FFC] = 0x00;
        rom[0x3FFD] = 0xC0;
        rom
    }

    fn make_oric() -> Oric {
        let dir = std::env::temp_dir().join("emu-oric-none");
        Oric::new(OricConfig::new(nop_rom(), None, dir)).expect("valid config")
    }

    #[test]
    fn rejects_wrong_rom_size() {
        let config = OricConfig::new(vec![0; 100], None, "/nowhere");
        assert!(matches!(Oric::new(config), Err(OricError::RomSize(100))));
    }

    #[test]
    fn first_tick_fetches_reset_vector() {
        let mut oric = make_oric();
        oric.tick();
        assert_eq!(oric.cpu().regs.pc, 0xC000);
        assert_eq!(oric.ticks(), 1);
    }

    #[test]
    fn floppy_needs_boot_rom() {
        let oric = make_oric();
        assert!(oric.bus().fdc.is_none());
        let config = OricConfig::new(nop_rom(), Some(vec![0x60; 512]), "/nowhere");
        let oric = Oric::new(config).unwrap();
        assert!(oric.bus().fdc.is_some());
        assert_eq!(oric.bus().peek(0x0320), 0x60);
    }

    #[test]
    fn psg_writes_go_through_via_port_a() {
        let mut oric = make_oric();
        let via = &mut oric.bus_mut().via;
        // PCR: CA2 and CB2 manual outputs. DDRA all output.
        via.write(0x03, 0xFF);

        // Latch register 8 (BDIR high, BC1 high).
        via.write(0x01, 0x08);
        via.write(0x0C, 0xEE);
        oric.tick_devices();
        assert_eq!(oric.psg().address(), 8);

        // Write 0x0F (BDIR high, BC1 low).
        let via = &mut oric.bus_mut().via;
        via.write(0x01, 0x0F);
        via.write(0x0C, 0xEC);
        oric.tick_devices();
        assert_eq!(oric.psg().registers()[8], 0x0F);
        assert_eq!(oric.take_psg_writes(), vec![0x080F]);
    }

    #[test]
    fn port_a_register_sets_keyboard_columns_without_queueing() {
        let mut oric = make_oric();
        let via = &mut oric.bus_mut().via;
        via.write(0x03, 0xFF);
        // Mixer: port A output.
        for (reg, value) in [(7u8, 0x40u8), (14, 0xDF)] {
            let via = &mut oric.bus_mut().via;
            via.write(0x01, reg);
            via.write(0x0C, 0xEE);
            oric.tick_devices();
            let via = &mut oric.bus_mut().via;
            via.write(0x01, value);
            via.write(0x0C, 0xEC);
            oric.tick_devices();
        }
        assert_eq!(oric.keyboard().active_columns(), 0x20);
        assert_eq!(oric.take_psg_writes(), vec![0x0740]);
    }

    #[test]
    fn key_sense_on_pb3() {
        let mut oric = make_oric();
        // Column 5 active, 'A' is column 5 of row 6.
        oric.kbd.set_active_columns(1 << 5);
        oric.key_down(u16::from(b'A'));
        let via = &mut oric.bus_mut().via;
        via.write(0x02, 0xF7); // DDRB: PB3 input
        via.write(0x00, 0x06); // select row 6
        oric.tick_devices();
        assert_ne!(oric.bus_mut().read(0x0300) & PB_KEY_SENSE, 0);

        oric.bus_mut().via.write(0x00, 0x05);
        oric.tick_devices();
        assert_eq!(oric.bus_mut().read(0x0300) & PB_KEY_SENSE, 0);
    }

    #[test]
    fn raw_keys_swap_case_and_route_specials() {
        let mut oric = make_oric();
        assert_eq!(oric.raw_key_down(u16::from(b'a')), KeyAction::Matrix);
        assert!(oric.keyboard().is_pressed(u16::from(b'A')));
        oric.raw_key_up(u16::from(b'a'));

        assert_eq!(oric.raw_key_down(KEY_NMI), KeyAction::Nmi);
        assert_eq!(oric.raw_key_down(KEY_RESET), KeyAction::Reset);
        // No disks and no tape files: F3 is tape slot 2 and fails quietly.
        assert_eq!(oric.raw_key_down(KEY_F1 + 2), KeyAction::Media { slot: 3 });
        assert!(!oric.tape().unwrap().is_loaded());
    }

    #[test]
    fn motor_edge_reaches_the_tape_drive() {
        let mut oric = make_oric();
        let via = &mut oric.bus_mut().via;
        via.write(0x02, 0x40);
        via.write(0x00, 0x40);
        oric.tick_devices();
        assert!(oric.tape().unwrap().is_motor_on());
        oric.bus_mut().via.write(0x00, 0x00);
        oric.tick_devices();
        assert!(!oric.tape().unwrap().is_motor_on());
    }

    #[test]
    fn undriven_pb6_leaves_the_motor_off() {
        let mut oric = make_oric();
        for _ in 0..1000 {
            oric.tick();
        }
        assert_eq!(oric.bus().via.pb() & PB_TAPE_MOTOR, PB_TAPE_MOTOR);
        assert!(!oric.tape().unwrap().is_motor_on());

        // Output latch set but PB6 still an input.
        oric.bus_mut().via.write(0x00, 0x40);
        oric.tick_devices();
        assert!(!oric.tape().unwrap().is_motor_on());
    }

    #[test]
    fn via_gets_four_cycles_per_four_ticks() {
        let mut oric = make_oric();
        let via = &mut oric.bus_mut().via;
        via.write(0x04, 0x00);
        via.write(0x05, 0x80);
        assert_eq!(oric.query("via.t1"), Some(Value::U16(0x8000)));

        for pass in 1..=5u16 {
            for _ in 0..4 {
                oric.tick();
            }
            assert_eq!(oric.query("via.t1"), Some(Value::U16(0x8000 - 4 * pass)));
        }
        assert_eq!(oric.query("via.cycles"), Some(Value::U64(20)));
    }

    #[test]
    fn floppy_reads_one_nibble_every_128_ticks() {
        let config = OricConfig::new(nop_rom(), Some(vec![0x60; 512]), "/nowhere");
        let mut oric = Oric::new(config).unwrap();
        let mut data = vec![0xFF; drive_disk2::NIB_LEN];
        data[..4].copy_from_slice(&[0xD5, 0xAA, 0x96, 0xEB]);
        oric.insert_disk_image(0, NibImage::from_bytes(data).unwrap())
            .unwrap();
        oric.bus_mut().fdc.as_mut().unwrap().read(0x9);

        let latch = |oric: &Oric| oric.bus().fdc.as_ref().unwrap().latch();
        // The controller runs on ticks 0, 128, 256, ...
        oric.tick();
        assert_eq!(latch(&oric), 0xD5);
        for _ in 0..127 {
            oric.tick();
        }
        assert_eq!(latch(&oric), 0xD5);

        let mut seen = Vec::new();
        for _ in 0..3 {
            for _ in 0..128 {
                oric.tick();
            }
            seen.push(latch(&oric));
        }
        assert_eq!(seen, vec![0xAA, 0x96, 0xEB]);
        assert_eq!(oric.ticks(), 512);
    }

    #[test]
    fn disabled_peripherals_report_errors() {
        let mut config = OricConfig::new(nop_rom(), None, "/nowhere");
        config.tape_enabled = false;
        let mut oric = Oric::new(config).unwrap();
        assert!(matches!(oric.insert_tape(0), Err(OricError::NoTape)));
        assert!(matches!(
            oric.insert_disk_image(0, NibImage::blank()),
            Err(OricError::NoFloppy)
        ));
        assert_eq!(oric.query("tape.motor"), None);
    }

    #[test]
    fn observable_paths() {
        let mut oric = make_oric();
        oric.bus_mut().write(0x1234, 0x56);
        assert_eq!(oric.query("memory.0x1234"), Some(Value::U8(0x56)));
        assert_eq!(oric.query("memory.$1234"), Some(Value::U8(0x56)));
        assert_eq!(oric.query("ticks"), Some(Value::U64(0)));
        assert_eq!(oric.query("tape.size"), Some(Value::U32(0)));
        assert!(oric.query("cpu.pc").is_some());
        assert!(oric.query("via.ifr").is_some());
        assert_eq!(oric.query("fdc.motor"), None);
    }

    #[test]
    fn snapshot_restores_machine() {
        let mut oric = make_oric();
        for _ in 0..1000 {
            oric.tick();
        }
        oric.bus_mut().write(0xBB80, b'Z');
        let snap = oric.snapshot();

        for _ in 0..500 {
            oric.tick();
        }
        oric.bus_mut().write(0xBB80, 0);
        oric.restore(&snap);
        assert_eq!(oric.ticks(), 1000);
        assert_eq!(oric.bus().peek(0xBB80), b'Z');
        assert_eq!(oric.snapshot(), snap);
    }

    #[test]
    fn discard_consumes() {
        let oric = make_oric();
        oric.discard();
    }
}
