//! MOS 6522 Versatile Interface Adapter (VIA).
//!
//! Two 8-bit ports, two 16-bit timers, a shift register, four control lines
//! and an interrupt controller. On the Oric a single VIA at $0300 scans the
//! keyboard (port B and the PSG behind port A), drives the PSG bus control
//! lines from CA2/CB2, runs the 100 Hz system timer on T1 and samples the
//! cassette input on CB1.
//!
//! # Registers ($0-$F)
//!
//! | Reg | Name | Description                              |
//! |-----|------|------------------------------------------|
//! | $0  | ORB  | Port B data (handshake)                  |
//! | $1  | ORA  | Port A data (handshake)                  |
//! | $2  | DDRB | Port B direction (1 = output)            |
//! | $3  | DDRA | Port A direction (1 = output)            |
//! | $4  | T1CL | T1 counter low, read clears T1 flag      |
//! | $5  | T1CH | T1 counter high, write starts T1         |
//! | $6  | T1LL | T1 latch low                             |
//! | $7  | T1LH | T1 latch high                            |
//! | $8  | T2CL | T2 counter low, read clears T2 flag      |
//! | $9  | T2CH | T2 counter high, write starts T2         |
//! | $A  | SR   | Shift register                           |
//! | $B  | ACR  | Auxiliary control                        |
//! | $C  | PCR  | Peripheral control                       |
//! | $D  | IFR  | Interrupt flags                          |
//! | $E  | IER  | Interrupt enable                         |
//! | $F  | ORA  | Port A data (no handshake)               |

use emu_core::{Observable, Value};

pub const IFR_CA2: u8 = 0x01;
pub const IFR_CA1: u8 = 0x02;
pub const IFR_SR: u8 = 0x04;
pub const IFR_CB2: u8 = 0x08;
pub const IFR_CB1: u8 = 0x10;
pub const IFR_T2: u8 = 0x20;
pub const IFR_T1: u8 = 0x40;

/// A 16-bit down counter with its latch.
#[derive(Debug, Clone, Copy)]
struct Timer {
    counter: u16,
    latch: u16,
    /// Cleared after the one-shot interrupt fires, set again by a start.
    armed: bool,
}

impl Timer {
    const fn new() -> Self {
        Self {
            counter: 0xFFFF,
            latch: 0xFFFF,
            armed: false,
        }
    }

    fn start(&mut self, high: u8) {
        self.latch = (self.latch & 0x00FF) | (u16::from(high) << 8);
        self.counter = self.latch;
        self.armed = true;
    }

    /// Count one step. Returns true when the counter passes zero.
    fn step(&mut self) -> bool {
        let expired = self.counter == 0;
        self.counter = self.counter.wrapping_sub(1);
        expired
    }
}

/// Behaviour of CA2 or CB2 as selected by its three PCR bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlMode {
    /// Input, flag on the given edge (true = positive). `independent`
    /// means port accesses leave the flag alone.
    Input { positive: bool, independent: bool },
    /// Output goes low on a port access, high on the C1 active edge.
    Handshake,
    /// Output goes low for one cycle after a port access.
    Pulse,
    /// Output held at a fixed level.
    Manual(bool),
}

impl ControlMode {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0b100 => ControlMode::Handshake,
            0b101 => ControlMode::Pulse,
            0b110 => ControlMode::Manual(false),
            0b111 => ControlMode::Manual(true),
            other => ControlMode::Input {
                positive: other & 0b010 != 0,
                independent: other & 0b001 != 0,
            },
        }
    }
}

/// State of one side (A or B) of the chip.
#[derive(Debug, Clone, Copy)]
struct Side {
    output: u8,
    ddr: u8,
    /// Levels driven onto the pins from outside.
    input: u8,
    c1: bool,
    c2_in: bool,
    /// Output latch for handshake and pulse modes.
    c2_out: bool,
}

impl Side {
    const fn new() -> Self {
        Self {
            output: 0,
            ddr: 0,
            input: 0xFF,
            c1: false,
            c2_in: false,
            c2_out: true,
        }
    }

    fn pins(&self) -> u8 {
        (self.output & self.ddr) | (self.input & !self.ddr)
    }
}

/// MOS 6522 Versatile Interface Adapter.
pub struct Via6522 {
    a: Side,
    b: Side,
    t1: Timer,
    t2: Timer,
    shift_register: u8,
    acr: u8,
    pcr: u8,
    ifr: u8,
    ier: u8,
    /// T1 square wave on PB7 when ACR bit 7 is set.
    pb7_output: bool,
    total_cycles: u64,
}

impl Default for Via6522 {
    fn default() -> Self {
        Self::new()
    }
}

impl Via6522 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            a: Side::new(),
            b: Side::new(),
            t1: Timer::new(),
            t2: Timer::new(),
            shift_register: 0,
            acr: 0,
            pcr: 0,
            ifr: 0,
            ier: 0,
            pb7_output: true,
            total_cycles: 0,
        }
    }

    /// Return to power-on state. External pin inputs are kept.
    pub fn reset(&mut self) {
        let (a_input, b_input) = (self.a.input, self.b.input);
        *self = Self::new();
        self.a.input = a_input;
        self.b.input = b_input;
    }

    /// Advance `cycles` clock cycles. Returns the IRQ output level.
    pub fn tick(&mut self, cycles: u32) -> bool {
        for _ in 0..cycles {
            self.step();
        }
        self.irq_active()
    }

    fn step(&mut self) {
        self.total_cycles += 1;

        if self.t1.step() {
            if self.acr & 0x40 != 0 {
                self.t1.counter = self.t1.latch;
                self.ifr |= IFR_T1;
                self.pb7_output = !self.pb7_output;
            } else if self.t1.armed {
                self.t1.armed = false;
                self.ifr |= IFR_T1;
                self.pb7_output = true;
            }
        }

        // In pulse-counting mode T2 is clocked from PB6 instead.
        if self.acr & 0x20 == 0 && self.t2.step() && self.t2.armed {
            self.t2.armed = false;
            self.ifr |= IFR_T2;
        }

        // Pulse mode holds C2 low for a single cycle.
        if self.ca2_mode() == ControlMode::Pulse {
            self.a.c2_out = true;
        }
        if self.cb2_mode() == ControlMode::Pulse {
            self.b.c2_out = true;
        }
    }

    /// True while any enabled interrupt flag is set.
    #[must_use]
    pub fn irq_active(&self) -> bool {
        self.ifr & self.ier & 0x7F != 0
    }

    /// Read a register.
    pub fn read(&mut self, reg: u8) -> u8 {
        match reg & 0x0F {
            0x00 => {
                self.port_b_access();
                self.pb()
            }
            0x01 => {
                self.port_a_access();
                self.a.pins()
            }
            0x02 => self.b.ddr,
            0x03 => self.a.ddr,
            0x04 => {
                self.ifr &= !IFR_T1;
                self.t1.counter as u8
            }
            0x05 => (self.t1.counter >> 8) as u8,
            0x06 => self.t1.latch as u8,
            0x07 => (self.t1.latch >> 8) as u8,
            0x08 => {
                self.ifr &= !IFR_T2;
                self.t2.counter as u8
            }
            0x09 => (self.t2.counter >> 8) as u8,
            0x0A => {
                self.ifr &= !IFR_SR;
                self.shift_register
            }
            0x0B => self.acr,
            0x0C => self.pcr,
            0x0D => {
                let any = if self.irq_active() { 0x80 } else { 0 };
                (self.ifr & 0x7F) | any
            }
            0x0E => self.ier | 0x80,
            _ => self.a.pins(),
        }
    }

    /// Write a register.
    pub fn write(&mut self, reg: u8, value: u8) {
        match reg & 0x0F {
            0x00 => {
                self.port_b_access();
                self.b.output = value;
            }
            0x01 => {
                self.port_a_access();
                self.a.output = value;
            }
            0x02 => self.b.ddr = value,
            0x03 => self.a.ddr = value,
            0x04 | 0x06 => self.t1.latch = (self.t1.latch & 0xFF00) | u16::from(value),
            0x05 => {
                self.t1.start(value);
                self.ifr &= !IFR_T1;
                self.pb7_output = false;
            }
            0x07 => {
                self.t1.latch = (self.t1.latch & 0x00FF) | (u16::from(value) << 8);
                self.ifr &= !IFR_T1;
            }
            0x08 => self.t2.latch = (self.t2.latch & 0xFF00) | u16::from(value),
            0x09 => {
                self.t2.start(value);
                self.ifr &= !IFR_T2;
            }
            0x0A => {
                self.shift_register = value;
                self.ifr &= !IFR_SR;
            }
            0x0B => self.acr = value,
            0x0C => {
                self.pcr = value;
                // Entering handshake or pulse mode starts with the line high.
                if matches!(self.ca2_mode(), ControlMode::Handshake | ControlMode::Pulse) {
                    self.a.c2_out = true;
                }
                if matches!(self.cb2_mode(), ControlMode::Handshake | ControlMode::Pulse) {
                    self.b.c2_out = true;
                }
            }
            0x0D => self.ifr &= !(value & 0x7F),
            0x0E => {
                if value & 0x80 != 0 {
                    self.ier |= value & 0x7F;
                } else {
                    self.ier &= !(value & 0x7F);
                }
            }
            _ => self.a.output = value,
        }
    }

    fn ca2_mode(&self) -> ControlMode {
        ControlMode::from_bits(self.pcr >> 1)
    }

    fn cb2_mode(&self) -> ControlMode {
        ControlMode::from_bits(self.pcr >> 5)
    }

    fn port_a_access(&mut self) {
        self.ifr &= !IFR_CA1;
        match self.ca2_mode() {
            ControlMode::Input { independent: false, .. } => self.ifr &= !IFR_CA2,
            ControlMode::Handshake | ControlMode::Pulse => self.a.c2_out = false,
            _ => {}
        }
    }

    fn port_b_access(&mut self) {
        self.ifr &= !IFR_CB1;
        match self.cb2_mode() {
            ControlMode::Input { independent: false, .. } => self.ifr &= !IFR_CB2,
            ControlMode::Handshake | ControlMode::Pulse => self.b.c2_out = false,
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Pins
    // ------------------------------------------------------------------

    /// Port A pin levels: outputs where DDRA is set, inputs elsewhere.
    #[must_use]
    pub fn pa(&self) -> u8 {
        self.a.pins()
    }

    /// Port B bits the chip itself drives: the output register under the
    /// DDR. Undriven pins read as 0 here, whatever the outside holds them at.
    #[must_use]
    pub fn pb_driven(&self) -> u8 {
        self.b.output & self.b.ddr
    }

    /// Port B pin levels, including the T1 square wave on PB7 when enabled.
    #[must_use]
    pub fn pb(&self) -> u8 {
        let pins = self.b.pins();
        if self.acr & 0x80 != 0 {
            (pins & 0x7F) | if self.pb7_output { 0x80 } else { 0 }
        } else {
            pins
        }
    }

    /// Drive the port A inputs. Bits configured as outputs are unaffected.
    pub fn set_pa(&mut self, value: u8) {
        self.a.input = value;
    }

    /// Drive the port B inputs. A falling PB6 clocks T2 in pulse-count mode.
    pub fn set_pb(&mut self, value: u8) {
        let falling_pb6 = self.b.input & 0x40 != 0 && value & 0x40 == 0;
        self.b.input = value;
        if falling_pb6 && self.acr & 0x20 != 0 && self.t2.step() && self.t2.armed {
            self.t2.armed = false;
            self.ifr |= IFR_T2;
        }
    }

    /// CA1 input. Flags on the edge selected by PCR bit 0.
    pub fn set_ca1(&mut self, level: bool) {
        let positive = self.pcr & 0x01 != 0;
        if edge(self.a.c1, level, positive) {
            self.ifr |= IFR_CA1;
            if self.ca2_mode() == ControlMode::Handshake {
                self.a.c2_out = true;
            }
        }
        self.a.c1 = level;
    }

    /// CB1 input. Flags on the edge selected by PCR bit 4.
    pub fn set_cb1(&mut self, level: bool) {
        let positive = self.pcr & 0x10 != 0;
        if edge(self.b.c1, level, positive) {
            self.ifr |= IFR_CB1;
            if self.cb2_mode() == ControlMode::Handshake {
                self.b.c2_out = true;
            }
        }
        self.b.c1 = level;
    }

    /// CA2 input, only meaningful while CA2 is configured as an input.
    pub fn set_ca2(&mut self, level: bool) {
        if let ControlMode::Input { positive, .. } = self.ca2_mode() {
            if edge(self.a.c2_in, level, positive) {
                self.ifr |= IFR_CA2;
            }
        }
        self.a.c2_in = level;
    }

    /// CB2 input, only meaningful while CB2 is configured as an input.
    pub fn set_cb2(&mut self, level: bool) {
        if let ControlMode::Input { positive, .. } = self.cb2_mode() {
            if edge(self.b.c2_in, level, positive) {
                self.ifr |= IFR_CB2;
            }
        }
        self.b.c2_in = level;
    }

    /// CA2 line level. In input modes this is the level driven from outside.
    #[must_use]
    pub fn ca2(&self) -> bool {
        match self.ca2_mode() {
            ControlMode::Input { .. } => self.a.c2_in,
            ControlMode::Manual(level) => level,
            ControlMode::Handshake | ControlMode::Pulse => self.a.c2_out,
        }
    }

    /// CB2 line level. In input modes this is the level driven from outside.
    #[must_use]
    pub fn cb2(&self) -> bool {
        match self.cb2_mode() {
            ControlMode::Input { .. } => self.b.c2_in,
            ControlMode::Manual(level) => level,
            ControlMode::Handshake | ControlMode::Pulse => self.b.c2_out,
        }
    }

    #[must_use]
    pub fn ifr(&self) -> u8 {
        self.ifr
    }

    #[must_use]
    pub fn ier(&self) -> u8 {
        self.ier
    }

    #[must_use]
    pub fn timer1_counter(&self) -> u16 {
        self.t1.counter
    }

    #[must_use]
    pub fn timer2_counter(&self) -> u16 {
        self.t2.counter
    }

    // ------------------------------------------------------------------
    // Snapshot support
    // ------------------------------------------------------------------

    /// Register file and line state as a flat byte image.
    #[must_use]
    pub fn save_state(&self) -> [u8; VIA_STATE_LEN] {
        let mut out = [0u8; VIA_STATE_LEN];
        out[0] = self.a.output;
        out[1] = self.a.ddr;
        out[2] = self.a.input;
        out[3] = self.b.output;
        out[4] = self.b.ddr;
        out[5] = self.b.input;
        out[6..8].copy_from_slice(&self.t1.counter.to_le_bytes());
        out[8..10].copy_from_slice(&self.t1.latch.to_le_bytes());
        out[10..12].copy_from_slice(&self.t2.counter.to_le_bytes());
        out[12..14].copy_from_slice(&self.t2.latch.to_le_bytes());
        out[14] = self.shift_register;
        out[15] = self.acr;
        out[16] = self.pcr;
        out[17] = self.ifr;
        out[18] = self.ier;
        out[19] = u8::from(self.t1.armed)
            | u8::from(self.t2.armed) << 1
            | u8::from(self.pb7_output) << 2
            | u8::from(self.a.c1) << 3
            | u8::from(self.b.c1) << 4
            | u8::from(self.a.c2_out) << 5
            | u8::from(self.b.c2_out) << 6;
        out
    }

    /// Restore from [`Via6522::save_state`] output.
    pub fn load_state(&mut self, state: &[u8; VIA_STATE_LEN]) {
        let word = |i: usize| u16::from_le_bytes([state[i], state[i + 1]]);
        self.a.output = state[0];
        self.a.ddr = state[1];
        self.a.input = state[2];
        self.b.output = state[3];
        self.b.ddr = state[4];
        self.b.input = state[5];
        self.t1.counter = word(6);
        self.t1.latch = word(8);
        self.t2.counter = word(10);
        self.t2.latch = word(12);
        self.shift_register = state[14];
        self.acr = state[15];
        self.pcr = state[16];
        self.ifr = state[17];
        self.ier = state[18];
        let bits = state[19];
        self.t1.armed = bits & 0x01 != 0;
        self.t2.armed = bits & 0x02 != 0;
        self.pb7_output = bits & 0x04 != 0;
        self.a.c1 = bits & 0x08 != 0;
        self.b.c1 = bits & 0x10 != 0;
        self.a.c2_out = bits & 0x20 != 0;
        self.b.c2_out = bits & 0x40 != 0;
    }
}

/// Length of [`Via6522::save_state`] output.
pub const VIA_STATE_LEN: usize = 20;

fn edge(previous: bool, current: bool, positive: bool) -> bool {
    if positive {
        !previous && current
    } else {
        previous && !current
    }
}

impl Observable for Via6522 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "ora" => Some(self.a.output.into()),
            "orb" => Some(self.b.output.into()),
            "ddra" => Some(self.a.ddr.into()),
            "ddrb" => Some(self.b.ddr.into()),
            "pa" => Some(self.pa().into()),
            "pb" => Some(self.pb().into()),
            "t1" => Some(self.t1.counter.into()),
            "t1.latch" => Some(self.t1.latch.into()),
            "t2" => Some(self.t2.counter.into()),
            "acr" => Some(self.acr.into()),
            "pcr" => Some(self.pcr.into()),
            "ifr" => Some(self.ifr.into()),
            "ier" => Some(self.ier.into()),
            "ca2" => Some(self.ca2().into()),
            "cb2" => Some(self.cb2().into()),
            "irq" => Some(self.irq_active().into()),
            "cycles" => Some(self.total_cycles.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "ora", "orb", "ddra", "ddrb", "pa", "pb", "t1", "t1.latch", "t2", "acr", "pcr", "ifr",
            "ier", "ca2", "cb2", "irq", "cycles",
        ]
    }
}
