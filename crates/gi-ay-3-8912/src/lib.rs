//! General Instrument AY-3-8912 Programmable Sound Generator.
//!
//! The 8912 is the 28-pin 8910: same sixteen registers, but only I/O port A
//! is bonded out. This crate models the register file and the bus interface.
//! Sound synthesis is left to whatever consumes the register writes.
//!
//! # Register map
//!
//! | Reg | Name       | Bits |
//! |-----|------------|------|
//! | R0  | A fine     | 7-0  |
//! | R1  | A coarse   | 3-0  |
//! | R2  | B fine     | 7-0  |
//! | R3  | B coarse   | 3-0  |
//! | R4  | C fine     | 7-0  |
//! | R5  | C coarse   | 3-0  |
//! | R6  | Noise      | 4-0  |
//! | R7  | Mixer/IO   | 7-0  |
//! | R8  | A volume   | 4-0  |
//! | R9  | B volume   | 4-0  |
//! | R10 | C volume   | 4-0  |
//! | R11 | Env fine   | 7-0  |
//! | R12 | Env coarse | 7-0  |
//! | R13 | Env shape  | 3-0  |
//! | R14 | Port A     | 7-0  |
//! | R15 | Port B     | 7-0  |

use emu_core::{Observable, Value};

/// Number of registers that drive sound. R14 and R15 are I/O.
pub const SOUND_REGISTERS: u8 = 14;

/// I/O port A data register.
pub const REG_PORT_A: u8 = 14;

/// Mixer register. Bit 6 set makes port A an output.
pub const REG_MIXER: u8 = 7;

/// Bits implemented per register. Unimplemented bits read back as zero.
const REGISTER_MASKS: [u8; 16] = [
    0xFF, 0x0F, 0xFF, 0x0F, 0xFF, 0x0F, 0x1F, 0xFF, 0x1F, 0x1F, 0x1F, 0xFF, 0xFF, 0x0F, 0xFF, 0xFF,
];

/// Bus operation selected by BDIR and BC1 (BC2 tied high).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusControl {
    Inactive,
    Read,
    Write,
    LatchAddress,
}

impl BusControl {
    #[must_use]
    pub fn from_lines(bdir: bool, bc1: bool) -> Self {
        match (bdir, bc1) {
            (false, false) => BusControl::Inactive,
            (false, true) => BusControl::Read,
            (true, false) => BusControl::Write,
            (true, true) => BusControl::LatchAddress,
        }
    }
}

/// AY-3-8912 register file.
pub struct Ay38912 {
    registers: [u8; 16],
    address: u8,
    /// Levels driven onto the port A pins from outside.
    port_a_input: u8,
}

impl Default for Ay38912 {
    fn default() -> Self {
        Self::new()
    }
}

impl Ay38912 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registers: [0; 16],
            address: 0,
            port_a_input: 0xFF,
        }
    }

    /// Clear all registers, as the RESET pin does.
    pub fn reset(&mut self) {
        self.registers = [0; 16];
        self.address = 0;
    }

    /// Latch a register address. The upper nibble selects the chip and must
    /// be zero; otherwise the latch is left alone.
    pub fn latch_address(&mut self, value: u8) {
        if value & 0xF0 == 0 {
            self.address = value;
        }
    }

    /// Currently latched register address.
    #[must_use]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Write the latched register. Returns the new port A output when the
    /// write changes what the port drives.
    pub fn write(&mut self, value: u8) -> Option<u8> {
        let reg = self.address & 0x0F;
        let before = self.port_a_output();
        self.registers[reg as usize] = value & REGISTER_MASKS[reg as usize];
        let after = self.port_a_output();
        match (reg, after) {
            (REG_PORT_A, Some(out)) => Some(out),
            (REG_MIXER, Some(out)) if before != after => Some(out),
            _ => None,
        }
    }

    /// Read the latched register. Port A reads the pins while it is an input.
    #[must_use]
    pub fn read(&self) -> u8 {
        let reg = self.address & 0x0F;
        if reg == REG_PORT_A && !self.port_a_is_output() {
            self.port_a_input
        } else {
            self.registers[reg as usize]
        }
    }

    /// Drive the port A input pins.
    pub fn set_port_a_input(&mut self, value: u8) {
        self.port_a_input = value;
    }

    #[must_use]
    pub fn port_a_is_output(&self) -> bool {
        self.registers[REG_MIXER as usize] & 0x40 != 0
    }

    /// Value on the port A pins while it is an output.
    #[must_use]
    pub fn port_a_output(&self) -> Option<u8> {
        self.port_a_is_output()
            .then_some(self.registers[REG_PORT_A as usize])
    }

    #[must_use]
    pub fn registers(&self) -> &[u8; 16] {
        &self.registers
    }

    /// Restore registers and the address latch, e.g. from a snapshot.
    pub fn load_registers(&mut self, registers: &[u8; 16], address: u8) {
        for (i, (dst, &src)) in self.registers.iter_mut().zip(registers).enumerate() {
            *dst = src & REGISTER_MASKS[i];
        }
        self.address = address & 0x0F;
    }
}

impl Observable for Ay38912 {
    fn query(&self, path: &str) -> Option<Value> {
        if path == "address" {
            return Some(self.address.into());
        }
        if path == "port_a.output" {
            return Some(self.port_a_is_output().into());
        }
        let index: usize = path.strip_prefix("r")?.parse().ok()?;
        self.registers.get(index).map(|&v| v.into())
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "address", "port_a.output", "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9",
            "r10", "r11", "r12", "r13", "r14", "r15",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_reg(psg: &mut Ay38912, reg: u8, value: u8) -> Option<u8> {
        psg.latch_address(reg);
        psg.write(value)
    }

    #[test]
    fn bus_control_decode() {
        assert_eq!(BusControl::from_lines(true, true), BusControl::LatchAddress);
        assert_eq!(BusControl::from_lines(true, false), BusControl::Write);
        assert_eq!(BusControl::from_lines(false, true), BusControl::Read);
        assert_eq!(BusControl::from_lines(false, false), BusControl::Inactive);
    }

    #[test]
    fn registers_are_masked() {
        let mut psg = Ay38912::new();
        write_reg(&mut psg, 1, 0xFF);
        assert_eq!(psg.read(), 0x0F);
        write_reg(&mut psg, 8, 0xFF);
        assert_eq!(psg.read(), 0x1F);
        write_reg(&mut psg, 13, 0xFF);
        assert_eq!(psg.read(), 0x0F);
    }

    #[test]
    fn address_with_chip_select_bits_is_ignored() {
        let mut psg = Ay38912::new();
        psg.latch_address(7);
        psg.latch_address(0x17);
        assert_eq!(psg.address(), 7);
    }

    #[test]
    fn port_a_direction_follows_mixer_bit_6() {
        let mut psg = Ay38912::new();
        psg.set_port_a_input(0x3C);

        assert_eq!(write_reg(&mut psg, REG_PORT_A, 0xFE), None);
        assert_eq!(psg.read(), 0x3C, "input mode reads the pins");

        assert_eq!(write_reg(&mut psg, REG_MIXER, 0x7F), Some(0xFE));
        psg.latch_address(REG_PORT_A);
        assert_eq!(psg.read(), 0xFE);
        assert_eq!(psg.write(0xFD), Some(0xFD));
        assert_eq!(psg.port_a_output(), Some(0xFD));
    }

    #[test]
    fn mixer_write_without_direction_change_reports_nothing() {
        let mut psg = Ay38912::new();
        write_reg(&mut psg, REG_MIXER, 0x40);
        assert_eq!(write_reg(&mut psg, REG_MIXER, 0x7F), None);
    }

    #[test]
    fn reset_clears_registers() {
        let mut psg = Ay38912::new();
        write_reg(&mut psg, 0, 0x55);
        psg.reset();
        assert_eq!(psg.registers(), &[0; 16]);
        assert_eq!(psg.query("r0"), Some(Value::U8(0)));
    }
}
