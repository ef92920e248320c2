//! 6502 instruction execution.

use emu_core::{Bus, Cpu, Observable, Value};

use crate::flags::{C, D, I, N, V, Z};
use crate::{Registers, Status};

const NMI_VECTOR: u16 = 0xFFFA;
const RESET_VECTOR: u16 = 0xFFFC;
const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles per opcode, before page-cross and branch penalties.
#[rustfmt::skip]
const CYCLES: [u8; 256] = [
//  0  1  2  3  4  5  6  7  8  9  A  B  C  D  E  F
    7, 6, 2, 8, 3, 3, 5, 5, 3, 2, 2, 2, 4, 4, 6, 6, // 0
    2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // 1
    6, 6, 2, 8, 3, 3, 5, 5, 4, 2, 2, 2, 4, 4, 6, 6, // 2
    2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // 3
    6, 6, 2, 8, 3, 3, 5, 5, 3, 2, 2, 2, 3, 4, 6, 6, // 4
    2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // 5
    6, 6, 2, 8, 3, 3, 5, 5, 4, 2, 2, 2, 5, 4, 6, 6, // 6
    2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // 7
    2, 6, 2, 6, 3, 3, 3, 3, 2, 2, 2, 2, 4, 4, 4, 4, // 8
    2, 6, 2, 6, 4, 4, 4, 4, 2, 5, 2, 5, 5, 5, 5, 5, // 9
    2, 6, 2, 6, 3, 3, 3, 3, 2, 2, 2, 2, 4, 4, 4, 4, // A
    2, 5, 2, 5, 4, 4, 4, 4, 2, 4, 2, 4, 4, 4, 4, 4, // B
    2, 6, 2, 8, 3, 3, 5, 5, 2, 2, 2, 2, 4, 4, 6, 6, // C
    2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // D
    2, 6, 2, 8, 3, 3, 5, 5, 2, 2, 2, 2, 4, 4, 6, 6, // E
    2, 5, 2, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, // F
];

/// Operand addressing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Imm,
    Zp,
    Zpx,
    Zpy,
    Abs,
    Abx,
    Aby,
    Izx,
    Izy,
}

/// The MOS 6502 CPU.
#[derive(Debug)]
pub struct Mos6502 {
    /// CPU registers.
    pub regs: Registers,

    /// Idle cycles left before the next instruction is fetched.
    pending_cycles: u8,

    /// IRQ input level (true = asserted).
    irq_line: bool,

    /// NMI edge latched, serviced before the next fetch.
    nmi_pending: bool,

    /// Reset requested, vector fetched before the next fetch.
    reset_pending: bool,

    /// Set by the KIL opcodes. Only a reset recovers.
    jammed: bool,

    /// Total cycles executed.
    total_cycles: u64,
}

impl Default for Mos6502 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mos6502 {
    /// Create a CPU with power-on registers. PC is left at zero so tests can
    /// place code anywhere; call [`Cpu::reset`] to start from the vector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            pending_cycles: 0,
            irq_line: false,
            nmi_pending: false,
            reset_pending: false,
            jammed: false,
            total_cycles: 0,
        }
    }

    /// True between instructions, i.e. the next tick fetches an opcode.
    #[must_use]
    pub fn is_instruction_complete(&self) -> bool {
        self.pending_cycles == 0
    }

    /// Total cycles executed since creation.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    fn step<B: Bus>(&mut self, bus: &mut B) -> u8 {
        if self.reset_pending {
            self.reset_pending = false;
            self.jammed = false;
            self.regs.s = self.regs.s.wrapping_sub(3);
            self.regs.p.set_if(I, true);
            self.regs.p.set_if(D, false);
            self.regs.pc = read_word(bus, RESET_VECTOR);
            return 7;
        }
        if self.jammed {
            return 1;
        }
        if self.nmi_pending {
            self.nmi_pending = false;
            self.enter_interrupt(bus, NMI_VECTOR, self.regs.p.pushed_by_interrupt());
            return 7;
        }
        if self.irq_line && !self.regs.p.is_set(I) {
            self.enter_interrupt(bus, IRQ_VECTOR, self.regs.p.pushed_by_interrupt());
            return 7;
        }

        let opcode = self.fetch(bus);
        let extra = self.execute(bus, opcode);
        CYCLES[opcode as usize] + extra
    }

    fn enter_interrupt<B: Bus>(&mut self, bus: &mut B, vector: u16, status: u8) {
        let [lo, hi] = self.regs.pc.to_le_bytes();
        self.push(bus, hi);
        self.push(bus, lo);
        self.push(bus, status);
        self.regs.p.set_if(I, true);
        self.regs.pc = read_word(bus, vector);
    }

    fn fetch<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    fn fetch_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch(bus);
        let hi = self.fetch(bus);
        u16::from_le_bytes([lo, hi])
    }

    fn push<B: Bus>(&mut self, bus: &mut B, value: u8) {
        let addr = self.regs.push_addr();
        bus.write(addr, value);
    }

    fn pull<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let addr = self.regs.pull_addr();
        bus.read(addr)
    }

    /// Resolve the effective address. The flag reports a page crossing on
    /// the indexed modes.
    fn resolve<B: Bus>(&mut self, bus: &mut B, mode: Mode) -> (u16, bool) {
        match mode {
            Mode::Imm => {
                let addr = self.regs.pc;
                self.regs.pc = self.regs.pc.wrapping_add(1);
                (addr, false)
            }
            Mode::Zp => (u16::from(self.fetch(bus)), false),
            Mode::Zpx => (u16::from(self.fetch(bus).wrapping_add(self.regs.x)), false),
            Mode::Zpy => (u16::from(self.fetch(bus).wrapping_add(self.regs.y)), false),
            Mode::Abs => (self.fetch_word(bus), false),
            Mode::Abx => {
                let base = self.fetch_word(bus);
                index(base, self.regs.x)
            }
            Mode::Aby => {
                let base = self.fetch_word(bus);
                index(base, self.regs.y)
            }
            Mode::Izx => {
                let ptr = self.fetch(bus).wrapping_add(self.regs.x);
                (read_zp_word(bus, ptr), false)
            }
            Mode::Izy => {
                let ptr = self.fetch(bus);
                let base = read_zp_word(bus, ptr);
                index(base, self.regs.y)
            }
        }
    }

    /// Load an operand and apply `op`. Returns the page-cross penalty.
    fn read_with<B: Bus>(&mut self, bus: &mut B, mode: Mode, op: fn(&mut Self, u8)) -> u8 {
        let (addr, crossed) = self.resolve(bus, mode);
        let value = bus.read(addr);
        op(self, value);
        u8::from(crossed && matches!(mode, Mode::Abx | Mode::Aby | Mode::Izy))
    }

    fn store<B: Bus>(&mut self, bus: &mut B, mode: Mode, value: u8) -> u8 {
        let (addr, _) = self.resolve(bus, mode);
        bus.write(addr, value);
        0
    }

    fn modify<B: Bus>(&mut self, bus: &mut B, mode: Mode, op: fn(&mut Self, u8) -> u8) -> u8 {
        let (addr, _) = self.resolve(bus, mode);
        let value = bus.read(addr);
        let result = op(self, value);
        bus.write(addr, result);
        0
    }

    fn branch<B: Bus>(&mut self, bus: &mut B, taken: bool) -> u8 {
        let offset = self.fetch(bus) as i8;
        if !taken {
            return 0;
        }
        let target = self.regs.pc.wrapping_add_signed(i16::from(offset));
        let crossed = (target & 0xFF00) != (self.regs.pc & 0xFF00);
        self.regs.pc = target;
        1 + u8::from(crossed)
    }

    /// Execute one opcode. Returns cycles on top of the table value.
    fn execute<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u8 {
        match opcode {
            // Loads
            0xA9 => self.read_with(bus, Mode::Imm, Self::lda),
            0xA5 => self.read_with(bus, Mode::Zp, Self::lda),
            0xB5 => self.read_with(bus, Mode::Zpx, Self::lda),
            0xAD => self.read_with(bus, Mode::Abs, Self::lda),
            0xBD => self.read_with(bus, Mode::Abx, Self::lda),
            0xB9 => self.read_with(bus, Mode::Aby, Self::lda),
            0xA1 => self.read_with(bus, Mode::Izx, Self::lda),
            0xB1 => self.read_with(bus, Mode::Izy, Self::lda),
            0xA2 => self.read_with(bus, Mode::Imm, Self::ldx),
            0xA6 => self.read_with(bus, Mode::Zp, Self::ldx),
            0xB6 => self.read_with(bus, Mode::Zpy, Self::ldx),
            0xAE => self.read_with(bus, Mode::Abs, Self::ldx),
            0xBE => self.read_with(bus, Mode::Aby, Self::ldx),
            0xA0 => self.read_with(bus, Mode::Imm, Self::ldy),
            0xA4 => self.read_with(bus, Mode::Zp, Self::ldy),
            0xB4 => self.read_with(bus, Mode::Zpx, Self::ldy),
            0xAC => self.read_with(bus, Mode::Abs, Self::ldy),
            0xBC => self.read_with(bus, Mode::Abx, Self::ldy),

            // Stores
            0x85 => self.store(bus, Mode::Zp, self.regs.a),
            0x95 => self.store(bus, Mode::Zpx, self.regs.a),
            0x8D => self.store(bus, Mode::Abs, self.regs.a),
            0x9D => self.store(bus, Mode::Abx, self.regs.a),
            0x99 => self.store(bus, Mode::Aby, self.regs.a),
            0x81 => self.store(bus, Mode::Izx, self.regs.a),
            0x91 => self.store(bus, Mode::Izy, self.regs.a),
            0x86 => self.store(bus, Mode::Zp, self.regs.x),
            0x96 => self.store(bus, Mode::Zpy, self.regs.x),
            0x8E => self.store(bus, Mode::Abs, self.regs.x),
            0x84 => self.store(bus, Mode::Zp, self.regs.y),
            0x94 => self.store(bus, Mode::Zpx, self.regs.y),
            0x8C => self.store(bus, Mode::Abs, self.regs.y),

            // Logic and arithmetic: the cc=01 column group
            0x01..=0x7F | 0xC0..=0xFF if opcode & 0x03 == 0x01 => {
                let mode = group_one_mode(opcode);
                let op: fn(&mut Self, u8) = match opcode >> 5 {
                    0 => Self::ora,
                    1 => Self::and,
                    2 => Self::eor,
                    3 => Self::adc,
                    6 => Self::cmp,
                    _ => Self::sbc,
                };
                self.read_with(bus, mode, op)
            }

            0xE0 => self.read_with(bus, Mode::Imm, Self::cpx),
            0xE4 => self.read_with(bus, Mode::Zp, Self::cpx),
            0xEC => self.read_with(bus, Mode::Abs, Self::cpx),
            0xC0 => self.read_with(bus, Mode::Imm, Self::cpy),
            0xC4 => self.read_with(bus, Mode::Zp, Self::cpy),
            0xCC => self.read_with(bus, Mode::Abs, Self::cpy),
            0x24 => self.read_with(bus, Mode::Zp, Self::bit),
            0x2C => self.read_with(bus, Mode::Abs, Self::bit),

            // Read-modify-write
            0x0A => self.accumulator(Self::asl),
            0x4A => self.accumulator(Self::lsr),
            0x2A => self.accumulator(Self::rol),
            0x6A => self.accumulator(Self::ror),
            0x06 | 0x16 | 0x0E | 0x1E => self.modify(bus, rmw_mode(opcode), Self::asl),
            0x46 | 0x56 | 0x4E | 0x5E => self.modify(bus, rmw_mode(opcode), Self::lsr),
            0x26 | 0x36 | 0x2E | 0x3E => self.modify(bus, rmw_mode(opcode), Self::rol),
            0x66 | 0x76 | 0x6E | 0x7E => self.modify(bus, rmw_mode(opcode), Self::ror),
            0xE6 | 0xF6 | 0xEE | 0xFE => self.modify(bus, rmw_mode(opcode), Self::inc),
            0xC6 | 0xD6 | 0xCE | 0xDE => self.modify(bus, rmw_mode(opcode), Self::dec),

            // Register transfers and steps
            0xAA => self.transfer(self.regs.a, |r, v| r.x = v),
            0xA8 => self.transfer(self.regs.a, |r, v| r.y = v),
            0x8A => self.transfer(self.regs.x, |r, v| r.a = v),
            0x98 => self.transfer(self.regs.y, |r, v| r.a = v),
            0xBA => self.transfer(self.regs.s, |r, v| r.x = v),
            0x9A => {
                self.regs.s = self.regs.x;
                0
            }
            0xE8 => self.transfer(self.regs.x.wrapping_add(1), |r, v| r.x = v),
            0xC8 => self.transfer(self.regs.y.wrapping_add(1), |r, v| r.y = v),
            0xCA => self.transfer(self.regs.x.wrapping_sub(1), |r, v| r.x = v),
            0x88 => self.transfer(self.regs.y.wrapping_sub(1), |r, v| r.y = v),

            // Flags
            0x18 => self.flag(C, false),
            0x38 => self.flag(C, true),
            0x58 => self.flag(I, false),
            0x78 => self.flag(I, true),
            0xD8 => self.flag(D, false),
            0xF8 => self.flag(D, true),
            0xB8 => self.flag(V, false),

            // Branches
            0x10 => self.branch(bus, !self.regs.p.is_set(N)),
            0x30 => self.branch(bus, self.regs.p.is_set(N)),
            0x50 => self.branch(bus, !self.regs.p.is_set(V)),
            0x70 => self.branch(bus, self.regs.p.is_set(V)),
            0x90 => self.branch(bus, !self.regs.p.is_set(C)),
            0xB0 => self.branch(bus, self.regs.p.is_set(C)),
            0xD0 => self.branch(bus, !self.regs.p.is_set(Z)),
            0xF0 => self.branch(bus, self.regs.p.is_set(Z)),

            // Stack
            0x48 => {
                self.push(bus, self.regs.a);
                0
            }
            0x08 => {
                self.push(bus, self.regs.p.pushed_by_software());
                0
            }
            0x68 => {
                let value = self.pull(bus);
                self.lda(value);
                0
            }
            0x28 => {
                let value = self.pull(bus);
                self.regs.p = Status::from_stack(value);
                0
            }

            // Control flow
            0x4C => {
                self.regs.pc = self.fetch_word(bus);
                0
            }
            0x6C => {
                let ptr = self.fetch_word(bus);
                // The high byte is fetched without carrying into the page.
                let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
                self.regs.pc = u16::from_le_bytes([bus.read(ptr), bus.read(hi_addr)]);
                0
            }
            0x20 => {
                let target = self.fetch_word(bus);
                let [lo, hi] = self.regs.pc.wrapping_sub(1).to_le_bytes();
                self.push(bus, hi);
                self.push(bus, lo);
                self.regs.pc = target;
                0
            }
            0x60 => {
                let lo = self.pull(bus);
                let hi = self.pull(bus);
                self.regs.pc = u16::from_le_bytes([lo, hi]).wrapping_add(1);
                0
            }
            0x40 => {
                let p = self.pull(bus);
                self.regs.p = Status::from_stack(p);
                let lo = self.pull(bus);
                let hi = self.pull(bus);
                self.regs.pc = u16::from_le_bytes([lo, hi]);
                0
            }
            0x00 => {
                // BRK skips its padding byte.
                self.regs.pc = self.regs.pc.wrapping_add(1);
                self.enter_interrupt(bus, IRQ_VECTOR, self.regs.p.pushed_by_software());
                0
            }
            0xEA => 0,

            // KIL
            0x02 | 0x12 | 0x22 | 0x32 | 0x42 | 0x52 | 0x62 | 0x72 | 0x92 | 0xB2 | 0xD2 | 0xF2 => {
                self.regs.pc = self.regs.pc.wrapping_sub(1);
                self.jammed = true;
                0
            }

            // Undocumented opcodes run as NOPs of the same length.
            _ => {
                let len = undocumented_operand_len(opcode);
                self.regs.pc = self.regs.pc.wrapping_add(len);
                0
            }
        }
    }

    fn accumulator(&mut self, op: fn(&mut Self, u8) -> u8) -> u8 {
        self.regs.a = op(self, self.regs.a);
        0
    }

    fn transfer(&mut self, value: u8, dest: fn(&mut Registers, u8)) -> u8 {
        dest(&mut self.regs, value);
        self.regs.p.update_nz(value);
        0
    }

    fn flag(&mut self, flag: u8, set: bool) -> u8 {
        self.regs.p.set_if(flag, set);
        0
    }

    // ------------------------------------------------------------------
    // ALU
    // ------------------------------------------------------------------

    fn lda(&mut self, value: u8) {
        self.regs.a = value;
        self.regs.p.update_nz(value);
    }

    fn ldx(&mut self, value: u8) {
        self.regs.x = value;
        self.regs.p.update_nz(value);
    }

    fn ldy(&mut self, value: u8) {
        self.regs.y = value;
        self.regs.p.update_nz(value);
    }

    fn ora(&mut self, value: u8) {
        self.lda(self.regs.a | value);
    }

    fn and(&mut self, value: u8) {
        self.lda(self.regs.a & value);
    }

    fn eor(&mut self, value: u8) {
        self.lda(self.regs.a ^ value);
    }

    fn adc(&mut self, value: u8) {
        if self.regs.p.is_set(D) {
            self.adc_decimal(value);
        } else {
            self.adc_binary(value);
        }
    }

    fn adc_binary(&mut self, value: u8) {
        let a = self.regs.a;
        let sum = u16::from(a) + u16::from(value) + u16::from(self.regs.p.is_set(C));
        let result = sum as u8;
        self.regs.p.set_if(C, sum > 0xFF);
        self.regs.p.set_if(V, (a ^ result) & (value ^ result) & 0x80 != 0);
        self.lda(result);
    }

    /// NMOS decimal add: Z follows the binary sum, N and V the high digit
    /// before its adjustment.
    fn adc_decimal(&mut self, value: u8) {
        let a = self.regs.a;
        let carry = u8::from(self.regs.p.is_set(C));
        let binary = a.wrapping_add(value).wrapping_add(carry);

        let mut lo = (a & 0x0F) + (value & 0x0F) + carry;
        let mut hi = (a >> 4) + (value >> 4);
        if lo > 9 {
            lo = (lo + 6) & 0x0F;
            hi += 1;
        }
        let unadjusted = hi << 4;
        self.regs.p.set_if(Z, binary == 0);
        self.regs.p.set_if(N, unadjusted & 0x80 != 0);
        self.regs.p.set_if(V, (a ^ value) & 0x80 == 0 && (a ^ unadjusted) & 0x80 != 0);
        if hi > 9 {
            hi += 6;
        }
        self.regs.p.set_if(C, hi > 0x0F);
        self.regs.a = ((hi & 0x0F) << 4) | lo;
    }

    fn sbc(&mut self, value: u8) {
        if self.regs.p.is_set(D) {
            self.sbc_decimal(value);
        } else {
            self.adc_binary(!value);
        }
    }

    /// NMOS decimal subtract: all flags follow the binary difference.
    fn sbc_decimal(&mut self, value: u8) {
        let a = self.regs.a;
        let borrow = i16::from(!self.regs.p.is_set(C));
        let binary = i16::from(a) - i16::from(value) - borrow;
        let result = binary as u8;
        self.regs.p.set_if(C, binary >= 0);
        self.regs.p.set_if(V, (a ^ value) & (a ^ result) & 0x80 != 0);
        self.regs.p.update_nz(result);

        let mut lo = i16::from(a & 0x0F) - i16::from(value & 0x0F) - borrow;
        let mut hi = i16::from(a >> 4) - i16::from(value >> 4);
        if lo < 0 {
            lo += 10;
            hi -= 1;
        }
        if hi < 0 {
            hi += 10;
        }
        self.regs.a = (((hi as u8) & 0x0F) << 4) | ((lo as u8) & 0x0F);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.regs.p.set_if(C, register >= value);
        self.regs.p.update_nz(register.wrapping_sub(value));
    }

    fn cmp(&mut self, value: u8) {
        self.compare(self.regs.a, value);
    }

    fn cpx(&mut self, value: u8) {
        self.compare(self.regs.x, value);
    }

    fn cpy(&mut self, value: u8) {
        self.compare(self.regs.y, value);
    }

    fn bit(&mut self, value: u8) {
        self.regs.p.set_if(Z, self.regs.a & value == 0);
        self.regs.p.set_if(N, value & 0x80 != 0);
        self.regs.p.set_if(V, value & 0x40 != 0);
    }

    fn asl(&mut self, value: u8) -> u8 {
        self.regs.p.set_if(C, value & 0x80 != 0);
        let result = value << 1;
        self.regs.p.update_nz(result);
        result
    }

    fn lsr(&mut self, value: u8) -> u8 {
        self.regs.p.set_if(C, value & 0x01 != 0);
        let result = value >> 1;
        self.regs.p.update_nz(result);
        result
    }

    fn rol(&mut self, value: u8) -> u8 {
        let result = (value << 1) | u8::from(self.regs.p.is_set(C));
        self.regs.p.set_if(C, value & 0x80 != 0);
        self.regs.p.update_nz(result);
        result
    }

    fn ror(&mut self, value: u8) -> u8 {
        let result = (value >> 1) | (u8::from(self.regs.p.is_set(C)) << 7);
        self.regs.p.set_if(C, value & 0x01 != 0);
        self.regs.p.update_nz(result);
        result
    }

    fn inc(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.regs.p.update_nz(result);
        result
    }

    fn dec(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.regs.p.update_nz(result);
        result
    }
}

fn read_word<B: Bus>(bus: &mut B, addr: u16) -> u16 {
    u16::from_le_bytes([bus.read(addr), bus.read(addr.wrapping_add(1))])
}

/// Pointer reads wrap within page zero.
fn read_zp_word<B: Bus>(bus: &mut B, ptr: u8) -> u16 {
    u16::from_le_bytes([bus.read(u16::from(ptr)), bus.read(u16::from(ptr.wrapping_add(1)))])
}

fn index(base: u16, offset: u8) -> (u16, bool) {
    let addr = base.wrapping_add(u16::from(offset));
    (addr, (addr & 0xFF00) != (base & 0xFF00))
}

fn group_one_mode(opcode: u8) -> Mode {
    match (opcode >> 2) & 0x07 {
        0 => Mode::Izx,
        1 => Mode::Zp,
        2 => Mode::Imm,
        3 => Mode::Abs,
        4 => Mode::Izy,
        5 => Mode::Zpx,
        6 => Mode::Aby,
        _ => Mode::Abx,
    }
}

fn rmw_mode(opcode: u8) -> Mode {
    match (opcode >> 2) & 0x07 {
        1 => Mode::Zp,
        3 => Mode::Abs,
        5 => Mode::Zpx,
        _ => Mode::Abx,
    }
}

fn undocumented_operand_len(opcode: u8) -> u16 {
    let odd_column = opcode & 0x01 != 0;
    match (opcode >> 2) & 0x07 {
        0 | 1 | 4 | 5 => 1,
        2 => u16::from(odd_column),
        6 => 2 * u16::from(odd_column),
        _ => 2,
    }
}

impl Cpu for Mos6502 {
    type Registers = Registers;

    fn tick<B: Bus>(&mut self, bus: &mut B) {
        self.total_cycles += 1;
        if self.pending_cycles > 0 {
            self.pending_cycles -= 1;
            return;
        }
        let cycles = self.step(bus);
        self.pending_cycles = cycles.saturating_sub(1);
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Self::Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.jammed
    }

    fn set_irq(&mut self, asserted: bool) {
        self.irq_line = asserted;
    }

    fn nmi(&mut self) {
        self.nmi_pending = true;
    }

    fn reset(&mut self) {
        self.pending_cycles = 0;
        self.nmi_pending = false;
        self.reset_pending = true;
    }
}

impl Observable for Mos6502 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" | "sp" => Some(self.regs.s.into()),
            "p" | "status" => Some(self.regs.p.0.into()),
            "flags.c" => Some(self.regs.p.is_set(C).into()),
            "flags.z" => Some(self.regs.p.is_set(Z).into()),
            "flags.i" => Some(self.regs.p.is_set(I).into()),
            "flags.d" => Some(self.regs.p.is_set(D).into()),
            "flags.v" => Some(self.regs.p.is_set(V).into()),
            "flags.n" => Some(self.regs.p.is_set(N).into()),
            "irq" => Some(self.irq_line.into()),
            "cycles" => Some(self.total_cycles.into()),
            "halted" => Some(self.jammed.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "a", "x", "y", "s", "p", "flags.c", "flags.z", "flags.i", "flags.d", "flags.v",
            "flags.n", "irq", "cycles", "halted",
        ]
    }
}
