//! Machine snapshots.
//!
//! Binary format (little-endian):
//!
//! | Offset | Content |
//! |---|---|
//! | 0 | magic `ORIS` |
//! | 4 | version (1) |
//! | 5 | CPU: A X Y S P, PC |
//! | 12 | tick counter, tape divider, motor latch |
//! | 22 | VIA state |
//! | 42 | PSG registers, latched address |
//! | 59 | keyboard columns, boot ROM bank |
//! | 62 | tape: present flag, position, bit, size |
//! | 72 | RAM |
//!
//! Open files are never part of a snapshot; the tape position is applied
//! to whatever tape the live machine holds.

use std::io;

use mos_via_6522::VIA_STATE_LEN;

use crate::Oric;
use crate::config::RAM_SIZE;
use crate::tape::TapeState;

const MAGIC: &[u8; 4] = b"ORIS";
pub const VERSION: u8 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("not a snapshot")]
    BadMagic,
    #[error("snapshot version {0}, expected {VERSION}")]
    Version(u8),
    #[error("snapshot truncated")]
    Truncated(#[from] io::Error),
}

/// CPU registers at the time of capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub p: u8,
    pub pc: u16,
}

/// Everything needed to put a machine back where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub cpu: CpuState,
    pub ticks: u64,
    pub tape_divider: u8,
    pub motor: bool,
    pub via: [u8; VIA_STATE_LEN],
    pub psg_registers: [u8; 16],
    pub psg_address: u8,
    pub keyboard_columns: u8,
    pub boot_extension: u16,
    pub tape: Option<TapeState>,
    pub ram: Vec<u8>,
}

struct StateWriter {
    buf: Vec<u8>,
}

impl StateWriter {
    fn new() -> Self {
        Self {
            buf: Vec::with_capacity(RAM_SIZE + 128),
        }
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }
    fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
    fn write_bool(&mut self, v: bool) {
        self.buf.push(u8::from(v));
    }
    fn write_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }
}

struct StateReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> StateReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_bytes(&mut self, len: usize) -> io::Result<&'a [u8]> {
        let end = self.pos + len;
        let Some(bytes) = self.data.get(self.pos..end) else {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated"));
        };
        self.pos = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut out = [0; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    fn read_u8(&mut self) -> io::Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }
    fn read_u16(&mut self) -> io::Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }
    fn read_u32(&mut self) -> io::Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }
    fn read_u64(&mut self) -> io::Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }
    fn read_bool(&mut self) -> io::Result<bool> {
        Ok(self.read_u8()? != 0)
    }
}

impl Snapshot {
    /// Capture `oric` between two ticks.
    #[must_use]
    pub fn capture(oric: &Oric) -> Self {
        oric.snapshot()
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = StateWriter::new();
        w.write_bytes(MAGIC);
        w.write_u8(VERSION);

        let cpu = &self.cpu;
        for v in [cpu.a, cpu.x, cpu.y, cpu.s, cpu.p] {
            w.write_u8(v);
        }
        w.write_u16(cpu.pc);

        w.write_u64(self.ticks);
        w.write_u8(self.tape_divider);
        w.write_bool(self.motor);

        w.write_bytes(&self.via);
        w.write_bytes(&self.psg_registers);
        w.write_u8(self.psg_address);
        w.write_u8(self.keyboard_columns);
        w.write_u16(self.boot_extension);

        let tape = self.tape.unwrap_or_default();
        w.write_bool(self.tape.is_some());
        w.write_u32(tape.position);
        w.write_u8(tape.bit_position);
        w.write_u32(tape.size);

        w.write_bytes(&self.ram);
        w.buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, SnapshotError> {
        let mut r = StateReader::new(data);
        if r.read_bytes(MAGIC.len()).ok() != Some(MAGIC.as_slice()) {
            return Err(SnapshotError::BadMagic);
        }
        let version = r.read_u8()?;
        if version != VERSION {
            return Err(SnapshotError::Version(version));
        }

        let [a, x, y, s, p] = r.read_array::<5>()?;
        let cpu = CpuState {
            a,
            x,
            y,
            s,
            p,
            pc: r.read_u16()?,
        };
        let ticks = r.read_u64()?;
        let tape_divider = r.read_u8()?;
        let motor = r.read_bool()?;
        let via = r.read_array()?;
        let psg_registers = r.read_array()?;
        let psg_address = r.read_u8()?;
        let keyboard_columns = r.read_u8()?;
        let boot_extension = r.read_u16()?;

        let has_tape = r.read_bool()?;
        let tape = TapeState {
            position: r.read_u32()?,
            bit_position: r.read_u8()?,
            size: r.read_u32()?,
        };
        let ram = r.read_bytes(RAM_SIZE)?.to_vec();

        Ok(Self {
            cpu,
            ticks,
            tape_divider,
            motor,
            via,
            psg_registers,
            psg_address,
            keyboard_columns,
            boot_extension,
            tape: has_tape.then_some(tape),
            ram,
        })
    }
}
