// Copyright (c) 2017, 2018, 2023 Marek Benc <benc.marek.elektro98@proton.me>
//
// Permission to use, copy, modify, and distribute this software for any
// purpose with or without fee is hereby granted, provided that the above
// copyright notice and this permission notice appear in all copies.
//
// THE SOFTWARE IS PROVIDED "AS IS" AND THE AUTHOR DISCLAIMS ALL WARRANTIES
// WITH REGARD TO THIS SOFTWARE INCLUDING ALL IMPLIED WARRANTIES OF
// MERCHANTABILITY AND FITNESS. IN NO EVENT SHALL THE AUTHOR BE LIABLE FOR
// ANY SPECIAL, DIRECT, INDIRECT, OR CONSEQUENTIAL DAMAGES OR ANY DAMAGES
// WHATSOEVER RESULTING FROM LOSS OF USE, DATA OR PROFITS, WHETHER IN AN
// ACTION OF CONTRACT, NEGLIGENCE OR OTHER TORTIOUS ACTION, ARISING OUT OF
// OR IN CONNECTION WITH THE USE OR PERFORMANCE OF THIS SOFTWARE.
//

// A software implementation of the Zilog Z80: all five prefix tables, full
// undocumented-flag precision, the instruction set Spectrum software
// actually depends on.

use log::warn;
use thiserror::Error;

use crate::z80::bus::Bus;
use crate::z80::decode::IndexMode;
use crate::z80::regs::Registers;
use crate::z80::{cb, ed, main_table, xy, xycb};

pub const RESET_EXEC_START:   u16 = 0x0000;
pub const NMI_VEC:            u16 = 0x0066;
pub const MODE1_INT_VEC:      u16 = 0x0038;
pub const MODE2_INT_VEC_HIGH: u8  = 0x00;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptMode {
    Mode0,
    Mode1,
    Mode2,
}

pub struct CPU {
    pub regs:    Registers,
    pub halted:  bool,
    pub im:      InterruptMode,
    pub iff1:    bool,
    pub iff2:    bool,

    /// Set by EI, cleared at the start of the very next instruction fetch;
    /// blocks IRQ acceptance so the instruction after EI always runs first.
    pub ei_pending: bool,

    nmi_pending: bool,
    irq_line:    bool,

    /// The DD/FD "displacement register": IX or IY is copied in here before
    /// an XY-prefixed instruction runs, and copied back out afterwards. A
    /// distinct field, never a pointer into IX/IY (see DESIGN NOTES).
    pub xy: u16,
}

impl CPU {
    pub fn new() -> CPU {
        let mut cpu = CPU {
            regs:        Registers::default(),
            halted:      true,
            im:          InterruptMode::Mode0,
            iff1:        false,
            iff2:        false,
            ei_pending:  false,
            nmi_pending: false,
            irq_line:    false,
            xy:          0,
        };
        cpu.power(true);
        cpu
    }

    /// Power on/off. Powering on sets every register to its defined
    /// power-on value (PC=0, AF=0xFFFF, SP/IX/IY=0xFFFF, R=0xFF, flags all
    /// set); powering off halts the CPU and disables interrupts, leaving
    /// register contents alone (there's nothing left to power off into).
    pub fn power(&mut self, on: bool) {
        if on {
            self.regs = Registers::default();
            self.regs.main.af = 0xFFFF;
            self.regs.main.bc = 0xFFFF;
            self.regs.main.de = 0xFFFF;
            self.regs.main.hl = 0xFFFF;
            self.regs.shadow.af = 0xFFFF;
            self.regs.shadow.bc = 0xFFFF;
            self.regs.shadow.de = 0xFFFF;
            self.regs.shadow.hl = 0xFFFF;
            self.regs.ix = 0xFFFF;
            self.regs.iy = 0xFFFF;
            self.regs.sp = 0xFFFF;
            self.regs.pc = RESET_EXEC_START;
            self.regs.i  = MODE2_INT_VEC_HIGH;
            self.regs.r  = 0xFF;

            self.halted      = false;
            self.im          = InterruptMode::Mode0;
            self.iff1        = false;
            self.iff2        = false;
            self.ei_pending  = false;
            self.nmi_pending = false;
            self.irq_line    = false;
            self.xy          = 0;
        } else {
            self.halted = true;
            self.iff1   = false;
            self.iff2   = false;
        }
    }

    /// A CPU RESET: PC/SP/IX/IY go to their reset-defined values and
    /// interrupts are disabled, but general registers are left untouched
    /// (real Z80 hardware RESET doesn't clear A/BC/DE/HL either).
    pub fn reset(&mut self) {
        self.regs.pc = RESET_EXEC_START;
        self.regs.sp = 0xFFFF;
        self.regs.ix = 0xFFFF;
        self.regs.iy = 0xFFFF;
        self.regs.i  = MODE2_INT_VEC_HIGH;

        self.halted      = false;
        self.im          = InterruptMode::Mode0;
        self.iff1        = false;
        self.iff2        = false;
        self.ei_pending  = false;
        self.nmi_pending = false;
        self.irq_line    = false;
    }

    pub fn nmi(&mut self) {
        self.nmi_pending = true;
    }
    pub fn irq(&mut self, level: bool) {
        self.irq_line = level;
    }

    /// Advance the CPU until the cumulative cycle count for this call
    /// reaches or exceeds `requested_cycles`; return the exact number of
    /// cycles consumed, which may overshoot the request by up to the cost
    /// of the final instruction.
    pub fn run(&mut self, bus: &mut dyn Bus, requested_cycles: u32) -> u32 {
        let mut executed: u32 = 0;
        while executed < requested_cycles {
            executed += self.step(bus);
        }
        executed
    }

    fn step(&mut self, bus: &mut dyn Bus) -> u32 {
        if self.nmi_pending {
            self.nmi_pending = false;
            self.wake_from_halt(bus);

            self.regs.bump_r();
            self.iff1 = false;
            // IFF2 is deliberately left alone; RETN restores IFF1 from it.
            self.push16(bus, self.regs.pc);
            self.regs.pc = NMI_VEC;
            return 11;
        }

        if self.irq_line && self.iff1 && !self.ei_pending {
            self.wake_from_halt(bus);
            self.regs.bump_r();
            self.iff1 = false;
            self.iff2 = false;

            return self.accept_irq(bus);
        }

        self.regs.bump_r();
        self.ei_pending = false;

        if self.halted {
            4
        } else {
            let opcode = self.fetch_opcode_byte(bus);
            main_table::exec(self, bus, opcode)
        }
    }

    fn wake_from_halt(&mut self, bus: &mut dyn Bus) {
        if self.halted {
            self.halted = false;
            bus.halt(false);
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
    }

    fn accept_irq(&mut self, bus: &mut dyn Bus) -> u32 {
        match self.im {
            InterruptMode::Mode0 => {
                let data = bus.int_data();
                let opcode = (data & 0xFF) as u8;
                let base_cycles = match opcode {
                    0xC3 => {
                        self.regs.pc = ((data >> 8) & 0xFFFF) as u16;
                        10
                    },
                    0xCD => {
                        let addr = ((data >> 8) & 0xFFFF) as u16;
                        self.push16(bus, self.regs.pc);
                        self.regs.pc = addr;
                        17
                    },
                    other => {
                        let vector = (other & 0x38) as u16;
                        self.push16(bus, self.regs.pc);
                        self.regs.pc = vector;
                        11
                    },
                };
                base_cycles + 2
            },
            InterruptMode::Mode1 => {
                self.push16(bus, self.regs.pc);
                self.regs.pc = MODE1_INT_VEC;
                13
            },
            InterruptMode::Mode2 => {
                let vector_low = (bus.int_data() & 0xFF) as u8;
                let vector_addr = ((self.regs.i as u16) << 8) | (vector_low as u16);
                self.push16(bus, self.regs.pc);
                self.regs.pc = bus.read16(vector_addr);
                19
            },
        }
    }

    // -- fetch/stack helpers shared by every instruction table --

    pub fn fetch_opcode_byte(&mut self, bus: &mut dyn Bus) -> u8 {
        let byte = bus.read8(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        byte
    }
    pub fn fetch_imm8(&mut self, bus: &mut dyn Bus) -> u8 {
        self.fetch_opcode_byte(bus)
    }
    pub fn fetch_imm16(&mut self, bus: &mut dyn Bus) -> u16 {
        let lo = self.fetch_imm8(bus);
        let hi = self.fetch_imm8(bus);
        ((hi as u16) << 8) | (lo as u16)
    }
    pub fn fetch_displacement_addr(&mut self, bus: &mut dyn Bus, index: IndexMode) -> u16 {
        let d = self.fetch_imm8(bus) as i8;
        index.reg_value(self).wrapping_add(d as i16 as u16)
    }

    pub fn push16(&mut self, bus: &mut dyn Bus, value: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(2);
        bus.write16(self.regs.sp, value);
    }
    pub fn pop16(&mut self, bus: &mut dyn Bus) -> u16 {
        let value = bus.read16(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }

    /// Dispatch a DD/FD-prefixed instruction. `second_byte` is the byte
    /// that followed the prefix. An "XY-illegal" opcode (one that doesn't
    /// reference H, L or (HL)) falls through to the unprefixed table with
    /// 4 cycles tacked on, per spec.
    pub fn dispatch_xy(&mut self, bus: &mut dyn Bus, index: IndexMode, second_byte: u8) -> u32 {
        if second_byte == 0xCB {
            let displacement = self.fetch_imm8(bus) as i8;
            let addr = index.reg_value(self).wrapping_add(displacement as i16 as u16);
            let sub_opcode = self.fetch_opcode_byte(bus);
            xycb::exec(self, bus, index, addr, sub_opcode)
        } else {
            match xy::exec(self, bus, index, second_byte) {
                Some(cycles) => cycles,
                None => main_table::exec(self, bus, second_byte) + 4,
            }
        }
    }

    pub fn dispatch_cb(&mut self, bus: &mut dyn Bus) -> u32 {
        let opcode = self.fetch_opcode_byte(bus);
        cb::exec(self, bus, opcode)
    }

    pub fn dispatch_ed(&mut self, bus: &mut dyn Bus) -> u32 {
        let opcode = self.fetch_opcode_byte(bus);
        match ed::exec(self, bus, opcode) {
            Some(cycles) => cycles,
            None => {
                warn!("Illegal ED-prefixed opcode 0xED 0x{:02X}, treating as a 2-byte NOP.", opcode);
                8
            },
        }
    }
}

impl Default for CPU {
    fn default() -> Self {
        CPU::new()
    }
}

/// A fixed-layout, fully-`Copy` snapshot of every register and interrupt flag
/// spec.md's §6 "Snapshot state" names for the CPU half of a save, used as
/// the CPU's half of `zx::snapshot::Snapshot`. `im` is a raw byte rather than
/// `InterruptMode` so that a malformed buffer deserialized straight into this
/// struct (e.g. by an external loader) can still be rejected explicitly by
/// `CPU::write_state`, instead of being impossible to construct at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuState {
    pub af: u16, pub bc: u16, pub de: u16, pub hl: u16,
    pub af_shadow: u16, pub bc_shadow: u16, pub de_shadow: u16, pub hl_shadow: u16,
    pub ix: u16, pub iy: u16,
    pub pc: u16, pub sp: u16,
    pub i: u8, pub r: u8,
    pub iff1: bool, pub iff2: bool,
    pub im: u8,
    pub halted: bool,
    pub ei_pending: bool,
    pub nmi_pending: bool,
    pub irq_line: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("invalid snapshot: interrupt mode byte 0x{0:02X} is not 0, 1 or 2")]
    InvalidInterruptMode(u8),
}

impl CPU {
    /// Write out every register/flag/IFF/IM/HALT/pending-interrupt field in
    /// a defined order. Always succeeds: every live CPU state is valid.
    pub fn read_state(&self) -> CpuState {
        CpuState {
            af: self.regs.main.af, bc: self.regs.main.bc,
            de: self.regs.main.de, hl: self.regs.main.hl,
            af_shadow: self.regs.shadow.af, bc_shadow: self.regs.shadow.bc,
            de_shadow: self.regs.shadow.de, hl_shadow: self.regs.shadow.hl,
            ix: self.regs.ix, iy: self.regs.iy,
            pc: self.regs.pc, sp: self.regs.sp,
            i: self.regs.i, r: self.regs.r,
            iff1: self.iff1, iff2: self.iff2,
            im: match self.im {
                InterruptMode::Mode0 => 0,
                InterruptMode::Mode1 => 1,
                InterruptMode::Mode2 => 2,
            },
            halted: self.halted,
            ei_pending: self.ei_pending,
            nmi_pending: self.nmi_pending,
            irq_line: self.irq_line,
        }
    }

    /// Load a previously-read (or externally constructed) `CpuState`. The
    /// only validation spec.md §7 calls for: `im` must be 0, 1 or 2. `r`
    /// is already constrained to a full byte by its type, satisfying the
    /// "R fits in 8 bits" requirement without a runtime check.
    pub fn write_state(&mut self, state: &CpuState) -> Result<(), SnapshotError> {
        let im = match state.im {
            0 => InterruptMode::Mode0,
            1 => InterruptMode::Mode1,
            2 => InterruptMode::Mode2,
            other => return Err(SnapshotError::InvalidInterruptMode(other)),
        };

        self.regs.main.af = state.af; self.regs.main.bc = state.bc;
        self.regs.main.de = state.de; self.regs.main.hl = state.hl;
        self.regs.shadow.af = state.af_shadow; self.regs.shadow.bc = state.bc_shadow;
        self.regs.shadow.de = state.de_shadow; self.regs.shadow.hl = state.hl_shadow;
        self.regs.ix = state.ix; self.regs.iy = state.iy;
        self.regs.pc = state.pc; self.regs.sp = state.sp;
        self.regs.i = state.i; self.regs.r = state.r;
        self.iff1 = state.iff1; self.iff2 = state.iff2;
        self.im = im;
        self.halted = state.halted;
        self.ei_pending = state.ei_pending;
        self.nmi_pending = state.nmi_pending;
        self.irq_line = state.irq_line;

        Ok(())
    }
}

#[cfg(test)]
mod snapshot_tests {
    use super::*;

    #[test]
    fn read_then_write_state_is_a_fixed_point() {
        let mut cpu = CPU::new();
        cpu.regs.main.set_a(0x42);
        cpu.regs.pc = 0x1234;
        let state = cpu.read_state();

        let mut other = CPU::new();
        other.write_state(&state).unwrap();
        assert_eq!(other.read_state(), state);
    }

    #[test]
    fn write_state_rejects_invalid_interrupt_mode() {
        let mut cpu = CPU::new();
        let mut state = cpu.read_state();
        state.im = 3;
        assert_eq!(cpu.write_state(&state), Err(SnapshotError::InvalidInterruptMode(3)));
    }
}
