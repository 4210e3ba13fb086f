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

// The plain CB-prefixed table: rotate/shift/BIT/RES/SET over an unindexed
// r8 slot. DDCB/FDCB forms go through `xycb` instead, which has its own
// addressing (a single pre-computed `(IX+d)`/`(IY+d)` effective address).

use crate::z80::alu;
use crate::z80::bus::Bus;
use crate::z80::cpu::CPU;
use crate::z80::decode::{self, y_field, z_field, IndexMode};

pub fn exec(cpu: &mut CPU, bus: &mut dyn Bus, opcode: u8) -> u32 {
    let x = opcode >> 6;
    let y = y_field(opcode);
    let z = z_field(opcode);

    let is_mem = z == 6;
    let value = decode::read_r8(cpu, bus, z, IndexMode::None, None);

    match x {
        0 => {
            let mut flags = cpu.regs.main.flags();
            let result = rot_op(&mut flags, y, value);
            cpu.regs.main.set_flags(flags);
            decode::write_r8(cpu, bus, z, IndexMode::None, None, result);
            if is_mem { 15 } else { 8 }
        },
        1 => {
            let undoc_src = if is_mem { (cpu.regs.main.hl >> 8) as u8 } else { value & (1 << y) };
            let mut flags = cpu.regs.main.flags();
            alu::bit(&mut flags, y, value, undoc_src);
            cpu.regs.main.set_flags(flags);
            if is_mem { 12 } else { 8 }
        },
        2 => {
            let result = alu::res_bit(y, value);
            decode::write_r8(cpu, bus, z, IndexMode::None, None, result);
            if is_mem { 15 } else { 8 }
        },
        3 => {
            let result = alu::set_bit(y, value);
            decode::write_r8(cpu, bus, z, IndexMode::None, None, result);
            if is_mem { 15 } else { 8 }
        },
        _ => unreachable!(),
    }
}

pub fn rot_op(flags: &mut crate::z80::regs::Flags, y: u8, value: u8) -> u8 {
    let carry_in = flags.carry;
    match y {
        0 => alu::rlc(flags, value),
        1 => alu::rrc(flags, value),
        2 => alu::rl(flags, value, carry_in),
        3 => alu::rr(flags, value, carry_in),
        4 => alu::sla(flags, value),
        5 => alu::sra(flags, value),
        6 => alu::sll(flags, value),
        7 => alu::srl(flags, value),
        _ => unreachable!(),
    }
}
