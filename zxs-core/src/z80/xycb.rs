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

// The DDCB/FDCB table: always operates on the single byte at a pre-computed
// `(IX+d)`/`(IY+d)` address. Every form except BIT b,(I?+d) also copies the
// result into an 8-bit register named by the low 3 bits of the opcode -- an
// undocumented but well-characterized quirk of the real chip's microcode,
// which happens to fall out of (HL)'s own "z==6" slot being unused here.

use crate::z80::alu;
use crate::z80::bus::Bus;
use crate::z80::cb::rot_op;
use crate::z80::cpu::CPU;
use crate::z80::decode::{y_field, z_field, IndexMode};

pub fn exec(cpu: &mut CPU, bus: &mut dyn Bus, _index: IndexMode, addr: u16, opcode: u8) -> u32 {
    let x = opcode >> 6;
    let y = y_field(opcode);
    let z = z_field(opcode);

    let value = bus.read8(addr);

    match x {
        0 => {
            let mut flags = cpu.regs.main.flags();
            let result = rot_op(&mut flags, y, value);
            cpu.regs.main.set_flags(flags);
            bus.write8(addr, result);
            copy_to_register(cpu, z, result);
            23
        },
        1 => {
            let undoc_src = (addr >> 8) as u8;
            let mut flags = cpu.regs.main.flags();
            alu::bit(&mut flags, y, value, undoc_src);
            cpu.regs.main.set_flags(flags);
            20
        },
        2 => {
            let result = alu::res_bit(y, value);
            bus.write8(addr, result);
            copy_to_register(cpu, z, result);
            23
        },
        3 => {
            let result = alu::set_bit(y, value);
            bus.write8(addr, result);
            copy_to_register(cpu, z, result);
            23
        },
        _ => unreachable!(),
    }
}

fn copy_to_register(cpu: &mut CPU, z: u8, value: u8) {
    match z {
        0 => cpu.regs.main.set_b(value),
        1 => cpu.regs.main.set_c(value),
        2 => cpu.regs.main.set_d(value),
        3 => cpu.regs.main.set_e(value),
        4 => cpu.regs.main.set_h(value),
        5 => cpu.regs.main.set_l(value),
        6 => {}, // canonical (IX+d)/(IY+d) form: memory write above, no register copy
        7 => cpu.regs.main.set_a(value),
        _ => unreachable!(),
    }
}
