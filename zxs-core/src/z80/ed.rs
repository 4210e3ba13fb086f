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

// The ED-prefixed table: 16-bit ADC/SBC, I/O and extended load/exchange
// forms, and the sixteen block-transfer/compare/IO instructions. ED never
// interacts with IX/IY, so every register access here goes through
// `IndexMode::None`.

use crate::z80::alu;
use crate::z80::bus::Bus;
use crate::z80::cpu::{InterruptMode, CPU};
use crate::z80::decode::{self, p_field, q_field, y_field, z_field, IndexMode};

pub fn exec(cpu: &mut CPU, bus: &mut dyn Bus, opcode: u8) -> Option<u32> {
    let x = opcode >> 6;
    let y = y_field(opcode);
    let z = z_field(opcode);
    let p = p_field(opcode);
    let q = q_field(opcode);

    match x {
        1 => Some(exec_x1(cpu, bus, y, z, p, q)),
        2 if y >= 4 && z <= 3 => Some(exec_block(cpu, bus, y, z)),
        _ => None,
    }
}

fn exec_x1(cpu: &mut CPU, bus: &mut dyn Bus, y: u8, z: u8, p: u8, q: u8) -> u32 {
    match z {
        0 => {
            let value = bus.in_port(cpu.regs.main.bc);
            let mut flags = cpu.regs.main.flags();
            flags.sign = alu::is_neg8(value);
            flags.zero = value == 0;
            flags.half_carry = false;
            flags.parity_overflow = alu::parity8(value);
            flags.add_sub = false;
            flags.set_undoc_from(value);
            cpu.regs.main.set_flags(flags);
            if y != 6 {
                decode::write_r8(cpu, bus, y, IndexMode::None, None, value);
            }
            12
        },
        1 => {
            let value = if y == 6 { 0 } else { decode::read_r8(cpu, bus, y, IndexMode::None, None) };
            bus.out_port(cpu.regs.main.bc, value);
            12
        },
        2 => {
            let dest = cpu.regs.main.hl;
            let operand = decode::rp_table(cpu, p, IndexMode::None);
            let mut flags = cpu.regs.main.flags();
            let carry_in = flags.carry;
            let result = if q == 0 {
                alu::sbc16(&mut flags, dest, operand, carry_in)
            } else {
                alu::adc16(&mut flags, dest, operand, carry_in)
            };
            cpu.regs.main.set_flags(flags);
            cpu.regs.main.hl = result;
            15
        },
        3 => {
            let nn = cpu.fetch_imm16(bus);
            if q == 0 {
                let value = decode::rp_table(cpu, p, IndexMode::None);
                bus.write16(nn, value);
            } else {
                let value = bus.read16(nn);
                decode::set_rp_table(cpu, p, IndexMode::None, value);
            }
            20
        },
        4 => {
            let a = cpu.regs.main.a();
            let mut flags = cpu.regs.main.flags();
            let result = alu::neg(&mut flags, a);
            cpu.regs.main.set_flags(flags);
            cpu.regs.main.set_a(result);
            8
        },
        5 => {
            cpu.regs.pc = cpu.pop16(bus);
            cpu.iff1 = cpu.iff2;
            14
        },
        6 => {
            cpu.im = match y {
                0 | 1 => InterruptMode::Mode0,
                2 => InterruptMode::Mode1,
                3 => InterruptMode::Mode2,
                4 | 5 => InterruptMode::Mode0,
                6 => InterruptMode::Mode1,
                7 => InterruptMode::Mode2,
                _ => unreachable!(),
            };
            8
        },
        7 => match y {
            0 => { cpu.regs.i = cpu.regs.main.a(); 9 },
            1 => { cpu.regs.r = cpu.regs.main.a(); 9 },
            2 => {
                let i = cpu.regs.i;
                let mut flags = cpu.regs.main.flags();
                alu::ld_a_ir_flags(&mut flags, i, cpu.iff2);
                cpu.regs.main.set_flags(flags);
                cpu.regs.main.set_a(i);
                9
            },
            3 => {
                let r = cpu.regs.r;
                let mut flags = cpu.regs.main.flags();
                alu::ld_a_ir_flags(&mut flags, r, cpu.iff2);
                cpu.regs.main.set_flags(flags);
                cpu.regs.main.set_a(r);
                9
            },
            4 => {
                let a = cpu.regs.main.a();
                let mem = bus.read8(cpu.regs.main.hl);
                let new_mem = (mem << 4) | (a & 0x0F);
                let new_a = (a & 0xF0) | (mem >> 4);
                bus.write8(cpu.regs.main.hl, new_mem);
                let mut flags = cpu.regs.main.flags();
                flags.sign = alu::is_neg8(new_a);
                flags.zero = new_a == 0;
                flags.half_carry = false;
                flags.parity_overflow = alu::parity8(new_a);
                flags.add_sub = false;
                flags.set_undoc_from(new_a);
                cpu.regs.main.set_flags(flags);
                cpu.regs.main.set_a(new_a);
                18
            },
            5 => {
                let a = cpu.regs.main.a();
                let mem = bus.read8(cpu.regs.main.hl);
                let new_mem = (mem >> 4) | (a << 4);
                let new_a = (a & 0xF0) | (mem & 0x0F);
                bus.write8(cpu.regs.main.hl, new_mem);
                let mut flags = cpu.regs.main.flags();
                flags.sign = alu::is_neg8(new_a);
                flags.zero = new_a == 0;
                flags.half_carry = false;
                flags.parity_overflow = alu::parity8(new_a);
                flags.add_sub = false;
                flags.set_undoc_from(new_a);
                cpu.regs.main.set_flags(flags);
                cpu.regs.main.set_a(new_a);
                18
            },
            _ => 4, // 0xED 0x76 / 0xED 0x7E: undocumented no-ops
        },
        _ => unreachable!(),
    }
}

fn exec_block(cpu: &mut CPU, bus: &mut dyn Bus, y: u8, z: u8) -> u32 {
    match z {
        0 => block_ld(cpu, bus, y),
        1 => block_cp(cpu, bus, y),
        2 => block_in(cpu, bus, y),
        3 => block_out(cpu, bus, y),
        _ => unreachable!(),
    }
}

fn block_ld(cpu: &mut CPU, bus: &mut dyn Bus, y: u8) -> u32 {
    let decrement = y == 5 || y == 7;
    let repeat = y == 6 || y == 7;

    let value = bus.read8(cpu.regs.main.hl);
    bus.write8(cpu.regs.main.de, value);
    cpu.regs.main.hl = if decrement { cpu.regs.main.hl.wrapping_sub(1) } else { cpu.regs.main.hl.wrapping_add(1) };
    cpu.regs.main.de = if decrement { cpu.regs.main.de.wrapping_sub(1) } else { cpu.regs.main.de.wrapping_add(1) };
    cpu.regs.main.bc = cpu.regs.main.bc.wrapping_sub(1);

    let a = cpu.regs.main.a();
    let bc_after = cpu.regs.main.bc;
    let mut flags = cpu.regs.main.flags();
    alu::ldi_flags(&mut flags, value, a, bc_after);
    cpu.regs.main.set_flags(flags);

    if repeat && bc_after != 0 {
        cpu.regs.pc = cpu.regs.pc.wrapping_sub(2);
        21
    } else {
        16
    }
}

fn block_cp(cpu: &mut CPU, bus: &mut dyn Bus, y: u8) -> u32 {
    let decrement = y == 5 || y == 7;
    let repeat = y == 6 || y == 7;

    let value = bus.read8(cpu.regs.main.hl);
    let a = cpu.regs.main.a();
    cpu.regs.main.hl = if decrement { cpu.regs.main.hl.wrapping_sub(1) } else { cpu.regs.main.hl.wrapping_add(1) };
    cpu.regs.main.bc = cpu.regs.main.bc.wrapping_sub(1);

    let bc_after = cpu.regs.main.bc;
    let mut flags = cpu.regs.main.flags();
    alu::cpi_flags(&mut flags, a, value, bc_after);
    cpu.regs.main.set_flags(flags);

    if repeat && bc_after != 0 && !flags.zero {
        cpu.regs.pc = cpu.regs.pc.wrapping_sub(2);
        21
    } else {
        16
    }
}

fn block_in(cpu: &mut CPU, bus: &mut dyn Bus, y: u8) -> u32 {
    let decrement = y == 5 || y == 7;
    let repeat = y == 6 || y == 7;

    let value = bus.in_port(cpu.regs.main.bc);
    bus.write8(cpu.regs.main.hl, value);
    cpu.regs.main.hl = if decrement { cpu.regs.main.hl.wrapping_sub(1) } else { cpu.regs.main.hl.wrapping_add(1) };
    let b_after = cpu.regs.main.b().wrapping_sub(1);
    cpu.regs.main.set_b(b_after);
    let c = cpu.regs.main.c();
    let bc_like = if decrement { c.wrapping_sub(1) } else { c.wrapping_add(1) };

    let mut flags = cpu.regs.main.flags();
    alu::ini_ind_flags(&mut flags, value, b_after, bc_like);
    cpu.regs.main.set_flags(flags);

    if repeat && b_after != 0 {
        cpu.regs.pc = cpu.regs.pc.wrapping_sub(2);
        21
    } else {
        16
    }
}

fn block_out(cpu: &mut CPU, bus: &mut dyn Bus, y: u8) -> u32 {
    let decrement = y == 5 || y == 7;
    let repeat = y == 6 || y == 7;

    let value = bus.read8(cpu.regs.main.hl);
    cpu.regs.main.hl = if decrement { cpu.regs.main.hl.wrapping_sub(1) } else { cpu.regs.main.hl.wrapping_add(1) };
    let b_after = cpu.regs.main.b().wrapping_sub(1);
    cpu.regs.main.set_b(b_after);
    bus.out_port(cpu.regs.main.bc, value);
    let l_after = cpu.regs.main.l();

    let mut flags = cpu.regs.main.flags();
    alu::outi_outd_flags(&mut flags, value, b_after, l_after);
    cpu.regs.main.set_flags(flags);

    if repeat && b_after != 0 {
        cpu.regs.pc = cpu.regs.pc.wrapping_sub(2);
        21
    } else {
        16
    }
}
