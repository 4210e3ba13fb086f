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

// The unprefixed table, x=0..3, decomposed per `z80::decode`. Generalized
// over an `IndexMode` so the DD/FD table in `xy` can reuse the same bodies
// for every opcode that actually reads H, L or (HL) -- see `touches_index`.

use crate::z80::alu;
use crate::z80::bus::Bus;
use crate::z80::cpu::CPU;
use crate::z80::decode::{
    self, p_field, q_field, test_condition, x_field, y_field, z_field, IndexMode,
};

pub fn exec(cpu: &mut CPU, bus: &mut dyn Bus, opcode: u8) -> u32 {
    exec_with_index(cpu, bus, opcode, IndexMode::None)
}

/// True for every main-table opcode that reads or writes H, L or (HL) and
/// therefore aliases onto IXH/IXL/(IX+d) (or IY) under a DD/FD prefix.
/// 0x76 (HALT) is the odd one out: it occupies the LD (HL),(HL) slot but
/// stays plain HALT even when prefixed (a documented Z80 hardware quirk).
pub fn touches_index(opcode: u8) -> bool {
    if opcode == 0x76 {
        return false;
    }
    let x = x_field(opcode);
    let y = y_field(opcode);
    let z = z_field(opcode);
    let p = p_field(opcode);
    let q = q_field(opcode);

    match (x, z) {
        (0, 1) => true,                     // ADD HL,rp -- HL is always the dest
        (0, 2) => p == 2,                   // LD (nn),HL / LD HL,(nn)
        (0, 3) => p == 2,                   // INC/DEC HL
        (0, 4) | (0, 5) | (0, 6) => y == 4 || y == 5 || y == 6,
        (1, _) => y == 4 || y == 5 || y == 6 || z == 4 || z == 5 || z == 6,
        (2, _) => z == 4 || z == 5 || z == 6,
        (3, 1) => (q == 0 && p == 2) || (q == 1 && (p == 2 || p == 3)),
        (3, 3) => y == 4,                   // EX (SP),HL
        (3, 5) => q == 0 && p == 2,         // PUSH HL
        _ => false,
    }
}

pub fn exec_with_index(cpu: &mut CPU, bus: &mut dyn Bus, opcode: u8, index: IndexMode) -> u32 {
    match opcode {
        0xCB => return cpu.dispatch_cb(bus),
        0xED => return cpu.dispatch_ed(bus),
        0xDD => { let b = cpu.fetch_opcode_byte(bus); return cpu.dispatch_xy(bus, IndexMode::IX, b); },
        0xFD => { let b = cpu.fetch_opcode_byte(bus); return cpu.dispatch_xy(bus, IndexMode::IY, b); },
        _ => {},
    }

    let x = x_field(opcode);
    let y = y_field(opcode);
    let z = z_field(opcode);
    let p = p_field(opcode);
    let q = q_field(opcode);

    match x {
        0 => exec_x0(cpu, bus, y, z, p, q, index),
        1 => exec_x1(cpu, bus, y, z, index),
        2 => exec_x2(cpu, bus, y, z, index),
        3 => exec_x3(cpu, bus, y, z, p, q, index),
        _ => unreachable!(),
    }
}

fn exec_x0(cpu: &mut CPU, bus: &mut dyn Bus, y: u8, z: u8, p: u8, q: u8, index: IndexMode) -> u32 {
    match z {
        0 => match y {
            0 => 4, // NOP
            1 => { std::mem::swap(&mut cpu.regs.main.af, &mut cpu.regs.shadow.af); 4 },
            2 => {
                cpu.regs.main.set_b(cpu.regs.main.b().wrapping_sub(1));
                let d = cpu.fetch_imm8(bus) as i8;
                if cpu.regs.main.b() != 0 {
                    cpu.regs.pc = cpu.regs.pc.wrapping_add(d as i16 as u16);
                    13
                } else {
                    8
                }
            },
            3 => {
                let d = cpu.fetch_imm8(bus) as i8;
                cpu.regs.pc = cpu.regs.pc.wrapping_add(d as i16 as u16);
                12
            },
            _ => {
                let d = cpu.fetch_imm8(bus) as i8;
                if test_condition(cpu, y - 4) {
                    cpu.regs.pc = cpu.regs.pc.wrapping_add(d as i16 as u16);
                    12
                } else {
                    7
                }
            },
        },
        1 => {
            if q == 0 {
                let value = cpu.fetch_imm16(bus);
                decode::set_rp_table(cpu, p, index, value);
                10
            } else {
                let dest = index.reg_value(cpu);
                let operand = decode::rp_table(cpu, p, index);
                let mut flags = cpu.regs.main.flags();
                let result = alu::add16(&mut flags, dest, operand);
                cpu.regs.main.set_flags(flags);
                index.set_reg_value(cpu, result);
                11
            }
        },
        2 => {
            match (q, p) {
                (0, 0) => { bus.write8(cpu.regs.main.bc, cpu.regs.main.a()); 7 },
                (0, 1) => { bus.write8(cpu.regs.main.de, cpu.regs.main.a()); 7 },
                (0, 2) => { let nn = cpu.fetch_imm16(bus); bus.write16(nn, index.reg_value(cpu)); 16 },
                (0, 3) => { let nn = cpu.fetch_imm16(bus); bus.write8(nn, cpu.regs.main.a()); 13 },
                (1, 0) => { cpu.regs.main.set_a(bus.read8(cpu.regs.main.bc)); 7 },
                (1, 1) => { cpu.regs.main.set_a(bus.read8(cpu.regs.main.de)); 7 },
                (1, 2) => { let nn = cpu.fetch_imm16(bus); let v = bus.read16(nn); index.set_reg_value(cpu, v); 16 },
                (1, 3) => { let nn = cpu.fetch_imm16(bus); cpu.regs.main.set_a(bus.read8(nn)); 13 },
                _ => unreachable!(),
            }
        },
        3 => {
            let value = decode::rp_table(cpu, p, index);
            let result = if q == 0 { value.wrapping_add(1) } else { value.wrapping_sub(1) };
            decode::set_rp_table(cpu, p, index, result);
            6
        },
        4 => {
            let (v, extra, disp_addr) = read_slot_with_cost(cpu, bus, y, index);
            let mut flags = cpu.regs.main.flags();
            let r = alu::inc8(&mut flags, v);
            cpu.regs.main.set_flags(flags);
            decode::write_r8(cpu, bus, y, index, disp_addr, r);
            if y == 6 { 11 + extra } else { 4 }
        },
        5 => {
            let (v, extra, disp_addr) = read_slot_with_cost(cpu, bus, y, index);
            let mut flags = cpu.regs.main.flags();
            let r = alu::dec8(&mut flags, v);
            cpu.regs.main.set_flags(flags);
            decode::write_r8(cpu, bus, y, index, disp_addr, r);
            if y == 6 { 11 + extra } else { 4 }
        },
        6 => {
            // LD r[y],n -- for y==6 under an index, the displacement comes
            // first, then the immediate (hardware order: DD 36 d n).
            if y == 6 && index != IndexMode::None {
                let addr = cpu.fetch_displacement_addr(bus, index);
                let n = cpu.fetch_imm8(bus);
                bus.write8(addr, n);
                19
            } else {
                let n = cpu.fetch_imm8(bus);
                decode::write_r8(cpu, bus, y, index, None, n);
                if y == 6 { 10 } else { 7 }
            }
        },
        7 => {
            let mut flags = cpu.regs.main.flags();
            let a = cpu.regs.main.a();
            let carry_in = flags.carry;
            let result = match y {
                0 => alu::rlca(&mut flags, a),
                1 => alu::rrca(&mut flags, a),
                2 => alu::rla(&mut flags, a, carry_in),
                3 => alu::rra(&mut flags, a, carry_in),
                4 => { cpu.regs.main.set_flags(flags); return_daa(cpu) },
                5 => alu::cpl(&mut flags, a),
                6 => { alu::scf(&mut flags, a); a },
                7 => { alu::ccf(&mut flags, a); a },
                _ => unreachable!(),
            };
            if y != 4 {
                cpu.regs.main.set_flags(flags);
                cpu.regs.main.set_a(result);
            }
            4
        },
        _ => unreachable!(),
    }
}

fn return_daa(cpu: &mut CPU) -> u8 {
    let mut flags = cpu.regs.main.flags();
    let result = alu::daa(&mut flags, cpu.regs.main.a());
    cpu.regs.main.set_flags(flags);
    cpu.regs.main.set_a(result);
    result
}

fn exec_x1(cpu: &mut CPU, bus: &mut dyn Bus, y: u8, z: u8, index: IndexMode) -> u32 {
    if y == 6 && z == 6 {
        cpu.regs.pc = cpu.regs.pc.wrapping_sub(1);
        cpu.halted = true;
        bus.halt(true);
        return 4;
    }

    let (src_is_idx_mem, dst_is_idx_mem) = (z == 6 && index != IndexMode::None, y == 6 && index != IndexMode::None);
    let disp_addr = if src_is_idx_mem || dst_is_idx_mem {
        Some(cpu.fetch_displacement_addr(bus, index))
    } else {
        None
    };
    let value = decode::read_r8(cpu, bus, z, index, disp_addr);
    decode::write_r8(cpu, bus, y, index, disp_addr, value);

    if z == 6 || y == 6 {
        if index != IndexMode::None { 19 } else { 7 }
    } else {
        4
    }
}

fn exec_x2(cpu: &mut CPU, bus: &mut dyn Bus, y: u8, z: u8, index: IndexMode) -> u32 {
    let (v, extra, _) = read_slot_with_cost(cpu, bus, z, index);
    alu_op(cpu, y, v);
    if z == 6 { 7 + extra } else { 4 }
}

pub fn alu_op(cpu: &mut CPU, y: u8, operand: u8) -> u8 {
    let mut flags = cpu.regs.main.flags();
    let a = cpu.regs.main.a();
    let carry_in = flags.carry;
    let result = match y {
        0 => alu::add8(&mut flags, a, operand, false),
        1 => alu::add8(&mut flags, a, operand, carry_in),
        2 => alu::sub8(&mut flags, a, operand, false),
        3 => alu::sub8(&mut flags, a, operand, carry_in),
        4 => alu::and8(&mut flags, a, operand),
        5 => alu::xor8(&mut flags, a, operand),
        6 => alu::or8(&mut flags, a, operand),
        7 => { alu::cp8(&mut flags, a, operand); a },
        _ => unreachable!(),
    };
    cpu.regs.main.set_flags(flags);
    if y != 7 {
        cpu.regs.main.set_a(result);
    }
    result
}

fn exec_x3(cpu: &mut CPU, bus: &mut dyn Bus, y: u8, z: u8, p: u8, q: u8, index: IndexMode) -> u32 {
    match z {
        0 => {
            if test_condition(cpu, y) {
                cpu.regs.pc = cpu.pop16(bus);
                11
            } else {
                5
            }
        },
        1 => {
            if q == 0 {
                let value = cpu.pop16(bus);
                decode::set_rp2_table(cpu, p, index, value);
                10
            } else {
                match p {
                    0 => { cpu.regs.pc = cpu.pop16(bus); 10 },
                    1 => {
                        std::mem::swap(&mut cpu.regs.main.bc, &mut cpu.regs.shadow.bc);
                        std::mem::swap(&mut cpu.regs.main.de, &mut cpu.regs.shadow.de);
                        std::mem::swap(&mut cpu.regs.main.hl, &mut cpu.regs.shadow.hl);
                        4
                    },
                    2 => { cpu.regs.pc = index.reg_value(cpu); 4 },
                    3 => { cpu.regs.sp = index.reg_value(cpu); 6 },
                    _ => unreachable!(),
                }
            }
        },
        2 => {
            let nn = cpu.fetch_imm16(bus);
            if test_condition(cpu, y) {
                cpu.regs.pc = nn;
            }
            10
        },
        3 => match y {
            0 => { let nn = cpu.fetch_imm16(bus); cpu.regs.pc = nn; 10 },
            1 => cpu.dispatch_cb(bus),
            2 => { let n = cpu.fetch_imm8(bus); let port = ((cpu.regs.main.a() as u16) << 8) | (n as u16); bus.out_port(port, cpu.regs.main.a()); 11 },
            3 => { let n = cpu.fetch_imm8(bus); let port = ((cpu.regs.main.a() as u16) << 8) | (n as u16); let v = bus.in_port(port); cpu.regs.main.set_a(v); 11 },
            4 => {
                let sp = cpu.regs.sp;
                let stack_val = bus.read16(sp);
                let idx_val = index.reg_value(cpu);
                bus.write16(sp, idx_val);
                index.set_reg_value(cpu, stack_val);
                if index != IndexMode::None { 23 } else { 19 }
            },
            5 => { std::mem::swap(&mut cpu.regs.main.de, &mut cpu.regs.main.hl); 4 },
            6 => { cpu.iff1 = false; cpu.iff2 = false; 4 },
            7 => { cpu.iff1 = true; cpu.iff2 = true; cpu.ei_pending = true; 4 },
            _ => unreachable!(),
        },
        4 => {
            let nn = cpu.fetch_imm16(bus);
            if test_condition(cpu, y) {
                cpu.push16(bus, cpu.regs.pc);
                cpu.regs.pc = nn;
                17
            } else {
                10
            }
        },
        5 => {
            if q == 0 {
                let value = decode::rp2_table(cpu, p, index);
                cpu.push16(bus, value);
                if p == 2 && index != IndexMode::None { 15 } else { 11 }
            } else {
                match p {
                    0 => { let nn = cpu.fetch_imm16(bus); cpu.push16(bus, cpu.regs.pc); cpu.regs.pc = nn; 17 },
                    1 => { let b = cpu.fetch_opcode_byte(bus); cpu.dispatch_xy(bus, IndexMode::IX, b) },
                    2 => cpu.dispatch_ed(bus),
                    3 => { let b = cpu.fetch_opcode_byte(bus); cpu.dispatch_xy(bus, IndexMode::IY, b) },
                    _ => unreachable!(),
                }
            }
        },
        6 => {
            let n = cpu.fetch_imm8(bus);
            alu_op(cpu, y, n);
            7
        },
        7 => {
            cpu.push16(bus, cpu.regs.pc);
            cpu.regs.pc = (y as u16) * 8;
            11
        },
        _ => unreachable!(),
    }
}

/// Read an x=0/x=2-style r8 slot, returning the extra displacement-fetch
/// cycles to add on top of the instruction's base (HL) timing when it
/// turned out to be `(IX+d)`/`(IY+d)`.
fn read_slot_with_cost(cpu: &mut CPU, bus: &mut dyn Bus, slot: u8, index: IndexMode) -> (u8, u32, Option<u16>) {
    if decode::r8_is_indexed_mem(slot, index) {
        let addr = cpu.fetch_displacement_addr(bus, index);
        (bus.read8(addr), 8, Some(addr))
    } else {
        (decode::read_r8(cpu, bus, slot, index, None), 0, None)
    }
}
