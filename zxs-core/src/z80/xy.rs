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

// The DD/FD table. Rather than hand-duplicating every main-table body with
// IX/IY swapped in, this reuses `main_table::exec_with_index` for the set of
// opcodes that actually reference H, L or (HL); anything else isn't part of
// the DD/FD table at all, and `CPU::dispatch_xy` falls through to the plain
// unprefixed instruction (plus the 4-cycle cost of the wasted prefix byte).

use crate::z80::bus::Bus;
use crate::z80::cpu::CPU;
use crate::z80::decode::IndexMode;
use crate::z80::main_table;

pub fn exec(cpu: &mut CPU, bus: &mut dyn Bus, index: IndexMode, opcode: u8) -> Option<u32> {
    if main_table::touches_index(opcode) {
        Some(main_table::exec_with_index(cpu, bus, opcode, index))
    } else {
        None
    }
}
