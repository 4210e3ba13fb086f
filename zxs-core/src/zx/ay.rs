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

// spec.md's Open Questions leave the 128K AY-3-8912 out of scope; this is a
// register-latch-only stub (no tone/noise/envelope generation), just enough
// that software probing for the chip's presence via readback doesn't see
// garbage.

pub const REGISTER_COUNT: usize = 16;

pub struct Ay {
    registers: [u8; REGISTER_COUNT],
    selected:  u8,
}

impl Ay {
    pub fn new() -> Ay {
        Ay { registers: [0; REGISTER_COUNT], selected: 0 }
    }

    /// OUT to 0xFFFD: select a register.
    pub fn select(&mut self, value: u8) {
        self.selected = value & 0x0F;
    }
    /// OUT to 0xBFFD: write the selected register.
    pub fn write(&mut self, value: u8) {
        self.registers[self.selected as usize] = value;
    }
    /// IN from 0xFFFD: read the selected register back.
    pub fn read(&self) -> u8 {
        self.registers[self.selected as usize]
    }
}

impl Default for Ay {
    fn default() -> Self {
        Ay::new()
    }
}
