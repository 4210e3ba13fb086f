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

// Flags register contents, S Z YF HF XF PV N C (bits 7..0):
pub const FLAG_SIGN:             u8 = 0b1000_0000;
pub const FLAG_ZERO:             u8 = 0b0100_0000;
pub const FLAG_UNDOC_Y:          u8 = 0b0010_0000;
pub const FLAG_HALF_CARRY:       u8 = 0b0001_0000;
pub const FLAG_UNDOC_X:          u8 = 0b0000_1000;
pub const FLAG_PARITY_OVERFLOW:  u8 = 0b0000_0100;
pub const FLAG_ADD_SUB:          u8 = 0b0000_0010;
pub const FLAG_CARRY:            u8 = 0b0000_0001;

/// The F register, unpacked into named bits. `undoc_y`/`undoc_x` are always
/// recomputed by every flag-setting operation -- they're never left as
/// stale bits from whatever instruction ran before.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    pub sign:            bool,
    pub zero:             bool,
    pub undoc_y:          bool,
    pub half_carry:       bool,
    pub undoc_x:          bool,
    pub parity_overflow:  bool,
    pub add_sub:          bool,
    pub carry:            bool,
}

impl Flags {
    pub fn to_byte(&self) -> u8 {
        0 | if self.sign            { FLAG_SIGN }            else { 0 }
          | if self.zero             { FLAG_ZERO }            else { 0 }
          | if self.undoc_y          { FLAG_UNDOC_Y }         else { 0 }
          | if self.half_carry       { FLAG_HALF_CARRY }      else { 0 }
          | if self.undoc_x          { FLAG_UNDOC_X }         else { 0 }
          | if self.parity_overflow  { FLAG_PARITY_OVERFLOW } else { 0 }
          | if self.add_sub          { FLAG_ADD_SUB }         else { 0 }
          | if self.carry            { FLAG_CARRY }           else { 0 }
    }
    pub fn from_byte(byte: u8) -> Flags {
        Flags {
            sign:             (byte & FLAG_SIGN)            != 0,
            zero:             (byte & FLAG_ZERO)            != 0,
            undoc_y:          (byte & FLAG_UNDOC_Y)         != 0,
            half_carry:       (byte & FLAG_HALF_CARRY)      != 0,
            undoc_x:          (byte & FLAG_UNDOC_X)         != 0,
            parity_overflow:  (byte & FLAG_PARITY_OVERFLOW) != 0,
            add_sub:          (byte & FLAG_ADD_SUB)         != 0,
            carry:            (byte & FLAG_CARRY)           != 0,
        }
    }
    /// Copy YF/XF (bits 5 and 3) out of an arbitrary byte, as required
    /// whenever a flag table says "YF/XF come from X rather than the
    /// result" (CP, BIT n,(HL), LD A,I/R).
    pub fn set_undoc_from(&mut self, byte: u8) {
        self.undoc_y = (byte & FLAG_UNDOC_Y) != 0;
        self.undoc_x = (byte & FLAG_UNDOC_X) != 0;
    }
}

macro_rules! reg_pair {
    ($get_hi:ident, $set_hi:ident, $get_lo:ident, $set_lo:ident, $field:ident) => {
        pub fn $get_hi(&self) -> u8 {
            (self.$field >> 8) as u8
        }
        pub fn $set_hi(&mut self, value: u8) {
            self.$field = (self.$field & 0x00FF) | ((value as u16) << 8);
        }
        pub fn $get_lo(&self) -> u8 {
            (self.$field & 0x00FF) as u8
        }
        pub fn $set_lo(&mut self, value: u8) {
            self.$field = (self.$field & 0xFF00) | (value as u16);
        }
    };
}

/// One half of the register file: a flat byte/word view over AF/BC/DE/HL
/// plus the index registers, swapped as a whole for the shadow set.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegSet {
    pub af: u16,
    pub bc: u16,
    pub de: u16,
    pub hl: u16,
}

impl RegSet {
    pub fn flags(&self) -> Flags {
        Flags::from_byte((self.af & 0xFF) as u8)
    }
    pub fn set_flags(&mut self, flags: Flags) {
        self.af = (self.af & 0xFF00) | (flags.to_byte() as u16);
    }

    reg_pair!(a, set_a, f, set_f, af);
    reg_pair!(b, set_b, c, set_c, bc);
    reg_pair!(d, set_d, e, set_e, de);
    reg_pair!(h, set_h, l, set_l, hl);
}

/// The full Z80 register file: the active set, the shadow set, the index
/// registers, and the special registers (PC/SP/I/R). IX/IY are stored as
/// plain `u16`s with `hi()/lo()` accessors, same shape as the general pairs,
/// so that DD/FD decoding can alias H/L onto IXH/IXL or IYH/IYL generically
/// instead of poking bytes of a raw struct.
#[derive(Clone, Copy, Debug, Default)]
pub struct Registers {
    pub main:   RegSet,
    pub shadow: RegSet,

    pub ix: u16,
    pub iy: u16,

    pub pc: u16,
    pub sp: u16,
    pub i:  u8,
    pub r:  u8,
}

impl Registers {
    pub fn ixh(&self) -> u8 { (self.ix >> 8) as u8 }
    pub fn ixl(&self) -> u8 { (self.ix & 0xFF) as u8 }
    pub fn set_ixh(&mut self, v: u8) { self.ix = (self.ix & 0x00FF) | ((v as u16) << 8); }
    pub fn set_ixl(&mut self, v: u8) { self.ix = (self.ix & 0xFF00) | (v as u16); }

    pub fn iyh(&self) -> u8 { (self.iy >> 8) as u8 }
    pub fn iyl(&self) -> u8 { (self.iy & 0xFF) as u8 }
    pub fn set_iyh(&mut self, v: u8) { self.iy = (self.iy & 0x00FF) | ((v as u16) << 8); }
    pub fn set_iyl(&mut self, v: u8) { self.iy = (self.iy & 0xFF00) | (v as u16); }

    /// Advance R by one, preserving bit 7 (the software-writable "R7" bit).
    pub fn bump_r(&mut self) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
    }
}
