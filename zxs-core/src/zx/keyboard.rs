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

// Eight bytes, one per ULA address-line row, bit == 0 meaning "key down".
// The host writes this bitmap wholesale between frames; the ULA reads
// individual rows during CPU execution (see `zx::machine`'s `in_port`).

pub const ROWS: usize = 8;

pub struct Keyboard {
    matrix: [u8; ROWS],
}

impl Keyboard {
    pub fn new() -> Keyboard {
        Keyboard { matrix: [0xFF; ROWS] }
    }

    /// Replace the whole bitmap at once -- the "single atomic snapshot" the
    /// concurrency model calls for when the host writes it between frames.
    pub fn set_bitmap(&mut self, bitmap: [u8; ROWS]) {
        self.matrix = bitmap;
    }
    pub fn bitmap(&self) -> [u8; ROWS] {
        self.matrix
    }

    pub fn press(&mut self, row: usize, column_bit: u8) {
        self.matrix[row] &= !column_bit;
    }
    pub fn release(&mut self, row: usize, column_bit: u8) {
        self.matrix[row] |= column_bit;
    }

    /// The row byte the ULA read logic ANDs together for every row selected
    /// by a cleared high-address bit.
    pub fn row(&self, row: usize) -> u8 {
        self.matrix[row]
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Keyboard::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_keyboard_reports_everything_up() {
        let kbd = Keyboard::new();
        for row in 0..ROWS {
            assert_eq!(kbd.row(row), 0xFF);
        }
    }

    #[test]
    fn press_clears_only_its_own_bit() {
        let mut kbd = Keyboard::new();
        kbd.press(1, 0b0000_0010); // 'A' in row 1, per the Spectrum matrix
        assert_eq!(kbd.row(1), 0xFD);
        kbd.release(1, 0b0000_0010);
        assert_eq!(kbd.row(1), 0xFF);
    }
}
