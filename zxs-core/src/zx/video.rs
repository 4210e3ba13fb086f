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

// The ULA's character-cell renderer: two 8-entry RGBA palettes (normal and
// BRIGHT), a row-major framebuffer sized by the model's border geometry, and
// the bitmap/attribute decode spec.md's "Character row decoding" describes.
// `Machine::run_1_frame` calls `fill_border_scanline`/`render_paper_scanline`
// once per scanline as it interleaves CPU execution with video output.

use crate::zx::models::BorderGeometry;

pub const SCREEN_WIDTH:  u32 = 256;
pub const SCREEN_HEIGHT: u32 = 192;
pub const CHAR_COLS:     u32 = 32;
pub const CHAR_ROWS:     u32 = 24;

/// Offset, within the video bank, where the 6144-byte bitmap region ends and
/// the 768-byte attribute region begins.
pub const CHARACTER_RAM_SIZE: usize = 6144;

/// 0,0,0 .. 7 = black, blue, red, magenta, green, cyan, yellow, white, at
/// normal (0xCD) luminance; the BRIGHT palette uses 0xFF instead.
const NORMAL_LUMA: u8 = 0xCD;
const BRIGHT_LUMA: u8 = 0xFF;

fn rgba(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | 0xFF
}

fn build_palette(luma: u8) -> [u32; 8] {
    [
        rgba(0, 0, 0),
        rgba(0, 0, luma),
        rgba(luma, 0, 0),
        rgba(luma, 0, luma),
        rgba(0, luma, 0),
        rgba(0, luma, luma),
        rgba(luma, luma, 0),
        rgba(luma, luma, luma),
    ]
}

pub struct Palettes {
    normal: [u32; 8],
    bright: [u32; 8],
}

impl Palettes {
    pub fn new() -> Palettes {
        Palettes {
            normal: build_palette(NORMAL_LUMA),
            bright: build_palette(BRIGHT_LUMA),
        }
    }
    pub fn color(&self, index: u8, bright: bool) -> u32 {
        let table = if bright { &self.bright } else { &self.normal };
        table[(index & 0x07) as usize]
    }
}

impl Default for Palettes {
    fn default() -> Self {
        Palettes::new()
    }
}

pub struct Attribute {
    pub flash:  bool,
    pub bright: bool,
    pub paper:  u8,
    pub ink:    u8,
}

impl Attribute {
    pub fn decode(byte: u8) -> Attribute {
        Attribute {
            flash:  (byte & 0x80) != 0,
            bright: (byte & 0x40) != 0,
            paper:  (byte >> 3) & 0x07,
            ink:    byte & 0x07,
        }
    }
}

/// One frame's worth of pixels, row-major RGBA8888, sized
/// `(side*2 + 256) x (top + 192 + bottom)` per the model's border geometry.
pub struct FrameBuffer {
    pub width:  u32,
    pub height: u32,
    pixels: Vec<u32>,
    border: BorderGeometry,
}

impl FrameBuffer {
    pub fn new(border: BorderGeometry) -> FrameBuffer {
        let width = border.side_width * 2 + SCREEN_WIDTH;
        let height = border.top_height + SCREEN_HEIGHT + border.bottom_height;
        FrameBuffer {
            width,
            height,
            pixels: vec![0; (width * height) as usize],
            border,
        }
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    fn put(&mut self, x: u32, y: u32, color: u32) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }

    /// Fill one entire border scanline -- top or bottom region -- with a
    /// single color. `y` is the absolute row in the framebuffer.
    pub fn fill_border_row(&mut self, y: u32, color: u32) {
        for x in 0..self.width {
            self.put(x, y, color);
        }
    }

    /// Render one paper-region scanline. `paper_y` is 0..192; `char_row_byte`
    /// supplies the bitmap byte for character column `cx` and `attr_byte`
    /// supplies its attribute for the given `cy` (`paper_y / 8`), per the
    /// "Character row decoding" offsets in spec.md. `border_color` is the
    /// ULA's currently-latched border RGBA, used for the left/right strips
    /// flanking the 256-pixel paper region on this scanline.
    pub fn render_paper_row<F, G>(&mut self, paper_y: u32, flash_on: bool, palettes: &Palettes,
                                   border_color: u32, mut char_byte_at: F, mut attr_byte_at: G)
    where
        F: FnMut(u32) -> u8,
        G: FnMut(u32) -> u8,
    {
        let y = self.border.top_height + paper_y;
        self.fill_border_row_span(y, 0, self.border.side_width, border_color);

        for cx in 0..CHAR_COLS {
            let char_byte = char_byte_at(cx);
            let attr = Attribute::decode(attr_byte_at(cx));
            let (ink_idx, paper_idx) = if attr.flash && flash_on {
                (attr.paper, attr.ink)
            } else {
                (attr.ink, attr.paper)
            };
            let ink = palettes.color(ink_idx, attr.bright);
            let paper = palettes.color(paper_idx, attr.bright);

            for bit in 0..8u32 {
                let pixel = if (char_byte & (0x80 >> bit)) != 0 { ink } else { paper };
                self.put(self.border.side_width + cx * 8 + bit, y, pixel);
            }
        }

        let right_x = self.border.side_width + SCREEN_WIDTH;
        self.fill_border_row_span(y, right_x, right_x + self.border.side_width, border_color);
    }

    fn fill_border_row_span(&mut self, y: u32, from: u32, to: u32, color: u32) {
        for x in from..to {
            self.put(x, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zx::models::{BorderGeometry, ModelKind, lookup};

    #[test]
    fn attribute_decode_splits_flash_bright_paper_ink() {
        // FLASH + BRIGHT, paper=2, ink=5: 1 1 010 101
        let attr = Attribute::decode(0b1_1_010_101);
        assert!(attr.flash);
        assert!(attr.bright);
        assert_eq!(attr.paper, 2);
        assert_eq!(attr.ink, 5);
    }

    #[test]
    fn bright_palette_uses_a_higher_luma_than_normal() {
        let palettes = Palettes::new();
        let normal_white = palettes.color(7, false);
        let bright_white = palettes.color(7, true);
        assert_ne!(normal_white, bright_white);
        assert_ne!(normal_white, 0); // not pure black
    }

    #[test]
    fn palette_index_wraps_into_eight_entries() {
        let palettes = Palettes::new();
        assert_eq!(palettes.color(0, false), palettes.color(8, false));
    }

    #[test]
    fn frame_buffer_is_sized_from_border_geometry() {
        let border = lookup(ModelKind::Spectrum48kIssue3).border;
        let fb = FrameBuffer::new(border);
        assert_eq!(fb.width, border.side_width * 2 + SCREEN_WIDTH);
        assert_eq!(fb.height, border.top_height + SCREEN_HEIGHT + border.bottom_height);
    }

    #[test]
    fn render_paper_row_paints_ink_where_bitmap_bit_is_set() {
        let border = BorderGeometry { top_height: 0, bottom_height: 0, side_width: 0 };
        let mut fb = FrameBuffer::new(border);
        let palettes = Palettes::new();
        // ink=1 (blue), paper=0 (black), not flashing.
        fb.render_paper_row(0, false, &palettes, 0, |_cx| 0x80, |_cy| 0b000_001);

        let ink = palettes.color(1, false);
        let paper = palettes.color(0, false);
        assert_eq!(fb.pixels()[0], ink, "bit 7 set -> ink color in column 0");
        assert_eq!(fb.pixels()[1], paper, "bit 6 clear -> paper color in column 1");
    }

    #[test]
    fn render_paper_row_swaps_ink_and_paper_while_flashing() {
        let border = BorderGeometry { top_height: 0, bottom_height: 0, side_width: 0 };
        let mut fb = FrameBuffer::new(border);
        let palettes = Palettes::new();
        fb.render_paper_row(0, true, &palettes, 0, |_cx| 0x80, |_cy| 0b1_0_000_001); // FLASH set, ink=1, paper=0

        let ink = palettes.color(1, false);
        let paper = palettes.color(0, false);
        assert_eq!(fb.pixels()[0], paper, "while flashing, ink/paper swap");
        assert_eq!(fb.pixels()[1], ink);
    }
}
