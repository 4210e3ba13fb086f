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

// A HashMap<Scancode, KeyDesc{row,column}> keymap. The Spectrum core wants
// one atomic 8-byte bitmap per frame, so `SdlKeyboard` keeps that bitmap
// locally and flips bits live as SDL key events arrive; the caller copies it
// into the machine once per frame with `bitmap()`.

use std::collections::HashMap;

use sdl2::event::Event;
use sdl2::keyboard::Scancode;

pub enum Action {
    None,
    TogglePause,
    ResetHard,
    ToggleFullscreen,
    Quit,
}

struct KeyDesc {
    row:    usize,
    column: u8,
}

fn new_key_map() -> HashMap<Scancode, KeyDesc> {
    let mut map = HashMap::new();
    let mut row = |scancode: Scancode, r: usize, c: u8| { map.insert(scancode, KeyDesc { row: r, column: c }); };

    // Row 0: CAPS SHIFT, Z, X, C, V
    row(Scancode::LShift, 0, 0b0000_0001);
    row(Scancode::Z,      0, 0b0000_0010);
    row(Scancode::X,      0, 0b0000_0100);
    row(Scancode::C,      0, 0b0000_1000);
    row(Scancode::V,      0, 0b0001_0000);
    // Row 1: A, S, D, F, G
    row(Scancode::A, 1, 0b0000_0001);
    row(Scancode::S, 1, 0b0000_0010);
    row(Scancode::D, 1, 0b0000_0100);
    row(Scancode::F, 1, 0b0000_1000);
    row(Scancode::G, 1, 0b0001_0000);
    // Row 2: Q, W, E, R, T
    row(Scancode::Q, 2, 0b0000_0001);
    row(Scancode::W, 2, 0b0000_0010);
    row(Scancode::E, 2, 0b0000_0100);
    row(Scancode::R, 2, 0b0000_1000);
    row(Scancode::T, 2, 0b0001_0000);
    // Row 3: 1, 2, 3, 4, 5
    row(Scancode::Num1, 3, 0b0000_0001);
    row(Scancode::Num2, 3, 0b0000_0010);
    row(Scancode::Num3, 3, 0b0000_0100);
    row(Scancode::Num4, 3, 0b0000_1000);
    row(Scancode::Num5, 3, 0b0001_0000);
    // Row 4: 0, 9, 8, 7, 6
    row(Scancode::Num0, 4, 0b0000_0001);
    row(Scancode::Num9, 4, 0b0000_0010);
    row(Scancode::Num8, 4, 0b0000_0100);
    row(Scancode::Num7, 4, 0b0000_1000);
    row(Scancode::Num6, 4, 0b0001_0000);
    // Row 5: P, O, I, U, Y
    row(Scancode::P, 5, 0b0000_0001);
    row(Scancode::O, 5, 0b0000_0010);
    row(Scancode::I, 5, 0b0000_0100);
    row(Scancode::U, 5, 0b0000_1000);
    row(Scancode::Y, 5, 0b0001_0000);
    // Row 6: ENTER, L, K, J, H
    row(Scancode::Return, 6, 0b0000_0001);
    row(Scancode::L,      6, 0b0000_0010);
    row(Scancode::K,      6, 0b0000_0100);
    row(Scancode::J,      6, 0b0000_1000);
    row(Scancode::H,      6, 0b0001_0000);
    // Row 7: SPACE, SYMBOL SHIFT, M, N, B
    row(Scancode::Space,  7, 0b0000_0001);
    row(Scancode::RShift, 7, 0b0000_0010);
    row(Scancode::M,      7, 0b0000_0100);
    row(Scancode::N,      7, 0b0000_1000);
    row(Scancode::B,      7, 0b0001_0000);

    map
}

pub struct SdlKeyboard {
    key_map: HashMap<Scancode, KeyDesc>,
    bitmap:  [u8; 8],
}

impl SdlKeyboard {
    pub fn new() -> SdlKeyboard {
        SdlKeyboard { key_map: new_key_map(), bitmap: [0xFF; 8] }
    }

    pub fn bitmap(&self) -> [u8; 8] {
        self.bitmap
    }

    fn press(&mut self, desc: &KeyDesc) {
        self.bitmap[desc.row] &= !desc.column;
    }
    fn release(&mut self, desc: &KeyDesc) {
        self.bitmap[desc.row] |= desc.column;
    }

    /// Handle one SDL event, returning a host-level action if the event
    /// wasn't a plain Spectrum keypress (F4 pause, F5 reset, F11 fullscreen,
    /// window close).
    pub fn handle_event(&mut self, event: &Event) -> Action {
        match event {
            Event::KeyDown { repeat: false, scancode: Some(scancode), .. } => {
                match scancode {
                    Scancode::F4  => Action::TogglePause,
                    Scancode::F5  => Action::ResetHard,
                    Scancode::F11 => Action::ToggleFullscreen,
                    _ => {
                        if let Some(desc) = self.key_map.get(scancode) {
                            self.press(desc);
                        }
                        Action::None
                    },
                }
            },
            Event::KeyUp { repeat: false, scancode: Some(scancode), .. } => {
                if let Some(desc) = self.key_map.get(scancode) {
                    self.release(desc);
                }
                Action::None
            },
            Event::Quit { .. } => Action::Quit,
            _ => Action::None,
        }
    }
}

impl Default for SdlKeyboard {
    fn default() -> Self {
        SdlKeyboard::new()
    }
}
