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

// One contiguous image holding every ROM and RAM bank back to back, indexed
// through a 4-entry page table of 16 KiB logical slots. 16K/48K models never
// repage after `initialize`; 128K models repage on writes to port 0x7FFD.

use log::warn;

use crate::zx::models::ModelInfo;

const SLOT_SIZE: u16 = 0x4000;

pub struct Memory {
    image: Vec<u8>,
    rom_banks: usize,
    ram_banks: usize,
    is_16k: bool,
    is_128k: bool,
    page_table: [usize; 4],
    pub video_bank: usize,
    pub paging_disabled: bool,
    pub paging_latch: u8,
}

impl Memory {
    pub fn new(model: &ModelInfo) -> Memory {
        let mut memory = Memory {
            image: vec![0; model.memory_size],
            rom_banks: model.rom_banks,
            ram_banks: model.ram_banks,
            is_16k: model.memory_size == 0x8000,
            is_128k: model.kind.is_128k(),
            page_table: [0; 4],
            video_bank: 5,
            paging_disabled: false,
            paging_latch: 0,
        };
        memory.initialize();
        memory
    }

    /// 128K: slot 0 -> ROM bank 0, slot 1 -> RAM bank 5 (also VRAM), slot 2
    /// -> RAM bank 2, slot 3 -> RAM bank 0, per spec. 16K/48K/Plus/Inves have
    /// no paging latch and no spare RAM banks to choose among, so they get
    /// the only layout that reproduces the flat-memory 48K bus callback: ROM
    /// followed by RAM banks 0,1,2 in address order.
    pub fn initialize(&mut self) {
        self.paging_disabled = false;
        self.paging_latch = 0;
        if self.is_128k {
            self.video_bank = 5;
            self.page_table = [
                self.rom_bank(0),
                self.ram_bank(5),
                self.ram_bank(2),
                self.ram_bank(0),
            ];
        } else {
            self.video_bank = 0;
            self.page_table = [
                self.rom_bank(0),
                self.ram_bank(0),
                self.ram_bank(1),
                self.ram_bank(2),
            ];
        }
    }

    fn rom_bank(&self, n: usize) -> usize {
        n.min(self.rom_banks.saturating_sub(1))
    }
    fn ram_bank(&self, n: usize) -> usize {
        self.rom_banks + n.min(self.ram_banks.saturating_sub(1))
    }

    fn bank_offset(&self, bank: usize) -> usize {
        bank * (SLOT_SIZE as usize)
    }

    pub fn load_rom(&mut self, offset: usize, data: &[u8]) {
        let end = offset + data.len();
        if end > self.image.len() {
            warn!("ROM image of {} bytes at offset 0x{:X} doesn't fit the {}-byte memory image; truncating.", data.len(), offset, self.image.len());
            let fit = self.image.len().saturating_sub(offset);
            self.image[offset..offset + fit].copy_from_slice(&data[..fit]);
        } else {
            self.image[offset..end].copy_from_slice(data);
        }
    }

    pub fn read8(&self, addr: u16) -> u8 {
        if self.is_16k && addr >= 0x8000 {
            return 0;
        }
        let slot = (addr / SLOT_SIZE) as usize;
        let offset = (addr % SLOT_SIZE) as usize;
        self.image[self.bank_offset(self.page_table[slot]) + offset]
    }

    pub fn write8(&mut self, addr: u16, value: u8) {
        if self.is_16k && addr >= 0x8000 {
            return;
        }
        let slot = (addr / SLOT_SIZE) as usize;
        if self.page_table[slot] < self.rom_banks {
            return;
        }
        let offset = (addr % SLOT_SIZE) as usize;
        let physical = self.bank_offset(self.page_table[slot]) + offset;
        self.image[physical] = value;
    }

    /// Byte at a fixed physical bank, bypassing the page table -- used by
    /// the renderer, which always looks at the ULA-selected video bank
    /// (5 or 7) regardless of what's currently paged into CPU-visible slot 1.
    pub fn read8_in_bank(&self, bank: usize, offset_in_bank: usize) -> u8 {
        self.image[self.bank_offset(bank) + offset_in_bank]
    }

    pub fn video_bank_physical(&self) -> usize {
        self.ram_bank(self.video_bank)
    }

    /// Apply an 0x7FFD paging-latch write. No-op once `paging_disabled` is
    /// latched (stays that way until `initialize` runs again via reset).
    pub fn page(&mut self, value: u8) {
        if self.paging_disabled {
            return;
        }

        let rom_select = (value >> 4) & 0x01;
        let video_select = (value >> 3) & 0x01;
        let ram_select = value & 0x07;

        self.page_table[0] = self.rom_bank(rom_select as usize);
        self.video_bank = if video_select != 0 { 7 } else { 5 };
        self.page_table[1] = self.ram_bank(self.video_bank);
        self.page_table[3] = self.ram_bank(ram_select as usize);
        self.paging_latch = value;

        if (value & 0x20) != 0 {
            self.paging_disabled = true;
        }

        self.write8(0x5B5C, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zx::models::{lookup, ModelKind};

    fn memory_48k() -> Memory {
        Memory::new(lookup(ModelKind::Spectrum48kIssue3))
    }
    fn memory_128k() -> Memory {
        Memory::new(lookup(ModelKind::SpectrumPlus128kEn))
    }

    #[test]
    fn rom_slot_rejects_writes() {
        let mut mem = memory_48k();
        mem.write8(0x0000, 0xAA);
        assert_eq!(mem.read8(0x0000), 0, "ROM is write-protected");
    }

    #[test]
    fn ram_slots_read_back_what_was_written() {
        let mut mem = memory_48k();
        mem.write8(0x8000, 0x42);
        assert_eq!(mem.read8(0x8000), 0x42);
    }

    #[test]
    fn sixteen_k_model_reads_zero_above_0x8000() {
        let mut mem = Memory::new(lookup(ModelKind::Spectrum16kIssue1));
        mem.write8(0xC000, 0x99); // no-op: unbacked address
        assert_eq!(mem.read8(0xC000), 0);
    }

    #[test]
    fn paging_selects_ram_bank_into_slot_three() {
        let mut mem = memory_128k();
        mem.page(0x01); // RAM bank 1 into slot 3
        mem.write8(0xC000, 0x11);
        mem.page(0x00); // RAM bank 0 into slot 3
        mem.write8(0xC000, 0x22);
        mem.page(0x01); // back to RAM bank 1
        assert_eq!(mem.read8(0xC000), 0x11, "bank 1's contents must survive being paged out and back in");
    }

    #[test]
    fn paging_disable_bit_latches_until_reinitialized() {
        let mut mem = memory_128k();
        mem.page(0x20); // set bit 5: disable further paging
        mem.page(0x08); // would flip video_bank to 7 if paging were still live
        assert_eq!(mem.video_bank, 5, "the disable latch must block this second write");

        mem.initialize();
        assert!(!mem.paging_disabled, "a fresh reset clears the latch");
    }

    #[test]
    fn paging_write_mirrors_into_0x5b5c() {
        let mut mem = memory_128k();
        mem.page(0x03);
        assert_eq!(mem.read8(0x5B5C), 0x03);
    }

    #[test]
    fn video_bank_toggles_between_five_and_seven() {
        let mut mem = memory_128k();
        mem.page(0x08); // bit 3 set -> bank 7
        assert_eq!(mem.video_bank, 7);
        mem.page(0x00);
        assert_eq!(mem.video_bank, 5);
    }
}
