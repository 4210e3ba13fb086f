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

// The Spectrum machine model: owns RAM/ROM, the keyboard matrix, the ULA's
// border/audio latches and the frame cycle accumulator, and implements the
// `Bus` callbacks the CPU drives it through. `Machine` is split into a `cpu`
// field and a `state` field (rather than one flat struct) purely so
// `self.cpu.run(&mut self.state, n)` borrows two disjoint fields instead of
// trying to pass `self` to itself -- `state` is where `Bus` is implemented.

use log::{info, warn};

use crate::z80::bus::Bus;
use crate::z80::cpu::CPU;
use crate::zx::audio::Audio;
use crate::zx::ay::Ay;
use crate::zx::keyboard::Keyboard;
use crate::zx::memory::Memory;
use crate::zx::models::{self, ModelInfo, ModelKind};
use crate::zx::snapshot::{Snapshot, SnapshotError};
use crate::zx::video::{self, FrameBuffer, Palettes};

const KEMPSTON_PORT_LOW: u8 = 0x1F;
const FULLER_PORT_LOW:   u8 = 0x7F;
const PAGING_PORT:       u16 = 0x7FFD;
const AY_SELECT_PORT:    u16 = 0xFFFD;
const AY_DATA_PORT:      u16 = 0xBFFD;

const FLASH_PERIOD_FRAMES: u32 = 16;

/// Everything the CPU's `Bus` calls touch. See the module doc for why this
/// is a separate struct from `Machine`.
pub struct MachineState {
    model: &'static ModelInfo,

    memory:   Memory,
    keyboard: Keyboard,
    video:    FrameBuffer,
    palettes: Palettes,
    audio:    Audio,
    ay:       Option<Ay>,

    kempston_state: u8,

    border_color: u8,
    border_rgba:  u32,

    /// Last byte written to port 0xFE -- part of the snapshot state (§6) and
    /// also what `out_port` compares against to detect a MIC/EAR edge.
    port_fe_last_value: u8,

    frame_cycles:       u32,
    flash:              bool,
    frames_since_flash: u32,

    /// Which scanline `run_1_scanline` will render next; wraps to 0 (and
    /// runs the end-of-frame bookkeeping) after the last one.
    scanline_cursor: u32,
}

impl MachineState {
    fn new(model: &'static ModelInfo) -> MachineState {
        let palettes = Palettes::new();
        let border_rgba = palettes.color(0, false);
        MachineState {
            model,
            memory:   Memory::new(model),
            keyboard: Keyboard::new(),
            video:    FrameBuffer::new(model.border),
            palettes,
            audio:    Audio::new(),
            ay:       if model.kind.is_128k() { Some(Ay::new()) } else { None },
            kempston_state: 0,
            border_color: 0,
            border_rgba,
            port_fe_last_value: 0,
            frame_cycles: 0,
            flash: false,
            frames_since_flash: 0,
            scanline_cursor: 0,
        }
    }

    fn initialize(&mut self) {
        self.memory.initialize();
        self.frame_cycles = 0;
        self.flash = false;
        self.frames_since_flash = 0;
        self.scanline_cursor = 0;
        self.border_color = 0;
        self.border_rgba = self.palettes.color(0, false);
        self.port_fe_last_value = 0;
        self.ay = if self.model.kind.is_128k() { Some(Ay::new()) } else { None };
    }

    fn ula_read(&self, port: u16) -> u8 {
        let high = (port >> 8) as u8;
        let mut result: u8 = 0xBF;
        for row in 0..8 {
            if (high & (1 << row)) == 0 {
                result &= self.keyboard.row(row);
            }
        }
        if self.audio.ear_input_high(self.frame_cycles, self.model.timing.cycles_per_frame) {
            result |= 0x40;
        }
        result
    }

    fn ula_write(&mut self, value: u8) {
        let new_border = value & 0x07;
        if new_border != self.border_color {
            self.border_color = new_border;
            self.border_rgba = self.palettes.color(new_border, false);
        }

        if (value & 0x18) != (self.port_fe_last_value & 0x18) {
            let new_sample = if (value & 0x10) != 0 { crate::zx::audio::WAVE_HIGH } else { crate::zx::audio::WAVE_LOW };
            self.audio.flush_to(self.frame_cycles, self.model.timing.cycles_per_frame, Some(new_sample));
            self.audio.port_fe_update_cycle = self.frame_cycles;
        }
        self.port_fe_last_value = value;
    }

    fn render_paper_scanline(&mut self, paper_y: u32) {
        let cy = (paper_y / 8) as usize;
        let row = (paper_y % 8) as usize;
        let bank = self.memory.video_bank_physical();
        let memory = &self.memory;
        let flash = self.flash;
        let palettes = &self.palettes;
        let border_rgba = self.border_rgba;

        self.video.render_paper_row(paper_y, flash, palettes, border_rgba,
            |cx| {
                let offset = 2048 * (cy / 8) + 32 * (cy % 8) + 256 * row + cx as usize;
                memory.read8_in_bank(bank, offset)
            },
            |cx| {
                let offset = video::CHARACTER_RAM_SIZE + 32 * cy + cx as usize;
                memory.read8_in_bank(bank, offset)
            },
        );
    }
}

impl Bus for MachineState {
    fn read8(&mut self, addr: u16) -> u8 {
        self.memory.read8(addr)
    }
    fn write8(&mut self, addr: u16, value: u8) {
        self.memory.write8(addr, value);
    }

    fn in_port(&mut self, port: u16) -> u8 {
        let low = (port & 0xFF) as u8;
        if self.model.kind.is_128k() && port == AY_SELECT_PORT {
            self.ay.as_ref().map(|ay| ay.read()).unwrap_or(0xFF)
        } else if low == KEMPSTON_PORT_LOW {
            self.kempston_state
        } else if low == FULLER_PORT_LOW {
            0xFF // Fuller joystick: no buttons wired up, floating bus.
        } else if (low & 0x01) == 0 {
            self.ula_read(port)
        } else {
            0xFF // floating bus: Mikrogen and any other unrecognized odd port.
        }
    }

    fn out_port(&mut self, port: u16, value: u8) {
        let low = (port & 0xFF) as u8;
        if self.model.kind.is_128k() && port == PAGING_PORT {
            self.memory.page(value);
        } else if self.model.kind.is_128k() && port == AY_SELECT_PORT {
            if let Some(ay) = self.ay.as_mut() { ay.select(value); }
        } else if self.model.kind.is_128k() && port == AY_DATA_PORT {
            if let Some(ay) = self.ay.as_mut() { ay.write(value); }
        } else if (low & 0x01) == 0 {
            self.ula_write(value);
        }
        // Odd, unrecognized ports: writes are silently discarded (spec.md §7).
    }

    fn int_data(&mut self) -> u32 {
        0xFF // no device on the Spectrum drives IM 0/2 ACK data; floating bus.
    }
}

pub struct Machine {
    pub cpu: CPU,
    state:   MachineState,
}

impl Machine {
    pub fn new(kind: ModelKind) -> Machine {
        let model = models::lookup(kind);
        info!("Creating a Spectrum machine: {}", model.name);
        let mut machine = Machine {
            cpu:   CPU::new(),
            state: MachineState::new(model),
        };
        machine.initialize();
        machine
    }

    pub fn model(&self) -> &'static ModelInfo {
        self.state.model
    }

    /// Wire a ROM image into the memory image at the descriptor's offset
    /// (see `ModelInfo::roms`); the caller is expected to match the
    /// descriptor's `length` against what it read off disk.
    pub fn load_rom(&mut self, offset: usize, data: &[u8]) {
        self.state.memory.load_rom(offset, data);
    }

    /// Set up the CPU's callback table (implicit here: the CPU takes `&mut
    /// dyn Bus` per call rather than storing a context pointer) and reset
    /// every piece of machine state to its power-on layout, per spec.md
    /// §4.2 "Initialization".
    pub fn initialize(&mut self) {
        self.state.initialize();
    }

    pub fn power(&mut self, on: bool) {
        self.cpu.power(on);
        if on {
            self.state.initialize();
        }
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
        self.state.initialize();
    }

    pub fn set_keyboard_bitmap(&mut self, bitmap: [u8; 8]) {
        self.state.keyboard.set_bitmap(bitmap);
    }
    pub fn set_kempston_state(&mut self, buttons: u8) {
        self.state.kempston_state = buttons;
    }
    pub fn set_ear_input(&mut self, input: [u8; crate::zx::audio::SAMPLES_PER_FRAME]) {
        self.state.audio.set_ear_input(input);
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.state.video
    }
    pub fn audio_samples(&self) -> &[i16; crate::zx::audio::SAMPLES_PER_FRAME] {
        self.state.audio.samples()
    }
    pub fn border_rgba(&self) -> u32 {
        self.state.border_rgba
    }
    pub fn flash(&self) -> bool {
        self.state.flash
    }

    fn run_cpu(&mut self, cycles: u32) -> u32 {
        let executed = self.cpu.run(&mut self.state, cycles);
        self.state.frame_cycles += executed;
        executed
    }
    fn run_until(&mut self, target: u32) {
        while self.state.frame_cycles < target {
            let remaining = target - self.state.frame_cycles;
            self.run_cpu(remaining);
        }
    }

    fn total_rows(&self) -> u32 {
        self.state.model.border.top_height + video::SCREEN_HEIGHT + self.state.model.border.bottom_height
    }

    /// Run exactly one frame: interrupt assertion, top border, 192 paper
    /// scanlines (with character/attribute decode and FLASH handling),
    /// bottom border, then audio flush and the flash/frame_cycles rollover.
    /// Implemented in terms of `run_1_scanline` so the two entry points
    /// can never drift out of sync with each other.
    pub fn run_1_frame(&mut self) {
        let rows = self.total_rows();
        for _ in 0..rows {
            self.run_1_scanline();
        }
    }

    /// Optional finer-grained ABI entry point (spec.md §6): the same five
    /// phases as `run_1_frame`, one scanline at a time. The interrupt-assert
    /// phase and the jump to the first visible border row happen on the
    /// first call of a frame; the last call of a frame also performs the
    /// audio flush and flash/frame_cycles rollover that `run_1_frame` would
    /// otherwise do once at the very end.
    pub fn run_1_scanline(&mut self) {
        let timing = self.state.model.timing;
        let border = self.state.model.border;

        if self.state.scanline_cursor == 0 {
            self.run_until(timing.cycles_at_int);
            self.cpu.irq(true);
            self.run_cpu(timing.cycles_per_int);
            self.cpu.irq(false);
            self.run_until(timing.cycles_at_visible_top_border);
        }

        let row = self.state.scanline_cursor;
        if row < border.top_height {
            let target = timing.cycles_at_visible_top_border + (row + 1) * timing.cycles_per_scanline;
            self.run_until(target);
            let color = self.state.border_rgba;
            self.state.video.fill_border_row(row, color);
        } else if row < border.top_height + video::SCREEN_HEIGHT {
            let paper_y = row - border.top_height;
            let target = timing.cycles_at_paper_region + (paper_y + 1) * timing.cycles_per_scanline;
            self.run_until(target);
            self.state.render_paper_scanline(paper_y);
        } else {
            let bottom_row = row - border.top_height - video::SCREEN_HEIGHT;
            let target = timing.cycles_at_bottom_border + (bottom_row + 1) * timing.cycles_per_scanline;
            self.run_until(target);
            let color = self.state.border_rgba;
            self.state.video.fill_border_row(row, color);
        }

        self.state.scanline_cursor += 1;
        if self.state.scanline_cursor >= self.total_rows() {
            self.state.scanline_cursor = 0;
            self.finish_frame_bookkeeping();
        }
    }

    fn finish_frame_bookkeeping(&mut self) {
        let timing = self.state.model.timing;
        self.state.audio.flush_to(self.state.frame_cycles, timing.cycles_per_frame, None);
        self.state.audio.finish_frame();

        self.state.frames_since_flash += 1;
        if self.state.frames_since_flash >= FLASH_PERIOD_FRAMES {
            self.state.frames_since_flash = 0;
            self.state.flash = !self.state.flash;
        }

        if self.state.frame_cycles >= timing.cycles_per_frame {
            self.state.frame_cycles -= timing.cycles_per_frame;
        } else {
            warn!("frame_cycles ({}) ended a frame short of cycles_per_frame ({}); clamping to 0.",
                  self.state.frame_cycles, timing.cycles_per_frame);
            self.state.frame_cycles = 0;
        }
    }

    pub fn read_state(&self) -> Snapshot {
        Snapshot {
            cpu: self.cpu.read_state(),
            port_fe_last_value: self.state.port_fe_last_value,
            border_color: self.state.border_color,
            current_audio_sample: self.state.audio.current_sample,
            flash: self.state.flash,
            frames_since_flash: self.state.frames_since_flash,
            paging_latch: if self.state.model.kind.is_128k() { Some(self.state.memory.paging_latch) } else { None },
            paging_disabled: if self.state.model.kind.is_128k() { Some(self.state.memory.paging_disabled) } else { None },
        }
    }

    pub fn write_state(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        self.cpu.write_state(&snapshot.cpu)?;
        self.state.port_fe_last_value = snapshot.port_fe_last_value;
        self.state.border_color = snapshot.border_color & 0x07;
        self.state.border_rgba = self.state.palettes.color(self.state.border_color, false);
        self.state.audio.current_sample = snapshot.current_audio_sample;
        self.state.flash = snapshot.flash;
        self.state.frames_since_flash = snapshot.frames_since_flash;
        if let Some(latch) = snapshot.paging_latch {
            self.state.memory.paging_disabled = false;
            self.state.memory.page(latch);
        }
        if let Some(disabled) = snapshot.paging_disabled {
            self.state.memory.paging_disabled = disabled;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program_machine(program: &[u8]) -> Machine {
        let mut machine = Machine::new(ModelKind::Spectrum48kIssue2);
        machine.load_rom(0, program);
        // Copy the program up past the ROM boundary too, so it's visible
        // regardless of where the test pokes the page table in the future.
        machine
    }

    #[test]
    fn frame_cycles_rolls_over_by_exactly_cycles_per_frame() {
        let mut machine = program_machine(&[0x00]); // NOP forever
        let before = machine.state.frame_cycles;
        machine.run_1_frame();
        let cycles_per_frame = machine.state.model.timing.cycles_per_frame;
        assert_eq!(machine.state.frame_cycles, (before + cycles_per_frame) % cycles_per_frame);
    }

    #[test]
    fn flash_toggles_every_16_frames() {
        let mut machine = program_machine(&[0x00]);
        assert!(!machine.flash());
        for _ in 0..16 {
            machine.run_1_frame();
        }
        assert!(machine.flash());
    }

    #[test]
    fn keyboard_row_a_clears_bit_one_when_pressed() {
        let mut machine = Machine::new(ModelKind::Spectrum48kIssue2);
        let mut bitmap = [0xFFu8; 8];
        bitmap[1] = 0xFD; // clear bit 1: 'A' in the real Spectrum matrix
        machine.set_keyboard_bitmap(bitmap);

        let value = machine.state.ula_read(0xFDFE);
        assert_eq!(value & 0b0000_0010, 0);
        assert_eq!(value & 0b0110_0000, 0b0110_0000); // unused bit and EAR (no tape attached) both read high
    }

    #[test]
    fn paging_latch_switches_rom_bank_until_disabled_bit_latches() {
        let mut machine = Machine::new(ModelKind::SpectrumPlus128kEn);
        machine.load_rom(0, &[0xAA]);       // ROM bank 0, byte 0
        machine.load_rom(0x4000, &[0xBB]);  // ROM bank 1, byte 0

        Bus::out_port(&mut machine.state, PAGING_PORT, 0x10);
        assert_eq!(Bus::read8(&mut machine.state, 0x0000), 0xBB);

        Bus::out_port(&mut machine.state, PAGING_PORT, 0x30); // ROM bank 1 + the sticky disable bit
        Bus::out_port(&mut machine.state, PAGING_PORT, 0x00); // selects ROM bank 0, but should be ignored now
        assert_eq!(Bus::read8(&mut machine.state, 0x0000), 0xBB);
    }

    #[test]
    fn snapshot_round_trip_restores_ula_and_cpu_state() {
        let mut machine = Machine::new(ModelKind::SpectrumPlus128kEn);
        Bus::out_port(&mut machine.state, 0xFE, 4); // border = green
        Bus::out_port(&mut machine.state, PAGING_PORT, 0x25); // RAM bank 5, sticky disable set
        machine.run_1_frame();
        let snapshot = machine.read_state();

        let mut fresh = Machine::new(ModelKind::SpectrumPlus128kEn);
        fresh.write_state(&snapshot).expect("a snapshot taken from a live machine must always write back cleanly");

        assert_eq!(fresh.state.border_color, 4);
        assert_eq!(fresh.state.frames_since_flash, snapshot.frames_since_flash);
        assert!(fresh.state.memory.paging_disabled);
        assert_eq!(snapshot.paging_latch, Some(0x25));
    }
}
