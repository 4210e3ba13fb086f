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

// A zero-order-hold speaker model: one sample is held constant between
// MIC/EAR edges and stamped into every slot the CPU's cycle count crosses.
// `flush_to` is called once per frame phase boundary (border rows, paper
// rows, frame end) so the buffer ends up filled even across scanlines that
// never touch port 0xFE.

pub const SAMPLES_PER_FRAME: usize = 882; // PAL: 50 Hz * 44100 Hz / 50
pub const WAVE_HIGH: i16 =  6550;
pub const WAVE_LOW:  i16 = -6550;

pub struct Audio {
    buffer:              [i16; SAMPLES_PER_FRAME],
    next_sample:         usize,
    pub current_sample:  i16,

    /// The CPU cycle (within the current frame) of the last MIC/EAR edge.
    /// Assigned on every port-0xFE write but never read back here -- see
    /// spec.md's Open Questions: it exists to let a future, more precise
    /// resampler interpolate the edge position within a sample slot instead
    /// of only snapping to a frame-relative sample index.
    pub port_fe_update_cycle: u32,

    /// 882-byte tape EAR input, one byte per output sample slot; 0x90 means
    /// "EAR high" for this slot. Defaults to all-high: with no tape deck
    /// attached the EAR line floats high, per spec.md's worked example S5
    /// (reading port 0xFE with no tape returns bit 6 set).
    ear_input: [u8; SAMPLES_PER_FRAME],
}

impl Audio {
    pub fn new() -> Audio {
        Audio {
            buffer:              [0; SAMPLES_PER_FRAME],
            next_sample:         0,
            current_sample:      WAVE_LOW,
            port_fe_update_cycle: 0,
            ear_input:           [0x90; SAMPLES_PER_FRAME],
        }
    }

    pub fn set_ear_input(&mut self, input: [u8; SAMPLES_PER_FRAME]) {
        self.ear_input = input;
    }

    /// Sample slot for `frame_cycles`, a cycle count relative to the start
    /// of the frame: `cycles_per_frame` cycles map onto 882 output slots.
    fn sample_index_for(frame_cycles: u32, cycles_per_frame: u32) -> usize {
        let idx = (frame_cycles as u64 * SAMPLES_PER_FRAME as u64) / (cycles_per_frame as u64);
        (idx as usize).min(SAMPLES_PER_FRAME - 1)
    }

    /// EAR input bit (0x40) as the ULA would currently see it, sampled from
    /// the slot corresponding to `frame_cycles`.
    pub fn ear_input_high(&self, frame_cycles: u32, cycles_per_frame: u32) -> bool {
        let idx = Self::sample_index_for(frame_cycles, cycles_per_frame);
        (self.ear_input[idx] & 0x90) == 0x90
    }

    /// Fill every sample slot between the last flush point and
    /// `frame_cycles` with `current_sample`, then (if `new_sample` is given)
    /// latch it in for subsequent slots. Called both on every MIC/EAR edge
    /// and once at the end of the frame to fill the remainder.
    pub fn flush_to(&mut self, frame_cycles: u32, cycles_per_frame: u32, new_sample: Option<i16>) {
        let target = Self::sample_index_for(frame_cycles, cycles_per_frame);
        while self.next_sample <= target && self.next_sample < SAMPLES_PER_FRAME {
            self.buffer[self.next_sample] = self.current_sample;
            self.next_sample += 1;
        }
        if let Some(sample) = new_sample {
            self.current_sample = sample;
        }
    }

    /// Called at the end of `run_1_frame`: pads out any remaining slots and
    /// rewinds the write cursor for the next frame.
    pub fn finish_frame(&mut self) {
        while self.next_sample < SAMPLES_PER_FRAME {
            self.buffer[self.next_sample] = self.current_sample;
            self.next_sample += 1;
        }
        self.next_sample = 0;
    }

    pub fn samples(&self) -> &[i16; SAMPLES_PER_FRAME] {
        &self.buffer
    }
}

impl Default for Audio {
    fn default() -> Self {
        Audio::new()
    }
}
