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

// The machine-level half of spec.md's §6 "Snapshot state": everything a
// faithful save needs beyond the CPU's own `CpuState` -- the ULA's port 0xFE
// latch, border color, current audio sample, flash phase, and (128K only)
// the paging latch value and its sticky-disable bit.

use thiserror::Error;

use crate::z80::cpu::{CpuState, SnapshotError as CpuSnapshotError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub cpu: CpuState,
    pub port_fe_last_value: u8,
    pub border_color: u8,
    pub current_audio_sample: i16,
    pub flash: bool,
    pub frames_since_flash: u32,
    /// `None` on 16K/48K/Plus/Inves models, which have no paging latch.
    pub paging_latch: Option<u8>,
    pub paging_disabled: Option<bool>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error(transparent)]
    Cpu(#[from] CpuSnapshotError),
}
