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

// The model table. Per-model behavior in `machine.rs` is chosen by matching
// on `ModelKind` rather than by storing literal function pointers in this
// table -- the data-driven-enum-match is the idiomatic Rust rendition of the
// "immutable ABI table built once at startup" shape.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    Spectrum16kIssue1,
    Spectrum48kIssue2,
    Spectrum48kIssue3,
    SpectrumPlus,
    SpectrumPlus128kEn,
    SpectrumPlus128kEs,
    InvesSpectrumPlus,
}

impl ModelKind {
    pub fn is_128k(self) -> bool {
        matches!(self, ModelKind::SpectrumPlus128kEn | ModelKind::SpectrumPlus128kEs)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RomDescriptor {
    pub name:   &'static str,
    pub offset: usize,
    pub length: usize,
}

/// Per-model raster timing, in T-states, all relative to the start of a
/// frame (`frame_cycles == 0` at the first cycle of the top border).
#[derive(Clone, Copy, Debug)]
pub struct TimingInfo {
    pub cycles_per_int:             u32,
    pub cycles_per_scanline:        u32,
    pub cycles_per_frame:           u32,
    pub cycles_at_int:              u32,
    pub cycles_at_visible_top_border: u32,
    pub cycles_at_paper_region:     u32,
    pub cycles_at_bottom_border:    u32,
}

#[derive(Clone, Copy, Debug)]
pub struct BorderGeometry {
    pub top_height:    u32,
    pub bottom_height: u32,
    pub side_width:    u32,
}

#[derive(Clone, Copy, Debug)]
pub struct ModelInfo {
    pub kind:        ModelKind,
    pub name:        &'static str,
    pub memory_size: usize,
    pub rom_banks:   usize,
    pub ram_banks:   usize,
    pub roms:        &'static [RomDescriptor],
    pub timing:      TimingInfo,
    pub border:      BorderGeometry,
}

// The INT pulse (32 T-states) overlaps the very start of the top border
// rather than preceding it, so `cycles_at_int` and `cycles_at_visible_top_border`
// are both 0: the frame's T-state counter and the raster position share one
// origin. Every `cycles_at_*` below is then just `row_count * cycles_per_scanline`,
// which is what keeps a full lap of top border + 192 paper rows + bottom
// border summing to exactly `cycles_per_frame`.
const STANDARD_TIMING: TimingInfo = TimingInfo {
    cycles_per_int:              32,
    cycles_per_scanline:         224,
    cycles_per_frame:            69888,
    cycles_at_int:               0,
    cycles_at_visible_top_border: 0,
    cycles_at_paper_region:      64 * 224,
    cycles_at_bottom_border:     (64 + 192) * 224,
};

const STANDARD_BORDER: BorderGeometry = BorderGeometry { top_height: 64, bottom_height: 56, side_width: 48 };

/// 128K models run a slightly longer frame (70908 vs 69888 T-states) at a
/// slightly longer scanline (228 vs 224) with one fewer top border row, so
/// the same row-sum-equals-cycles_per_frame property holds: 63 + 192 + 56 = 311
/// rows * 228 T-states = 70908.
const WIDE_BORDER: BorderGeometry = BorderGeometry { top_height: 63, bottom_height: 56, side_width: 48 };

pub static MODELS: &[ModelInfo] = &[
    ModelInfo {
        kind: ModelKind::Spectrum16kIssue1,
        name: "ZX Spectrum 16K (Issue 1)",
        memory_size: 0x8000,
        rom_banks: 1,
        ram_banks: 1,
        roms: &[RomDescriptor { name: "48k.rom", offset: 0x0000, length: 0x4000 }],
        timing: STANDARD_TIMING,
        border: STANDARD_BORDER,
    },
    ModelInfo {
        kind: ModelKind::Spectrum48kIssue2,
        name: "ZX Spectrum 48K (Issue 2)",
        memory_size: 0x10000,
        rom_banks: 1,
        ram_banks: 3,
        roms: &[RomDescriptor { name: "48k.rom", offset: 0x0000, length: 0x4000 }],
        timing: STANDARD_TIMING,
        border: STANDARD_BORDER,
    },
    ModelInfo {
        kind: ModelKind::Spectrum48kIssue3,
        name: "ZX Spectrum 48K (Issue 3)",
        memory_size: 0x10000,
        rom_banks: 1,
        ram_banks: 3,
        roms: &[RomDescriptor { name: "48k.rom", offset: 0x0000, length: 0x4000 }],
        timing: STANDARD_TIMING,
        border: STANDARD_BORDER,
    },
    ModelInfo {
        kind: ModelKind::SpectrumPlus,
        name: "ZX Spectrum+",
        memory_size: 0x10000,
        rom_banks: 1,
        ram_banks: 3,
        roms: &[RomDescriptor { name: "48k.rom", offset: 0x0000, length: 0x4000 }],
        timing: STANDARD_TIMING,
        border: STANDARD_BORDER,
    },
    ModelInfo {
        kind: ModelKind::SpectrumPlus128kEn,
        name: "ZX Spectrum +128K (EN)",
        memory_size: 0x4000 * (2 + 8),
        rom_banks: 2,
        ram_banks: 8,
        roms: &[
            RomDescriptor { name: "128k-en-0.rom", offset: 0x0000, length: 0x4000 },
            RomDescriptor { name: "128k-en-1.rom", offset: 0x4000, length: 0x4000 },
        ],
        timing: TimingInfo { cycles_per_frame: 70908, cycles_at_paper_region: 63 * 228, cycles_at_bottom_border: (63 + 192) * 228, cycles_per_scanline: 228, ..STANDARD_TIMING },
        border: WIDE_BORDER,
    },
    ModelInfo {
        kind: ModelKind::SpectrumPlus128kEs,
        name: "ZX Spectrum +128K (ES)",
        memory_size: 0x4000 * (2 + 8),
        rom_banks: 2,
        ram_banks: 8,
        roms: &[
            RomDescriptor { name: "128k-es-0.rom", offset: 0x0000, length: 0x4000 },
            RomDescriptor { name: "128k-es-1.rom", offset: 0x4000, length: 0x4000 },
        ],
        timing: TimingInfo { cycles_per_frame: 70908, cycles_at_paper_region: 63 * 228, cycles_at_bottom_border: (63 + 192) * 228, cycles_per_scanline: 228, ..STANDARD_TIMING },
        border: WIDE_BORDER,
    },
    ModelInfo {
        kind: ModelKind::InvesSpectrumPlus,
        name: "Inves Spectrum+",
        memory_size: 0x10000,
        rom_banks: 1,
        ram_banks: 3,
        roms: &[RomDescriptor { name: "inves.rom", offset: 0x0000, length: 0x4000 }],
        timing: STANDARD_TIMING,
        border: STANDARD_BORDER,
    },
];

pub fn lookup(kind: ModelKind) -> &'static ModelInfo {
    MODELS.iter().find(|m| m.kind == kind).expect("every ModelKind has a MODELS row")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_model_kind_resolves_to_a_table_row() {
        let kinds = [
            ModelKind::Spectrum16kIssue1,
            ModelKind::Spectrum48kIssue2,
            ModelKind::Spectrum48kIssue3,
            ModelKind::SpectrumPlus,
            ModelKind::SpectrumPlus128kEn,
            ModelKind::SpectrumPlus128kEs,
            ModelKind::InvesSpectrumPlus,
        ];
        for kind in kinds {
            assert_eq!(lookup(kind).kind, kind);
        }
    }

    #[test]
    fn only_128k_variants_report_is_128k() {
        assert!(ModelKind::SpectrumPlus128kEn.is_128k());
        assert!(ModelKind::SpectrumPlus128kEs.is_128k());
        assert!(!ModelKind::Spectrum48kIssue3.is_128k());
        assert!(!ModelKind::Spectrum16kIssue1.is_128k());
    }

    #[test]
    fn scanline_rows_sum_to_a_full_frame_for_every_model() {
        for model in MODELS {
            let t = &model.timing;
            let rows = t.cycles_per_frame / t.cycles_per_scanline;
            assert_eq!(rows * t.cycles_per_scanline, t.cycles_per_frame,
                "{}: frame must be a whole number of scanlines", model.name);
        }
    }

    #[test]
    fn sixteen_k_model_has_no_spare_ram_banks() {
        let model = lookup(ModelKind::Spectrum16kIssue1);
        assert_eq!(model.memory_size, 0x8000);
        assert_eq!(model.ram_banks, 1);
    }
}
