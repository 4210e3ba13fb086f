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

// Same role as the legacy frontend's `FrameTimer`: sleep away whatever's left
// of a frame's wall-clock budget after the host has rendered it, so we don't
// run faster than the real machine. The legacy build measured against the
// external `time` crate; `std::time` covers the same ground now.

use std::thread;
use std::time::{Duration, Instant};

/// The Z80 clock rate shared by every 48K model. The 128K models run
/// fractionally faster (3.5469 MHz) but the difference is inaudible for
/// frame-pacing purposes, so one constant covers both.
const CPU_CLOCK_HZ: f64 = 3_500_000.0;

pub struct FrameTimer {
    frame_duration: Duration,
    last_frame_at:  Instant,
}

impl FrameTimer {
    pub fn new(cycles_per_frame: u32, _cycles_per_scanline: u32) -> FrameTimer {
        let seconds_per_frame = cycles_per_frame as f64 / CPU_CLOCK_HZ;
        FrameTimer {
            frame_duration: Duration::from_secs_f64(seconds_per_frame),
            last_frame_at:  Instant::now(),
        }
    }

    /// Block until `frame_duration` has elapsed since the previous call,
    /// then reset the clock. If the host is already running behind (the
    /// frame took longer than its budget), return immediately instead of
    /// trying to catch up.
    pub fn sleep_for_remainder(&mut self) {
        let elapsed = self.last_frame_at.elapsed();
        if elapsed < self.frame_duration {
            thread::sleep(self.frame_duration - elapsed);
        }
        self.last_frame_at = Instant::now();
    }
}
