// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Display timing
//!
//! The GPU video clock runs at 11/7 of the CPU clock. Positions are tracked
//! in hundredths of a video cycle so the ratio stays exact:
//!
//! ```text
//! video_cycles += cycles * 1100 / 7        (remainder carried)
//! video_cycles >= H_TOTAL * 100  -> next scanline
//! scanline     >= V_TOTAL        -> next frame (field toggles in 480i)
//! ```
//!
//! | Mode | Video cycles / line | Lines / frame |
//! |------|---------------------|---------------|
//! | NTSC | 3413                | 263           |
//! | PAL  | 3406                | 314           |
//!
//! Blanking is derived from the GP1 0x06/0x07 display ranges.

use super::registers::{DisplayGeometry, GPUStatus, StatusFlags, VideoMode};
use super::GPU;
use crate::core::interrupt::{interrupts, InterruptController};

/// Signals sampled once per tick by the timer collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSample {
    /// Video cycles per dot for the active horizontal resolution
    pub dotclock_divisor: u32,
    pub in_hblank: bool,
    pub in_vblank: bool,
    pub scanline: u32,
}

/// Display timing counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayTiming {
    /// Position within the scanline, in hundredths of a video cycle
    pub video_cycles: u64,

    /// Remainder of the 1100/7 scaling carried between ticks
    pub remainder: u32,

    pub scanline: u32,

    /// Current interlace field (480-line mode)
    pub odd_field: bool,

    pub in_hblank: bool,
    pub in_vblank: bool,
}

impl DisplayTiming {
    /// Video cycles per scanline and scanlines per frame
    pub fn totals(mode: VideoMode) -> (u64, u32) {
        match mode {
            VideoMode::Ntsc => (3413, 263),
            VideoMode::Pal => (3406, 314),
        }
    }

    /// Advance by `cycles` CPU cycles and recompute the blanking flags
    ///
    /// # Returns
    ///
    /// Number of frames that wrapped during this advance.
    pub fn advance(&mut self, cycles: u32, status: &GPUStatus, display: &DisplayGeometry) -> u32 {
        let scaled = cycles as u64 * 1100 + self.remainder as u64;
        self.video_cycles += scaled / 7;
        self.remainder = (scaled % 7) as u32;

        let (h_total, v_total) = Self::totals(status.video_mode());
        let h_total = h_total * 100;
        let mut frames = 0;

        while self.video_cycles >= h_total {
            self.video_cycles -= h_total;
            self.scanline += 1;
            if self.scanline >= v_total {
                self.scanline = 0;
                frames += 1;
                if status.is_interlaced_480() {
                    self.odd_field = !self.odd_field;
                }
            }
        }

        let dot = (self.video_cycles / 100) as u32;
        self.in_hblank = dot < display.h_start || dot >= display.h_end;
        self.in_vblank = self.scanline < display.v_start || self.scanline >= display.v_end;

        frames
    }

    /// Whether the line being drawn is odd (GPUSTAT bit 31)
    pub fn odd_line(&self, status: &GPUStatus) -> bool {
        if self.in_vblank {
            false
        } else if status.is_interlaced_480() {
            self.odd_field
        } else {
            self.scanline & 1 != 0
        }
    }
}

/// Video cycles per dot for the Status horizontal resolution
pub fn dotclock_divisor(status: &GPUStatus) -> u32 {
    if status.flags.contains(StatusFlags::HORIZONTAL_RES_2) {
        7
    } else {
        match status.horizontal_res_1 & 3 {
            0 => 10,
            1 => 8,
            2 => 5,
            _ => 4,
        }
    }
}

impl GPU {
    /// Advance display timing by `cycles` CPU cycles
    ///
    /// Raises VBLANK on the interrupt controller every tick, and the GPU line
    /// while the IRQ1 flag is set.
    pub fn tick(&mut self, cycles: u32, irq: &mut InterruptController) -> TimingSample {
        let frames = self
            .timing
            .advance(cycles, &self.status, &self.display);
        if frames > 0 {
            log::trace!("Frame wrap (x{}), field={}", frames, self.timing.odd_field);
        }

        let odd_line = self.timing.odd_line(&self.status);
        self.status.flags.set(StatusFlags::ODD_LINE, odd_line);
        let field = !self.status.is_interlaced_480() || self.timing.odd_field;
        self.status.flags.set(StatusFlags::INTERLACE_FIELD, field);

        irq.request(interrupts::VBLANK);
        if self.status.flags.contains(StatusFlags::IRQ) {
            irq.request(interrupts::GPU);
        }

        self.timing_sample()
    }

    /// Current timing signals without advancing
    pub fn timing_sample(&self) -> TimingSample {
        TimingSample {
            dotclock_divisor: dotclock_divisor(&self.status),
            in_hblank: self.timing.in_hblank,
            in_vblank: self.timing.in_vblank,
            scanline: self.timing.scanline,
        }
    }
}
