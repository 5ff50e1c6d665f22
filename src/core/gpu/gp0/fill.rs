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

//! GP0 Fill Rectangle command
//!
//! Implements the GP0(0x02) Fill Rectangle command, which performs fast VRAM
//! fills. Used by the BIOS and games to clear buffers.

use super::super::primitives::FillRect;
use super::super::queue::GpuJob;
use super::super::types::Color;
use super::super::GPU;
use crate::core::error::Result;

/// Build a fill job
///
/// # Command Format
///
/// ```text
/// Word 0: color+cmd      (0x02BBGGRR)
/// Word 1: top-left       (Y in bits 16-24, X in bits 0-9)
/// Word 2: width+height   (H in bits 16-24, W in bits 0-9)
/// ```
pub(super) fn build_fill(words: &[u32]) -> Result<GpuJob> {
    Ok(GpuJob::FillRect(FillRect {
        color: Color::from_u32(words[0]),
        x: words[1] & 0x3FF,
        y: (words[1] >> 16) & 0x1FF,
        width: words[2] & 0x3FF,
        height: (words[2] >> 16) & 0x1FF,
    }))
}

impl GPU {
    /// GP0(0x02): Fill Rectangle in VRAM
    ///
    /// Unlike the rectangle drawing commands (0x60-0x7F), a fill:
    /// - Operates directly on VRAM coordinates, wrapping at the edges
    /// - Ignores the drawing area, drawing offset and mask settings
    /// - Stores the 24-bit color exactly, with the mask flag clear
    pub(in crate::core::gpu) fn fill_rect(&mut self, fill: &FillRect) {
        log::trace!(
            "Fill Rectangle: ({}, {}) size {}×{} color=0x{:06X}",
            fill.x,
            fill.y,
            fill.width,
            fill.height,
            fill.color.to_u32()
        );

        let color = fill.color.to_u32();
        for dy in 0..fill.height {
            for dx in 0..fill.width {
                self.vram.set_pixel(fill.x + dx, fill.y + dy, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gpu::vram::MASK_24;

    fn fill(words: &[u32]) -> FillRect {
        match build_fill(words).unwrap() {
            GpuJob::FillRect(f) => f,
            other => panic!("unexpected job {:?}", other),
        }
    }

    #[test]
    fn test_build_masks_fields() {
        let f = fill(&[0x0211_2233, 0xFFFF_FFFF, 0xFFFF_FFFF]);
        assert_eq!((f.x, f.y), (0x3FF, 0x1FF));
        assert_eq!((f.width, f.height), (0x3FF, 0x1FF));
        assert_eq!(f.color.to_u32(), 0x11_2233);
    }

    #[test]
    fn test_fill_ignores_mask_and_area() {
        let mut gpu = GPU::new();
        gpu.draw_area.right = 0;
        gpu.draw_area.bottom = 0;
        gpu.status.flags.insert(
            crate::core::gpu::registers::StatusFlags::CHECK_MASK_BIT
                | crate::core::gpu::registers::StatusFlags::SET_MASK_BIT,
        );
        gpu.vram.set_pixel(5, 5, MASK_24);

        gpu.fill_rect(&fill(&[0x0200_00FF, 0x0004_0004, 0x0002_0002]));

        assert_eq!(gpu.vram.get_pixel(5, 5), 0x0000_00FF);
        assert_eq!(gpu.vram.get_pixel(6, 6), 0x0000_0000);
    }

    #[test]
    fn test_fill_wraps() {
        let mut gpu = GPU::new();
        gpu.fill_rect(&fill(&[0x0200_FF00, 0x01FF_03FF, 0x0002_0002]));

        assert_eq!(gpu.vram.get_pixel(1023, 511), 0x00FF00);
        assert_eq!(gpu.vram.get_pixel(0, 0), 0x00FF00);
        assert_eq!(gpu.vram.get_pixel(1, 1), 0);
    }
}
