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

//! GP0 Drawing Mode Commands
//!
//! GP0 commands that control drawing settings such as texture page, drawing
//! area, drawing offset, and masking behavior, plus the single-word
//! miscellaneous commands.
//!
//! # Commands
//!
//! - 0x00: NOP
//! - 0x01: Clear texture cache
//! - 0x1F: Interrupt request (IRQ1)
//! - 0xE1: Draw Mode Setting (texture page, transparency, dithering, etc.)
//! - 0xE2: Texture Window Setting
//! - 0xE3: Set Drawing Area Top-Left
//! - 0xE4: Set Drawing Area Bottom-Right
//! - 0xE5: Set Drawing Offset
//! - 0xE6: Mask Bit Setting
//!
//! # References
//!
//! - [PSX-SPX: GP0 Drawing Settings](http://problemkaputt.de/psx-spx.htm#gpurenderattributes)

use super::super::queue::GpuJob;
use super::super::registers::{DrawOffset, StatusFlags, TextureWindow};
use super::super::types::sign_extend_11;
use super::super::GPU;
use crate::core::error::Result;

pub(super) fn build_nop(_words: &[u32]) -> Result<GpuJob> {
    Ok(GpuJob::Nop)
}

pub(super) fn build_clear_cache(_words: &[u32]) -> Result<GpuJob> {
    Ok(GpuJob::ClearCache)
}

pub(super) fn build_interrupt_request(_words: &[u32]) -> Result<GpuJob> {
    Ok(GpuJob::InterruptRequest)
}

/// GP0(E1h) - Draw Mode Setting (aka "Texpage")
///
/// ```text
///   Bit 0-3:   Texture page X Base   (N*64)
///   Bit 4:     Texture page Y Base   (N*256)
///   Bit 5-6:   Semi Transparency     (0=B/2+F/2, 1=B+F, 2=B-F, 3=B+F/4)
///   Bit 7-8:   Texture page colors   (0=4bit, 1=8bit, 2=15bit)
///   Bit 9:     Dithering enabled
///   Bit 10:    Drawing to display area allowed
///   Bit 11:    Texture disable (only with GP1(09h) permission)
///   Bit 12:    Textured rectangle X-flip
///   Bit 13:    Textured rectangle Y-flip
/// ```
pub(super) fn build_draw_mode(words: &[u32]) -> Result<GpuJob> {
    Ok(GpuJob::SetDrawMode(words[0] & 0x00FF_FFFF))
}

pub(super) fn build_texture_window(words: &[u32]) -> Result<GpuJob> {
    Ok(GpuJob::SetTextureWindow(TextureWindow::from_word(words[0])))
}

/// Bits 0-9 X, bits 10-19 Y
fn area_corner(word: u32) -> (i32, i32) {
    ((word & 0x3FF) as i32, ((word >> 10) & 0x3FF) as i32)
}

pub(super) fn build_draw_area_top_left(words: &[u32]) -> Result<GpuJob> {
    let (x, y) = area_corner(words[0]);
    Ok(GpuJob::SetDrawAreaTopLeft { x, y })
}

pub(super) fn build_draw_area_bottom_right(words: &[u32]) -> Result<GpuJob> {
    let (x, y) = area_corner(words[0]);
    Ok(GpuJob::SetDrawAreaBottomRight { x, y })
}

/// Signed 11-bit X in bits 0-10, Y in bits 11-21
pub(super) fn build_draw_offset(words: &[u32]) -> Result<GpuJob> {
    Ok(GpuJob::SetDrawOffset(DrawOffset {
        x: sign_extend_11(words[0] & 0x7FF),
        y: sign_extend_11((words[0] >> 11) & 0x7FF),
    }))
}

pub(super) fn build_mask_bits(words: &[u32]) -> Result<GpuJob> {
    Ok(GpuJob::SetMaskBits {
        set_mask: words[0] & 1 != 0,
        check_mask: words[0] & 2 != 0,
    })
}

impl GPU {
    pub(in crate::core::gpu) fn set_draw_mode(&mut self, value: u32) {
        self.status
            .apply_draw_mode(value, self.texture_disable_allowed);
        self.rect_flip_x = (value >> 12) & 1 != 0;
        self.rect_flip_y = (value >> 13) & 1 != 0;

        log::trace!(
            "Draw mode: page=({}, {}) depth={:?} semi={:?} flip=({}, {})",
            self.status.texture_page_x,
            self.status.flags.contains(StatusFlags::TEXTURE_PAGE_Y) as u8,
            self.status.texture_depth,
            self.status.semi_transparency,
            self.rect_flip_x,
            self.rect_flip_y
        );
    }

    pub(in crate::core::gpu) fn set_texture_window(&mut self, window: TextureWindow) {
        self.texture_window = window;
    }

    pub(in crate::core::gpu) fn set_draw_area_top_left(&mut self, x: i32, y: i32) {
        self.draw_area.left = x;
        self.draw_area.top = y;
        log::trace!("Drawing area top-left: ({}, {})", x, y);
    }

    pub(in crate::core::gpu) fn set_draw_area_bottom_right(&mut self, x: i32, y: i32) {
        self.draw_area.right = x;
        self.draw_area.bottom = y;
        log::trace!("Drawing area bottom-right: ({}, {})", x, y);
    }

    pub(in crate::core::gpu) fn set_draw_offset(&mut self, offset: DrawOffset) {
        self.draw_offset = offset;
    }

    /// GP0(E6h): mask bit settings, mirrored into GPUSTAT bits 11-12
    pub(in crate::core::gpu) fn set_mask_bits(&mut self, set_mask: bool, check_mask: bool) {
        self.status.flags.set(StatusFlags::SET_MASK_BIT, set_mask);
        self.status.flags.set(StatusFlags::CHECK_MASK_BIT, check_mask);
    }

    /// GP0(1Fh): raise IRQ1 until acknowledged through GP1(02h)
    pub(in crate::core::gpu) fn request_interrupt(&mut self) {
        self.status.flags.insert(StatusFlags::IRQ);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_offset_is_signed() {
        // x = -1, y = -2
        let job = build_draw_offset(&[0xE500_0000 | 0x7FF | (0x7FE << 11)]).unwrap();
        assert_eq!(job, GpuJob::SetDrawOffset(DrawOffset { x: -1, y: -2 }));
    }

    #[test]
    fn test_draw_area_corners() {
        let job = build_draw_area_bottom_right(&[0xE400_0000 | 319 | (239 << 10)]).unwrap();
        assert_eq!(job, GpuJob::SetDrawAreaBottomRight { x: 319, y: 239 });
    }

    #[test]
    fn test_draw_mode_sets_flips_and_page() {
        let mut gpu = GPU::new();
        let GpuJob::SetDrawMode(value) = build_draw_mode(&[0xE100_3012]).unwrap() else {
            panic!("expected draw mode");
        };
        gpu.set_draw_mode(value);

        assert!(gpu.rect_flip_x && gpu.rect_flip_y);
        assert_eq!(gpu.status.texture_page_x, 2);
        assert!(gpu.status.flags.contains(StatusFlags::TEXTURE_PAGE_Y));
    }

    #[test]
    fn test_mask_bits_mirror_into_status() {
        let mut gpu = GPU::new();
        let GpuJob::SetMaskBits {
            set_mask,
            check_mask,
        } = build_mask_bits(&[0xE600_0003]).unwrap()
        else {
            panic!("expected mask bits");
        };
        gpu.set_mask_bits(set_mask, check_mask);

        assert!(gpu.status.set_mask_bit());
        assert!(gpu.status.check_mask_bit());
    }
}
