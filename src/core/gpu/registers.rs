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

//! GPU register type definitions
//!
//! This module contains the GPUSTAT register model and the drawing
//! environment (drawing area, draw offset, texture window) and display
//! geometry (start position, horizontal/vertical ranges) registers.
//!
//! # GPUSTAT Layout
//!
//! ```text
//! 0-3   Texture page X base (N*64)      19    Vertical resolution (0=240, 1=480)
//! 4     Texture page Y base (N*256)     20    Video mode (0=NTSC, 1=PAL)
//! 5-6   Semi-transparency mode          21    Display depth (0=15bit, 1=24bit)
//! 7-8   Texture depth                   22    Vertical interlace
//! 9     Dither                          23    Display disabled
//! 10    Draw to display area            24    IRQ1
//! 11    Set mask bit while drawing      25    DMA request
//! 12    Draw pixels (check mask)        26    Ready to receive command
//! 13    Interlace field                 27    Ready to send VRAM to CPU
//! 14    Reverse flag                    28    Ready to receive DMA block
//! 15    Texture disable                 29-30 DMA direction
//! 16    Horizontal resolution 2         31    Drawing odd line
//! 17-18 Horizontal resolution 1
//! ```
//!
//! # References
//!
//! - [PSX-SPX: GPU Status Register](http://problemkaputt.de/psx-spx.htm#gpustatusregister)

use bitflags::bitflags;

use super::types::{SemiTransparency, TexPage, TextureDepth};

bitflags! {
    /// Single-bit GPUSTAT fields, at their register positions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StatusFlags: u32 {
        const TEXTURE_PAGE_Y = 1 << 4;
        const DITHER = 1 << 9;
        const DRAW_TO_DISPLAY = 1 << 10;
        const SET_MASK_BIT = 1 << 11;
        const CHECK_MASK_BIT = 1 << 12;
        const INTERLACE_FIELD = 1 << 13;
        const REVERSE_FLAG = 1 << 14;
        const TEXTURE_DISABLE = 1 << 15;
        const HORIZONTAL_RES_2 = 1 << 16;
        const VERTICAL_RES = 1 << 19;
        const VIDEO_MODE_PAL = 1 << 20;
        const DISPLAY_DEPTH_24 = 1 << 21;
        const VERTICAL_INTERLACE = 1 << 22;
        const DISPLAY_DISABLED = 1 << 23;
        const IRQ = 1 << 24;
        const DMA_REQUEST = 1 << 25;
        const READY_CMD = 1 << 26;
        const READY_VRAM_SEND = 1 << 27;
        const READY_DMA = 1 << 28;
        const ODD_LINE = 1 << 31;
    }
}

/// DMA direction (GPUSTAT bits 29-30, GP1 0x04)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DmaDirection {
    #[default]
    Off,
    Fifo,
    CpuToGp0,
    GpuReadToCpu,
}

impl DmaDirection {
    /// Decode from a 2-bit field
    pub fn from_bits(value: u32) -> Self {
        match value & 3 {
            0 => DmaDirection::Off,
            1 => DmaDirection::Fifo,
            2 => DmaDirection::CpuToGp0,
            _ => DmaDirection::GpuReadToCpu,
        }
    }

    /// Encode to a 2-bit field
    pub fn bits(self) -> u32 {
        match self {
            DmaDirection::Off => 0,
            DmaDirection::Fifo => 1,
            DmaDirection::CpuToGp0 => 2,
            DmaDirection::GpuReadToCpu => 3,
        }
    }
}

/// Vertical resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalRes {
    /// 240 lines (NTSC) or 256 lines (PAL)
    R240,
    /// 480 lines (NTSC interlaced) or 512 lines (PAL interlaced)
    R480,
}

/// Video mode (refresh rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoMode {
    /// NTSC mode: 60Hz refresh rate
    Ntsc,
    /// PAL mode: 50Hz refresh rate
    Pal,
}

/// Display color depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayDepth {
    /// 15-bit color (5-5-5 RGB)
    D15Bits,
    /// 24-bit color (8-8-8 RGB, packed across 16-bit VRAM words)
    D24Bits,
}

/// GPU status register
///
/// Every one of the 32 GPUSTAT bits is backed by a field here, so
/// [`GPUStatus::to_u32`] and [`GPUStatus::from_u32`] are exact inverses.
///
/// # Examples
///
/// ```
/// use psrx_gpu::core::gpu::GPUStatus;
///
/// let status = GPUStatus::from_u32(0x1480_2000);
/// assert_eq!(status.to_u32(), 0x1480_2000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GPUStatus {
    /// Single-bit fields
    pub flags: StatusFlags,

    /// Texture page X base in 64-pixel units (bits 0-3)
    pub texture_page_x: u8,

    /// Semi-transparency mode (bits 5-6)
    pub semi_transparency: SemiTransparency,

    /// Texture depth (bits 7-8)
    pub texture_depth: TextureDepth,

    /// Horizontal resolution 1 (bits 17-18)
    pub horizontal_res_1: u8,

    /// DMA direction (bits 29-30)
    pub dma_direction: DmaDirection,
}

impl GPUStatus {
    /// Status value right after GP1(0x00)
    pub const RESET_VALUE: u32 = 0x1480_2000;

    /// Pack into the GPUSTAT word
    pub fn to_u32(&self) -> u32 {
        self.flags.bits()
            | (self.texture_page_x as u32 & 0xF)
            | (self.semi_transparency.bits() << 5)
            | (self.texture_depth.bits() << 7)
            | ((self.horizontal_res_1 as u32 & 3) << 17)
            | (self.dma_direction.bits() << 29)
    }

    /// Unpack from a GPUSTAT word
    pub fn from_u32(value: u32) -> Self {
        Self {
            flags: StatusFlags::from_bits_truncate(value),
            texture_page_x: (value & 0xF) as u8,
            semi_transparency: SemiTransparency::from_bits(value >> 5),
            texture_depth: TextureDepth::from_bits(value >> 7),
            horizontal_res_1: ((value >> 17) & 3) as u8,
            dma_direction: DmaDirection::from_bits(value >> 29),
        }
    }

    /// Status after a GPU reset
    pub fn after_reset() -> Self {
        Self::from_u32(Self::RESET_VALUE)
    }

    /// Apply a GP0(0xE1) draw mode word
    ///
    /// Updates bits 0-10; bit 15 only when `allow_texture_disable` is set.
    pub fn apply_draw_mode(&mut self, value: u32, allow_texture_disable: bool) {
        self.apply_texpage(value, allow_texture_disable);
        self.flags.set(StatusFlags::DITHER, (value >> 9) & 1 != 0);
        self.flags
            .set(StatusFlags::DRAW_TO_DISPLAY, (value >> 10) & 1 != 0);
    }

    /// Apply a polygon texpage attribute: bits 0-8, and 11 when allowed
    pub fn apply_texpage(&mut self, value: u32, allow_texture_disable: bool) {
        self.texture_page_x = (value & 0xF) as u8;
        self.flags
            .set(StatusFlags::TEXTURE_PAGE_Y, (value >> 4) & 1 != 0);
        self.semi_transparency = SemiTransparency::from_bits(value >> 5);
        self.texture_depth = TextureDepth::from_bits(value >> 7);
        let disable = allow_texture_disable && (value >> 11) & 1 != 0;
        self.flags.set(StatusFlags::TEXTURE_DISABLE, disable);
    }

    /// Texture page currently selected in Status (used by rectangles)
    pub fn texture_page(&self) -> TexPage {
        TexPage {
            base_x: self.texture_page_x as u32 * 64,
            base_y: if self.flags.contains(StatusFlags::TEXTURE_PAGE_Y) {
                256
            } else {
                0
            },
            semi_transparency: self.semi_transparency,
            depth: self.texture_depth,
            texture_disable: self.flags.contains(StatusFlags::TEXTURE_DISABLE),
        }
    }

    /// Horizontal display resolution in pixels
    pub fn horizontal_resolution(&self) -> u32 {
        if self.flags.contains(StatusFlags::HORIZONTAL_RES_2) {
            368
        } else {
            match self.horizontal_res_1 & 3 {
                0 => 256,
                1 => 320,
                2 => 512,
                _ => 640,
            }
        }
    }

    /// Vertical resolution setting
    pub fn vertical_res(&self) -> VerticalRes {
        if self.flags.contains(StatusFlags::VERTICAL_RES) {
            VerticalRes::R480
        } else {
            VerticalRes::R240
        }
    }

    /// Video mode setting
    pub fn video_mode(&self) -> VideoMode {
        if self.flags.contains(StatusFlags::VIDEO_MODE_PAL) {
            VideoMode::Pal
        } else {
            VideoMode::Ntsc
        }
    }

    /// Display depth setting
    pub fn display_depth(&self) -> DisplayDepth {
        if self.flags.contains(StatusFlags::DISPLAY_DEPTH_24) {
            DisplayDepth::D24Bits
        } else {
            DisplayDepth::D15Bits
        }
    }

    /// Whether 480-line interlaced output is active
    pub fn is_interlaced_480(&self) -> bool {
        self.flags
            .contains(StatusFlags::VERTICAL_RES | StatusFlags::VERTICAL_INTERLACE)
    }

    /// Effective output resolution `(width, height)`
    pub fn display_resolution(&self) -> (u32, u32) {
        let width = self.horizontal_resolution();
        let mut height = match self.video_mode() {
            VideoMode::Ntsc => 240,
            VideoMode::Pal => 256,
        };
        if self.is_interlaced_480() {
            height *= 2;
        }
        (width, height)
    }

    /// Value of bit 25 as derived from the DMA direction
    pub fn derived_dma_request(&self) -> bool {
        match self.dma_direction {
            DmaDirection::Off => false,
            DmaDirection::Fifo => true,
            DmaDirection::CpuToGp0 => self.flags.contains(StatusFlags::READY_DMA),
            DmaDirection::GpuReadToCpu => self.flags.contains(StatusFlags::READY_VRAM_SEND),
        }
    }

    #[inline(always)]
    pub fn set_mask_bit(&self) -> bool {
        self.flags.contains(StatusFlags::SET_MASK_BIT)
    }

    #[inline(always)]
    pub fn check_mask_bit(&self) -> bool {
        self.flags.contains(StatusFlags::CHECK_MASK_BIT)
    }
}

/// Drawing area (clipping rectangle)
///
/// Note the hardware quirk: `right`/`bottom` are inclusive coordinates, not
/// dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawingArea {
    /// Left edge X coordinate (inclusive)
    pub left: i32,

    /// Top edge Y coordinate (inclusive)
    pub top: i32,

    /// Right edge X coordinate (inclusive)
    pub right: i32,

    /// Bottom edge Y coordinate (inclusive)
    pub bottom: i32,
}

impl DrawingArea {
    /// Whether a point lies inside the area
    #[inline(always)]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Raw GP0(0xE3) value of the top-left corner
    pub fn top_left_word(&self) -> u32 {
        (self.left as u32 & 0x3FF) | ((self.top as u32 & 0x3FF) << 10)
    }

    /// Raw GP0(0xE4) value of the bottom-right corner
    pub fn bottom_right_word(&self) -> u32 {
        (self.right as u32 & 0x3FF) | ((self.bottom as u32 & 0x3FF) << 10)
    }
}

impl Default for DrawingArea {
    fn default() -> Self {
        Self {
            left: 0,
            top: 0,
            right: 1023,
            bottom: 511,
        }
    }
}

/// Signed drawing offset (GP0 0xE5), added to every vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawOffset {
    pub x: i32,
    pub y: i32,
}

impl DrawOffset {
    /// Raw 22-bit GP0(0xE5) value
    pub fn word(&self) -> u32 {
        (self.x as u32 & 0x7FF) | ((self.y as u32 & 0x7FF) << 11)
    }
}

/// Texture window
///
/// The raw mask/offset values (8-pixel units) are kept for readback, and
/// pre-combined into per-axis AND/OR masks applied to every texel coordinate:
/// `coord = (coord & pre_mask) | post_mask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureWindow {
    pub mask_x: u8,
    pub mask_y: u8,
    pub offset_x: u8,
    pub offset_y: u8,
    pub pre_mask_x: u32,
    pub pre_mask_y: u32,
    pub post_mask_x: u32,
    pub post_mask_y: u32,
}

impl TextureWindow {
    /// Decode a GP0(0xE2) value
    ///
    /// # Examples
    ///
    /// ```
    /// use psrx_gpu::core::gpu::TextureWindow;
    ///
    /// // mask_x = 0x1F (all of bits 3-7), offset_x = 0x02
    /// let tw = TextureWindow::from_word(0x1F | (0x02 << 10));
    /// assert_eq!(tw.apply_u(0xFF), 0x07 | 0x10);
    /// ```
    pub fn from_word(value: u32) -> Self {
        let mask_x = (value & 0x1F) as u8;
        let mask_y = ((value >> 5) & 0x1F) as u8;
        let offset_x = ((value >> 10) & 0x1F) as u8;
        let offset_y = ((value >> 15) & 0x1F) as u8;
        Self {
            mask_x,
            mask_y,
            offset_x,
            offset_y,
            pre_mask_x: !((mask_x as u32) * 8) & 0xFF,
            pre_mask_y: !((mask_y as u32) * 8) & 0xFF,
            post_mask_x: ((offset_x & mask_x) as u32) * 8,
            post_mask_y: ((offset_y & mask_y) as u32) * 8,
        }
    }

    /// Raw 20-bit GP0(0xE2) value
    pub fn word(&self) -> u32 {
        (self.mask_x as u32)
            | ((self.mask_y as u32) << 5)
            | ((self.offset_x as u32) << 10)
            | ((self.offset_y as u32) << 15)
    }

    /// Apply the window to a U coordinate
    ///
    /// One formula, `(u & !(mask * 8)) | ((offset & mask) * 8)`, serves every
    /// primitive; there is no second post-mask variant.
    #[inline(always)]
    pub fn apply_u(&self, u: u32) -> u32 {
        ((u & 0xFF) & self.pre_mask_x) | self.post_mask_x
    }

    #[inline(always)]
    pub fn apply_v(&self, v: u32) -> u32 {
        ((v & 0xFF) & self.pre_mask_y) | self.post_mask_y
    }
}

impl Default for TextureWindow {
    fn default() -> Self {
        Self::from_word(0)
    }
}

/// Display geometry set through GP1 0x05-0x07
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayGeometry {
    /// Top-left of the displayed VRAM region
    pub start_x: u32,
    pub start_y: u32,

    /// Horizontal display range in GPU dots
    pub h_start: u32,
    pub h_end: u32,

    /// Vertical display range in scanlines
    pub v_start: u32,
    pub v_end: u32,
}

impl Default for DisplayGeometry {
    fn default() -> Self {
        Self {
            start_x: 0,
            start_y: 0,
            h_start: 0x200,
            h_end: 0x200 + 0xA00,
            v_start: 0x10,
            v_end: 0x10 + 0xF0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn status_pack_unpack_is_bijective(value in any::<u32>()) {
            prop_assert_eq!(GPUStatus::from_u32(value).to_u32(), value);
        }
    }

    #[test]
    fn test_reset_value_fields() {
        let status = GPUStatus::after_reset();
        assert!(status.flags.contains(StatusFlags::DISPLAY_DISABLED));
        assert!(status.flags.contains(StatusFlags::READY_CMD));
        assert!(status.flags.contains(StatusFlags::READY_DMA));
        assert!(status.flags.contains(StatusFlags::INTERLACE_FIELD));
        assert_eq!(status.dma_direction, DmaDirection::Off);
        assert_eq!(status.display_resolution(), (256, 240));
    }

    #[test]
    fn test_resolution_decoding() {
        let mut status = GPUStatus::default();
        status.horizontal_res_1 = 3;
        assert_eq!(status.horizontal_resolution(), 640);

        status.flags.insert(StatusFlags::HORIZONTAL_RES_2);
        assert_eq!(status.horizontal_resolution(), 368);

        status.flags.insert(StatusFlags::VIDEO_MODE_PAL);
        assert_eq!(status.display_resolution(), (368, 256));

        // 480-line mode needs both vres and interlace
        status.flags.insert(StatusFlags::VERTICAL_RES);
        assert_eq!(status.display_resolution().1, 256);
        status.flags.insert(StatusFlags::VERTICAL_INTERLACE);
        assert_eq!(status.display_resolution().1, 512);
    }

    #[test]
    fn test_texture_disable_requires_permission() {
        let mut status = GPUStatus::default();
        status.apply_draw_mode(1 << 11, false);
        assert!(!status.flags.contains(StatusFlags::TEXTURE_DISABLE));

        status.apply_draw_mode(1 << 11, true);
        assert!(status.flags.contains(StatusFlags::TEXTURE_DISABLE));
    }

    #[test]
    fn test_texture_window_masks() {
        // mask 0x1E (bits 4-7 of u), offset 0x0A
        let tw = TextureWindow::from_word(0x1E | (0x0A << 10));
        assert_eq!(tw.pre_mask_x, !(0x1E * 8) & 0xFF);
        assert_eq!(tw.post_mask_x, (0x0A & 0x1E) * 8);
        assert_eq!(tw.word(), 0x1E | (0x0A << 10));

        // Zero window leaves coordinates untouched
        let tw = TextureWindow::default();
        assert_eq!(tw.apply_u(0xAB), 0xAB);
        assert_eq!(tw.apply_v(0x12), 0x12);
    }
}
