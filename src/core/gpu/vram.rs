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

//! VRAM store
//!
//! The GPU's 1024×512 pixel memory, kept in two synchronized representations:
//!
//! - **24-bit**: `0x0M_BB_GG_RR`, bit 24 holding the mask flag. Used for display
//!   composition and all blending math.
//! - **15-bit**: the native `MBBBBBGGGGGRRRRR` word. Used for texture sampling
//!   and CPU readback, so values written by the CPU come back unchanged.
//!
//! Every write goes through one of the setters below, which update both arrays
//! from the same source value.
//!
//! # References
//!
//! - [PSX-SPX: GPU Video Memory](http://problemkaputt.de/psx-spx.htm#gpuvideomemoryvram)

/// Mask flag in the 24-bit representation
pub const MASK_24: u32 = 0x0100_0000;

/// Mask flag in the 15-bit representation
pub const MASK_15: u16 = 0x8000;

/// Dual-representation VRAM
#[derive(Clone)]
pub struct Vram {
    pixels24: Vec<u32>,
    pixels15: Vec<u16>,
}

impl Vram {
    /// VRAM width in pixels
    pub const WIDTH: usize = 1024;

    /// VRAM height in pixels
    pub const HEIGHT: usize = 512;

    /// Total VRAM size in pixels
    pub const SIZE: usize = Self::WIDTH * Self::HEIGHT;

    /// Create a cleared (all black, unmasked) VRAM
    pub fn new() -> Self {
        Self {
            pixels24: vec![0; Self::SIZE],
            pixels15: vec![0; Self::SIZE],
        }
    }

    #[inline(always)]
    fn index(x: u32, y: u32) -> usize {
        let x = (x & 0x3FF) as usize;
        let y = (y & 0x1FF) as usize;
        y * Self::WIDTH + x
    }

    /// Read the 24-bit representation of a pixel (mask flag in bit 24)
    ///
    /// Coordinates wrap to the VRAM bounds.
    #[inline(always)]
    pub fn get_pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels24[Self::index(x, y)]
    }

    /// Read the raw 15-bit representation of a pixel
    #[inline(always)]
    pub fn get_pixel_15(&self, x: u32, y: u32) -> u16 {
        self.pixels15[Self::index(x, y)]
    }

    /// Write a pixel from its 24-bit representation
    ///
    /// The 24-bit value is stored as given; the 15-bit value is derived by
    /// truncating each channel to 5 bits.
    ///
    /// # Arguments
    ///
    /// * `x` - X coordinate (wraps at 1024)
    /// * `y` - Y coordinate (wraps at 512)
    /// * `color` - `0x0M_BB_GG_RR` color
    #[inline(always)]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: u32) {
        let index = Self::index(x, y);
        let color = color & (MASK_24 | 0x00FF_FFFF);
        self.pixels24[index] = color;
        self.pixels15[index] = pack_15(color);
    }

    /// Write a pixel from its raw 15-bit representation
    ///
    /// The raw value is stored as given; the 24-bit value is derived by
    /// widening each channel (`c << 3`).
    #[inline(always)]
    pub fn set_pixel_15(&mut self, x: u32, y: u32, raw: u16) {
        let index = Self::index(x, y);
        self.pixels15[index] = raw;
        self.pixels24[index] = expand_15(raw);
    }

    /// Copy both representations of one pixel to another location
    #[inline(always)]
    pub fn copy_pixel(&mut self, src: (u32, u32), dst: (u32, u32)) {
        let from = Self::index(src.0, src.1);
        let to = Self::index(dst.0, dst.1);
        self.pixels24[to] = self.pixels24[from];
        self.pixels15[to] = self.pixels15[from];
    }

    /// Force the mask flag on a pixel in both representations
    #[inline(always)]
    pub fn set_mask(&mut self, x: u32, y: u32) {
        let index = Self::index(x, y);
        self.pixels24[index] |= MASK_24;
        self.pixels15[index] |= MASK_15;
    }

    /// Check the mask flag of a pixel
    #[inline(always)]
    pub fn is_masked(&self, x: u32, y: u32) -> bool {
        self.pixels15[Self::index(x, y)] & MASK_15 != 0
    }

    /// Whole 24-bit array (row-major)
    pub fn pixels24(&self) -> &[u32] {
        &self.pixels24
    }

    /// Whole 15-bit array (row-major)
    pub fn pixels15(&self) -> &[u16] {
        &self.pixels15
    }

    /// Replace both arrays wholesale
    ///
    /// Used by save-state loading. Arrays of the wrong length are rejected
    /// and leave VRAM untouched.
    pub fn replace(&mut self, pixels24: Vec<u32>, pixels15: Vec<u16>) -> bool {
        if pixels24.len() != Self::SIZE || pixels15.len() != Self::SIZE {
            return false;
        }
        self.pixels24 = pixels24;
        self.pixels15 = pixels15;
        true
    }
}

impl Default for Vram {
    fn default() -> Self {
        Self::new()
    }
}

/// Pack a 24-bit color into the native 15-bit word
#[inline(always)]
pub fn pack_15(color: u32) -> u16 {
    let r = (color & 0xFF) >> 3;
    let g = ((color >> 8) & 0xFF) >> 3;
    let b = ((color >> 16) & 0xFF) >> 3;
    let m = if color & MASK_24 != 0 { MASK_15 } else { 0 };
    (r | (g << 5) | (b << 10)) as u16 | m
}

/// Widen a native 15-bit word to the 24-bit representation
#[inline(always)]
pub fn expand_15(raw: u16) -> u32 {
    let raw = raw as u32;
    let r = (raw & 0x1F) << 3;
    let g = ((raw >> 5) & 0x1F) << 3;
    let b = ((raw >> 10) & 0x1F) << 3;
    let m = if raw & 0x8000 != 0 { MASK_24 } else { 0 };
    r | (g << 8) | (b << 16) | m
}
