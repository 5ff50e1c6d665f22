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

//! Blender
//!
//! Texture modulation and the four semi-transparency formulas. Both operate
//! on the 24-bit `0x0M_BB_GG_RR` representation.
//!
//! # References
//!
//! - [PSX-SPX: GPU Semi-Transparency](http://problemkaputt.de/psx-spx.htm#gpurenderingattributes)

use super::super::types::SemiTransparency;
use super::super::vram::MASK_24;

#[inline(always)]
fn channel(color: u32, shift: u32) -> u32 {
    (color >> shift) & 0xFF
}

/// Modulate a texel by a base color
///
/// Per channel `min(base * texel >> 7, 0xFF)`: a base of 0x80 leaves the
/// texel unchanged, higher values brighten up to saturation. The texel's
/// mask flag passes through.
///
/// # Examples
///
/// ```
/// use psrx_gpu::core::gpu::apply_blending;
///
/// assert_eq!(apply_blending(0x0080_8080, 0x0012_3456), 0x0012_3456);
/// assert_eq!(apply_blending(0x00FF_FFFF, 0x0000_00F0), 0x0000_00FF);
/// ```
pub fn apply_blending(base: u32, texel: u32) -> u32 {
    let mut out = texel & !0x00FF_FFFF;
    for shift in [0, 8, 16] {
        let value = (channel(base, shift) * channel(texel, shift)) >> 7;
        out |= value.min(0xFF) << shift;
    }
    out
}

/// Combine a foreground color with the background pixel
///
/// Returns the blended 24-bit color without a mask flag; the caller decides
/// which mask flag the written pixel carries.
pub fn translucence(mode: SemiTransparency, back: u32, front: u32) -> u32 {
    let mut out = 0;
    for shift in [0, 8, 16] {
        let b = channel(back, shift) as i32;
        let f = channel(front, shift) as i32;
        let value = match mode {
            SemiTransparency::Average => (b + f) >> 1,
            SemiTransparency::Add => (b + f).min(0xFF),
            SemiTransparency::Subtract => (b - f).max(0),
            SemiTransparency::AddQuarter => (b + (f >> 2)).min(0xFF),
        };
        out |= (value as u32) << shift;
    }
    out & !MASK_24
}
