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

//! Texture sampler
//!
//! Reads VRAM as 4-bit, 8-bit or 15-bit texture data. Indexed formats pack
//! several texels into one 16-bit VRAM word and resolve through a CLUT row.
//!
//! ```text
//! 4-bit:  word at (base_x + u/4, base_y + v), nibble u%4   -> CLUT[index]
//! 8-bit:  word at (base_x + u/2, base_y + v), byte u%2     -> CLUT[index]
//! 15-bit: word at (base_x + u,   base_y + v)               -> direct color
//! ```
//!
//! A raw 15-bit value of exactly zero is the transparent texel; sampling it
//! yields `None` and the pixel is not drawn at all.

use super::super::types::{Clut, TexPage, TextureDepth};
use super::super::vram::{expand_15, Vram};

/// Sample one texel
///
/// `u`/`v` are texture-page coordinates after the texture window has been
/// applied.
///
/// # Returns
///
/// The texel in 24-bit representation with its mask flag in bit 24, or
/// `None` for the transparent texel.
pub fn sample_texel(vram: &Vram, page: &TexPage, clut: Clut, u: u32, v: u32) -> Option<u32> {
    let y = page.base_y + v;
    let raw = match page.depth {
        TextureDepth::T4Bit => {
            let word = vram.get_pixel_15(page.base_x + u / 4, y);
            let index = (word >> ((u & 3) * 4)) & 0xF;
            vram.get_pixel_15(clut.x + index as u32, clut.y)
        }
        TextureDepth::T8Bit => {
            let word = vram.get_pixel_15(page.base_x + u / 2, y);
            let index = (word >> ((u & 1) * 8)) & 0xFF;
            vram.get_pixel_15(clut.x + index as u32, clut.y)
        }
        TextureDepth::T15Bit | TextureDepth::Reserved => vram.get_pixel_15(page.base_x + u, y),
    };

    if raw == 0 {
        None
    } else {
        Some(expand_15(raw))
    }
}
