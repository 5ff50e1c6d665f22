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

//! Software renderer
//!
//! Rasterizes decoded primitives into VRAM. Every primitive family ends in the
//! same per-pixel stage ([`GPU::shade`]):
//!
//! 1. Skip the pixel if mask checking is on and the destination is masked
//! 2. Sample the texture through the texture window (transparent texel: skip)
//! 3. Modulate the texel by the base color unless the primitive is raw
//! 4. Apply semi-transparency against the background
//! 5. OR in the forced mask bit and write

mod blend;
mod line;
mod rasterizer;
mod rectangle;
mod surface;
mod texture;

pub use blend::{apply_blending, translucence};
pub use surface::{FrameSurface, SurfaceView};
pub use texture::sample_texel;

use super::queue::RenderJob;
use super::types::{Clut, TexPage};
use super::vram::MASK_24;
use super::GPU;

/// Texture state of one primitive, resolved when it executes
#[derive(Debug, Clone, Copy)]
pub(in crate::core::gpu) struct TextureContext {
    pub page: TexPage,
    pub clut: Clut,
    pub raw: bool,
}

impl GPU {
    /// Final per-pixel stage
    ///
    /// `base` is the flat or interpolated vertex color; `texture` carries the
    /// texture context and the texel coordinates for textured primitives.
    #[inline]
    pub(in crate::core::gpu) fn shade(
        &mut self,
        x: i32,
        y: i32,
        base: u32,
        texture: Option<(TextureContext, u32, u32)>,
        semi_transparent: bool,
    ) {
        let (px, py) = (x as u32, y as u32);
        if self.status.check_mask_bit() && self.vram.is_masked(px, py) {
            return;
        }

        let (color, translucent) = match texture {
            Some((tex, u, v)) => {
                let u = self.texture_window.apply_u(u);
                let v = self.texture_window.apply_v(v);
                let Some(texel) = sample_texel(&self.vram, &tex.page, tex.clut, u, v) else {
                    return;
                };
                let color = if tex.raw {
                    texel
                } else {
                    apply_blending(base, texel)
                };
                // Textured pixels are only translucent where the texel says so
                (color, semi_transparent && texel & MASK_24 != 0)
            }
            None => (base & 0x00FF_FFFF, semi_transparent),
        };

        let mut rgb = color & 0x00FF_FFFF;
        if translucent {
            rgb = translucence(
                self.status.semi_transparency,
                self.vram.get_pixel(px, py),
                rgb,
            );
        }

        let mask = if self.status.set_mask_bit() {
            MASK_24
        } else {
            color & MASK_24
        };
        self.vram.set_pixel(px, py, rgb | mask);
    }

    /// Execute a render-context job
    pub(in crate::core::gpu) fn run_render_job(&mut self, job: RenderJob, surface: &mut FrameSurface) {
        match job {
            RenderJob::ResizeSurface => {
                let (width, height) = match surface.view() {
                    SurfaceView::Display => self.display_resolution(),
                    SurfaceView::VramViewer => (1024, 512),
                };
                surface.resize(width, height);
            }
        }
    }
}
