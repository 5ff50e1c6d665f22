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

//! Rectangle (sprite) rendering
//!
//! Rectangles are axis-aligned spans. Textured rectangles step the texture
//! coordinate one texel per pixel, backwards along an axis whose flip flag
//! (GP0 0xE1 bits 12/13) is set, and sample from the texture page currently
//! selected in Status.

use super::super::primitives::Rectangle;
use super::super::registers::StatusFlags;
use super::super::GPU;
use super::TextureContext;

impl GPU {
    /// Execute a rectangle job
    pub(in crate::core::gpu) fn draw_rectangle(&mut self, rect: &Rectangle) {
        let origin = rect
            .position
            .offset(self.draw_offset.x, self.draw_offset.y);

        let area = self.draw_area;
        let x_start = origin.x.max(area.left);
        let x_end = (origin.x + rect.width as i32 - 1).min(area.right);
        let y_start = origin.y.max(area.top);
        let y_end = (origin.y + rect.height as i32 - 1).min(area.bottom);
        if x_start > x_end || y_start > y_end {
            return;
        }

        let texture = rect
            .texture
            .filter(|_| !self.status.flags.contains(StatusFlags::TEXTURE_DISABLE))
            .map(|tex| {
                (
                    TextureContext {
                        page: self.status.texture_page(),
                        clut: tex.clut,
                        raw: tex.raw,
                    },
                    tex.texcoord,
                )
            });

        log::trace!(
            "Rectangle: ({}, {}) {}x{} textured={} semi={}",
            origin.x,
            origin.y,
            rect.width,
            rect.height,
            texture.is_some(),
            rect.semi_transparent
        );

        let base = rect.color.to_u32();
        let (flip_x, flip_y) = (self.rect_flip_x, self.rect_flip_y);

        for y in y_start..=y_end {
            for x in x_start..=x_end {
                let sample = texture.map(|(tex, texcoord)| {
                    let du = (x - origin.x) as u32;
                    let dv = (y - origin.y) as u32;
                    let u = if flip_x {
                        (texcoord.u as u32).wrapping_sub(du)
                    } else {
                        (texcoord.u as u32).wrapping_add(du)
                    };
                    let v = if flip_y {
                        (texcoord.v as u32).wrapping_sub(dv)
                    } else {
                        (texcoord.v as u32).wrapping_add(dv)
                    };
                    (tex, u & 0xFF, v & 0xFF)
                });
                self.shade(x, y, base, sample, rect.semi_transparent);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gpu::primitives::RectTexture;
    use crate::core::gpu::types::{Clut, Color, TexCoord, TextureDepth, Vertex};

    fn solid(x: i32, y: i32, width: u32, height: u32) -> Rectangle {
        Rectangle {
            position: Vertex { x, y },
            width,
            height,
            color: Color {
                r: 0x10,
                g: 0x20,
                b: 0x30,
            },
            texture: None,
            semi_transparent: false,
        }
    }

    #[test]
    fn test_solid_rectangle_covers_exact_span() {
        let mut gpu = GPU::new();
        gpu.draw_rectangle(&solid(4, 6, 3, 2));

        for y in 5..9 {
            for x in 3..8 {
                let inside = (4..7).contains(&x) && (6..8).contains(&y);
                let expected = if inside { 0x0030_2010 } else { 0 };
                assert_eq!(gpu.vram.get_pixel(x, y), expected, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_rectangle_applies_draw_offset() {
        let mut gpu = GPU::new();
        gpu.draw_offset.x = 100;
        gpu.draw_offset.y = -2;
        gpu.draw_rectangle(&solid(0, 10, 1, 1));
        assert_eq!(gpu.vram.get_pixel(100, 8), 0x0030_2010);
    }

    #[test]
    fn test_textured_rectangle_flip_x() {
        let mut gpu = GPU::new();
        gpu.status.texture_depth = TextureDepth::T15Bit;
        gpu.status.texture_page_x = 1;
        // Texels 0x0001..0x0004 at u = 0..3 of page (64, 0)
        for u in 0..4u32 {
            gpu.vram.set_pixel_15(64 + u, 0, (u + 1) as u16);
        }
        gpu.rect_flip_x = true;

        let rect = Rectangle {
            texture: Some(RectTexture {
                texcoord: TexCoord { u: 3, v: 0 },
                clut: Clut::default(),
                raw: true,
            }),
            ..solid(200, 0, 4, 1)
        };
        gpu.draw_rectangle(&rect);

        // Reads u = 3, 2, 1, 0
        for i in 0..4u32 {
            assert_eq!(gpu.vram.get_pixel_15(200 + i, 0), (4 - i) as u16);
        }
    }
}
