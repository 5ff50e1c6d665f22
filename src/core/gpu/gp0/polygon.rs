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

//! GP0 polygon commands (0x20-0x3F)
//!
//! The opcode bits select the layout:
//!
//! ```text
//! bit 4  shaded (one color word per vertex)
//! bit 3  quad (4 vertices instead of 3)
//! bit 2  textured (one UV word per vertex)
//! bit 1  semi-transparent
//! bit 0  raw texture (no color modulation)
//! ```
//!
//! Per vertex the words are `[color] vertex [uv]`; the first color shares
//! the opcode word. The first UV word carries the CLUT in its upper half,
//! the second one the texture page attribute.

use super::super::primitives::{Polygon, PolygonVertex, TextureMapping};
use super::super::queue::GpuJob;
use super::super::types::{Clut, Color, TexCoord, TexPage, Vertex};
use crate::core::error::Result;

/// Build a polygon job from its complete word list
pub(super) fn build_polygon(words: &[u32]) -> Result<GpuJob> {
    let opcode = words[0] >> 24;
    let shaded = opcode & 0x10 != 0;
    let quad = opcode & 0x08 != 0;
    let textured = opcode & 0x04 != 0;
    let semi_transparent = opcode & 0x02 != 0;
    let raw = opcode & 0x01 != 0;

    let vertex_count = if quad { 4 } else { 3 };
    let mut vertices = [PolygonVertex::default(); 4];
    let mut clut = Clut::default();
    let mut page_attribute = 0;

    let mut cursor = 0;
    let mut color = Color::default();
    for (i, vertex) in vertices.iter_mut().take(vertex_count).enumerate() {
        if i == 0 || shaded {
            color = Color::from_u32(words[cursor]);
            cursor += 1;
        }
        vertex.color = color;
        vertex.position = Vertex::from_u32(words[cursor]);
        cursor += 1;

        if textured {
            let uv = words[cursor];
            cursor += 1;
            vertex.texcoord = TexCoord::from_u32(uv);
            match i {
                0 => clut = Clut::from_u32(uv),
                1 => page_attribute = uv >> 16,
                _ => {}
            }
        }
    }

    let texture = textured.then(|| TextureMapping {
        clut,
        page: TexPage::from_attribute(page_attribute),
        page_attribute,
        raw,
    });

    Ok(GpuJob::Polygon(Polygon {
        vertices,
        vertex_count,
        shaded,
        texture,
        semi_transparent,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gpu::types::TextureDepth;

    fn polygon(words: &[u32]) -> Polygon {
        match build_polygon(words).unwrap() {
            GpuJob::Polygon(p) => p,
            other => panic!("unexpected job {:?}", other),
        }
    }

    #[test]
    fn test_flat_triangle_shares_color() {
        let p = polygon(&[0x2000_00FF, 0x0000_0000, 0x0000_0010, 0x0010_0000]);
        assert_eq!(p.vertex_count, 3);
        assert!(!p.shaded && p.texture.is_none() && !p.semi_transparent);
        for v in &p.vertices[..3] {
            assert_eq!(v.color, Color { r: 0xFF, g: 0, b: 0 });
        }
        assert_eq!(p.vertices[2].position, Vertex { x: 0, y: 16 });
    }

    #[test]
    fn test_shaded_textured_quad_layout() {
        let words = [
            0x3E00_0011, // shaded, quad, textured, semi
            0x0000_0001,
            0x7FC0_0201, // CLUT x=0, y=511, uv (1, 2)
            0x0000_0022,
            0x0000_0002,
            0x0092_0403, // texpage: x=2*64, y=256, 8-bit
            0x0000_0033,
            0x0000_0003,
            0x0000_0605,
            0x0000_0044,
            0x0000_0004,
            0x0000_0807,
        ];
        let p = polygon(&words);

        assert!(p.is_quad() && p.shaded && p.semi_transparent);
        assert_eq!(p.vertices[3].color.r, 0x44);
        assert_eq!(p.vertices[3].position.x, 4);
        assert_eq!(p.vertices[2].texcoord, TexCoord { u: 5, v: 6 });

        let tex = p.texture.unwrap();
        assert!(!tex.raw);
        assert_eq!(tex.clut, Clut { x: 0, y: 511 });
        assert_eq!(tex.page_attribute, 0x0092);
        assert_eq!(tex.page.base_x, 128);
        assert_eq!(tex.page.base_y, 256);
        assert_eq!(tex.page.depth, TextureDepth::T8Bit);
    }
}
