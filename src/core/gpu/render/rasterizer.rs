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

//! Polygon rasterizer
//!
//! Triangles are filled with edge functions over their bounding box rather
//! than by scanline splitting:
//!
//! 1. Apply the draw offset; reject primitives whose bounding box exceeds
//!    1023×511
//! 2. Clip each vertex into the drawing area, shifting its texture
//!    coordinate by the same delta
//! 3. Skip zero-area triangles; force a positive winding by swapping
//!    vertices 1 and 2
//! 4. Walk the bounding box (intersected with the drawing area); a pixel is
//!    covered when all three biased edge functions are non-negative
//! 5. Interpolate color and texture coordinates affinely from the
//!    barycentric weights
//!
//! Quads are two triangles, 0-1-2 and 1-2-3.
//!
//! # References
//!
//! - [Fabian Giesen: The barycentric conspiracy](https://fgiesen.wordpress.com/2013/02/06/the-barycentric-conspirac/)
//! - [PSX-SPX: GPU Render Polygon Commands](http://problemkaputt.de/psx-spx.htm#gpurenderpolygoncommands)

use super::super::primitives::{Polygon, PolygonVertex};
use super::super::registers::{DrawingArea, StatusFlags};
use super::super::GPU;
use super::TextureContext;

/// A vertex after offset and clipping, in rasterizer space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(in crate::core::gpu) struct RasterVertex {
    pub x: i64,
    pub y: i64,
    pub color: [i64; 3],
    pub u: i64,
    pub v: i64,
}

impl RasterVertex {
    fn new(vertex: &PolygonVertex, dx: i32, dy: i32) -> Self {
        let position = vertex.position.offset(dx, dy);
        Self {
            x: position.x as i64,
            y: position.y as i64,
            color: vertex.color.channels(),
            u: vertex.texcoord.u as i64,
            v: vertex.texcoord.v as i64,
        }
    }

    /// Move the vertex inside the drawing area, dragging its texture
    /// coordinate along by the same amount
    fn clip(&mut self, area: &DrawingArea) {
        let (left, right) = (area.left as i64, area.right as i64);
        let (top, bottom) = (area.top as i64, area.bottom as i64);

        if self.x < left {
            self.u += left - self.x;
            self.x = left;
        } else if self.x > right {
            self.u -= self.x - right;
            self.x = right;
        }

        if self.y < top {
            self.v += top - self.y;
            self.y = top;
        } else if self.y > bottom {
            self.v -= self.y - bottom;
            self.y = bottom;
        }
    }
}

/// Twice the signed area of triangle `abc`
#[inline(always)]
pub(in crate::core::gpu) fn orient2d(a: (i64, i64), b: (i64, i64), c: (i64, i64)) -> i64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// Fill-rule bias of edge `a -> b`: 0 for covered edges, -1 otherwise
#[inline(always)]
fn edge_bias(a: &RasterVertex, b: &RasterVertex) -> i64 {
    if (a.y == b.y && b.x > a.x) || b.y < a.y {
        0
    } else {
        -1
    }
}

/// Whether a bounding box exceeds the hardware limit
#[inline(always)]
fn exceeds_hardware_limit(vertices: &[RasterVertex; 3]) -> bool {
    let min_x = vertices.iter().map(|v| v.x).min().unwrap_or(0);
    let max_x = vertices.iter().map(|v| v.x).max().unwrap_or(0);
    let min_y = vertices.iter().map(|v| v.y).min().unwrap_or(0);
    let max_y = vertices.iter().map(|v| v.y).max().unwrap_or(0);
    max_x - min_x > 1023 || max_y - min_y > 511
}

impl GPU {
    /// Execute a polygon job
    pub(in crate::core::gpu) fn draw_polygon(&mut self, polygon: &Polygon) {
        let texture = polygon.texture.map(|mapping| {
            // The polygon's texpage becomes the current one
            self.status
                .apply_texpage(mapping.page_attribute, self.texture_disable_allowed);
            TextureContext {
                page: mapping.page,
                clut: mapping.clut,
                raw: mapping.raw,
            }
        });
        let texture = texture.filter(|_| !self.status.flags.contains(StatusFlags::TEXTURE_DISABLE));

        let (dx, dy) = (self.draw_offset.x, self.draw_offset.y);
        let v: Vec<RasterVertex> = polygon.vertices[..polygon.vertex_count]
            .iter()
            .map(|vertex| RasterVertex::new(vertex, dx, dy))
            .collect();

        log::trace!(
            "Polygon: {} vertices, shaded={}, textured={}, semi={}",
            polygon.vertex_count,
            polygon.shaded,
            texture.is_some(),
            polygon.semi_transparent
        );

        self.rasterize_triangle(
            [v[0], v[1], v[2]],
            polygon.shaded,
            texture,
            polygon.semi_transparent,
        );
        if polygon.is_quad() {
            self.rasterize_triangle(
                [v[1], v[2], v[3]],
                polygon.shaded,
                texture,
                polygon.semi_transparent,
            );
        }
    }

    /// Rasterize one triangle whose vertices already carry the draw offset
    pub(in crate::core::gpu) fn rasterize_triangle(
        &mut self,
        mut v: [RasterVertex; 3],
        shaded: bool,
        texture: Option<TextureContext>,
        semi_transparent: bool,
    ) {
        if exceeds_hardware_limit(&v) {
            log::trace!("Triangle rejected: bounding box too large");
            return;
        }

        let area = self.draw_area;
        for vertex in v.iter_mut() {
            vertex.clip(&area);
        }

        let mut area2 = orient2d((v[0].x, v[0].y), (v[1].x, v[1].y), (v[2].x, v[2].y));
        if area2 == 0 {
            return;
        }
        if area2 < 0 {
            v.swap(1, 2);
            area2 = -area2;
        }

        let min_x = v.iter().map(|p| p.x).min().unwrap_or(0).max(area.left as i64);
        let max_x = v.iter().map(|p| p.x).max().unwrap_or(0).min(area.right as i64);
        let min_y = v.iter().map(|p| p.y).min().unwrap_or(0).max(area.top as i64);
        let max_y = v.iter().map(|p| p.y).max().unwrap_or(0).min(area.bottom as i64);

        let bias = [
            edge_bias(&v[1], &v[2]),
            edge_bias(&v[2], &v[0]),
            edge_bias(&v[0], &v[1]),
        ];
        let flat = v[0].color;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x, y);
                let w0 = orient2d((v[1].x, v[1].y), (v[2].x, v[2].y), p);
                let w1 = orient2d((v[2].x, v[2].y), (v[0].x, v[0].y), p);
                let w2 = orient2d((v[0].x, v[0].y), (v[1].x, v[1].y), p);

                if w0 + bias[0] < 0 || w1 + bias[1] < 0 || w2 + bias[2] < 0 {
                    continue;
                }

                let interpolate = |a: i64, b: i64, c: i64| (w0 * a + w1 * b + w2 * c) / area2;

                let rgb = if shaded {
                    let mut channels = [0i64; 3];
                    for (i, channel) in channels.iter_mut().enumerate() {
                        *channel =
                            interpolate(v[0].color[i], v[1].color[i], v[2].color[i]).clamp(0, 255);
                    }
                    channels
                } else {
                    flat
                };
                let base = (rgb[0] as u32) | ((rgb[1] as u32) << 8) | ((rgb[2] as u32) << 16);

                let sample = texture.map(|tex| {
                    let u = interpolate(v[0].u, v[1].u, v[2].u);
                    let t = interpolate(v[0].v, v[1].v, v[2].v);
                    (tex, (u as u32) & 0xFF, (t as u32) & 0xFF)
                });

                self.shade(x as i32, y as i32, base, sample, semi_transparent);
            }
        }
    }
}
