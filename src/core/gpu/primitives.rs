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

//! Decoded primitive payloads
//!
//! The GP0 builders turn raw command words into these structures; the
//! executor hands them to the rasterizer. Everything here is plain data: no
//! drawing state (offset, drawing area, semi-transparency formula) is baked in,
//! because those are read from the GPU at execution time.

use super::types::{Clut, Color, TexCoord, TexPage, Vertex};

/// One polygon corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolygonVertex {
    pub position: Vertex,
    pub color: Color,
    pub texcoord: TexCoord,
}

/// Texture reference of a textured polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureMapping {
    /// CLUT location (unused for 15-bit pages)
    pub clut: Clut,

    /// Decoded texture page
    pub page: TexPage,

    /// Raw texpage attribute, mirrored into GPUSTAT when the polygon runs
    pub page_attribute: u32,

    /// Raw texture: texel written as-is instead of modulated by vertex color
    pub raw: bool,
}

/// Triangle or quadrilateral (GP0 0x20-0x3F)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    /// Corners; only the first `vertex_count` are meaningful
    pub vertices: [PolygonVertex; 4],

    /// 3 or 4
    pub vertex_count: usize,

    /// Gouraud shading (per-vertex color)
    pub shaded: bool,

    /// Texture reference, if textured
    pub texture: Option<TextureMapping>,

    pub semi_transparent: bool,
}

impl Polygon {
    /// Whether the primitive is a quadrilateral
    pub fn is_quad(&self) -> bool {
        self.vertex_count == 4
    }
}

/// Single line segment (GP0 0x40-0x5F without the polyline bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub start: Vertex,
    pub end: Vertex,
    pub start_color: Color,
    pub end_color: Color,
    pub semi_transparent: bool,
}

/// Texture reference of a textured rectangle
///
/// Rectangles have no page of their own; the page in GPUSTAT at execution
/// time is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectTexture {
    pub texcoord: TexCoord,
    pub clut: Clut,
    pub raw: bool,
}

/// Rectangle / sprite (GP0 0x60-0x7F)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    /// Top-left corner, before the draw offset is applied
    pub position: Vertex,
    pub width: u32,
    pub height: u32,
    pub color: Color,
    pub texture: Option<RectTexture>,
    pub semi_transparent: bool,
}

/// Fill rectangle (GP0 0x02)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillRect {
    pub color: Color,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// VRAM rectangle used by the copy commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VramRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl VramRect {
    /// Decode from a position word and a size word
    ///
    /// Sizes of zero wrap to the maximum: `((n - 1) & mask) + 1`.
    pub fn from_words(position: u32, size: u32) -> Self {
        let width = size & 0xFFFF;
        let height = size >> 16;
        Self {
            x: position & 0x3FF,
            y: (position >> 16) & 0x1FF,
            width: (width.wrapping_sub(1) & 0x3FF) + 1,
            height: (height.wrapping_sub(1) & 0x1FF) + 1,
        }
    }

    /// Number of pixels covered
    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Number of 32-bit words needed to carry the pixels (two per word)
    pub fn word_count(&self) -> usize {
        self.pixel_count().div_ceil(2)
    }
}

/// VRAM to VRAM copy (GP0 0x80)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VramCopy {
    pub src_x: u32,
    pub src_y: u32,
    pub dst_x: u32,
    pub dst_y: u32,
    pub width: u32,
    pub height: u32,
}

/// CPU to VRAM image load (GP0 0xA0) with its collected payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLoad {
    pub rect: VramRect,

    /// Pixel pairs, low half first
    pub data: Vec<u32>,
}
