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

//! GP0 rectangle commands (0x60-0x7F)
//!
//! # Command Format
//!
//! ```text
//! Word 0: color+cmd
//! Word 1: vertex (top-left)
//! Word 2: UV + CLUT           (textured only)
//! Word 3: height<<16 | width  (variable size only)
//!
//! bits 3-4 of the opcode: 0=variable, 1=1×1, 2=8×8, 3=16×16
//! bit 2 textured, bit 1 semi-transparent, bit 0 raw texture
//! ```

use super::super::primitives::{RectTexture, Rectangle};
use super::super::queue::GpuJob;
use super::super::types::{Clut, Color, TexCoord, Vertex};
use crate::core::error::Result;

pub(super) fn build_rectangle(words: &[u32]) -> Result<GpuJob> {
    let opcode = words[0] >> 24;
    let textured = opcode & 0x04 != 0;

    let mut cursor = 2;
    let texture = if textured {
        let uv = words[cursor];
        cursor += 1;
        Some(RectTexture {
            texcoord: TexCoord::from_u32(uv),
            clut: Clut::from_u32(uv),
            raw: opcode & 0x01 != 0,
        })
    } else {
        None
    };

    let (width, height) = match (opcode >> 3) & 3 {
        0 => {
            let size = words[cursor];
            (size & 0x3FF, (size >> 16) & 0x1FF)
        }
        1 => (1, 1),
        2 => (8, 8),
        _ => (16, 16),
    };

    Ok(GpuJob::Rectangle(Rectangle {
        position: Vertex::from_u32(words[1]),
        width,
        height,
        color: Color::from_u32(words[0]),
        texture,
        semi_transparent: opcode & 0x02 != 0,
    }))
}
