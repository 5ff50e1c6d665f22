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

//! GP0 line commands (0x40-0x5F)
//!
//! ```text
//! flat:    color+cmd, vertex0, vertex1
//! shaded:  color0+cmd, vertex0, color1, vertex1
//! ```
//!
//! Polylines (bit 3) are terminated by a marker word rather than a fixed
//! count and are not supported.

use super::super::primitives::Line;
use super::super::queue::GpuJob;
use super::super::types::{Color, Vertex};
use crate::core::error::{GpuError, Result};

/// Build a single-segment line job
pub(super) fn build_line(words: &[u32]) -> Result<GpuJob> {
    let opcode = words[0] >> 24;
    let shaded = opcode & 0x10 != 0;

    let start_color = Color::from_u32(words[0]);
    let (end_color, end) = if shaded {
        (Color::from_u32(words[2]), words[3])
    } else {
        (start_color, words[2])
    };

    Ok(GpuJob::Line(Line {
        start: Vertex::from_u32(words[1]),
        end: Vertex::from_u32(end),
        start_color,
        end_color,
        semi_transparent: opcode & 0x02 != 0,
    }))
}

/// Polyline opcodes fail on their first word
pub(super) fn build_polyline(words: &[u32]) -> Result<GpuJob> {
    Err(GpuError::Unsupported(format!("polyline GP0(0x{:02X})", words[0] >> 24)).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EmulatorError;

    #[test]
    fn test_flat_line() {
        let job = build_line(&[0x4200_8040, 0x0002_0001, 0x0004_0003]).unwrap();
        let GpuJob::Line(line) = job else {
            panic!("expected line");
        };
        assert!(line.semi_transparent);
        assert_eq!(line.start, Vertex { x: 1, y: 2 });
        assert_eq!(line.end, Vertex { x: 3, y: 4 });
        assert_eq!(line.start_color, line.end_color);
    }

    #[test]
    fn test_shaded_line() {
        let job = build_line(&[0x5000_00FF, 0, 0x00FF_0000, 0x0000_0010]).unwrap();
        let GpuJob::Line(line) = job else {
            panic!("expected line");
        };
        assert_eq!(line.start_color.r, 0xFF);
        assert_eq!(line.end_color.b, 0xFF);
        assert_eq!(line.end.x, 16);
    }

    #[test]
    fn test_polyline_unsupported() {
        let err = build_polyline(&[0x4800_0000]).unwrap_err();
        assert!(matches!(err, EmulatorError::Gpu(GpuError::Unsupported(_))));
    }
}
