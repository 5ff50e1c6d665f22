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

//! Line rendering implementation
//!
//! Bresenham stepping between the two endpoints, with the color
//! interpolated over the step index.

use super::super::primitives::Line;
use super::super::GPU;

impl GPU {
    /// Execute a line job
    ///
    /// Lines spanning more than 1023 pixels horizontally or 511 vertically
    /// are dropped, as on hardware.
    pub(in crate::core::gpu) fn draw_line(&mut self, line: &Line) {
        let start = line.start.offset(self.draw_offset.x, self.draw_offset.y);
        let end = line.end.offset(self.draw_offset.x, self.draw_offset.y);

        let dx = end.x - start.x;
        let dy = end.y - start.y;
        if dx.abs() > 0x3FF || dy.abs() > 0x1FF {
            log::trace!("Line rejected: ({}, {}) span too large", dx, dy);
            return;
        }

        log::trace!(
            "Line: ({}, {}) -> ({}, {}) semi={}",
            start.x,
            start.y,
            end.x,
            end.y,
            line.semi_transparent
        );

        let c0 = line.start_color.channels();
        let c1 = line.end_color.channels();
        let steps = dx.abs().max(dy.abs()) as i64;

        let sx = if dx >= 0 { 1 } else { -1 };
        let sy = if dy >= 0 { 1 } else { -1 };
        let (adx, ady) = (dx.abs(), -dy.abs());
        let mut err = adx + ady;
        let (mut x, mut y) = (start.x, start.y);

        for step in 0..=steps {
            if self.draw_area.contains(x, y) {
                let mut color = 0u32;
                for (i, shift) in [0, 8, 16].into_iter().enumerate() {
                    let channel = if steps == 0 {
                        c0[i]
                    } else {
                        c0[i] + (c1[i] - c0[i]) * step / steps
                    };
                    color |= (channel as u32) << shift;
                }
                self.shade(x, y, color, None, line.semi_transparent);
            }

            let e2 = 2 * err;
            if e2 >= ady {
                err += ady;
                x += sx;
            }
            if e2 <= adx {
                err += adx;
                y += sy;
            }
        }
    }
}
