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

//! GP1 display configuration commands
//!
//! Implements display settings including resolution, area, and video mode.

use super::super::queue::RenderJob;
use super::super::registers::StatusFlags;
use super::super::GPU;

impl GPU {
    /// GP1(0x03): Display Enable
    ///
    /// # Arguments
    ///
    /// * `value` - Bit 0: 0=Enable, 1=Disable (inverted logic)
    pub(in crate::core::gpu) fn gp1_display_enable(&mut self, value: u32) {
        let disabled = value & 1 != 0;
        self.status.flags.set(StatusFlags::DISPLAY_DISABLED, disabled);

        log::debug!("Display {}", if disabled { "disabled" } else { "enabled" });
    }

    /// GP1(0x05): Start of Display Area
    ///
    /// # Arguments
    ///
    /// * `value` - Bits 0-9: X coordinate, Bits 10-18: Y coordinate
    pub(in crate::core::gpu) fn gp1_display_area_start(&mut self, value: u32) {
        self.display.start_x = value & 0x3FF;
        self.display.start_y = (value >> 10) & 0x1FF;

        log::debug!(
            "Display area start: ({}, {})",
            self.display.start_x,
            self.display.start_y
        );
    }

    /// GP1(0x06): Horizontal Display Range
    ///
    /// # Arguments
    ///
    /// * `value` - Bits 0-11: X1 start, Bits 12-23: X2 end (GPU dots)
    pub(in crate::core::gpu) fn gp1_horizontal_display_range(&mut self, value: u32) {
        self.display.h_start = value & 0xFFF;
        self.display.h_end = (value >> 12) & 0xFFF;

        log::debug!(
            "Horizontal display range: {} to {}",
            self.display.h_start,
            self.display.h_end
        );
    }

    /// GP1(0x07): Vertical Display Range
    ///
    /// # Arguments
    ///
    /// * `value` - Bits 0-9: Y1 start, Bits 10-19: Y2 end (scanlines)
    pub(in crate::core::gpu) fn gp1_vertical_display_range(&mut self, value: u32) {
        self.display.v_start = value & 0x3FF;
        self.display.v_end = (value >> 10) & 0x3FF;

        log::debug!(
            "Vertical display range: {} to {}",
            self.display.v_start,
            self.display.v_end
        );
    }

    /// GP1(0x08): Display Mode
    ///
    /// # Arguments
    ///
    /// * `value` - Display mode configuration bits:
    ///   - Bits 0-1: Horizontal resolution 1
    ///   - Bit 2: Vertical resolution (0=240, 1=480)
    ///   - Bit 3: Video mode (0=NTSC, 1=PAL)
    ///   - Bit 4: Color depth (0=15bit, 1=24bit)
    ///   - Bit 5: Interlace (0=Off, 1=On)
    ///   - Bit 6: Horizontal resolution 2
    ///   - Bit 7: Reverse flag
    ///
    /// The presentation surface follows the new resolution; resizing it is
    /// queued for the render thread.
    pub(in crate::core::gpu) fn gp1_display_mode(&mut self, value: u32) {
        let bit = |n: u32| (value >> n) & 1 != 0;

        self.status.horizontal_res_1 = (value & 3) as u8;
        self.status.flags.set(StatusFlags::VERTICAL_RES, bit(2));
        self.status.flags.set(StatusFlags::VIDEO_MODE_PAL, bit(3));
        self.status.flags.set(StatusFlags::DISPLAY_DEPTH_24, bit(4));
        self.status.flags.set(StatusFlags::VERTICAL_INTERLACE, bit(5));
        self.status.flags.set(StatusFlags::HORIZONTAL_RES_2, bit(6));
        self.status.flags.set(StatusFlags::REVERSE_FLAG, bit(7));

        log::debug!(
            "Display mode: {:?} {:?} {:?} resolution={:?}",
            self.status.vertical_res(),
            self.status.video_mode(),
            self.status.display_depth(),
            self.status.display_resolution()
        );

        self.queue.push_render(RenderJob::ResizeSurface);
    }
}
