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

//! GP1 control commands
//!
//! Implements GPU control operations including reset, interrupt, DMA and the
//! GPU info readback.

use super::super::queue::RenderJob;
use super::super::registers::{
    DisplayGeometry, DmaDirection, DrawOffset, DrawingArea, GPUStatus, StatusFlags, TextureWindow,
};
use super::super::GPU;

/// Value returned by GP1(0x10) index 7
const GPU_VERSION: u32 = 2;

impl GPU {
    /// GP1(0x00): Reset GPU
    ///
    /// Drops pending commands and restores Status, display geometry and the
    /// drawing environment to their power-on values. VRAM is preserved.
    pub(in crate::core::gpu) fn gp1_reset_gpu(&mut self) {
        self.gp1_reset_command_buffer();

        self.status = GPUStatus::after_reset();
        self.display = DisplayGeometry::default();
        self.draw_area = DrawingArea::default();
        self.draw_offset = DrawOffset::default();
        self.texture_window = TextureWindow::default();
        self.rect_flip_x = false;
        self.rect_flip_y = false;
        self.texture_disable_allowed = false;
        self.gpuread.clear();

        self.queue.push_render(RenderJob::ResizeSurface);
        log::debug!("GPU reset");
    }

    /// GP1(0x01): Reset Command Buffer
    ///
    /// Clears the job queue and any partially received GP0 command, including
    /// an image load in progress.
    pub(in crate::core::gpu) fn gp1_reset_command_buffer(&mut self) {
        self.queue.clear();
        self.decoder.reset();
        self.status.flags.insert(StatusFlags::READY_CMD);
    }

    /// GP1(0x02): Acknowledge GPU Interrupt
    pub(in crate::core::gpu) fn gp1_acknowledge_interrupt(&mut self) {
        self.status.flags.remove(StatusFlags::IRQ);
    }

    /// GP1(0x04): DMA Direction
    ///
    /// # Arguments
    ///
    /// * `value` - Bits 0-1: Direction (0=Off, 1=FIFO, 2=CPUtoGP0, 3=GPUREADtoCPU)
    pub(in crate::core::gpu) fn gp1_dma_direction(&mut self, value: u32) {
        self.status.dma_direction = DmaDirection::from_bits(value);
        log::debug!("DMA direction: {:?}", self.status.dma_direction);
    }

    /// GP1(0x09): Allow Texture Disable
    ///
    /// Gates GP0(0xE1) bit 11.
    pub(in crate::core::gpu) fn gp1_allow_texture_disable(&mut self, value: u32) {
        self.texture_disable_allowed = value & 1 != 0;
    }

    /// GP1(0x10-0x1F): GPU Info
    ///
    /// Latches internal state into GPUREAD. Only the low 3 bits select the
    /// item:
    ///
    /// - 2: Texture window settings
    /// - 3: Draw area top left
    /// - 4: Draw area bottom right
    /// - 5: Draw offset
    /// - 7: GPU version
    ///
    /// Any other index leaves the previous GPUREAD value in place.
    pub(in crate::core::gpu) fn gp1_get_gpu_info(&mut self, value: u32) {
        let index = value & 7;
        let info = match index {
            2 => self.texture_window.word(),
            3 => self.draw_area.top_left_word(),
            4 => self.draw_area.bottom_right_word(),
            5 => self.draw_offset.word(),
            7 => GPU_VERSION,
            _ => {
                log::warn!("GPU info index {} has no data, GPUREAD unchanged", index);
                return;
            }
        };

        self.gpuread_latch = info;
    }
}
