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

//! GP1 command dispatcher
//!
//! GP1 commands take effect immediately, bypassing the GP0 queue. The high
//! byte selects the command:
//!
//! | Command | Effect |
//! |---------|--------|
//! | 00      | Reset GPU |
//! | 01      | Reset command buffer |
//! | 02      | Acknowledge IRQ1 |
//! | 03      | Display enable |
//! | 04      | DMA direction |
//! | 05      | Display start (VRAM) |
//! | 06/07   | Horizontal/vertical display range |
//! | 08      | Display mode |
//! | 09      | Allow texture disable |
//! | 10-1F   | GPU info into GPUREAD |

mod control;
mod display;

use super::GPU;
use crate::core::error::{GpuError, Result};

impl GPU {
    /// Write the GP1 port
    ///
    /// # Errors
    ///
    /// `UnknownGp1Command` for 0x0A-0x0F and 0x20-0xFF.
    pub fn write_gp1(&mut self, value: u32) -> Result<()> {
        let command = (value >> 24) as u8;
        log::debug!("GP1(0x{:02X}) 0x{:06X}", command, value & 0x00FF_FFFF);

        match command {
            0x00 => self.gp1_reset_gpu(),
            0x01 => self.gp1_reset_command_buffer(),
            0x02 => self.gp1_acknowledge_interrupt(),
            0x03 => self.gp1_display_enable(value),
            0x04 => self.gp1_dma_direction(value),
            0x05 => self.gp1_display_area_start(value),
            0x06 => self.gp1_horizontal_display_range(value),
            0x07 => self.gp1_vertical_display_range(value),
            0x08 => self.gp1_display_mode(value),
            0x09 => self.gp1_allow_texture_disable(value),
            0x10..=0x1F => self.gp1_get_gpu_info(value),
            _ => return Err(GpuError::UnknownGp1Command { command, word: value }.into()),
        }

        self.refresh_dma_request();
        Ok(())
    }
}
