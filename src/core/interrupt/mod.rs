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

//! Interrupt controller
//!
//! The GPU core raises two lines: VBLANK on every display tick and GPU (IRQ1)
//! while GPUSTAT bit 24 is set. The DMA line is raised when a GPU transfer
//! completes.
//!
//! ## Registers
//!
//! - **I_STAT** (0x1F801070): pending sources. Writing acknowledges: every
//!   bit written as 0 is cleared, bits written as 1 are kept.
//! - **I_MASK** (0x1F801074): 1 = source may reach the CPU.
//!
//! ## References
//!
//! - [PSX-SPX: Interrupt Control](http://problemkaputt.de/psx-spx.htm#interruptcontrol)

use crate::core::error::{EmulatorError, Result};
use crate::core::memory::IODevice;

/// Interrupt source bits raised by this crate
pub mod interrupts {
    /// Vertical blank (bit 0)
    pub const VBLANK: u16 = 1 << 0;

    /// GPU IRQ1, GP0(0x1F) (bit 1)
    pub const GPU: u16 = 1 << 1;

    /// DMA transfer complete (bit 3)
    pub const DMA: u16 = 1 << 3;
}

/// I_STAT / I_MASK pair
///
/// # Example
///
/// ```
/// use psrx_gpu::core::interrupt::{interrupts, InterruptController};
///
/// let mut ic = InterruptController::new();
/// ic.request(interrupts::VBLANK);
/// assert!(!ic.is_pending());
///
/// ic.write_mask(interrupts::VBLANK as u32);
/// assert!(ic.is_pending());
///
/// // Write 0 to the VBLANK bit to acknowledge it
/// ic.write_status(!(interrupts::VBLANK as u32));
/// assert!(!ic.is_pending());
/// ```
#[derive(Debug, Default)]
pub struct InterruptController {
    status: u16,
    mask: u16,
}

impl InterruptController {
    /// All sources cleared and masked
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise one or more sources
    pub fn request(&mut self, interrupt: u16) {
        self.status |= interrupt;
        log::trace!(
            "IRQ requested: 0x{:04X}, status=0x{:04X}",
            interrupt,
            self.status
        );
    }

    /// Clear the given sources
    pub fn acknowledge(&mut self, interrupt: u16) {
        self.status &= !interrupt;
        log::trace!("IRQ acknowledged, status=0x{:04X}", self.status);
    }

    /// Whether any unmasked source is pending
    pub fn is_pending(&self) -> bool {
        self.status & self.mask != 0
    }

    pub fn read_status(&self) -> u32 {
        self.status as u32
    }

    /// I_STAT write: keeps only the bits written as 1
    pub fn write_status(&mut self, value: u32) {
        self.status &= value as u16;
    }

    pub fn read_mask(&self) -> u32 {
        self.mask as u32
    }

    pub fn write_mask(&mut self, value: u32) {
        self.mask = value as u16;
        log::debug!("IRQ mask set: 0x{:04X}", self.mask);
    }
}

impl IODevice for InterruptController {
    fn address_range(&self) -> (u32, u32) {
        (0x1F80_1070, 0x1F80_1077)
    }

    fn read_register(&mut self, offset: u32) -> Result<u32> {
        match offset {
            0 => Ok(self.read_status()),
            4 => Ok(self.read_mask()),
            _ => Err(EmulatorError::InvalidMemoryAccess {
                address: 0x1F80_1070 + offset,
            }),
        }
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        match offset {
            0 => self.write_status(value),
            4 => self.write_mask(value),
            _ => {
                return Err(EmulatorError::InvalidMemoryAccess {
                    address: 0x1F80_1070 + offset,
                })
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Interrupt Controller"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accumulates() {
        let mut ic = InterruptController::new();
        ic.request(interrupts::VBLANK);
        ic.request(interrupts::GPU);
        assert_eq!(
            ic.read_status(),
            (interrupts::VBLANK | interrupts::GPU) as u32
        );
    }

    #[test]
    fn test_masking() {
        let mut ic = InterruptController::new();
        ic.request(interrupts::GPU);
        ic.write_mask(interrupts::VBLANK as u32);
        assert!(!ic.is_pending());

        ic.write_mask(interrupts::GPU as u32);
        assert!(ic.is_pending());
    }

    #[test]
    fn test_write_zero_acknowledges() {
        let mut ic = InterruptController::new();
        ic.request(interrupts::VBLANK | interrupts::GPU | interrupts::DMA);

        // Clear only GPU
        ic.write_status(!(interrupts::GPU as u32));
        assert_eq!(
            ic.read_status(),
            (interrupts::VBLANK | interrupts::DMA) as u32
        );

        ic.acknowledge(interrupts::VBLANK);
        assert_eq!(ic.read_status(), interrupts::DMA as u32);
    }

    #[test]
    fn test_register_access() {
        let mut ic = InterruptController::new();
        ic.write_register(4, 0x0003).unwrap();
        ic.request(interrupts::VBLANK);

        assert_eq!(ic.read_register(0).unwrap(), 1);
        assert_eq!(ic.read_register(4).unwrap(), 3);
        assert!(ic.read_register(8).is_err());
    }
}
