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

//! Memory-mapped register seam
//!
//! Peripherals expose their registers to the CPU bus through [`IODevice`].
//! The bus (an external collaborator here) translates a physical address to
//! a device-relative offset and calls the trait methods.
//!
//! ```text
//!   CPU bus ──► contains(addr)? ──► read_register(addr - base)
//!                                   write_register(addr - base, value)
//! ```
//!
//! Reads take `&mut self`: some registers have read side effects (GPUREAD
//! pops the VRAM readback FIFO).

use crate::core::error::Result;

/// Trait for memory-mapped I/O devices
///
/// Devices implement the 32-bit accessors. The narrower accessors default to
/// read-modify-write on the containing word; devices that only accept full
/// words override them to fail.
pub trait IODevice {
    /// Inclusive `(start, end)` physical address range
    fn address_range(&self) -> (u32, u32);

    /// Whether `addr` falls inside this device
    fn contains(&self, addr: u32) -> bool {
        let (start, end) = self.address_range();
        addr >= start && addr <= end
    }

    /// Read a 32-bit register at a device-relative offset
    fn read_register(&mut self, offset: u32) -> Result<u32>;

    /// Write a 32-bit register at a device-relative offset
    fn write_register(&mut self, offset: u32, value: u32) -> Result<()>;

    /// Read a 16-bit half of a register
    fn read_register16(&mut self, offset: u32) -> Result<u16> {
        let value = self.read_register(offset & !0x03)?;
        let shift = (offset & 0x02) * 8;
        Ok((value >> shift) as u16)
    }

    /// Write a 16-bit half of a register
    fn write_register16(&mut self, offset: u32, value: u16) -> Result<()> {
        let aligned = offset & !0x03;
        let shift = (offset & 0x02) * 8;
        let current = self.read_register(aligned)?;
        let merged = (current & !(0xFFFF << shift)) | ((value as u32) << shift);
        self.write_register(aligned, merged)
    }

    /// Read one byte of a register
    fn read_register8(&mut self, offset: u32) -> Result<u8> {
        let value = self.read_register(offset & !0x03)?;
        let shift = (offset & 0x03) * 8;
        Ok((value >> shift) as u8)
    }

    /// Write one byte of a register
    fn write_register8(&mut self, offset: u32, value: u8) -> Result<()> {
        let aligned = offset & !0x03;
        let shift = (offset & 0x03) * 8;
        let current = self.read_register(aligned)?;
        let merged = (current & !(0xFF << shift)) | ((value as u32) << shift);
        self.write_register(aligned, merged)
    }

    /// Device name for logging
    fn name(&self) -> &str {
        "Unknown Device"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EmulatorError;

    /// Latch device with a read counter, to observe read side effects
    struct LatchDevice {
        base: u32,
        latch: [u32; 2],
        reads: usize,
    }

    impl IODevice for LatchDevice {
        fn address_range(&self) -> (u32, u32) {
            (self.base, self.base + 7)
        }

        fn read_register(&mut self, offset: u32) -> Result<u32> {
            self.reads += 1;
            self.latch
                .get((offset / 4) as usize)
                .copied()
                .ok_or(EmulatorError::InvalidMemoryAccess {
                    address: self.base + offset,
                })
        }

        fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
            match self.latch.get_mut((offset / 4) as usize) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(EmulatorError::InvalidMemoryAccess {
                    address: self.base + offset,
                }),
            }
        }
    }

    fn device() -> LatchDevice {
        LatchDevice {
            base: 0x1F80_1810,
            latch: [0; 2],
            reads: 0,
        }
    }

    #[test]
    fn test_contains() {
        let dev = device();
        assert!(dev.contains(0x1F80_1810));
        assert!(dev.contains(0x1F80_1817));
        assert!(!dev.contains(0x1F80_1818));
        assert_eq!(dev.name(), "Unknown Device");
    }

    #[test]
    fn test_narrow_writes_merge() {
        let mut dev = device();
        dev.write_register(4, 0xAABB_CCDD).unwrap();
        dev.write_register16(6, 0x1234).unwrap();
        dev.write_register8(4, 0x56).unwrap();

        assert_eq!(dev.read_register(4).unwrap(), 0x1234_CC56);
        assert_eq!(dev.read_register16(4).unwrap(), 0xCC56);
        assert_eq!(dev.read_register8(7).unwrap(), 0x12);
    }

    #[test]
    fn test_reads_go_through_mut_accessor() {
        let mut dev = device();
        dev.read_register(0).unwrap();
        dev.read_register8(1).unwrap();
        assert_eq!(dev.reads, 2);
    }

    #[test]
    fn test_out_of_range() {
        let mut dev = device();
        assert!(dev.read_register(8).is_err());
        assert!(dev.write_register(8, 0).is_err());
    }
}
