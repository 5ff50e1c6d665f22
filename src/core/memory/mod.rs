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

//! Main RAM and the global memory lock
//!
//! Only what the GPU's DMA side touches lives here: the 2MB main RAM that DMA
//! reads command lists from, and the lock that serializes multi-word VRAM
//! copies against DMA block staging.
//!
//! # Memory Map
//!
//! | Physical Address Range | Region | Size | Access |
//! |------------------------|--------|------|--------|
//! | 0x00000000-0x001FFFFF  | RAM    | 2MB  | R/W    |
//!
//! # Example
//!
//! ```
//! use psrx_gpu::core::memory::Ram;
//!
//! let mut ram = Ram::new();
//! ram.write_u32(0x0000_1000, 0x1234_5678);
//!
//! // Addresses mirror every 2MB and are forced to word alignment
//! assert_eq!(ram.read_u32(0x0020_1002), 0x1234_5678);
//! ```

mod io_device;

pub use io_device::IODevice;

use std::sync::{Arc, Mutex};

/// Lock held for the duration of multi-word VRAM copies and DMA block staging
pub type MemoryLock = Arc<Mutex<()>>;

/// Create a fresh, unshared memory lock
pub fn new_memory_lock() -> MemoryLock {
    Arc::new(Mutex::new(()))
}

/// 2MB of main RAM, little-endian
pub struct Ram {
    data: Vec<u8>,
}

impl Ram {
    /// RAM size in bytes
    pub const SIZE: usize = 2 * 1024 * 1024;

    /// Word address mask: 2MB mirror, 4-byte aligned
    pub const ADDRESS_MASK: u32 = 0x001F_FFFC;

    /// Create zero-filled RAM
    pub fn new() -> Self {
        Self {
            data: vec![0; Self::SIZE],
        }
    }

    /// Read a 32-bit word
    #[inline(always)]
    pub fn read_u32(&self, addr: u32) -> u32 {
        let offset = (addr & Self::ADDRESS_MASK) as usize;
        u32::from_le_bytes([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ])
    }

    /// Write a 32-bit word
    #[inline(always)]
    pub fn write_u32(&mut self, addr: u32, value: u32) {
        let offset = (addr & Self::ADDRESS_MASK) as usize;
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_layout() {
        let mut ram = Ram::new();
        ram.write_u32(0x100, 0x1122_3344);
        assert_eq!(ram.data[0x100], 0x44);
        assert_eq!(ram.data[0x103], 0x11);
    }

    #[test]
    fn test_address_masking() {
        let mut ram = Ram::new();
        ram.write_u32(0x001F_FFFF, 0xDEAD_BEEF);
        assert_eq!(ram.read_u32(0x001F_FFFC), 0xDEAD_BEEF);
        assert_eq!(ram.read_u32(0x803F_FFFC), 0xDEAD_BEEF);
    }

    #[test]
    fn test_memory_lock_is_shared() {
        let lock = new_memory_lock();
        let other = Arc::clone(&lock);
        let _guard = lock.lock().unwrap();
        assert!(other.try_lock().is_err());
    }
}
