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

//! DMA (Direct Memory Access) interface of the GPU
//!
//! Only the two GPU-facing channels are modelled:
//!
//! | Channel | Device | Base Address |
//! |---------|--------|--------------|
//! | 2       | GPU    | 0x1F8010A0   |
//! | 6       | OTC    | 0x1F8010E0   |
//!
//! plus the global DPCR (0x1F8010F0) and DICR (0x1F8010F4) registers.
//!
//! # Channel Registers
//!
//! Each channel has three 32-bit registers:
//! - **MADR** (+0x00): Memory address register
//! - **BCR** (+0x04): Block control register
//! - **CHCR** (+0x08): Channel control register
//!
//! # GPU Transfer Modes
//!
//! - **Mode 0** (Manual): BCR bits 0-15 words at once, started by the trigger bit
//! - **Mode 1** (Sync to requests): BCR size × count, block by block
//! - **Mode 2** (Linked list): `(count << 24) | next` headers, ending at
//!   `next == 0xFFFFFF`
//!
//! Every block is staged from RAM with the memory lock held, then fed to GP0
//! and drained before the next block is staged.
//!
//! # References
//!
//! - [PSX-SPX: DMA Controller](http://problemkaputt.de/psx-spx.htm#dmacontroller)

use std::sync::PoisonError;

use crate::core::error::{EmulatorError, GpuError, Result};
use crate::core::gpu::GPU;
use crate::core::interrupt::{interrupts, InterruptController};
use crate::core::memory::{new_memory_lock, IODevice, MemoryLock, Ram};

#[cfg(test)]
mod tests;

/// CHCR bit 24: start/busy
const CHCR_BUSY: u32 = 0x0100_0000;

/// CHCR bit 28: manual trigger
const CHCR_TRIGGER: u32 = 0x1000_0000;

/// Bits of OTC CHCR that software may change
const OTC_WRITABLE: u32 = 0x5100_0000;

/// OTC CHCR bit 1 always reads as set (backward step)
const OTC_FIXED: u32 = 0x0000_0002;

/// Linked-list terminator
pub const END_OF_LIST: u32 = 0x00FF_FFFF;

/// Single DMA channel
#[derive(Debug, Clone, Default)]
pub struct DMAChannel {
    /// Memory Address Register (MADR)
    base_address: u32,

    /// Block Control Register (BCR)
    ///
    /// - Bits 0-15: Block size (words)
    /// - Bits 16-31: Block count
    block_control: u32,

    /// Channel Control Register (CHCR)
    ///
    /// - Bit 0: Direction (0=to RAM, 1=from RAM)
    /// - Bit 1: Address step (0=forward, 1=backward)
    /// - Bits 9-10: Sync mode (0=manual, 1=sync to requests, 2=linked-list)
    /// - Bit 24: Start/busy flag
    /// - Bit 28: Manual trigger
    channel_control: u32,
}

impl DMAChannel {
    /// Direction: Device to RAM
    const TRANSFER_TO_RAM: u32 = 0;

    /// Check if channel is active (bit 24 of CHCR)
    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.channel_control & CHCR_BUSY != 0
    }

    /// Get transfer direction (bit 0 of CHCR)
    #[inline(always)]
    pub fn direction(&self) -> u32 {
        self.channel_control & 1
    }

    /// Get synchronization mode (bits 9-10 of CHCR)
    #[inline(always)]
    pub fn sync_mode(&self) -> u32 {
        (self.channel_control >> 9) & 3
    }

    /// Check if manual trigger is set (bit 28 of CHCR)
    #[inline(always)]
    pub fn trigger(&self) -> bool {
        self.channel_control & CHCR_TRIGGER != 0
    }

    /// Whether the channel should run now
    ///
    /// Manual mode needs the trigger bit on top of busy.
    fn ready(&self) -> bool {
        self.is_active() && (self.sync_mode() != 0 || self.trigger())
    }

    /// BCR bits 0-15, where 0 means 0x10000
    fn block_size(&self) -> u32 {
        match self.block_control & 0xFFFF {
            0 => 0x1_0000,
            n => n,
        }
    }

    fn block_count(&self) -> u32 {
        self.block_control >> 16
    }

    /// Clear busy and trigger
    fn deactivate(&mut self) {
        self.channel_control &= !(CHCR_BUSY | CHCR_TRIGGER);
    }
}

/// OTC channel registers, as captured by save states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OtcRegisters {
    pub madr: u32,
    pub bcr: u32,
    pub chcr: u32,
}

/// GPU-facing DMA controller
///
/// # Examples
///
/// ```
/// use psrx_gpu::core::dma::DMA;
///
/// let dma = DMA::new();
/// assert_eq!(dma.read_control(), 0x0765_4321);
/// ```
pub struct DMA {
    gpu: DMAChannel,
    otc: DMAChannel,

    /// DMA Control Register (DPCR)
    control: u32,

    /// DMA Interrupt Register (DICR)
    interrupt: u32,

    memory_lock: MemoryLock,
}

impl DMA {
    /// Channel 2: GPU (graphics)
    pub const CH_GPU: usize = 2;

    /// Channel 6: OTC (ordering table clear)
    pub const CH_OTC: usize = 6;

    /// First channel register address (channel 2 MADR)
    pub const BASE_ADDRESS: u32 = 0x1F80_10A0;

    pub fn new() -> Self {
        Self::with_memory_lock(new_memory_lock())
    }

    /// Create a controller sharing an existing memory lock
    pub fn with_memory_lock(memory_lock: MemoryLock) -> Self {
        Self {
            gpu: DMAChannel::default(),
            otc: DMAChannel {
                channel_control: OTC_FIXED,
                ..Default::default()
            },
            control: 0x0765_4321,
            interrupt: 0,
            memory_lock,
        }
    }

    /// The lock serializing block staging against VRAM copies
    pub fn memory_lock(&self) -> MemoryLock {
        MemoryLock::clone(&self.memory_lock)
    }

    fn channel(&self, channel: usize) -> Result<&DMAChannel> {
        match channel {
            Self::CH_GPU => Ok(&self.gpu),
            Self::CH_OTC => Ok(&self.otc),
            _ => Err(GpuError::DmaError(format!("channel {} is not modelled", channel)).into()),
        }
    }

    fn channel_mut(&mut self, channel: usize) -> Result<&mut DMAChannel> {
        match channel {
            Self::CH_GPU => Ok(&mut self.gpu),
            Self::CH_OTC => Ok(&mut self.otc),
            _ => Err(GpuError::DmaError(format!("channel {} is not modelled", channel)).into()),
        }
    }

    /// Run every channel that is ready
    ///
    /// # Errors
    ///
    /// DMA programming errors, and any GP0 decode error hit while feeding
    /// the GPU. The channel is left inactive either way.
    pub fn tick(&mut self, ram: &mut Ram, gpu: &mut GPU, irq: &mut InterruptController) -> Result<()> {
        if self.gpu.ready() {
            let result = self.transfer_gpu(ram, gpu);
            self.gpu.deactivate();
            result?;
            self.complete(Self::CH_GPU, irq);
        }

        if self.otc.ready() {
            self.transfer_otc(ram);
            self.otc.deactivate();
            self.complete(Self::CH_OTC, irq);
        }

        Ok(())
    }

    /// Execute GPU DMA transfer (channel 2)
    fn transfer_gpu(&mut self, ram: &mut Ram, gpu: &mut GPU) -> Result<()> {
        let channel = self.gpu.clone();
        log::debug!(
            "DMA2 transfer: addr=0x{:08X} bcr=0x{:08X} chcr=0x{:08X}",
            channel.base_address,
            channel.block_control,
            channel.channel_control
        );

        match (channel.sync_mode(), channel.direction()) {
            (0, _) => {
                let end = self.transfer_block(ram, gpu, channel.base_address, channel.block_size(), &channel)?;
                self.gpu.base_address = end;
            }
            (1, _) => {
                let mut addr = channel.base_address;
                for _ in 0..channel.block_count() {
                    addr = self.transfer_block(ram, gpu, addr, channel.block_size(), &channel)?;
                }
                self.gpu.base_address = addr;
            }
            (2, DMAChannel::TRANSFER_TO_RAM) => {
                return Err(GpuError::DmaError("linked list transfer towards RAM".into()).into());
            }
            (2, _) => self.transfer_linked_list(ram, gpu, channel.base_address)?,
            (mode, _) => {
                return Err(GpuError::Unsupported(format!("DMA sync mode {}", mode)).into());
            }
        }

        log::debug!("GPU DMA transfer complete");
        Ok(())
    }

    /// Move one block between RAM and the GPU
    ///
    /// # Returns
    ///
    /// The address following the block.
    fn transfer_block(
        &self,
        ram: &mut Ram,
        gpu: &mut GPU,
        addr: u32,
        words: u32,
        channel: &DMAChannel,
    ) -> Result<u32> {
        let step: u32 = if channel.channel_control & 2 != 0 { 4u32.wrapping_neg() } else { 4 };
        let addresses = (0..words).map(|i| addr.wrapping_add(step.wrapping_mul(i)) & Ram::ADDRESS_MASK);

        if channel.direction() == DMAChannel::TRANSFER_TO_RAM {
            let data: Vec<u32> = (0..words).map(|_| gpu.read_gpuread()).collect();
            let _guard = self.memory_lock.lock().unwrap_or_else(PoisonError::into_inner);
            for (at, word) in addresses.zip(data) {
                ram.write_u32(at, word);
            }
        } else {
            let block: Vec<u32> = {
                let _guard = self.memory_lock.lock().unwrap_or_else(PoisonError::into_inner);
                addresses.map(|at| ram.read_u32(at)).collect()
            };
            gpu.write_gp0_block(&block)?;
        }

        Ok(addr.wrapping_add(step.wrapping_mul(words)) & Ram::ADDRESS_MASK)
    }

    /// Chase a GPU command list, one link per staged block
    ///
    /// A list longer than RAM has words must revisit a header, so the chase
    /// stops there with a `DmaError`.
    fn transfer_linked_list(&mut self, ram: &Ram, gpu: &mut GPU, start: u32) -> Result<()> {
        const MAX_LINKS: usize = Ram::SIZE / 4;
        let mut addr = start & Ram::ADDRESS_MASK;

        for _ in 0..MAX_LINKS {
            let (header, payload) = {
                let _guard = self.memory_lock.lock().unwrap_or_else(PoisonError::into_inner);
                let header = ram.read_u32(addr);
                let count = header >> 24;
                let payload: Vec<u32> = (1..=count)
                    .map(|i| ram.read_u32(addr.wrapping_add(i * 4)))
                    .collect();
                (header, payload)
            };

            log::trace!("DMA2 link 0x{:06X}: {} words", addr, payload.len());
            gpu.write_gp0_block(&payload)?;

            let next = header & 0x00FF_FFFF;
            if next & 0x0080_0000 != 0 {
                self.gpu.base_address = END_OF_LIST;
                return Ok(());
            }
            addr = next & Ram::ADDRESS_MASK;
        }

        self.gpu.base_address = addr;
        log::warn!("DMA2 linked list from 0x{:06X} never terminates", start & Ram::ADDRESS_MASK);
        Err(GpuError::DmaError(format!(
            "linked list from 0x{:06X} exceeds {} links",
            start & Ram::ADDRESS_MASK,
            MAX_LINKS
        ))
        .into())
    }

    /// Execute OTC (Ordering Table Clear) transfer (channel 6)
    ///
    /// Writes a reverse-linked empty ordering table: every entry points to
    /// the previous word, the last one holds the terminator.
    fn transfer_otc(&mut self, ram: &mut Ram) {
        let count = self.otc.block_size();
        let mut addr = self.otc.base_address & Ram::ADDRESS_MASK;

        let _guard = self.memory_lock.lock().unwrap_or_else(PoisonError::into_inner);
        for i in 0..count {
            let prev = addr.wrapping_sub(4) & Ram::ADDRESS_MASK;
            let entry = if i == count - 1 { END_OF_LIST } else { prev };
            ram.write_u32(addr, entry);
            addr = prev;
        }

        log::debug!("OTC DMA transfer complete ({} entries)", count);
    }

    /// Flag completion in DICR and raise the DMA interrupt when enabled
    fn complete(&mut self, channel: usize, irq: &mut InterruptController) {
        let enabled = self.interrupt & (1 << (16 + channel)) != 0;
        let master = self.interrupt & (1 << 23) != 0;
        if enabled && master {
            self.interrupt |= 1 << (24 + channel);
            irq.request(interrupts::DMA);
        }
    }

    // Register access methods

    /// Read channel MADR register
    pub fn read_madr(&self, channel: usize) -> Result<u32> {
        Ok(self.channel(channel)?.base_address)
    }

    /// Write channel MADR register
    pub fn write_madr(&mut self, channel: usize, value: u32) -> Result<()> {
        self.channel_mut(channel)?.base_address = value & 0x00FF_FFFF;
        log::trace!("DMA{} MADR = 0x{:08X}", channel, value);
        Ok(())
    }

    /// Read channel BCR register
    pub fn read_bcr(&self, channel: usize) -> Result<u32> {
        Ok(self.channel(channel)?.block_control)
    }

    /// Write channel BCR register
    pub fn write_bcr(&mut self, channel: usize, value: u32) -> Result<()> {
        self.channel_mut(channel)?.block_control = value;
        log::trace!("DMA{} BCR = 0x{:08X}", channel, value);
        Ok(())
    }

    /// Read channel CHCR register
    pub fn read_chcr(&self, channel: usize) -> Result<u32> {
        Ok(self.channel(channel)?.channel_control)
    }

    /// Write channel CHCR register
    ///
    /// # Errors
    ///
    /// `ReadOnlyBit` when an OTC write asserts anything besides bits 24, 28
    /// and 30 (bit 1 reads as set and may be written back as such).
    pub fn write_chcr(&mut self, channel: usize, value: u32) -> Result<()> {
        if channel == Self::CH_OTC {
            if value & !(OTC_WRITABLE | OTC_FIXED) != 0 {
                return Err(GpuError::ReadOnlyBit {
                    register: "OTC CHCR",
                    value,
                }
                .into());
            }
            self.otc.channel_control = (value & OTC_WRITABLE) | OTC_FIXED;
        } else {
            self.channel_mut(channel)?.channel_control = value;
        }

        log::trace!("DMA{} CHCR = 0x{:08X}", channel, value);
        if value & CHCR_BUSY != 0 {
            let ch = self.channel(channel)?;
            log::debug!(
                "DMA{} started: addr=0x{:08X} bcr=0x{:08X} mode={}",
                channel,
                ch.base_address,
                ch.block_control,
                ch.sync_mode()
            );
        }
        Ok(())
    }

    /// Read DMA Control Register (DPCR)
    pub fn read_control(&self) -> u32 {
        self.control
    }

    /// Write DMA Control Register (DPCR)
    pub fn write_control(&mut self, value: u32) {
        self.control = value;
        log::trace!("DPCR = 0x{:08X}", value);
    }

    /// Read DMA Interrupt Register (DICR)
    ///
    /// Bit 31 is computed: force (bit 15) or master enable with any enabled
    /// channel flagged.
    pub fn read_interrupt(&self) -> u32 {
        let flags = (self.interrupt >> 24) & 0x7F;
        let enables = (self.interrupt >> 16) & 0x7F;
        let master = self.interrupt & (1 << 23) != 0;
        let force = self.interrupt & (1 << 15) != 0;
        let signal = force || (master && flags & enables != 0);
        (self.interrupt & 0x7FFF_FFFF) | ((signal as u32) << 31)
    }

    /// Write DMA Interrupt Register (DICR)
    ///
    /// Bits 0-5 and 15-23 are stored, flags 24-30 are write-1-to-clear.
    pub fn write_interrupt(&mut self, value: u32) {
        let clear = value & 0x7F00_0000;
        self.interrupt = (self.interrupt & 0x7F00_0000 & !clear) | (value & 0x00FF_803F);
        log::trace!("DICR = 0x{:08X}", self.interrupt);
    }

    /// OTC registers for persistence
    pub fn otc_registers(&self) -> OtcRegisters {
        OtcRegisters {
            madr: self.otc.base_address,
            bcr: self.otc.block_control,
            chcr: self.otc.channel_control,
        }
    }

    /// Split a bus offset into `(channel, register)`
    ///
    /// Only channels 2 and 6 decode; register 0xC is unused.
    fn decode_offset(offset: u32) -> Result<(usize, u32)> {
        let channel = Self::CH_GPU + (offset >> 4) as usize;
        let register = offset & 0xF;
        if (channel != Self::CH_GPU && channel != Self::CH_OTC) || register > 0x8 {
            return Err(EmulatorError::InvalidMemoryAccess {
                address: Self::BASE_ADDRESS + offset,
            });
        }
        Ok((channel, register))
    }

    /// Restore persisted OTC registers
    pub fn restore_otc(&mut self, registers: OtcRegisters) {
        self.otc.base_address = registers.madr & 0x00FF_FFFF;
        self.otc.block_control = registers.bcr;
        self.otc.channel_control = (registers.chcr & OTC_WRITABLE) | OTC_FIXED;
    }
}

impl Default for DMA {
    fn default() -> Self {
        Self::new()
    }
}

/// DMA registers on the CPU bus, from channel 2 MADR to DICR
///
/// Channels 3-5 fall inside the range but are not modelled.
impl IODevice for DMA {
    fn address_range(&self) -> (u32, u32) {
        (Self::BASE_ADDRESS, Self::BASE_ADDRESS + 0x57)
    }

    fn read_register(&mut self, offset: u32) -> Result<u32> {
        match offset {
            0x50 => Ok(self.read_control()),
            0x54 => Ok(self.read_interrupt()),
            _ => match Self::decode_offset(offset)? {
                (channel, 0x0) => self.read_madr(channel),
                (channel, 0x4) => self.read_bcr(channel),
                (channel, _) => self.read_chcr(channel),
            },
        }
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        match offset {
            0x50 => self.write_control(value),
            0x54 => self.write_interrupt(value),
            _ => match Self::decode_offset(offset)? {
                (channel, 0x0) => self.write_madr(channel, value)?,
                (channel, 0x4) => self.write_bcr(channel, value)?,
                (channel, _) => self.write_chcr(channel, value)?,
            },
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "DMA"
    }
}
