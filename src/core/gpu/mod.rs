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

//! GPU (Graphics Processing Unit) implementation
//!
//! This module implements the Sony CXD8561Q GPU used in the PlayStation
//! console. The GPU is responsible for:
//! - Managing 1MB of VRAM (1024×512 pixels)
//! - Processing GP0 (drawing) and GP1 (control) commands
//! - Rendering primitives (polygons, lines, rectangles)
//! - Display timing and output
//!
//! # Command flow
//!
//! ```text
//! GP0 word ──► Gp0Decoder ──► GpuJob ──► CommandQueue ──► execute()
//!                                                          │
//!                           Render(..) jobs wait for ◄─────┘
//!                           the render thread
//! GP1 word ──► applied immediately
//! ```
//!
//! # VRAM Layout
//!
//! VRAM is kept in two synchronized representations, see [`Vram`]: 24-bit
//! color for rendering and the native 15-bit words for transfers and
//! texture sampling.
//!
//! # Coordinate System
//!
//! The coordinate system origin (0, 0) is at the top-left corner of VRAM:
//! - X-axis: 0 to 1023 (left to right)
//! - Y-axis: 0 to 511 (top to bottom)
//!
//! # References
//!
//! - [PSX-SPX: GPU](http://problemkaputt.de/psx-spx.htm#gpu)
//! - [PSX-SPX: GPU Rendering](http://problemkaputt.de/psx-spx.htm#gpurenderstatecommands)

use std::collections::VecDeque;

use crate::core::error::{GpuError, Result};
use crate::core::memory::{new_memory_lock, IODevice, MemoryLock};
use crate::core::save_state::GpuRegisters;

// Module declarations
pub mod gp0;
mod gp1;
pub mod primitives;
pub mod queue;
pub mod registers;
mod render;
#[cfg(test)]
mod tests;
pub mod thread;
pub mod timing;
pub mod types;
pub mod vram;

// Public re-exports
pub use gp0::Gp0Decoder;
pub use queue::{execute, CommandQueue, ExecContext, GpuJob, RenderJob};
pub use registers::{
    DisplayDepth, DisplayGeometry, DmaDirection, DrawOffset, DrawingArea, GPUStatus, StatusFlags,
    TextureWindow, VerticalRes, VideoMode,
};
pub use render::{apply_blending, sample_texel, translucence, FrameSurface, SurfaceView};
pub use thread::GpuThread;
pub use timing::{DisplayTiming, TimingSample};
pub use types::*;
pub use vram::Vram;

/// GPU state representing the CXD8561 graphics processor
///
/// # Examples
///
/// ```
/// use psrx_gpu::core::GPU;
///
/// let mut gpu = GPU::new();
///
/// // GP1(0x10) index 7: GPU version
/// gpu.write_gp1(0x1000_0007).unwrap();
/// assert_eq!(gpu.read_gpuread(), 2);
/// ```
pub struct GPU {
    /// Dual-representation VRAM
    pub(in crate::core::gpu) vram: Vram,

    /// GPUSTAT
    pub(in crate::core::gpu) status: GPUStatus,

    /// Drawing area (clipping rectangle)
    pub(in crate::core::gpu) draw_area: DrawingArea,

    /// Drawing offset (added to all vertex coordinates)
    pub(in crate::core::gpu) draw_offset: DrawOffset,

    /// Texture window settings
    pub(in crate::core::gpu) texture_window: TextureWindow,

    /// Textured rectangle flips (GP0 E1 bits 12-13)
    pub(in crate::core::gpu) rect_flip_x: bool,
    pub(in crate::core::gpu) rect_flip_y: bool,

    /// GP1(0x09) permission for GP0 E1 bit 11
    pub(in crate::core::gpu) texture_disable_allowed: bool,

    /// Display start and ranges (GP1 0x05-0x07)
    pub(in crate::core::gpu) display: DisplayGeometry,

    pub(in crate::core::gpu) decoder: Gp0Decoder,

    /// Decoded jobs waiting for execution
    pub(in crate::core::gpu) queue: CommandQueue,

    /// VRAM→CPU readback FIFO
    pub(in crate::core::gpu) gpuread: VecDeque<u32>,

    /// Last value returned through GPUREAD
    pub(in crate::core::gpu) gpuread_latch: u32,

    pub(in crate::core::gpu) timing: DisplayTiming,

    /// Shared with DMA; held during CPU-facing VRAM copies
    pub(in crate::core::gpu) memory_lock: MemoryLock,

    /// Log every GP0 word at debug level
    trace_commands: bool,
}

impl GPU {
    /// GPU register base address (GP0/GPUREAD)
    pub const BASE_ADDRESS: u32 = 0x1F80_1810;

    /// Create a GPU in its post-reset state with cleared VRAM
    ///
    /// # Examples
    ///
    /// ```
    /// use psrx_gpu::core::GPU;
    ///
    /// let gpu = GPU::new();
    /// assert_eq!(gpu.status(), 0x1480_2000);
    /// assert_eq!(gpu.display_resolution(), (256, 240));
    /// ```
    pub fn new() -> Self {
        Self::with_memory_lock(new_memory_lock())
    }

    /// Create a GPU sharing an existing memory lock (normally the DMA's)
    pub fn with_memory_lock(memory_lock: MemoryLock) -> Self {
        Self {
            vram: Vram::new(),
            status: GPUStatus::after_reset(),
            draw_area: DrawingArea::default(),
            draw_offset: DrawOffset::default(),
            texture_window: TextureWindow::default(),
            rect_flip_x: false,
            rect_flip_y: false,
            texture_disable_allowed: false,
            display: DisplayGeometry::default(),
            decoder: Gp0Decoder::new(),
            queue: CommandQueue::new(),
            gpuread: VecDeque::new(),
            gpuread_latch: 0,
            timing: DisplayTiming::default(),
            memory_lock,
            trace_commands: false,
        }
    }

    /// Read access to VRAM
    pub fn vram(&self) -> &Vram {
        &self.vram
    }

    /// Get current GPU status register value
    pub fn status(&self) -> u32 {
        self.status.to_u32()
    }

    /// Unpacked GPUSTAT
    pub fn status_fields(&self) -> GPUStatus {
        self.status
    }

    /// Display start and ranges
    pub fn display_geometry(&self) -> DisplayGeometry {
        self.display
    }

    /// Drawing area (clipping rectangle)
    pub fn drawing_area(&self) -> DrawingArea {
        self.draw_area
    }

    /// Effective display resolution `(width, height)`
    pub fn display_resolution(&self) -> (u32, u32) {
        self.status.display_resolution()
    }

    /// Handle to the job queue
    pub fn queue(&self) -> CommandQueue {
        self.queue.clone()
    }

    /// Number of queued jobs
    pub fn pending_jobs(&self) -> usize {
        self.queue.len()
    }

    /// Whether a GP0 command is partially received
    pub fn is_receiving_command(&self) -> bool {
        !self.decoder.is_idle()
    }

    /// The memory lock this GPU takes for VRAM copies
    pub fn memory_lock(&self) -> MemoryLock {
        MemoryLock::clone(&self.memory_lock)
    }

    pub fn set_trace_commands(&mut self, enabled: bool) {
        self.trace_commands = enabled;
    }

    /// Write the GP0 port and execute whatever completes
    ///
    /// "Ready to receive command" is dropped for the duration of the write and
    /// raised again once the decoder is idle and only render-thread jobs (if
    /// any) remain queued.
    ///
    /// # Errors
    ///
    /// `UnknownGp0Opcode` or `Unsupported`; the partial command is dropped.
    pub fn write_gp0(&mut self, word: u32) -> Result<()> {
        self.status.flags.remove(StatusFlags::READY_CMD);

        let result = self.feed_gp0(word);
        self.drain();

        if self.decoder.is_idle() && self.queue.has_only_render_jobs() {
            self.status.flags.insert(StatusFlags::READY_CMD);
        }
        self.refresh_dma_request();
        result
    }

    /// Write a whole DMA block to GP0, executing once at the end
    ///
    /// # Errors
    ///
    /// The first decode error; words after it are not fed, jobs queued
    /// before it still run.
    pub fn write_gp0_block(&mut self, words: &[u32]) -> Result<()> {
        self.status.flags.remove(StatusFlags::READY_CMD);

        let result = words.iter().try_for_each(|&word| self.feed_gp0(word));
        self.drain();

        if self.decoder.is_idle() && self.queue.has_only_render_jobs() {
            self.status.flags.insert(StatusFlags::READY_CMD);
        }
        self.refresh_dma_request();
        result
    }

    /// Decode one GP0 word and queue the job it completes, without executing
    pub fn feed_gp0(&mut self, word: u32) -> Result<()> {
        if self.trace_commands {
            log::debug!("GP0 <- 0x{:08X}", word);
        }

        if let Some(job) = self.decoder.push(word)? {
            self.queue.push(job);
        }
        Ok(())
    }

    /// Execute queued jobs in the CPU context
    ///
    /// Render-thread jobs are handed back by the executor and re-queued in
    /// their original order once the queue is empty.
    pub fn drain(&mut self) {
        let mut deferred = Vec::new();
        while let Some(job) = self.queue.pop() {
            if let Some(job) = execute(job, self, &mut ExecContext::Cpu) {
                deferred.push(job);
            }
        }
        for job in deferred {
            self.queue.push(job);
        }
    }

    /// Execute every queued job, render-thread jobs included
    pub fn drain_render(&mut self, surface: &mut FrameSurface) {
        while let Some(job) = self.queue.pop() {
            execute(job, self, &mut ExecContext::Render(&mut *surface));
        }
    }

    /// Read the GPUREAD port
    ///
    /// Pops the VRAM readback FIFO when it holds data, otherwise repeats the
    /// last value (GP1 info results land there too).
    pub fn read_gpuread(&mut self) -> u32 {
        if let Some(word) = self.gpuread.pop_front() {
            self.gpuread_latch = word;
        }
        if self.gpuread.is_empty() {
            self.status.flags.remove(StatusFlags::READY_VRAM_SEND);
        }
        self.refresh_dma_request();
        self.gpuread_latch
    }

    /// Recompute GPUSTAT bit 25 from the DMA direction
    pub(in crate::core::gpu) fn refresh_dma_request(&mut self) {
        let request = self.status.derived_dma_request();
        self.status.flags.set(StatusFlags::DMA_REQUEST, request);
    }

    /// Register state for persistence
    pub(crate) fn registers(&self) -> GpuRegisters {
        GpuRegisters {
            status: self.status.to_u32(),
            display_start: [self.display.start_x, self.display.start_y],
            display_range: [
                self.display.h_start,
                self.display.h_end,
                self.display.v_start,
                self.display.v_end,
            ],
            draw_area: [
                self.draw_area.left,
                self.draw_area.top,
                self.draw_area.right,
                self.draw_area.bottom,
            ],
            draw_offset: [self.draw_offset.x, self.draw_offset.y],
            texture_window: self.texture_window.word(),
            rect_flip: [self.rect_flip_x, self.rect_flip_y],
            texture_disable_allowed: self.texture_disable_allowed,
            video_cycles: self.timing.video_cycles,
            timing_remainder: self.timing.remainder,
            scanline: self.timing.scanline,
            odd_field: self.timing.odd_field,
            blanking: [self.timing.in_hblank, self.timing.in_vblank],
            gpuread_latch: self.gpuread_latch,
        }
    }

    /// Restore persisted state
    ///
    /// # Errors
    ///
    /// `QueueNotEmpty` while jobs are pending; nothing is modified then.
    pub(crate) fn restore(
        &mut self,
        registers: &GpuRegisters,
        pixels24: Vec<u32>,
        pixels15: Vec<u16>,
    ) -> Result<()> {
        let pending = self.queue.len();
        if pending > 0 || !self.decoder.is_idle() {
            return Err(GpuError::QueueNotEmpty { pending }.into());
        }
        if !self.vram.replace(pixels24, pixels15) {
            return Err(crate::core::EmulatorError::SaveState(
                "VRAM arrays have the wrong size".into(),
            ));
        }

        self.status = GPUStatus::from_u32(registers.status);
        let [start_x, start_y] = registers.display_start;
        let [h_start, h_end, v_start, v_end] = registers.display_range;
        self.display = DisplayGeometry {
            start_x,
            start_y,
            h_start,
            h_end,
            v_start,
            v_end,
        };
        let [left, top, right, bottom] = registers.draw_area;
        self.draw_area = DrawingArea {
            left,
            top,
            right,
            bottom,
        };
        let [x, y] = registers.draw_offset;
        self.draw_offset = DrawOffset { x, y };
        self.texture_window = TextureWindow::from_word(registers.texture_window);
        [self.rect_flip_x, self.rect_flip_y] = registers.rect_flip;
        self.texture_disable_allowed = registers.texture_disable_allowed;
        let [in_hblank, in_vblank] = registers.blanking;
        self.timing = DisplayTiming {
            video_cycles: registers.video_cycles,
            remainder: registers.timing_remainder,
            scanline: registers.scanline,
            odd_field: registers.odd_field,
            in_hblank,
            in_vblank,
        };
        self.gpuread.clear();
        self.gpuread_latch = registers.gpuread_latch;

        log::debug!("GPU state restored (status 0x{:08X})", registers.status);
        Ok(())
    }
}

impl Default for GPU {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU registers on the CPU bus
///
/// | Offset | Read     | Write |
/// |--------|----------|-------|
/// | 0x0    | GPUREAD  | GP0   |
/// | 0x4    | GPUSTAT  | GP1   |
///
/// Only aligned 32-bit accesses are legal.
impl IODevice for GPU {
    fn address_range(&self) -> (u32, u32) {
        (Self::BASE_ADDRESS, Self::BASE_ADDRESS + 7)
    }

    fn read_register(&mut self, offset: u32) -> Result<u32> {
        match offset {
            0 => Ok(self.read_gpuread()),
            4 => Ok(self.status()),
            _ => Err(GpuError::MisalignedAccess { offset, size: 4 }.into()),
        }
    }

    fn write_register(&mut self, offset: u32, value: u32) -> Result<()> {
        match offset {
            0 => self.write_gp0(value),
            4 => self.write_gp1(value),
            _ => Err(GpuError::MisalignedAccess { offset, size: 4 }.into()),
        }
    }

    fn read_register16(&mut self, offset: u32) -> Result<u16> {
        Err(GpuError::MisalignedAccess { offset, size: 2 }.into())
    }

    fn write_register16(&mut self, offset: u32, _value: u16) -> Result<()> {
        Err(GpuError::MisalignedAccess { offset, size: 2 }.into())
    }

    fn read_register8(&mut self, offset: u32) -> Result<u8> {
        Err(GpuError::MisalignedAccess { offset, size: 1 }.into())
    }

    fn write_register8(&mut self, offset: u32, _value: u8) -> Result<()> {
        Err(GpuError::MisalignedAccess { offset, size: 1 }.into())
    }

    fn name(&self) -> &str {
        "GPU"
    }
}
