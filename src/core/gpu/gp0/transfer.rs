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

//! GP0 VRAM transfer commands
//!
//! Implements CPU↔VRAM and VRAM↔VRAM transfer operations.
//!
//! ```text
//! 0x80: cmd, src (Y<<16|X), dst (Y<<16|X), size (H<<16|W)
//! 0xA0: cmd, dst, size, then ceil(W*H/2) data words
//! 0xC0: cmd, src, size; pixels are then read back through GPUREAD
//! ```
//!
//! The CPU-facing transfers touch memory shared with the DMA engine, so they
//! run with the global memory lock held.

use std::sync::{Arc, PoisonError};

use super::super::primitives::{ImageLoad, VramCopy, VramRect};
use super::super::queue::GpuJob;
use super::super::registers::StatusFlags;
use super::super::vram::MASK_15;
use super::super::GPU;
use crate::core::error::Result;

pub(super) fn build_vram_to_vram(words: &[u32]) -> Result<GpuJob> {
    let src = VramRect::from_words(words[1], words[3]);
    Ok(GpuJob::CopyVramToVram(VramCopy {
        src_x: src.x,
        src_y: src.y,
        dst_x: words[2] & 0x3FF,
        dst_y: (words[2] >> 16) & 0x1FF,
        width: src.width,
        height: src.height,
    }))
}

/// Header only; the decoder appends the payload words
pub(super) fn build_cpu_to_vram(words: &[u32]) -> Result<GpuJob> {
    let rect = VramRect::from_words(words[1], words[2]);
    Ok(GpuJob::CopyCpuToVram(ImageLoad {
        rect,
        data: Vec::with_capacity(rect.word_count()),
    }))
}

pub(super) fn build_vram_to_cpu(words: &[u32]) -> Result<GpuJob> {
    Ok(GpuJob::CopyVramToCpu(VramRect::from_words(words[1], words[2])))
}

impl GPU {
    /// GP0(0x80): VRAM→VRAM Transfer
    ///
    /// Pixels are copied one at a time in row-major order, both
    /// representations verbatim. Destination pixels with the mask flag set
    /// are skipped when mask checking is on.
    pub(in crate::core::gpu) fn copy_vram_to_vram(&mut self, copy: &VramCopy) {
        log::trace!(
            "VRAM→VRAM transfer: ({}, {}) → ({}, {}) size {}×{}",
            copy.src_x,
            copy.src_y,
            copy.dst_x,
            copy.dst_y,
            copy.width,
            copy.height
        );

        let check_mask = self.status.check_mask_bit();
        let set_mask = self.status.set_mask_bit();

        for dy in 0..copy.height {
            for dx in 0..copy.width {
                let dst = (copy.dst_x + dx, copy.dst_y + dy);
                if check_mask && self.vram.is_masked(dst.0, dst.1) {
                    continue;
                }
                self.vram.copy_pixel((copy.src_x + dx, copy.src_y + dy), dst);
                if set_mask {
                    self.vram.set_mask(dst.0, dst.1);
                }
            }
        }
    }

    /// GP0(0xA0): CPU→VRAM Transfer
    ///
    /// Each data word carries two raw 15-bit pixels, low half first, written
    /// left-to-right, top-to-bottom within the destination rectangle.
    pub(in crate::core::gpu) fn copy_cpu_to_vram(&mut self, load: &ImageLoad) {
        let lock = Arc::clone(&self.memory_lock);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let rect = load.rect;
        log::trace!(
            "CPU→VRAM transfer: ({}, {}) size {}×{} ({} words)",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            load.data.len()
        );

        let check_mask = self.status.check_mask_bit();
        let forced = if self.status.set_mask_bit() { MASK_15 } else { 0 };

        let pixels = load
            .data
            .iter()
            .flat_map(|&word| [word as u16, (word >> 16) as u16])
            .take(rect.pixel_count());

        for (i, raw) in pixels.enumerate() {
            let x = rect.x + (i as u32 % rect.width);
            let y = rect.y + (i as u32 / rect.width);
            if check_mask && self.vram.is_masked(x, y) {
                continue;
            }
            self.vram.set_pixel_15(x, y, raw | forced);
        }
    }

    /// GP0(0xC0): VRAM→CPU Transfer
    ///
    /// Snapshots the rectangle into the GPUREAD FIFO, two pixels per word,
    /// and raises "ready to send VRAM" until the FIFO is drained.
    pub(in crate::core::gpu) fn copy_vram_to_cpu(&mut self, rect: &VramRect) {
        let lock = Arc::clone(&self.memory_lock);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        log::trace!(
            "VRAM→CPU transfer: ({}, {}) size {}×{}",
            rect.x,
            rect.y,
            rect.width,
            rect.height
        );

        let mut pending: Option<u16> = None;
        for dy in 0..rect.height {
            for dx in 0..rect.width {
                let raw = self.vram.get_pixel_15(rect.x + dx, rect.y + dy);
                match pending.take() {
                    Some(low) => self.gpuread.push_back(low as u32 | ((raw as u32) << 16)),
                    None => pending = Some(raw),
                }
            }
        }
        if let Some(low) = pending {
            self.gpuread.push_back(low as u32);
        }

        self.status.flags.insert(StatusFlags::READY_VRAM_SEND);
    }
}
