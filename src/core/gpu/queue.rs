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

//! Command queue and executor
//!
//! Every complete GP0 command becomes one [`GpuJob`]. Jobs are executed in
//! strict submission order: later primitives overdraw earlier ones and the
//! mask-bit test depends on what was written before.
//!
//! The queue is shared between the CPU/DMA context that fills it and the GPU
//! thread that drains it, so it lives behind a mutex. Jobs that need the
//! presentation surface are tagged [`GpuJob::Render`]; executing one without a
//! surface hands it back so it can be re-queued for the render thread.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::primitives::{FillRect, ImageLoad, Line, Polygon, Rectangle, VramCopy, VramRect};
use super::registers::{DrawOffset, TextureWindow};
use super::render::FrameSurface;
use super::GPU;

/// Work that may only run on the rendering context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderJob {
    /// Resize the presentation surface to the current display mode
    ResizeSurface,
}

/// One fully decoded GP0 command (or deferred GP1 side effect)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpuJob {
    /// GP0(0x00)
    Nop,
    /// GP0(0x01)
    ClearCache,
    /// GP0(0x02)
    FillRect(FillRect),
    /// GP0(0x20-0x3F)
    Polygon(Polygon),
    /// GP0(0x40-0x5F)
    Line(Line),
    /// GP0(0x60-0x7F)
    Rectangle(Rectangle),
    /// GP0(0x80-0x9F)
    CopyVramToVram(VramCopy),
    /// GP0(0xA0-0xBF) with its payload
    CopyCpuToVram(ImageLoad),
    /// GP0(0xC0-0xDF)
    CopyVramToCpu(VramRect),
    /// GP0(0xE1)
    SetDrawMode(u32),
    /// GP0(0xE2)
    SetTextureWindow(TextureWindow),
    /// GP0(0xE3)
    SetDrawAreaTopLeft { x: i32, y: i32 },
    /// GP0(0xE4)
    SetDrawAreaBottomRight { x: i32, y: i32 },
    /// GP0(0xE5)
    SetDrawOffset(DrawOffset),
    /// GP0(0xE6)
    SetMaskBits { set_mask: bool, check_mask: bool },
    /// GP0(0x1F)
    InterruptRequest,
    /// Rendering-context work
    Render(RenderJob),
}

impl GpuJob {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            GpuJob::Nop => "nop",
            GpuJob::ClearCache => "clear cache",
            GpuJob::FillRect(_) => "fill rectangle",
            GpuJob::Polygon(p) if p.is_quad() => "quad",
            GpuJob::Polygon(_) => "triangle",
            GpuJob::Line(_) => "line",
            GpuJob::Rectangle(_) => "rectangle",
            GpuJob::CopyVramToVram(_) => "VRAM→VRAM copy",
            GpuJob::CopyCpuToVram(_) => "CPU→VRAM copy",
            GpuJob::CopyVramToCpu(_) => "VRAM→CPU copy",
            GpuJob::SetDrawMode(_) => "draw mode",
            GpuJob::SetTextureWindow(_) => "texture window",
            GpuJob::SetDrawAreaTopLeft { .. } => "draw area top-left",
            GpuJob::SetDrawAreaBottomRight { .. } => "draw area bottom-right",
            GpuJob::SetDrawOffset(_) => "draw offset",
            GpuJob::SetMaskBits { .. } => "mask bit setting",
            GpuJob::InterruptRequest => "interrupt request",
            GpuJob::Render(_) => "render job",
        }
    }
}

/// Context a job is executed in
pub enum ExecContext<'a> {
    /// CPU/DMA side: no presentation surface available
    Cpu,
    /// GPU thread with the presentation surface
    Render(&'a mut FrameSurface),
}

/// Thread-safe FIFO of pending jobs
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct CommandQueue {
    jobs: Arc<Mutex<VecDeque<GpuJob>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<GpuJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a job
    pub fn push(&self, job: GpuJob) {
        self.lock().push_back(job);
    }

    /// Append a render job unless an identical one is already pending
    ///
    /// Render jobs read GPU state when they run, so one queued copy covers
    /// every request made before it executes.
    pub fn push_render(&self, job: RenderJob) {
        let mut jobs = self.lock();
        if !jobs.contains(&GpuJob::Render(job)) {
            jobs.push_back(GpuJob::Render(job));
        }
    }

    /// Take the oldest job
    pub fn pop(&self) -> Option<GpuJob> {
        self.lock().pop_front()
    }

    /// Drop every pending job
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether every pending job waits for the render thread
    pub fn has_only_render_jobs(&self) -> bool {
        self.lock().iter().all(|job| matches!(job, GpuJob::Render(_)))
    }
}

/// Execute one job against the GPU state
///
/// # Returns
///
/// `Some(job)` when the job needs the rendering context and `ctx` is
/// [`ExecContext::Cpu`]; the caller re-queues it. `None` once executed.
pub fn execute(job: GpuJob, gpu: &mut GPU, ctx: &mut ExecContext<'_>) -> Option<GpuJob> {
    log::trace!("GP0 execute: {}", job.name());

    match job {
        GpuJob::Nop | GpuJob::ClearCache => {}
        GpuJob::FillRect(fill) => gpu.fill_rect(&fill),
        GpuJob::Polygon(polygon) => gpu.draw_polygon(&polygon),
        GpuJob::Line(line) => gpu.draw_line(&line),
        GpuJob::Rectangle(rect) => gpu.draw_rectangle(&rect),
        GpuJob::CopyVramToVram(copy) => gpu.copy_vram_to_vram(&copy),
        GpuJob::CopyCpuToVram(load) => gpu.copy_cpu_to_vram(&load),
        GpuJob::CopyVramToCpu(rect) => gpu.copy_vram_to_cpu(&rect),
        GpuJob::SetDrawMode(value) => gpu.set_draw_mode(value),
        GpuJob::SetTextureWindow(window) => gpu.set_texture_window(window),
        GpuJob::SetDrawAreaTopLeft { x, y } => gpu.set_draw_area_top_left(x, y),
        GpuJob::SetDrawAreaBottomRight { x, y } => gpu.set_draw_area_bottom_right(x, y),
        GpuJob::SetDrawOffset(offset) => gpu.set_draw_offset(offset),
        GpuJob::SetMaskBits {
            set_mask,
            check_mask,
        } => gpu.set_mask_bits(set_mask, check_mask),
        GpuJob::InterruptRequest => gpu.request_interrupt(),
        GpuJob::Render(render) => match ctx {
            ExecContext::Cpu => {
                log::trace!("Deferring {:?} to the render thread", render);
                return Some(GpuJob::Render(render));
            }
            ExecContext::Render(surface) => gpu.run_render_job(render, surface),
        },
    }

    None
}
