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

//! Dedicated GPU thread
//!
//! The thread owns the presentation surface. It is driven by tick messages
//! from the emulation thread; each tick advances display timing, executes
//! every queued job (render-only jobs included) and refreshes the surface.
//!
//! ```text
//! emulation thread                       GPU thread
//!   tick(cycles) ── GpuCommand::Tick ──►  lock GPU
//!                                         tick timing, drain_render
//!                                         refresh surface
//!                ◄── TimingSample ─────
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use super::render::{FrameSurface, SurfaceView};
use super::timing::TimingSample;
use super::GPU;
use crate::core::error::{GpuError, Result};
use crate::core::interrupt::InterruptController;

/// Messages accepted by the GPU thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuCommand {
    /// Advance by this many CPU cycles
    Tick(u32),
    Shutdown,
}

/// Handle to a running GPU thread
///
/// Dropping the handle shuts the thread down and joins it.
pub struct GpuThread {
    commands: Sender<GpuCommand>,
    samples: Receiver<TimingSample>,
    surface: Arc<Mutex<FrameSurface>>,
    handle: Option<JoinHandle<()>>,
}

impl GpuThread {
    /// Start the GPU thread
    ///
    /// # Arguments
    ///
    /// * `gpu` - GPU shared with the CPU side (register writes, DMA)
    /// * `irq` - Interrupt controller receiving VBLANK / GPU requests
    /// * `view` - What the presentation surface shows
    pub fn spawn(
        gpu: Arc<Mutex<GPU>>,
        irq: Arc<Mutex<InterruptController>>,
        view: SurfaceView,
    ) -> Result<Self> {
        let (command_tx, command_rx) = unbounded::<GpuCommand>();
        let (sample_tx, sample_rx) = bounded::<TimingSample>(1);
        let surface = Arc::new(Mutex::new(FrameSurface::with_view(view)));

        let thread_surface = Arc::clone(&surface);
        let handle = std::thread::Builder::new()
            .name("psrx-gpu".into())
            .spawn(move || run(gpu, irq, thread_surface, command_rx, sample_tx))?;

        log::debug!("GPU thread started ({:?} view)", view);

        Ok(Self {
            commands: command_tx,
            samples: sample_rx,
            surface,
            handle: Some(handle),
        })
    }

    /// Advance the GPU by `cycles` CPU cycles and wait for the result
    ///
    /// # Errors
    ///
    /// `ThreadDisconnected` once the thread has stopped.
    pub fn tick(&self, cycles: u32) -> Result<TimingSample> {
        self.commands
            .send(GpuCommand::Tick(cycles))
            .map_err(|_| GpuError::ThreadDisconnected)?;
        Ok(self
            .samples
            .recv()
            .map_err(|_| GpuError::ThreadDisconnected)?)
    }

    /// Presentation surface, refreshed after every tick
    pub fn surface(&self) -> Arc<Mutex<FrameSurface>> {
        Arc::clone(&self.surface)
    }

    /// Stop the thread and wait for it to exit
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // The thread may already be gone; joining is all that is left
            let _ = self.commands.send(GpuCommand::Shutdown);
            if handle.join().is_err() {
                log::warn!("GPU thread panicked");
            }
            log::debug!("GPU thread stopped");
        }
    }
}

impl Drop for GpuThread {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    gpu: Arc<Mutex<GPU>>,
    irq: Arc<Mutex<InterruptController>>,
    surface: Arc<Mutex<FrameSurface>>,
    commands: Receiver<GpuCommand>,
    samples: Sender<TimingSample>,
) {
    while let Ok(command) = commands.recv() {
        let cycles = match command {
            GpuCommand::Tick(cycles) => cycles,
            GpuCommand::Shutdown => break,
        };

        let sample = {
            let mut gpu = gpu.lock().unwrap_or_else(PoisonError::into_inner);
            let mut surface = surface.lock().unwrap_or_else(PoisonError::into_inner);

            let sample = {
                let mut irq = irq.lock().unwrap_or_else(PoisonError::into_inner);
                gpu.tick(cycles, &mut irq)
            };
            gpu.drain_render(&mut surface);
            surface.refresh(&gpu);
            sample
        };

        if samples.send(sample).is_err() {
            break;
        }
    }
}
