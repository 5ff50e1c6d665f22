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

//! GPU command trace player
//!
//! Replays a JSON trace of GPU port writes and timing ticks, then writes the
//! resulting frame and/or a GPU state dump.
//!
//! ```json
//! [
//!   {"gp1": 0},
//!   {"gp0": 33554432}, {"gp0": 0}, {"gp0": 15728880},
//!   {"tick": 564480}
//! ]
//! ```

use clap::Parser;
use log::{error, info};
use psrx_gpu::core::error::{EmulatorError, Result};
use psrx_gpu::core::gpu::{FrameSurface, GpuThread, SurfaceView};
use psrx_gpu::core::save_state::{self, SnapshotInfo};
use psrx_gpu::core::{GpuConfig, InterruptController, DMA, GPU};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// PlayStation GPU trace player
#[derive(Parser)]
#[command(name = "psrx-gpu")]
#[command(about = "Replay a GPU command trace", long_about = None)]
struct Args {
    /// Path to a JSON command trace
    trace: PathBuf,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Show the whole VRAM instead of the display area
    #[arg(long)]
    vram_viewer: bool,

    /// Render on the dedicated GPU thread
    #[arg(long)]
    threaded: bool,

    /// Write the final frame as a binary PPM
    #[arg(long)]
    frame_out: Option<PathBuf>,

    /// Write a GPU state dump (plus a JSON description next to it)
    #[arg(long)]
    state_out: Option<PathBuf>,
}

/// One trace entry
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TraceEvent {
    Gp0(u32),
    Gp1(u32),
    /// CPU cycles, or `frame_ticks` when 0
    Tick(u32),
}

struct Outcome {
    surface: FrameSurface,
    ticks: u64,
}

fn main() -> Result<()> {
    // .env is optional
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize logger with default level INFO
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("psrx-gpu v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GpuConfig::load(path)?,
        None => GpuConfig::default(),
    };
    config.apply_env()?;
    if args.vram_viewer {
        config.view = SurfaceView::VramViewer;
    }
    config.threaded |= args.threaded;
    log::debug!("Configuration: {}", config.to_json()?);

    let events = read_trace(&args.trace)?;
    info!("Replaying {} events from {}", events.len(), args.trace.display());

    let mut gpu = GPU::new();
    gpu.set_trace_commands(config.trace_commands);

    let (gpu, outcome) = if config.threaded {
        let shared = Arc::new(Mutex::new(gpu));
        let outcome = replay_threaded(Arc::clone(&shared), &events, &config)?;
        let gpu = match Arc::try_unwrap(shared) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(_) => return Err(EmulatorError::Config("GPU still shared after replay".into())),
        };
        (gpu, outcome)
    } else {
        let outcome = replay_inline(&mut gpu, &events, &config)?;
        (gpu, outcome)
    };

    let (width, height) = outcome.surface.size();
    info!(
        "Replay finished: {} ticks, surface {}x{}, GPUSTAT=0x{:08X}",
        outcome.ticks,
        width,
        height,
        gpu.status()
    );

    if let Some(path) = &args.frame_out {
        std::fs::write(path, outcome.surface.to_ppm())?;
        info!("Frame written to {}", path.display());
    }

    if let Some(path) = &args.state_out {
        let dma = DMA::with_memory_lock(gpu.memory_lock());
        std::fs::write(path, save_state::dump(&gpu, &dma)?)?;
        SnapshotInfo::new(&gpu, outcome.ticks).write_json(path.with_extension("json"))?;
        info!("State written to {}", path.display());
    }

    Ok(())
}

fn read_trace(path: &Path) -> Result<Vec<TraceEvent>> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| {
        EmulatorError::Config(format!("Invalid trace {}: {}", path.display(), e))
    })
}

fn cycles(config: &GpuConfig, requested: u32) -> u32 {
    if requested == 0 {
        config.frame_ticks
    } else {
        requested
    }
}

/// Execute the trace on this thread, rendering after every tick
fn replay_inline(gpu: &mut GPU, events: &[TraceEvent], config: &GpuConfig) -> Result<Outcome> {
    let mut irq = InterruptController::new();
    let mut surface = FrameSurface::with_view(config.view);
    let mut ticks = 0;

    for (index, event) in events.iter().enumerate() {
        let result = match *event {
            TraceEvent::Gp0(word) => gpu.write_gp0(word),
            TraceEvent::Gp1(word) => gpu.write_gp1(word),
            TraceEvent::Tick(requested) => {
                gpu.tick(cycles(config, requested), &mut irq);
                gpu.drain_render(&mut surface);
                surface.refresh(gpu);
                ticks += 1;
                Ok(())
            }
        };
        if let Err(e) = result {
            error!("Event {} ({:?}) failed: {}", index, event, e);
            return Err(e);
        }
    }

    gpu.drain_render(&mut surface);
    surface.refresh(gpu);
    Ok(Outcome { surface, ticks })
}

/// Execute the trace with rendering on the GPU thread
fn replay_threaded(
    gpu: Arc<Mutex<GPU>>,
    events: &[TraceEvent],
    config: &GpuConfig,
) -> Result<Outcome> {
    let irq = Arc::new(Mutex::new(InterruptController::new()));
    let thread = GpuThread::spawn(Arc::clone(&gpu), irq, config.view)?;
    let mut ticks = 0;

    for (index, event) in events.iter().enumerate() {
        let result = match *event {
            TraceEvent::Gp0(word) => gpu
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write_gp0(word),
            TraceEvent::Gp1(word) => gpu
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write_gp1(word),
            TraceEvent::Tick(requested) => {
                ticks += 1;
                thread.tick(cycles(config, requested)).map(|_| ())
            }
        };
        if let Err(e) = result {
            error!("Event {} ({:?}) failed: {}", index, event, e);
            return Err(e);
        }
    }

    // Flush anything queued after the last tick
    thread.tick(0)?;

    let surface = thread
        .surface()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    thread.shutdown();

    Ok(Outcome { surface, ticks })
}
