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

//! GPU save state serialization
//!
//! Captures everything needed to resume the GPU core at a point in time.
//!
//! # Save State Format
//!
//! States are serialized with bincode using fixed-width integers, so the
//! layout is a flat sequence of fields in declaration order:
//!
//! - VRAM, 24-bit representation (1024×512 `u32`)
//! - VRAM, 15-bit representation (1024×512 `u16`)
//! - GPU registers ([`GpuRegisters`])
//! - OTC channel shadow registers (MADR, BCR, CHCR)
//!
//! There is no header, version or compression. A reader must know the exact
//! layout; changing any field here breaks every existing dump.
//!
//! # Example
//!
//! ```
//! use psrx_gpu::core::save_state;
//! use psrx_gpu::core::{DMA, GPU};
//!
//! let mut gpu = GPU::new();
//! let mut dma = DMA::new();
//!
//! let bytes = save_state::dump(&gpu, &dma).unwrap();
//! save_state::load(&mut gpu, &mut dma, &bytes).unwrap();
//! ```

use bincode::{config, Decode, Encode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::core::dma::{OtcRegisters, DMA};
use crate::core::error::{EmulatorError, Result};
use crate::core::gpu::GPU;

/// GPU register state
///
/// Status is stored as its packed word, which round-trips every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct GpuRegisters {
    /// GPUSTAT
    pub status: u32,

    /// Display area start (x, y)
    pub display_start: [u32; 2],

    /// Horizontal start/end, vertical start/end
    pub display_range: [u32; 4],

    /// Drawing area left, top, right, bottom
    pub draw_area: [i32; 4],

    pub draw_offset: [i32; 2],

    /// Texture window in GP0(0xE2) layout
    pub texture_window: u32,

    /// Textured rectangle flips (x, y)
    pub rect_flip: [bool; 2],

    pub texture_disable_allowed: bool,

    /// Display timing counters
    pub video_cycles: u64,
    pub timing_remainder: u32,
    pub scanline: u32,
    pub odd_field: bool,

    /// H-blank, V-blank
    pub blanking: [bool; 2],

    pub gpuread_latch: u32,
}

/// Complete GPU core state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct GpuState {
    /// VRAM, 24-bit representation
    pub pixels24: Vec<u32>,

    /// VRAM, 15-bit representation
    pub pixels15: Vec<u16>,

    pub gpu: GpuRegisters,

    /// OTC MADR, BCR, CHCR
    pub otc: [u32; 3],
}

impl GpuState {
    /// Snapshot the GPU and the OTC channel
    pub fn capture(gpu: &GPU, dma: &DMA) -> Self {
        let otc = dma.otc_registers();
        Self {
            pixels24: gpu.vram().pixels24().to_vec(),
            pixels15: gpu.vram().pixels15().to_vec(),
            gpu: gpu.registers(),
            otc: [otc.madr, otc.bcr, otc.chcr],
        }
    }

    /// Replace GPU and OTC state wholesale
    ///
    /// # Errors
    ///
    /// `QueueNotEmpty` if jobs are pending, `SaveState` if the VRAM arrays
    /// have the wrong size. Nothing is modified on error.
    pub fn apply(self, gpu: &mut GPU, dma: &mut DMA) -> Result<()> {
        gpu.restore(&self.gpu, self.pixels24, self.pixels15)?;

        let [madr, bcr, chcr] = self.otc;
        dma.restore_otc(OtcRegisters { madr, bcr, chcr });
        Ok(())
    }

    /// Encode into the fixed binary layout
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::encode_to_vec(self, layout()).map_err(|e| EmulatorError::SaveState(e.to_string()))
    }

    /// Decode from the fixed binary layout
    ///
    /// # Errors
    ///
    /// `SaveState` on truncated or trailing data.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (state, read): (GpuState, usize) = bincode::decode_from_slice(bytes, layout())
            .map_err(|e| EmulatorError::SaveState(e.to_string()))?;

        if read != bytes.len() {
            return Err(EmulatorError::SaveState(format!(
                "{} trailing bytes after state",
                bytes.len() - read
            )));
        }
        Ok(state)
    }

    /// Save state to file
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use psrx_gpu::core::save_state::GpuState;
    /// # use psrx_gpu::core::{DMA, GPU};
    /// let state = GpuState::capture(&GPU::new(), &DMA::new());
    /// state.save_to_file("gpu.state").unwrap();
    /// ```
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let encoded = self.encode()?;
        let mut file = File::create(path)?;
        file.write_all(&encoded)?;
        Ok(())
    }

    /// Load state from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Self::decode(&buffer)
    }
}

/// bincode configuration of the dump layout
fn layout() -> impl bincode::config::Config {
    config::standard().with_fixed_int_encoding()
}

/// Dump GPU and OTC state
pub fn dump(gpu: &GPU, dma: &DMA) -> Result<Vec<u8>> {
    let bytes = GpuState::capture(gpu, dma).encode()?;
    log::debug!("GPU state dumped ({} bytes)", bytes.len());
    Ok(bytes)
}

/// Load GPU and OTC state produced by [`dump`]
///
/// # Errors
///
/// `SaveState` on malformed input, `QueueNotEmpty` while jobs are pending.
pub fn load(gpu: &mut GPU, dma: &mut DMA, bytes: &[u8]) -> Result<()> {
    GpuState::decode(bytes)?.apply(gpu, dma)?;
    log::debug!("GPU state loaded ({} bytes)", bytes.len());
    Ok(())
}

/// Human-readable description written next to a dump
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotInfo {
    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Effective display resolution
    pub resolution: (u32, u32),

    /// Ticks executed before the snapshot
    pub ticks: u64,
}

impl SnapshotInfo {
    pub fn new(gpu: &GPU, ticks: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            resolution: gpu.display_resolution(),
            ticks,
        }
    }

    /// Write as pretty JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| EmulatorError::SaveState(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::GpuError;
    use tempfile::tempdir;

    fn drawn_gpu() -> GPU {
        let mut gpu = GPU::new();
        // Fill, draw offset, texture window, GPU info latch
        for word in [0x0211_2233, 0x000A_000A, 0x0004_0004, 0xE500_0805, 0xE200_0421] {
            gpu.write_gp0(word).unwrap();
        }
        gpu.write_gp1(0x1000_0007).unwrap();
        gpu
    }

    #[test]
    fn test_dump_load_round_trip() {
        let gpu = drawn_gpu();
        let mut dma = DMA::new();
        dma.write_madr(DMA::CH_OTC, 0x1234).unwrap();
        dma.write_bcr(DMA::CH_OTC, 16).unwrap();

        let bytes = dump(&gpu, &dma).unwrap();

        let mut restored = GPU::new();
        let mut restored_dma = DMA::new();
        load(&mut restored, &mut restored_dma, &bytes).unwrap();

        assert_eq!(restored.status(), gpu.status());
        assert_eq!(restored.vram().pixels24(), gpu.vram().pixels24());
        assert_eq!(restored.vram().pixels15(), gpu.vram().pixels15());
        assert_eq!(restored.registers(), gpu.registers());
        assert_eq!(restored.read_gpuread(), 2);
        assert_eq!(restored_dma.otc_registers(), dma.otc_registers());
    }

    #[test]
    fn test_layout_is_fixed_size() {
        let dma = DMA::new();
        let empty = dump(&GPU::new(), &dma).unwrap();
        let drawn = dump(&drawn_gpu(), &dma).unwrap();
        assert_eq!(empty.len(), drawn.len());
    }

    #[test]
    fn test_load_rejects_pending_jobs() {
        let bytes = dump(&GPU::new(), &DMA::new()).unwrap();

        let mut gpu = drawn_gpu();
        // Resize job waits for the render thread
        gpu.write_gp1(0x0800_0001).unwrap();
        let before = gpu.registers();

        let err = load(&mut gpu, &mut DMA::new(), &bytes).unwrap_err();
        assert!(matches!(
            err,
            EmulatorError::Gpu(GpuError::QueueNotEmpty { pending: 1 })
        ));
        assert_eq!(gpu.registers(), before);
    }

    #[test]
    fn test_truncated_dump() {
        let bytes = dump(&GPU::new(), &DMA::new()).unwrap();
        let result = GpuState::decode(&bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(EmulatorError::SaveState(_))));

        let mut padded = bytes.clone();
        padded.push(0);
        assert!(matches!(
            GpuState::decode(&padded),
            Err(EmulatorError::SaveState(_))
        ));
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gpu.state");

        let gpu = drawn_gpu();
        let state = GpuState::capture(&gpu, &DMA::new());
        state.save_to_file(&path).unwrap();

        let loaded = GpuState::load_from_file(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_snapshot_info_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gpu.json");

        SnapshotInfo::new(&GPU::new(), 42).write_json(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let info: SnapshotInfo = serde_json::from_str(&text).unwrap();
        assert_eq!(info.resolution, (256, 240));
        assert_eq!(info.ticks, 42);
    }
}
