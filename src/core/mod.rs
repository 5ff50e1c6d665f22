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

//! Core emulation components
//!
//! This module contains the GPU core and the collaborators it talks to:
//! - GPU (VRAM, GP0/GP1, rasterizer, display timing)
//! - DMA channels 2 (GPU) and 6 (OTC)
//! - Interrupt controller
//! - Main RAM and the memory-mapped register seam
//! - Save state persistence

pub mod config;
pub mod dma;
pub mod error;
pub mod gpu;
pub mod interrupt;
pub mod memory;
pub mod save_state;

// Re-export commonly used types
pub use config::GpuConfig;
pub use dma::DMA;
pub use error::{EmulatorError, GpuError, Result};
pub use gpu::GPU;
pub use interrupt::InterruptController;
pub use memory::{MemoryLock, Ram};
