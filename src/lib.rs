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

//! PlayStation 1 GPU core library
//!
//! This library provides the GPU (CXD8561) emulation core of a PlayStation 1
//! emulator: the dual-representation VRAM, the GP0/GP1 command channels, the
//! software rasterizer, display timing, and the GPU-facing DMA protocol.
//!
//! # Example
//!
//! ```
//! use psrx_gpu::core::GPU;
//!
//! let mut gpu = GPU::new();
//!
//! // Fill a 4x4 block with a solid color (GP0 0x02)
//! gpu.write_gp0(0x0211_2233).unwrap();
//! gpu.write_gp0(0x000A_000A).unwrap();
//! gpu.write_gp0(0x0004_0004).unwrap();
//!
//! assert_eq!(gpu.vram().get_pixel(10, 10), 0x0011_2233);
//! ```

pub mod core;
