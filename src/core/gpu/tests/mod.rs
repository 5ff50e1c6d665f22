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

//! GPU module tests
//!
//! Tests are organized into the following modules:
//! - `basic`: Initialization, reset value, register façade
//! - `vram`: VRAM transfers through GP0 (CPU↔VRAM, VRAM→VRAM)
//! - `gp0_commands`: GP0 drawing commands and command buffering
//! - `gp1_commands`: GP1 control commands (display control, DMA, info)
//! - `rendering`: Rasterization, texturing and blending
//! - `timing`: Display timing and interrupts
//! - `decoder`: Word-count properties of the GP0 decoder

use super::GPU;

mod rendering;
mod vram;

/// Write a sequence of GP0 words, failing the test on any error
pub(super) fn send(gpu: &mut GPU, words: &[u32]) {
    for &word in words {
        gpu.write_gp0(word).unwrap();
    }
}

/// Pack a GP0 vertex / position word
pub(super) fn xy(x: u32, y: u32) -> u32 {
    (y << 16) | (x & 0xFFFF)
}
