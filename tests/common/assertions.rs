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

//! Custom assertions for GPU testing

use psrx_gpu::core::gpu::Vram;

/// Assert a VRAM pixel has the expected 24-bit color
#[allow(dead_code)]
pub fn assert_vram_pixel(vram: &Vram, x: u32, y: u32, expected: u32) {
    let actual = vram.get_pixel(x, y);
    assert_eq!(
        actual, expected,
        "VRAM at ({}, {}) mismatch: expected 0x{:08X}, got 0x{:08X}",
        x, y, expected, actual
    );
}

/// Assert every pixel of a rectangle has the expected 24-bit color
#[allow(dead_code)]
pub fn assert_vram_rect(vram: &Vram, x: u32, y: u32, width: u32, height: u32, expected: u32) {
    for dy in 0..height {
        for dx in 0..width {
            assert_vram_pixel(vram, x + dx, y + dy, expected);
        }
    }
}

/// Assert a GPUSTAT bit
#[allow(dead_code)]
pub fn assert_status_bit(status: u32, bit: u32, expected: bool) {
    let actual = status & (1 << bit) != 0;
    assert_eq!(
        actual, expected,
        "GPUSTAT bit {} mismatch in 0x{:08X}: expected {}, got {}",
        bit, status, expected, actual
    );
}
