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

//! Test fixtures for common GPU scenarios

use psrx_gpu::core::{InterruptController, Ram, DMA, GPU};

/// Pack a GP0 coordinate word
#[allow(dead_code)]
pub fn xy(x: u32, y: u32) -> u32 {
    (y << 16) | (x & 0xFFFF)
}

/// Write a sequence of words to GP0, failing the test on any error
#[allow(dead_code)]
pub fn send_gp0(gpu: &mut GPU, words: &[u32]) {
    for &word in words {
        gpu.write_gp0(word)
            .unwrap_or_else(|e| panic!("GP0 0x{:08X} rejected: {}", word, e));
    }
}

/// GPU, DMA, RAM and interrupt controller sharing one memory lock
#[allow(dead_code)]
pub fn create_gpu_system() -> (GPU, DMA, Ram, InterruptController) {
    let dma = DMA::new();
    let gpu = GPU::with_memory_lock(dma.memory_lock());
    (gpu, dma, Ram::new(), InterruptController::new())
}

/// Store consecutive words in RAM
#[allow(dead_code)]
pub fn load_words(ram: &mut Ram, start_addr: u32, words: &[u32]) {
    for (i, &word) in words.iter().enumerate() {
        ram.write_u32(start_addr + (i as u32 * 4), word);
    }
}

/// Build a GPU display list in RAM
///
/// Each packet is written as a header word (`len << 24 | next`) followed by
/// its GP0 words; the last header terminates the list.
#[allow(dead_code)]
pub fn load_display_list(ram: &mut Ram, start_addr: u32, packets: &[&[u32]]) {
    let mut addr = start_addr;
    for (i, packet) in packets.iter().enumerate() {
        let next = if i + 1 == packets.len() {
            0x00FF_FFFF
        } else {
            addr + 4 + packet.len() as u32 * 4
        };
        ram.write_u32(addr, ((packet.len() as u32) << 24) | next);
        load_words(ram, addr + 4, packet);
        addr += 4 + packet.len() as u32 * 4;
    }
}
