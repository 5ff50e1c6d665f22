// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Shared fixtures for DMA tests

use super::super::*;

/// DICR with master enable and the given channel enabled
pub(super) fn irq_enabled(channel: usize) -> u32 {
    (1 << 23) | (1 << (16 + channel))
}

/// Controller, GPU and RAM sharing one memory lock
pub(super) fn setup() -> (DMA, GPU, Ram, InterruptController) {
    let dma = DMA::new();
    let gpu = GPU::with_memory_lock(dma.memory_lock());
    (dma, gpu, Ram::new(), InterruptController::new())
}

/// Store `words` consecutively from `addr`
pub(super) fn store(ram: &mut Ram, addr: u32, words: &[u32]) {
    for (i, &word) in words.iter().enumerate() {
        ram.write_u32(addr + (i as u32) * 4, word);
    }
}

#[test]
fn test_setup_shares_memory_lock() {
    let (dma, gpu, _, _) = setup();
    assert!(std::sync::Arc::ptr_eq(&dma.memory_lock(), &gpu.memory_lock()));
}

#[test]
fn test_store_is_little_endian_words() {
    let mut ram = Ram::new();
    store(&mut ram, 0x100, &[0x1122_3344, 0x5566_7788]);
    assert_eq!(ram.read_u32(0x100), 0x1122_3344);
    assert_eq!(ram.read_u32(0x104), 0x5566_7788);
}
