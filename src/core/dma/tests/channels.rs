// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Channel register and bus decoding tests

use super::super::*;

#[test]
fn test_channel_control_bits() {
    let mut dma = DMA::new();
    // From RAM, linked list, start
    dma.write_chcr(DMA::CH_GPU, 0x0100_0401).unwrap();

    let ch = &dma.gpu;
    assert!(ch.is_active());
    assert_eq!(ch.direction(), 1);
    assert_eq!(ch.sync_mode(), 2);
    assert!(!ch.trigger());
}

#[test]
fn test_manual_mode_waits_for_trigger() {
    let mut dma = DMA::new();
    dma.write_chcr(DMA::CH_GPU, 0x0100_0001).unwrap();
    assert!(!dma.gpu.ready());

    dma.write_chcr(DMA::CH_GPU, 0x1100_0001).unwrap();
    assert!(dma.gpu.ready());
}

#[test]
fn test_block_size_zero_means_64k() {
    let mut dma = DMA::new();
    dma.write_bcr(DMA::CH_GPU, 0x0002_0000).unwrap();
    assert_eq!(dma.gpu.block_size(), 0x1_0000);
    assert_eq!(dma.gpu.block_count(), 2);
}

#[test]
fn test_otc_chcr_rejects_read_only_bits() {
    let mut dma = DMA::new();

    let err = dma.write_chcr(DMA::CH_OTC, 0x1100_0201).unwrap_err();
    assert!(matches!(
        err,
        EmulatorError::Gpu(GpuError::ReadOnlyBit {
            register: "OTC CHCR",
            value: 0x1100_0201
        })
    ));

    // Bit 1 may be written back as read
    dma.write_chcr(DMA::CH_OTC, 0x5100_0002).unwrap();
    assert_eq!(dma.read_chcr(DMA::CH_OTC).unwrap(), 0x5100_0002);

    dma.write_chcr(DMA::CH_OTC, 0).unwrap();
    assert_eq!(dma.read_chcr(DMA::CH_OTC).unwrap(), 0x0000_0002);
}

#[test]
fn test_bus_decoding() {
    let mut dma = DMA::new();

    dma.write_register(0x00, 0x0000_1000).unwrap();
    dma.write_register(0x04, 0x0001_0010).unwrap();
    dma.write_register(0x40, 0x0000_2000).unwrap();
    dma.write_register(0x50, 0x0800_0000).unwrap();

    assert_eq!(dma.read_madr(DMA::CH_GPU).unwrap(), 0x1000);
    assert_eq!(dma.read_bcr(DMA::CH_GPU).unwrap(), 0x0001_0010);
    assert_eq!(dma.read_madr(DMA::CH_OTC).unwrap(), 0x2000);
    assert_eq!(dma.read_register(0x50).unwrap(), 0x0800_0000);
    assert_eq!(dma.read_register(0x48).unwrap(), 0x0000_0002);
}

#[test]
fn test_bus_rejects_unmodelled_channels() {
    let mut dma = DMA::new();

    // Channel 3 MADR
    assert!(matches!(
        dma.read_register(0x10),
        Err(EmulatorError::InvalidMemoryAccess {
            address: 0x1F80_10B0
        })
    ));
    // Unused register slot of channel 2
    assert!(dma.write_register(0x0C, 0).is_err());
}

#[test]
fn test_address_range() {
    let dma = DMA::new();
    assert!(dma.contains(0x1F80_10A0));
    assert!(dma.contains(0x1F80_10F4));
    assert!(!dma.contains(0x1F80_10F8));
    assert!(!dma.contains(0x1F80_1090));
}
