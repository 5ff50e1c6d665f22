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

//! VRAM transfer tests
//! Tests for CPU→VRAM, VRAM→CPU and VRAM→VRAM copies through GP0

use super::super::*;
use super::{send, xy};

const READY_VRAM_SEND: u32 = 1 << 27;

/// Upload raw 15-bit pixels as a `w`×`h` image at `(x, y)`
fn upload(gpu: &mut GPU, x: u32, y: u32, w: u32, h: u32, pixels: &[u16]) {
    send(gpu, &[0xA000_0000, xy(x, y), xy(w, h)]);
    for pair in pixels.chunks(2) {
        let high = pair.get(1).copied().unwrap_or(0) as u32;
        gpu.write_gp0(pair[0] as u32 | (high << 16)).unwrap();
    }
}

/// Read back a `w`×`h` rectangle through GPUREAD
fn download(gpu: &mut GPU, x: u32, y: u32, w: u32, h: u32) -> Vec<u32> {
    send(gpu, &[0xC000_0000, xy(x, y), xy(w, h)]);
    (0..(w * h).div_ceil(2)).map(|_| gpu.read_gpuread()).collect()
}

#[test]
fn test_cpu_to_vram_round_trip() {
    let mut gpu = GPU::new();
    upload(&mut gpu, 5, 5, 2, 2, &[0x1111, 0x2222, 0x3333, 0x4444]);

    assert_eq!(gpu.vram().get_pixel_15(5, 5), 0x1111);
    assert_eq!(gpu.vram().get_pixel_15(6, 5), 0x2222);
    assert_eq!(gpu.vram().get_pixel_15(5, 6), 0x3333);
    assert_eq!(gpu.vram().get_pixel_15(6, 6), 0x4444);

    assert_eq!(download(&mut gpu, 5, 5, 2, 2), vec![0x2222_1111, 0x4444_3333]);
}

#[test]
fn test_upload_updates_24bit_representation() {
    let mut gpu = GPU::new();
    // Pure red, mask set
    upload(&mut gpu, 0, 0, 1, 1, &[0x801F]);

    assert_eq!(gpu.vram().get_pixel(0, 0), vram::MASK_24 | 0x00_00F8);
    assert!(gpu.vram().is_masked(0, 0));
}

#[test]
fn test_ready_to_send_flag() {
    let mut gpu = GPU::new();
    send(&mut gpu, &[0xC000_0000, xy(0, 0), xy(4, 1)]);
    assert_ne!(gpu.status() & READY_VRAM_SEND, 0);

    gpu.read_gpuread();
    assert_ne!(gpu.status() & READY_VRAM_SEND, 0);
    gpu.read_gpuread();
    assert_eq!(gpu.status() & READY_VRAM_SEND, 0);
}

#[test]
fn test_gpuread_repeats_last_value_when_empty() {
    let mut gpu = GPU::new();
    upload(&mut gpu, 0, 0, 2, 1, &[0xAAAA, 0x5555]);

    assert_eq!(download(&mut gpu, 0, 0, 2, 1), vec![0x5555_AAAA]);
    assert_eq!(gpu.read_gpuread(), 0x5555_AAAA);
}

#[test]
fn test_odd_sized_download_pads_high_half() {
    let mut gpu = GPU::new();
    upload(&mut gpu, 0, 0, 3, 1, &[0x0001, 0x0002, 0x0003]);

    assert_eq!(download(&mut gpu, 0, 0, 3, 1), vec![0x0002_0001, 0x0000_0003]);
}

#[test]
fn test_upload_wraps_at_vram_edge() {
    let mut gpu = GPU::new();
    upload(&mut gpu, 1023, 511, 2, 2, &[1, 2, 3, 4]);

    assert_eq!(gpu.vram().get_pixel_15(1023, 511), 1);
    assert_eq!(gpu.vram().get_pixel_15(0, 511), 2);
    assert_eq!(gpu.vram().get_pixel_15(1023, 0), 3);
    assert_eq!(gpu.vram().get_pixel_15(0, 0), 4);
}

#[test]
fn test_upload_honours_mask_settings() {
    let mut gpu = GPU::new();
    upload(&mut gpu, 0, 0, 1, 1, &[0x8001]);

    // Check mask: the masked pixel is kept
    send(&mut gpu, &[0xE600_0002]);
    upload(&mut gpu, 0, 0, 2, 1, &[0x7FFF, 0x7FFF]);
    assert_eq!(gpu.vram().get_pixel_15(0, 0), 0x8001);
    assert_eq!(gpu.vram().get_pixel_15(1, 0), 0x7FFF);

    // Set mask: written pixels carry bit 15
    send(&mut gpu, &[0xE600_0001]);
    upload(&mut gpu, 2, 0, 1, 1, &[0x0001]);
    assert_eq!(gpu.vram().get_pixel_15(2, 0), 0x8001);
}

#[test]
fn test_vram_to_vram_copy() {
    let mut gpu = GPU::new();
    send(&mut gpu, &[0x0211_2233, xy(0, 0), xy(2, 2)]);

    send(&mut gpu, &[0x8000_0000, xy(0, 0), xy(100, 100), xy(2, 2)]);

    for (x, y) in [(100, 100), (101, 100), (100, 101), (101, 101)] {
        // Exact 24-bit value, not a 15-bit round trip
        assert_eq!(gpu.vram().get_pixel(x, y), 0x11_2233);
    }
    assert_eq!(gpu.vram().get_pixel(102, 100), 0);
}

#[test]
fn test_vram_to_vram_then_readback() {
    let mut gpu = GPU::new();
    upload(&mut gpu, 0, 0, 2, 1, &[0x1234, 0x5678]);
    send(&mut gpu, &[0x8000_0000, xy(0, 0), xy(512, 256), xy(2, 1)]);

    assert_eq!(download(&mut gpu, 512, 256, 2, 1), vec![0x5678_1234]);
}

#[test]
fn test_upload_waits_for_memory_lock() {
    use std::sync::mpsc;
    use std::time::Duration;

    let mut gpu = GPU::new();
    let lock = gpu.memory_lock();
    let guard = lock.lock().unwrap();

    let (done_tx, done_rx) = mpsc::channel();
    let writer = std::thread::spawn(move || {
        upload(&mut gpu, 0, 0, 1, 1, &[0x0042]);
        done_tx.send(()).unwrap();
        gpu
    });

    // The copy cannot complete while DMA holds the lock
    assert!(done_rx.recv_timeout(Duration::from_millis(50)).is_err());
    drop(guard);

    let gpu = writer.join().unwrap();
    assert_eq!(gpu.vram().get_pixel_15(0, 0), 0x0042);
}
