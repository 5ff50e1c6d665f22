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

//! Rendering tests
//! Tests for rasterization, texturing, translucency and presentation

use super::super::*;
use super::{send, xy};
use vram::MASK_24;

/// Upload 15-bit pixels through GP0(0xA0), one row
fn upload_row(gpu: &mut GPU, x: u32, y: u32, pixels: &[u16]) {
    let mut words = vec![0xA000_0000, xy(x, y), xy(pixels.len() as u32, 1)];
    for pair in pixels.chunks(2) {
        let lo = pair[0] as u32;
        let hi = pair.get(1).copied().unwrap_or(0) as u32;
        words.push(lo | (hi << 16));
    }
    send(gpu, &words);
}

#[test]
fn test_shaded_triangle_interpolates_colors() {
    let mut gpu = GPU::new();
    // Red, green, blue corners
    send(
        &mut gpu,
        &[
            0x3000_00FF,
            xy(0, 0),
            0x0000_FF00,
            xy(8, 0),
            0x00FF_0000,
            xy(0, 8),
        ],
    );

    // Top-left vertex gets its exact color
    assert_eq!(gpu.vram().get_pixel(0, 0), 0x0000_00FF);

    // Along the top edge red fades into green
    assert_eq!(gpu.vram().get_pixel(1, 0), 0x0000_1FDF);
    assert_eq!(gpu.vram().get_pixel(7, 0), 0x0000_DF1F);

    // The hypotenuse is not covered
    assert_eq!(gpu.vram().get_pixel(8, 0), 0);
    assert_eq!(gpu.vram().get_pixel(0, 8), 0);
    assert_eq!(gpu.vram().get_pixel(4, 4), 0);
}

#[test]
fn test_winding_does_not_matter() {
    let mut a = GPU::new();
    let mut b = GPU::new();
    send(&mut a, &[0x2000_FFFF, xy(2, 2), xy(12, 3), xy(4, 10)]);
    send(&mut b, &[0x2000_FFFF, xy(2, 2), xy(4, 10), xy(12, 3)]);
    assert_eq!(a.vram().pixels24(), b.vram().pixels24());
    assert_eq!(a.vram().get_pixel(5, 5), 0x0000_FFFF);
}

#[test]
fn test_degenerate_triangle_draws_nothing() {
    let mut gpu = GPU::new();
    send(&mut gpu, &[0x2000_FFFF, xy(0, 0), xy(5, 5), xy(10, 10)]);
    assert!(gpu.vram().pixels24().iter().all(|&p| p == 0));
}

#[test]
fn test_oversized_triangle_rejected() {
    let mut gpu = GPU::new();
    send(&mut gpu, &[0x2000_FFFF, xy(0, 0), xy(1024, 0), xy(0, 10)]);
    assert!(gpu.vram().pixels24().iter().all(|&p| p == 0));
}

#[test]
fn test_quad_shared_edge_drawn_once() {
    let mut gpu = GPU::new();
    // Additive translucency exposes any pixel written twice
    send(&mut gpu, &[0xE100_0020]);
    send(
        &mut gpu,
        &[0x2A40_4040, xy(0, 0), xy(4, 0), xy(0, 4), xy(4, 4)],
    );

    for y in 0..6 {
        for x in 0..6 {
            let expected = if x < 4 && y < 4 { 0x0040_4040 } else { 0 };
            assert_eq!(gpu.vram().get_pixel(x, y), expected, "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn test_translucency_modes() {
    let back = 0x0080_4020;
    let front = 0x0040_C0F0;
    let cases = [
        (0u32, 0x0060_8088),
        (1, 0x00C0_FFFF),
        (2, 0x0040_0000),
        (3, 0x0090_705C),
    ];

    for (mode, expected) in cases {
        let mut gpu = GPU::new();
        send(&mut gpu, &[0x0200_0000 | back, xy(0, 0), xy(16, 1)]);
        send(&mut gpu, &[0xE100_0000 | (mode << 5)]);
        send(&mut gpu, &[0x6200_0000 | front, xy(0, 0), xy(1, 1)]);

        assert_eq!(gpu.vram().get_pixel(0, 0), expected, "mode {}", mode);
        // Outside the rectangle the background is untouched
        assert_eq!(gpu.vram().get_pixel(1, 0), back);
    }
}

#[test]
fn test_clut4_raw_textured_rectangle() {
    let mut gpu = GPU::new();
    send(&mut gpu, &[0x0211_2233, xy(96, 100), xy(16, 1)]);

    // Texels: indices 1, 2, 3, 4 in one word at page (64, 0)
    upload_row(&mut gpu, 64, 0, &[0x4321]);
    // CLUT at (0, 480): transparent, red, green, blue
    upload_row(&mut gpu, 0, 480, &[0x0000, 0x001F, 0x03E0, 0x7C00]);

    // Page X 1, 4-bit
    send(&mut gpu, &[0xE100_0001]);
    let clut = (480 << 6) << 16;
    send(&mut gpu, &[0x6500_0000, xy(100, 100), clut, xy(4, 1)]);

    assert_eq!(gpu.vram().get_pixel(100, 100), 0x0000_00F8);
    assert_eq!(gpu.vram().get_pixel(101, 100), 0x0000_F800);
    assert_eq!(gpu.vram().get_pixel(102, 100), 0x00F8_0000);
    // Index 4 resolves to a zero CLUT entry and leaves the background
    assert_eq!(gpu.vram().get_pixel(103, 100), 0x0011_2233);
}

#[test]
fn test_textured_rectangle_modulation() {
    let mut gpu = GPU::new();
    upload_row(&mut gpu, 64, 0, &[0x001F]);

    // Page X 1, 15-bit
    send(&mut gpu, &[0xE100_0101]);
    send(&mut gpu, &[0x6440_4040, xy(0, 0), 0, xy(1, 1)]);

    // 0xF8 * 0x40 >> 7
    assert_eq!(gpu.vram().get_pixel(0, 0), 0x0000_007C);
}

#[test]
fn test_textured_translucency_follows_texel_mask() {
    let mut gpu = GPU::new();
    send(&mut gpu, &[0x0200_0020, xy(96, 100), xy(16, 1)]);
    upload_row(&mut gpu, 64, 0, &[0x001F, 0x801F]);

    // Page X 1, 15-bit, average
    send(&mut gpu, &[0xE100_0101]);
    send(&mut gpu, &[0x6700_0000, xy(100, 100), 0, xy(2, 1)]);

    // Opaque texel replaces the background
    assert_eq!(gpu.vram().get_pixel(100, 100), 0x0000_00F8);
    // Masked texel blends and keeps its mask flag
    assert_eq!(gpu.vram().get_pixel(101, 100), MASK_24 | 0x0000_008C);
    assert!(gpu.vram().is_masked(101, 100));
}

#[test]
fn test_zero_texel_skipped_by_blended_polygon() {
    let mut gpu = GPU::new();
    send(&mut gpu, &[0x0211_2233, xy(0, 0), xy(8, 8)]);
    upload_row(&mut gpu, 128, 0, &[0x0000; 4]);

    // Modulated, semi-transparent textured quad; page 0x0122 (X 2, add, 15-bit)
    send(
        &mut gpu,
        &[
            0x2E80_8080,
            xy(0, 0),
            0x0000_0000,
            xy(4, 0),
            0x0122_0003,
            xy(0, 4),
            0x0000_0300,
            xy(4, 4),
            0x0000_0303,
        ],
    );

    for y in 0..5 {
        for x in 0..5 {
            assert_eq!(gpu.vram().get_pixel(x, y), 0x0011_2233, "({}, {})", x, y);
        }
    }
    assert_eq!(gpu.status_fields().texture_page_x, 2);
}

#[test]
fn test_textured_polygon_selects_its_own_page() {
    let mut gpu = GPU::new();
    upload_row(&mut gpu, 128, 0, &[0x03E0; 4]);

    // Raw textured triangle, page attribute 0x0102 (X 2, 15-bit)
    send(
        &mut gpu,
        &[
            0x2500_0000,
            xy(0, 0),
            0x0000_0000,
            xy(4, 0),
            0x0102_0003,
            xy(0, 4),
            0x0000_0300,
        ],
    );

    assert_eq!(gpu.vram().get_pixel(0, 0), 0x0000_F800);
    // Status now reports the polygon's page
    let status = gpu.status_fields();
    assert_eq!(status.texture_page_x, 2);
    assert_eq!(status.texture_depth, TextureDepth::T15Bit);
}

#[test]
fn test_display_surface_refresh() {
    let mut gpu = GPU::new();
    let mut surface = FrameSurface::with_view(SurfaceView::Display);
    send(&mut gpu, &[0x0211_2233, xy(0, 0), xy(16, 16)]);

    // Display starts disabled after reset
    surface.refresh(&gpu);
    assert_eq!(&surface.pixels()[..4], &[0, 0, 0, 0xFF]);

    gpu.write_gp1(0x0300_0000).unwrap();
    surface.refresh(&gpu);
    assert_eq!(&surface.pixels()[..4], &[0x33, 0x22, 0x11, 0xFF]);
    assert_eq!(surface.pixels().len(), 256 * 240 * 4);
}

#[test]
fn test_display_surface_24bit() {
    let mut gpu = GPU::new();
    let mut surface = FrameSurface::with_view(SurfaceView::Display);
    gpu.write_gp1(0x0300_0000).unwrap();
    gpu.write_gp1(0x0800_0010).unwrap();
    gpu.drain_render(&mut surface);

    // One pixel spread over two VRAM words: R G | B -
    upload_row(&mut gpu, 0, 0, &[0x2211, 0x0033]);
    surface.refresh(&gpu);
    assert_eq!(&surface.pixels()[..3], &[0x11, 0x22, 0x33]);
}

#[test]
fn test_vram_viewer_and_ppm() {
    let mut gpu = GPU::new();
    let mut surface = FrameSurface::with_view(SurfaceView::VramViewer);
    send(&mut gpu, &[0x0200_00FF, xy(512, 256), xy(16, 1)]);
    surface.refresh(&gpu);

    let offset = (256 * 1024 + 512) * 4;
    assert_eq!(&surface.pixels()[offset..offset + 4], &[0xFF, 0, 0, 0xFF]);

    let ppm = surface.to_ppm();
    let header = b"P6\n1024 512\n255\n";
    assert!(ppm.starts_with(header));
    assert_eq!(ppm.len(), header.len() + 1024 * 512 * 3);
}
