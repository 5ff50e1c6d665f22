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

//! Presentation surface
//!
//! The RGBA pixel buffer handed to whatever displays frames. It is sized to
//! the active display resolution, or to the whole VRAM in the diagnostic
//! VRAM viewer mode, and is only ever resized on the render thread.

use serde::{Deserialize, Serialize};

use super::super::registers::{DisplayDepth, StatusFlags};
use super::super::vram::Vram;
use super::super::GPU;

/// What the surface shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceView {
    /// The display area at the active resolution
    #[default]
    Display,
    /// The full 1024×512 VRAM
    #[serde(rename = "vram")]
    VramViewer,
}

/// RGBA8 frame buffer
#[derive(Debug, Clone)]
pub struct FrameSurface {
    view: SurfaceView,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameSurface {
    /// Create a display surface of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            view: SurfaceView::Display,
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    /// Create a surface for a view, at that view's initial size
    pub fn with_view(view: SurfaceView) -> Self {
        let mut surface = match view {
            SurfaceView::Display => Self::new(256, 240),
            SurfaceView::VramViewer => Self::new(Vram::WIDTH as u32, Vram::HEIGHT as u32),
        };
        surface.view = view;
        surface
    }

    pub fn view(&self) -> SurfaceView {
        self.view
    }

    /// `(width, height)` in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// RGBA bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Reallocate for a new size; contents are cleared
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        log::debug!(
            "Resizing surface {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        self.width = width;
        self.height = height;
        self.pixels = vec![0; (width * height * 4) as usize];
    }

    /// Recompose the surface from VRAM
    pub fn refresh(&mut self, gpu: &GPU) {
        match self.view {
            SurfaceView::VramViewer => self.refresh_vram(&gpu.vram),
            SurfaceView::Display => self.refresh_display(gpu),
        }
    }

    fn put(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8) {
        let offset = ((y * self.width + x) * 4) as usize;
        self.pixels[offset..offset + 4].copy_from_slice(&[r, g, b, 0xFF]);
    }

    fn refresh_vram(&mut self, vram: &Vram) {
        let width = self.width.min(Vram::WIDTH as u32);
        let height = self.height.min(Vram::HEIGHT as u32);
        for y in 0..height {
            for x in 0..width {
                let c = vram.get_pixel(x, y);
                self.put(x, y, c as u8, (c >> 8) as u8, (c >> 16) as u8);
            }
        }
    }

    fn refresh_display(&mut self, gpu: &GPU) {
        if gpu.status.flags.contains(StatusFlags::DISPLAY_DISABLED) {
            for chunk in self.pixels.chunks_exact_mut(4) {
                chunk.copy_from_slice(&[0, 0, 0, 0xFF]);
            }
            return;
        }

        let start_x = gpu.display.start_x;
        let start_y = gpu.display.start_y;
        let depth = gpu.status.display_depth();

        for y in 0..self.height {
            let row = start_y + y;
            for x in 0..self.width {
                match depth {
                    DisplayDepth::D15Bits => {
                        let c = gpu.vram.get_pixel(start_x + x, row);
                        self.put(x, y, c as u8, (c >> 8) as u8, (c >> 16) as u8);
                    }
                    DisplayDepth::D24Bits => {
                        // Three bytes per pixel packed across 16-bit words
                        let byte = x * 3;
                        let at = |n: u32| {
                            let word = gpu.vram.get_pixel_15(start_x + n / 2, row);
                            if n & 1 == 0 {
                                word as u8
                            } else {
                                (word >> 8) as u8
                            }
                        };
                        self.put(x, y, at(byte), at(byte + 1), at(byte + 2));
                    }
                }
            }
        }
    }

    /// Encode as a binary PPM (P6) image
    pub fn to_ppm(&self) -> Vec<u8> {
        let header = format!("P6\n{} {}\n255\n", self.width, self.height);
        let mut out = Vec::with_capacity(header.len() + (self.width * self.height * 3) as usize);
        out.extend_from_slice(header.as_bytes());
        for chunk in self.pixels.chunks_exact(4) {
            out.extend_from_slice(&chunk[..3]);
        }
        out
    }
}
