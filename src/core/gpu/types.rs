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

//! GPU operand types
//!
//! Small value types decoded out of GP0 command words: colors, vertices,
//! texture coordinates, CLUT and texture page references.

/// A 24-bit RGB color used in GPU commands
///
/// PlayStation GPU commands carry 24-bit colors (8 bits per channel) in the
/// low 24 bits of a command word, red in the lowest byte.
///
/// # Examples
///
/// ```
/// use psrx_gpu::core::gpu::Color;
///
/// let color = Color::from_u32(0x00FF8040);
/// assert_eq!(color.r, 0x40);
/// assert_eq!(color.g, 0x80);
/// assert_eq!(color.b, 0xFF);
/// assert_eq!(color.to_u32(), 0x00FF8040);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Color {
    /// Create a Color from a 32-bit command word
    ///
    /// # Arguments
    ///
    /// * `value` - 32-bit word containing RGB color in bits 0-23
    pub fn from_u32(value: u32) -> Self {
        Self {
            r: (value & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: ((value >> 16) & 0xFF) as u8,
        }
    }

    /// Pack back into the `0x00BBGGRR` layout used by the VRAM 24-bit store
    pub fn to_u32(self) -> u32 {
        (self.r as u32) | ((self.g as u32) << 8) | ((self.b as u32) << 16)
    }

    /// Channels as signed integers, for interpolation
    #[inline(always)]
    pub(in crate::core::gpu) fn channels(self) -> [i64; 3] {
        [self.r as i64, self.g as i64, self.b as i64]
    }
}

/// A 2D vertex position
///
/// Vertex coordinates are signed 11-bit values (-1024..=1023). The upper bits
/// of each 16-bit half are ignored by the hardware, so they are sign-extended
/// from bit 10 here.
///
/// # Examples
///
/// ```
/// use psrx_gpu::core::gpu::Vertex;
///
/// let v = Vertex::from_u32(0x0064_0032);
/// assert_eq!((v.x, v.y), (50, 100));
///
/// // 0x7FF is -1 in 11-bit two's complement
/// let v = Vertex::from_u32(0x07FF_07FF);
/// assert_eq!((v.x, v.y), (-1, -1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vertex {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
}

impl Vertex {
    /// Create a Vertex from a 32-bit command word
    ///
    /// - Bits 0-10: X coordinate (signed)
    /// - Bits 16-26: Y coordinate (signed)
    pub fn from_u32(value: u32) -> Self {
        Self {
            x: sign_extend_11(value & 0x7FF),
            y: sign_extend_11((value >> 16) & 0x7FF),
        }
    }

    /// Translate by a draw offset
    #[inline(always)]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Sign-extend an 11-bit value
#[inline(always)]
pub fn sign_extend_11(value: u32) -> i32 {
    ((value << 21) as i32) >> 21
}

/// Texture coordinate for textured primitives
///
/// # Examples
///
/// ```
/// use psrx_gpu::core::gpu::TexCoord;
///
/// let tc = TexCoord::from_u32(0x7FFF_4020);
/// assert_eq!(tc.u, 0x20);
/// assert_eq!(tc.v, 0x40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TexCoord {
    /// U coordinate (horizontal, 0-255)
    pub u: u8,
    /// V coordinate (vertical, 0-255)
    pub v: u8,
}

impl TexCoord {
    /// Create a TexCoord from the low 16 bits of a command word
    pub fn from_u32(value: u32) -> Self {
        Self {
            u: (value & 0xFF) as u8,
            v: ((value >> 8) & 0xFF) as u8,
        }
    }
}

/// CLUT (color lookup table) location
///
/// Carried in the upper half of the first texture coordinate word of a
/// textured primitive. X is in 16-pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Clut {
    /// CLUT X position in VRAM pixels
    pub x: u32,
    /// CLUT Y position in VRAM pixels
    pub y: u32,
}

impl Clut {
    /// Decode from the upper 16 bits of a texture coordinate word
    pub fn from_u32(value: u32) -> Self {
        let clut = value >> 16;
        Self {
            x: (clut & 0x3F) * 16,
            y: (clut >> 6) & 0x1FF,
        }
    }
}

/// Texture color depth
///
/// The fourth encoding is reserved on hardware and samples like 15-bit; it is
/// kept as its own variant so the Status word round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureDepth {
    /// 4-bit indexed color (16 colors, uses CLUT)
    #[default]
    T4Bit,
    /// 8-bit indexed color (256 colors, uses CLUT)
    T8Bit,
    /// 15-bit direct color (no CLUT)
    T15Bit,
    /// Reserved encoding (samples as 15-bit)
    Reserved,
}

impl TextureDepth {
    /// Decode from a 2-bit field
    pub fn from_bits(value: u32) -> Self {
        match value & 3 {
            0 => TextureDepth::T4Bit,
            1 => TextureDepth::T8Bit,
            2 => TextureDepth::T15Bit,
            _ => TextureDepth::Reserved,
        }
    }

    /// Encode to a 2-bit field
    pub fn bits(self) -> u32 {
        match self {
            TextureDepth::T4Bit => 0,
            TextureDepth::T8Bit => 1,
            TextureDepth::T15Bit => 2,
            TextureDepth::Reserved => 3,
        }
    }
}

/// Semi-transparency formula
///
/// - 0: 0.5×Back + 0.5×Front
/// - 1: 1.0×Back + 1.0×Front
/// - 2: 1.0×Back - 1.0×Front
/// - 3: 1.0×Back + 0.25×Front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SemiTransparency {
    #[default]
    Average,
    Add,
    Subtract,
    AddQuarter,
}

impl SemiTransparency {
    /// Decode from a 2-bit field
    pub fn from_bits(value: u32) -> Self {
        match value & 3 {
            0 => SemiTransparency::Average,
            1 => SemiTransparency::Add,
            2 => SemiTransparency::Subtract,
            _ => SemiTransparency::AddQuarter,
        }
    }

    /// Encode to a 2-bit field
    pub fn bits(self) -> u32 {
        match self {
            SemiTransparency::Average => 0,
            SemiTransparency::Add => 1,
            SemiTransparency::Subtract => 2,
            SemiTransparency::AddQuarter => 3,
        }
    }
}

/// Texture page reference
///
/// Polygons carry their own page in the upper half of the second texture
/// coordinate word; rectangles use the page currently set in Status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TexPage {
    /// Page base X in VRAM pixels (multiple of 64)
    pub base_x: u32,
    /// Page base Y in VRAM pixels (0 or 256)
    pub base_y: u32,
    /// Semi-transparency formula requested by the page attribute
    pub semi_transparency: SemiTransparency,
    /// Texel depth
    pub depth: TextureDepth,
    /// Texture disable bit (honoured only when GP1 0x09 allows it)
    pub texture_disable: bool,
}

impl TexPage {
    /// Decode a texture page attribute (the same layout as GP0 0xE1 bits 0-11)
    ///
    /// # Examples
    ///
    /// ```
    /// use psrx_gpu::core::gpu::{TexPage, TextureDepth};
    ///
    /// // X base 2*64, Y base 256, 8-bit depth
    /// let page = TexPage::from_attribute(0x0092);
    /// assert_eq!(page.base_x, 128);
    /// assert_eq!(page.base_y, 256);
    /// assert_eq!(page.depth, TextureDepth::T8Bit);
    /// ```
    pub fn from_attribute(value: u32) -> Self {
        Self {
            base_x: (value & 0xF) * 64,
            base_y: ((value >> 4) & 1) * 256,
            semi_transparency: SemiTransparency::from_bits(value >> 5),
            depth: TextureDepth::from_bits(value >> 7),
            texture_disable: (value >> 11) & 1 != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_sign_extension() {
        // 0x400 is the most negative 11-bit value
        let v = Vertex::from_u32(0x0400_0400);
        assert_eq!(v.x, -1024);
        assert_eq!(v.y, -1024);

        // Bits above bit 10 are ignored
        let v = Vertex::from_u32(0xF805_F803);
        assert_eq!(v.x, 3);
        assert_eq!(v.y, 5);
    }

    #[test]
    fn test_clut_decode() {
        // CLUT word: x=2 (32 px), y=480
        let clut = Clut::from_u32((480 << 6 | 2) << 16);
        assert_eq!(clut.x, 32);
        assert_eq!(clut.y, 480);
    }

    #[test]
    fn test_depth_bits_roundtrip() {
        for bits in 0..4 {
            assert_eq!(TextureDepth::from_bits(bits).bits(), bits);
            assert_eq!(SemiTransparency::from_bits(bits).bits(), bits);
        }
    }
}
