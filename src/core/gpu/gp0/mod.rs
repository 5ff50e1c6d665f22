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

//! GP0 command decoder
//!
//! GP0 is a word stream. The high byte of the first word of every command
//! selects an entry in a fixed 256-slot table giving the command's total
//! word count and its builder. The decoder accumulates words until the count
//! is reached, then the builder turns them into one [`GpuJob`].
//!
//! ```text
//!            opcode word                 count reached
//!   Idle ───────────────────► Command ───────────────────► Idle (+ job)
//!                                │
//!                                │ 0xA0 header complete
//!                                ▼
//!                            ImageLoad ── ceil(w*h/2) data words ──► Idle (+ job)
//! ```
//!
//! # Word counts
//!
//! | Opcode    | Words |
//! |-----------|-------|
//! | 00 01 1F  | 1 |
//! | 02        | 3 |
//! | 20-3F     | 1 + n + (textured ? n : 0) + (shaded ? n-1 : 0) |
//! | 40-5F     | 3 flat / 4 shaded (polylines unsupported) |
//! | 60-7F     | 2 + textured + variable size |
//! | 80-9F     | 4 |
//! | A0-BF     | 3 + payload |
//! | C0-DF     | 3 |
//! | E1-E6     | 1 |

mod drawing_mode;
mod fill;
mod line;
mod polygon;
mod rectangle;
mod transfer;

use super::queue::GpuJob;
use crate::core::error::{GpuError, Result};

/// Builds a job from a complete command
pub type Builder = fn(&[u32]) -> Result<GpuJob>;

/// One GP0 opcode table slot
#[derive(Clone, Copy)]
pub struct Gp0Entry {
    /// Total words including the opcode word
    pub words: usize,
    pub build: Builder,
    pub name: &'static str,
}

const fn entry(words: usize, build: Builder, name: &'static str) -> Option<Gp0Entry> {
    Some(Gp0Entry { words, build, name })
}

const fn polygon_words(opcode: usize) -> usize {
    let n = if opcode & 0x08 != 0 { 4 } else { 3 };
    let textured = if opcode & 0x04 != 0 { n } else { 0 };
    let shaded = if opcode & 0x10 != 0 { n - 1 } else { 0 };
    1 + n + textured + shaded
}

const fn rectangle_words(opcode: usize) -> usize {
    let textured = if opcode & 0x04 != 0 { 1 } else { 0 };
    let variable = if (opcode >> 3) & 3 == 0 { 1 } else { 0 };
    2 + textured + variable
}

const fn build_table() -> [Option<Gp0Entry>; 256] {
    let mut table: [Option<Gp0Entry>; 256] = [None; 256];

    table[0x00] = entry(1, drawing_mode::build_nop, "nop");
    table[0x01] = entry(1, drawing_mode::build_clear_cache, "clear cache");
    table[0x02] = entry(3, fill::build_fill, "fill rectangle");
    table[0x1F] = entry(1, drawing_mode::build_interrupt_request, "interrupt request");

    let mut op = 0x20;
    while op < 0x40 {
        table[op] = entry(polygon_words(op), polygon::build_polygon, "polygon");
        op += 1;
    }

    while op < 0x60 {
        table[op] = if op & 0x08 != 0 {
            entry(1, line::build_polyline, "polyline")
        } else if op & 0x10 != 0 {
            entry(4, line::build_line, "shaded line")
        } else {
            entry(3, line::build_line, "line")
        };
        op += 1;
    }

    while op < 0x80 {
        table[op] = entry(rectangle_words(op), rectangle::build_rectangle, "rectangle");
        op += 1;
    }

    while op < 0xA0 {
        table[op] = entry(4, transfer::build_vram_to_vram, "VRAM→VRAM copy");
        op += 1;
    }

    while op < 0xC0 {
        table[op] = entry(3, transfer::build_cpu_to_vram, "CPU→VRAM copy");
        op += 1;
    }

    while op < 0xE0 {
        table[op] = entry(3, transfer::build_vram_to_cpu, "VRAM→CPU copy");
        op += 1;
    }

    table[0xE1] = entry(1, drawing_mode::build_draw_mode, "draw mode");
    table[0xE2] = entry(1, drawing_mode::build_texture_window, "texture window");
    table[0xE3] = entry(1, drawing_mode::build_draw_area_top_left, "draw area top-left");
    table[0xE4] = entry(1, drawing_mode::build_draw_area_bottom_right, "draw area bottom-right");
    table[0xE5] = entry(1, drawing_mode::build_draw_offset, "draw offset");
    table[0xE6] = entry(1, drawing_mode::build_mask_bits, "mask bit setting");

    table
}

/// Opcode dispatch table
pub static GP0_TABLE: [Option<Gp0Entry>; 256] = build_table();

/// Look up the table entry of a command word
pub fn lookup(word: u32) -> Result<Gp0Entry> {
    let opcode = (word >> 24) as u8;
    GP0_TABLE[opcode as usize].ok_or_else(|| GpuError::UnknownGp0Opcode { opcode, word }.into())
}

#[derive(Default)]
enum DecoderState {
    #[default]
    Idle,
    Command {
        entry: Gp0Entry,
        words: Vec<u32>,
    },
    ImageLoad {
        job: GpuJob,
        remaining: usize,
    },
}

/// Reassembles the GP0 word stream into jobs
#[derive(Default)]
pub struct Gp0Decoder {
    state: DecoderState,
}

impl Gp0Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one word
    ///
    /// # Returns
    ///
    /// The completed job, if this word finished a command.
    ///
    /// # Errors
    ///
    /// `UnknownGp0Opcode` for opcodes outside the table and `Unsupported`
    /// for polylines. The decoder is idle afterwards.
    pub fn push(&mut self, word: u32) -> Result<Option<GpuJob>> {
        log::trace!("GP0 word 0x{:08X}", word);

        match std::mem::take(&mut self.state) {
            DecoderState::Idle => {
                let entry = lookup(word)?;
                self.accumulate(entry, vec![word])
            }
            DecoderState::Command { entry, mut words } => {
                words.push(word);
                self.accumulate(entry, words)
            }
            DecoderState::ImageLoad { mut job, remaining } => {
                if let GpuJob::CopyCpuToVram(load) = &mut job {
                    load.data.push(word);
                }
                if remaining > 1 {
                    self.state = DecoderState::ImageLoad {
                        job,
                        remaining: remaining - 1,
                    };
                    Ok(None)
                } else {
                    Ok(Some(job))
                }
            }
        }
    }

    fn accumulate(&mut self, entry: Gp0Entry, words: Vec<u32>) -> Result<Option<GpuJob>> {
        if words.len() < entry.words {
            self.state = DecoderState::Command { entry, words };
            return Ok(None);
        }

        let job = (entry.build)(&words)?;
        log::trace!("GP0 decoded {} ({} words)", entry.name, words.len());

        if let GpuJob::CopyCpuToVram(load) = &job {
            let remaining = load.rect.word_count();
            self.state = DecoderState::ImageLoad { job, remaining };
            return Ok(None);
        }

        Ok(Some(job))
    }

    /// Whether no command is partially received
    pub fn is_idle(&self) -> bool {
        matches!(self.state, DecoderState::Idle)
    }

    /// Words buffered for the command in progress
    pub fn buffered_words(&self) -> usize {
        match &self.state {
            DecoderState::Idle => 0,
            DecoderState::Command { words, .. } => words.len(),
            DecoderState::ImageLoad { job, .. } => match job {
                GpuJob::CopyCpuToVram(load) => 3 + load.data.len(),
                _ => 0,
            },
        }
    }

    /// Drop any partially received command
    pub fn reset(&mut self) {
        self.state = DecoderState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_word_counts() {
        let words = |op: usize| GP0_TABLE[op].map(|e| e.words);

        assert_eq!(words(0x00), Some(1));
        assert_eq!(words(0x02), Some(3));
        assert_eq!(words(0x20), Some(4));
        assert_eq!(words(0x28), Some(5));
        assert_eq!(words(0x2C), Some(9));
        assert_eq!(words(0x30), Some(6));
        assert_eq!(words(0x34), Some(9));
        assert_eq!(words(0x38), Some(8));
        assert_eq!(words(0x3C), Some(12));
        assert_eq!(words(0x40), Some(3));
        assert_eq!(words(0x50), Some(4));
        assert_eq!(words(0x60), Some(3));
        assert_eq!(words(0x64), Some(4));
        assert_eq!(words(0x68), Some(2));
        assert_eq!(words(0x7C), Some(3));
        assert_eq!(words(0x80), Some(4));
        assert_eq!(words(0xA0), Some(3));
        assert_eq!(words(0xC0), Some(3));
        assert_eq!(words(0xE1), Some(1));
        assert_eq!(words(0xE6), Some(1));
        assert_eq!(words(0x03), None);
        assert_eq!(words(0xE0), None);
        assert_eq!(words(0xE7), None);
        assert_eq!(words(0xFF), None);
    }

    #[test]
    fn test_unknown_opcode_is_fatal() {
        let mut decoder = Gp0Decoder::new();
        let err = decoder.push(0xE700_0000).unwrap_err();
        assert!(matches!(
            err,
            crate::core::EmulatorError::Gpu(GpuError::UnknownGp0Opcode { opcode: 0xE7, .. })
        ));
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_image_load_collects_payload() {
        let mut decoder = Gp0Decoder::new();
        assert_eq!(decoder.push(0xA000_0000).unwrap(), None);
        assert_eq!(decoder.push(0x0000_0000).unwrap(), None);
        // 3x1 -> 2 payload words
        assert_eq!(decoder.push(0x0001_0003).unwrap(), None);
        assert_eq!(decoder.push(0x2222_1111).unwrap(), None);
        assert_eq!(decoder.buffered_words(), 4);

        let job = decoder.push(0x0000_3333).unwrap();
        match job {
            Some(GpuJob::CopyCpuToVram(load)) => {
                assert_eq!(load.data, vec![0x2222_1111, 0x0000_3333]);
            }
            other => panic!("unexpected job {:?}", other),
        }
        assert!(decoder.is_idle());
        assert_eq!(decoder.buffered_words(), 0);
    }
}
