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

/// Emulator error types
use thiserror::Error;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Main error type for the emulator
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("Invalid memory access at 0x{address:08X}")]
    InvalidMemoryAccess { address: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Save state error: {0}")]
    SaveState(String),

    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
}

/// GPU-specific error types
///
/// Every variant is fatal: the GPU core has no degraded mode, so an error
/// here means the caller (or the emulated software) did something the core
/// does not model.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GpuError {
    #[error("Misaligned register access: {size}-byte access at offset 0x{offset:X}")]
    MisalignedAccess { offset: u32, size: u8 },

    #[error("Write to {register} asserts read-only bits: {value:#010x}")]
    ReadOnlyBit { register: &'static str, value: u32 },

    #[error("Unknown GP0 opcode 0x{opcode:02X} (word {word:#010x})")]
    UnknownGp0Opcode { opcode: u8, word: u32 },

    #[error("Unknown GP1 command 0x{command:02X} (word {word:#010x})")]
    UnknownGp1Command { command: u8, word: u32 },

    #[error("Unsupported GPU feature: {0}")]
    Unsupported(String),

    #[error("DMA error: {0}")]
    DmaError(String),

    #[error("Command queue holds {pending} pending jobs")]
    QueueNotEmpty { pending: usize },

    #[error("GPU thread is no longer running")]
    ThreadDisconnected,
}
