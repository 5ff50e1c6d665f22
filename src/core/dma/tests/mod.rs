// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Unit tests for the GPU-facing DMA channels organized by category

mod channels;
mod helpers;
