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

//! GPU runtime configuration
//!
//! Read from a TOML file, then overridden by environment variables:
//!
//! | Variable            | Field            | Values            |
//! |---------------------|------------------|-------------------|
//! | `PSRX_GPU_VIEW`     | `view`           | `display`, `vram` |
//! | `PSRX_GPU_THREADED` | `threaded`       | `true`, `false`, `1`, `0` |
//! | `PSRX_GPU_TRACE`    | `trace_commands` | `true`, `false`, `1`, `0` |
//!
//! ```toml
//! view = "vram"
//! threaded = true
//! frame_ticks = 33868
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{EmulatorError, Result};
use crate::core::gpu::SurfaceView;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuConfig {
    /// What the presentation surface shows
    pub view: SurfaceView,

    /// Run rendering on the dedicated GPU thread
    pub threaded: bool,

    /// Log every GP0 word at debug level
    pub trace_commands: bool,

    /// CPU cycles per tick when replaying a trace (one NTSC frame by default)
    pub frame_ticks: u32,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            view: SurfaceView::Display,
            threaded: false,
            trace_commands: false,
            frame_ticks: 564_480,
        }
    }
}

impl GpuConfig {
    /// Read a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml(&contents)?;
        log::debug!("Loaded GPU config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| EmulatorError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Apply `PSRX_GPU_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable source
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(view) = lookup("PSRX_GPU_VIEW") {
            self.view = match view.trim().to_ascii_lowercase().as_str() {
                "display" => SurfaceView::Display,
                "vram" => SurfaceView::VramViewer,
                other => {
                    return Err(EmulatorError::Config(format!(
                        "PSRX_GPU_VIEW: unknown view '{}'",
                        other
                    )))
                }
            };
        }
        if let Some(value) = lookup("PSRX_GPU_THREADED") {
            self.threaded = parse_flag("PSRX_GPU_THREADED", &value)?;
        }
        if let Some(value) = lookup("PSRX_GPU_TRACE") {
            self.trace_commands = parse_flag("PSRX_GPU_TRACE", &value)?;
        }
        Ok(())
    }

    /// Pretty JSON for diagnostics
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| EmulatorError::Config(e.to_string()))
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(EmulatorError::Config(format!(
            "{}: expected a boolean, got '{}'",
            name, other
        ))),
    }
}
