//! Processor configuration
//!
//! Loaded from JSON. Every field has a default, so a partial file (or `{}`)
//! is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::engine::render::DEFAULT_MAX_SAMPLES;
use crate::error::Result;

const MIB: u64 = 1024 * 1024;

/// Default input ceiling (150 MiB)
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 150 * MIB;

/// Input ceiling of the compact preset (15 MiB)
pub const COMPACT_MAX_INPUT_BYTES: u64 = 15 * MIB;

/// Prefix of generated output file names
pub const DEFAULT_OUTPUT_PREFIX: &str = "GOH_REMIX_";

/// Settings for a [`Processor`](crate::pipeline::Processor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Inputs larger than this are rejected before decoding
    pub max_input_bytes: u64,
    /// Prepended to the output file stem
    pub output_prefix: String,
    /// Override for the renderer's output limit in samples
    pub max_render_samples: Option<u64>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self::extended()
    }
}

impl ProcessorConfig {
    /// 15 MiB input ceiling
    pub fn compact() -> Self {
        Self {
            max_input_bytes: COMPACT_MAX_INPUT_BYTES,
            ..Self::extended()
        }
    }

    /// 150 MiB input ceiling
    pub fn extended() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            max_render_samples: None,
        }
    }

    /// Set the input ceiling in mebibytes
    pub fn with_max_input_mb(mut self, megabytes: u64) -> Self {
        self.max_input_bytes = megabytes.saturating_mul(MIB);
        self
    }

    /// Sample limit the renderer should use
    pub fn render_sample_limit(&self) -> u64 {
        self.max_render_samples.unwrap_or(DEFAULT_MAX_SAMPLES)
    }

    /// Load a configuration file
    ///
    /// # Errors
    /// * `Io` - the file cannot be read
    /// * `Config` - the file is not valid configuration JSON
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
