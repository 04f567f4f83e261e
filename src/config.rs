use crate::foundation::error::{SurfError, SurfResult};
use crate::render::display::ScalingMode;
use anyhow::Context as _;
use std::path::Path;

/// Default output (and initial overlay) width.
pub const DEFAULT_OUTPUT_WIDTH: u32 = 640;
/// Default output (and initial overlay) height.
pub const DEFAULT_OUTPUT_HEIGHT: u32 = 480;

const MAX_OUTPUT_DIM: u32 = 4096;

/// Construction options for a compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositorOpts {
    /// Fixed output surface width, also the initial overlay width.
    pub output_width: u32,
    /// Fixed output surface height, also the initial overlay height.
    pub output_height: u32,
    /// How the active source maps into the output.
    pub scaling: ScalingMode,
    /// Honour the key colour of cursors that set one.
    pub apply_cursor_key: bool,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            output_width: DEFAULT_OUTPUT_WIDTH,
            output_height: DEFAULT_OUTPUT_HEIGHT,
            scaling: ScalingMode::Stretch,
            apply_cursor_key: true,
        }
    }
}

impl CompositorOpts {
    /// Return options with a different scaling mode.
    pub fn with_scaling(mut self, scaling: ScalingMode) -> Self {
        self.scaling = scaling;
        self
    }

    /// Check option invariants.
    pub fn validate(&self) -> SurfResult<()> {
        for (name, v) in [
            ("output_width", self.output_width),
            ("output_height", self.output_height),
        ] {
            if v == 0 || v > MAX_OUTPUT_DIM {
                return Err(SurfError::validation(format!(
                    "{name} must be in 1..={MAX_OUTPUT_DIM}, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate options from JSON.
    pub fn from_json_str(s: &str) -> SurfResult<Self> {
        let opts: Self = serde_json::from_str(s).map_err(|e| SurfError::serde(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Read, parse and validate options from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> SurfResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read compositor options '{}'", path.display()))?;
        Self::from_json_str(&s)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
