//! Serde-described backend sessions.
//!
//! A [`Script`] is a list of engine-side operations replayed against a [`GraphicsBackend`]. The
//! CLI and the fixture tests use it to drive a compositor deterministically from JSON.

use crate::backend::{BackendKind, CursorImage, GraphicsBackend, create_backend};
use crate::config::CompositorOpts;
use crate::foundation::core::{PixelPoint, PixelRect, Rgb};
use crate::foundation::error::{SurfError, SurfResult};
use crate::host::{HostServices, StaticSettings};
use crate::pixel::format::{FormatName, PixelFormat};
use anyhow::Context as _;
use std::path::Path;

/// A compositor configuration plus the operations to replay on it.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Options for the backend built by [`Script::build_backend`].
    #[serde(default)]
    pub opts: CompositorOpts,
    /// Host settings the backend consults on every update.
    #[serde(default)]
    pub settings: StaticSettings,
    /// Operations, applied in order.
    pub steps: Vec<Step>,
}

/// One backend operation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    /// [`GraphicsBackend::init_size`] on the active layer.
    InitSize {
        /// Logical width.
        width: u32,
        /// Logical height.
        height: u32,
        /// Layer format; the layer default when absent.
        #[serde(default)]
        format: Option<FormatName>,
    },
    /// Set game palette entries from `start`.
    SetPalette {
        /// First entry.
        #[serde(default)]
        start: usize,
        /// Entry colours.
        colors: Vec<Rgb>,
    },
    /// Set cursor palette entries from `start` (enables the cursor palette).
    SetCursorPalette {
        /// First entry.
        #[serde(default)]
        start: usize,
        /// Entry colours.
        colors: Vec<Rgb>,
    },
    /// Fill a game-surface rectangle with one raw pixel value.
    FillScreen {
        /// Target rectangle, clipped to the surface.
        rect: PixelRect,
        /// Raw value in the game format (a palette index for CLUT8).
        value: u32,
    },
    /// Fill an overlay rectangle with a colour encoded in the overlay format.
    FillOverlay {
        /// Target rectangle, clipped to the surface.
        rect: PixelRect,
        /// Fill colour.
        color: Rgb,
    },
    /// Zero the overlay.
    ClearOverlay,
    /// Replace the cursor sprite with indexed pixels.
    SetCursor {
        /// Sprite width.
        width: u32,
        /// Sprite height.
        height: u32,
        /// Row-major palette indices.
        pixels: Vec<u8>,
        /// Hotspot within the sprite.
        #[serde(default)]
        hotspot: PixelPoint,
        /// Transparent index; every pixel is drawn when absent.
        #[serde(default)]
        key_color: Option<u32>,
    },
    /// Pointer position in output space.
    Pointer {
        /// Horizontal output coordinate.
        x: i32,
        /// Vertical output coordinate.
        y: i32,
    },
    /// Pointer position in logical space of the active layer.
    WarpMouse {
        /// Horizontal logical coordinate.
        x: i32,
        /// Vertical logical coordinate.
        y: i32,
    },
    /// Show or hide the cursor.
    ShowMouse {
        /// New visibility.
        visible: bool,
    },
    /// Make the overlay the composite source.
    ShowOverlay,
    /// Make the game surface the composite source.
    HideOverlay,
    /// Request a deferred update, then present it.
    UpdateScreen,
}

/// Outcome of [`Script::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Steps applied.
    pub steps: usize,
    /// Composites that actually ran.
    pub composites: usize,
}

impl Script {
    /// Parse a script from JSON.
    pub fn from_json_str(s: &str) -> SurfResult<Self> {
        let script: Self = serde_json::from_str(s).map_err(|e| SurfError::serde(e.to_string()))?;
        script.opts.validate()?;
        Ok(script)
    }

    /// Read and parse a script from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> SurfResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read script '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Build a detached software backend configured by this script.
    pub fn build_backend(&self) -> SurfResult<Box<dyn GraphicsBackend>> {
        let host = HostServices::detached().with_settings(self.settings);
        create_backend(BackendKind::Software, self.opts, host)
    }

    /// Apply every step to `backend`. Each `update_screen` is followed by
    /// [`GraphicsBackend::present_if_pending`].
    #[tracing::instrument(skip_all, fields(steps = self.steps.len()))]
    pub fn run(&self, backend: &mut dyn GraphicsBackend) -> RunSummary {
        let mut summary = RunSummary::default();
        for step in &self.steps {
            if apply_step(backend, step) {
                summary.composites += 1;
            }
            summary.steps += 1;
        }
        summary
    }
}

fn packed(colors: &[Rgb]) -> Vec<u8> {
    colors.iter().flat_map(|c| [c.r, c.g, c.b]).collect()
}

fn solid_block(format: PixelFormat, rect: PixelRect, value: u32) -> (Vec<u8>, usize) {
    let bpp = format.bpp();
    let pitch = rect.width as usize * bpp;
    let mut buf = vec![0u8; pitch * rect.height as usize];
    for px in buf.chunks_exact_mut(bpp) {
        format.write_raw(px, value);
    }
    (buf, pitch)
}

fn apply_step(backend: &mut dyn GraphicsBackend, step: &Step) -> bool {
    match step {
        Step::InitSize {
            width,
            height,
            format,
        } => backend.init_size(*width, *height, format.map(PixelFormat::from)),
        Step::SetPalette { start, colors } => {
            backend.set_palette(&packed(colors), *start, colors.len());
        }
        Step::SetCursorPalette { start, colors } => {
            backend.set_cursor_palette(&packed(colors), *start, colors.len());
        }
        Step::FillScreen { rect, value } => {
            let bounds = PixelRect::from_size(backend.width(), backend.height());
            let Some(clip) = rect.intersect(bounds) else {
                return false;
            };
            let (buf, pitch) = solid_block(backend.screen_format(), clip, *value);
            backend.copy_rect_to_screen(&buf, pitch, clip.x, clip.y, clip.width, clip.height);
        }
        Step::FillOverlay { rect, color } => {
            let bounds = PixelRect::from_size(backend.overlay_width(), backend.overlay_height());
            let Some(clip) = rect.intersect(bounds) else {
                return false;
            };
            let format = backend.overlay_format();
            let value = format.rgb(color.r, color.g, color.b);
            let (buf, pitch) = solid_block(format, clip, value);
            backend.copy_rect_to_overlay(&buf, pitch, clip.x, clip.y, clip.width, clip.height);
        }
        Step::ClearOverlay => backend.clear_overlay(),
        Step::SetCursor {
            width,
            height,
            pixels,
            hotspot,
            key_color,
        } => {
            let mut image =
                CursorImage::new(pixels, *width, *height).with_hotspot(hotspot.x, hotspot.y);
            image.key_color = *key_color;
            backend.set_mouse_cursor(&image);
        }
        Step::Pointer { x, y } => backend.set_pointer_position(PixelPoint::new(*x, *y)),
        Step::WarpMouse { x, y } => backend.warp_mouse(*x, *y),
        Step::ShowMouse { visible } => {
            backend.show_mouse(*visible);
        }
        Step::ShowOverlay => backend.show_overlay(),
        Step::HideOverlay => backend.hide_overlay(),
        Step::UpdateScreen => {
            backend.update_screen();
            return backend.present_if_pending();
        }
    }
    false
}

#[cfg(test)]
#[path = "../tests/unit/script.rs"]
mod tests;
