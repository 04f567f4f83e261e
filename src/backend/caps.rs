use crate::pixel::format::PixelFormat;

/// Optional display capabilities a caller may query or toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Fullscreen presentation.
    FullscreenMode,
    /// Aspect-ratio correction of non-square pixels.
    AspectRatioCorrection,
    /// Bilinear filtering when scaling.
    FilteringMode,
    /// Selectable stretch modes.
    StretchMode,
    /// The cursor may use its own palette instead of the game palette.
    CursorPalette,
    /// Cursor sprites may carry per-pixel alpha.
    CursorAlpha,
    /// The overlay may carry per-pixel alpha.
    OverlaySupportsAlpha,
    /// Explicit vertical-sync control.
    VSync,
}

/// One selectable display mode. A single all-zero entry means "no selectable modes".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphicsMode {
    /// Short mode name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Mode identifier.
    pub id: i32,
}

impl GraphicsMode {
    /// The all-zero terminator entry.
    pub const SENTINEL: Self = Self {
        name: "",
        description: "",
        id: 0,
    };
}

static NO_GRAPHICS_MODES: [GraphicsMode; 1] = [GraphicsMode::SENTINEL];

/// Formats the software compositor accepts for the game surface, highest fidelity first.
///
/// The indexed format stays last: callers that don't care fall back to it.
pub(crate) fn supported_formats() -> Vec<PixelFormat> {
    vec![
        PixelFormat::rgba8888_native(),
        PixelFormat::RGB565,
        PixelFormat::RGB555_A1,
        PixelFormat::CLUT8,
    ]
}

pub(crate) fn supported_graphics_modes() -> &'static [GraphicsMode] {
    &NO_GRAPHICS_MODES
}

pub(crate) fn has_feature(f: Feature) -> bool {
    matches!(f, Feature::CursorPalette | Feature::CursorAlpha)
}

#[cfg(test)]
#[path = "../../tests/unit/backend/caps.rs"]
mod tests;
