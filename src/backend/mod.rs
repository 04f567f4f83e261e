//! The display-backend contract and its software implementation.
//!
//! Callers program against [`GraphicsBackend`]: format negotiation, surface and palette I/O,
//! cursor management, feature flags and the deferred screen update. [`create_backend`] picks the
//! implementation at construction time.

pub(crate) mod caps;
pub(crate) mod scheduler;
pub(crate) mod software;

use crate::config::CompositorOpts;
use crate::foundation::core::PixelPoint;
use crate::foundation::error::SurfResult;
use crate::host::HostServices;
use crate::pixel::format::PixelFormat;
use crate::surface::Surface;

pub use caps::{Feature, GraphicsMode};
pub use scheduler::{UpdateState, UpdateStats};
pub use software::{CursorState, SoftwareCompositor};

/// Which layer is the composite source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActiveTarget {
    /// The emulated application's surface (gameplay).
    #[default]
    Game,
    /// The GUI overlay.
    Overlay,
}

/// A cursor sprite handed to [`GraphicsBackend::set_mouse_cursor`].
///
/// `pixels` holds `width * height` tightly packed pixels in `format` (indexed when `None`). An
/// empty buffer or a zero dimension makes the update a no-op. Every pixel is drawn unless a key
/// colour is set.
#[derive(Clone, Copy, Debug)]
pub struct CursorImage<'a> {
    /// Raw sprite pixels.
    pub pixels: &'a [u8],
    /// Sprite width.
    pub width: u32,
    /// Sprite height.
    pub height: u32,
    /// Hotspot x offset within the sprite.
    pub hotspot_x: i32,
    /// Hotspot y offset within the sprite.
    pub hotspot_y: i32,
    /// Raw pixel value treated as transparent, if any.
    pub key_color: Option<u32>,
    /// Keep the sprite at native size regardless of game scaling.
    pub dont_scale: bool,
    /// Sprite pixel format; `None` means indexed.
    pub format: Option<PixelFormat>,
}

impl<'a> CursorImage<'a> {
    /// Indexed sprite with hotspot at the origin and no key colour.
    pub fn new(pixels: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
            hotspot_x: 0,
            hotspot_y: 0,
            key_color: None,
            dont_scale: false,
            format: None,
        }
    }

    /// Return the image with a hotspot.
    pub fn with_hotspot(mut self, x: i32, y: i32) -> Self {
        self.hotspot_x = x;
        self.hotspot_y = y;
        self
    }

    /// Return the image with a transparent key colour.
    pub fn with_key_color(mut self, key: u32) -> Self {
        self.key_color = Some(key);
        self
    }

    /// Return the image in an explicit pixel format.
    pub fn with_format(mut self, format: PixelFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Engine-facing display backend contract.
///
/// Surface, palette and cursor operations are infallible: malformed input is ignored and
/// out-of-range copies are clipped. All calls are expected from the single owning thread.
pub trait GraphicsBackend: Send {
    /// Formats accepted by [`GraphicsBackend::init_size`], highest fidelity first.
    fn supported_formats(&self) -> Vec<PixelFormat>;
    /// Selectable display modes.
    fn supported_graphics_modes(&self) -> &'static [GraphicsMode];
    /// Whether `f` is supported at all.
    fn has_feature(&self, f: Feature) -> bool;
    /// Current state of `f`; unsupported features read as `false`.
    fn feature_state(&self, f: Feature) -> bool;
    /// Toggle `f`; unsupported features are ignored.
    fn set_feature_state(&mut self, f: Feature, enable: bool);

    /// (Re)create the active layer at `width x height` and reflow display areas.
    fn init_size(&mut self, width: u32, height: u32, format: Option<PixelFormat>);
    /// Logical width of the game surface.
    fn width(&self) -> u32;
    /// Logical height of the game surface.
    fn height(&self) -> u32;
    /// Format of the game surface.
    fn screen_format(&self) -> PixelFormat;
    /// Copy raw pixels into the game surface. Never triggers a composite.
    fn copy_rect_to_screen(&mut self, buf: &[u8], pitch: usize, x: i32, y: i32, w: u32, h: u32);

    /// Current composite source.
    fn active_target(&self) -> ActiveTarget;
    /// Make the overlay the composite source.
    fn show_overlay(&mut self);
    /// Make the game surface the composite source.
    fn hide_overlay(&mut self);
    /// Fill the whole overlay with zero.
    fn clear_overlay(&mut self);
    /// Copy the overlay (shape, format and pixels) into `dest`.
    fn grab_overlay(&self, dest: &mut Surface);
    /// Copy raw pixels into the overlay.
    fn copy_rect_to_overlay(&mut self, buf: &[u8], pitch: usize, x: i32, y: i32, w: u32, h: u32);
    /// Overlay width.
    fn overlay_width(&self) -> u32;
    /// Overlay height.
    fn overlay_height(&self) -> u32;
    /// Overlay format.
    fn overlay_format(&self) -> PixelFormat;

    /// Set game palette entries `[start, start + num)` from packed RGB.
    fn set_palette(&mut self, colors: &[u8], start: usize, num: usize);
    /// Read game palette entries `[start, start + num)` as packed RGB.
    fn grab_palette(&self, colors: &mut [u8], start: usize, num: usize);
    /// Set cursor palette entries and enable the cursor palette.
    fn set_cursor_palette(&mut self, colors: &[u8], start: usize, num: usize);

    /// Show or hide the cursor, returning the previous visibility.
    fn show_mouse(&mut self, visible: bool) -> bool;
    /// Move the pointer to a logical position of the active layer.
    fn warp_mouse(&mut self, x: i32, y: i32);
    /// Move the pointer to an output-space position reported by the host.
    fn set_pointer_position(&mut self, p: PixelPoint);
    /// Current pointer position in output space.
    fn pointer_position(&self) -> PixelPoint;
    /// Replace the cursor sprite, hotspot, key colour and scaling flag.
    fn set_mouse_cursor(&mut self, cursor: &CursorImage<'_>);

    /// Mark the output stale and, during strict gameplay, offer the coordinator a switch.
    fn update_screen(&mut self);
    /// Composite the active layer and cursor into the output now.
    fn real_update_screen(&mut self);
    /// Whether an `update_screen` is waiting for its composite.
    fn is_update_pending(&self) -> bool;
    /// Composite only if an update is pending. Returns whether a composite ran.
    fn present_if_pending(&mut self) -> bool {
        if !self.is_update_pending() {
            return false;
        }
        self.real_update_screen();
        true
    }
    /// The composited output surface.
    fn screen(&self) -> &Surface;
}

/// Available backend implementations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// CPU compositor over in-memory surfaces.
    #[default]
    Software,
}

/// Create a display backend.
pub fn create_backend(
    kind: BackendKind,
    opts: CompositorOpts,
    host: HostServices,
) -> SurfResult<Box<dyn GraphicsBackend>> {
    match kind {
        BackendKind::Software => Ok(Box::new(SoftwareCompositor::new(opts, host)?)),
    }
}
