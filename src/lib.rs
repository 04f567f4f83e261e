//! retrosurf is a software compositor for emulated displays.
//!
//! It owns an indexed game surface, a true-colour GUI overlay and a cursor sprite, and merges
//! them into a fixed-resolution RGB565 output on demand:
//!
//! - Negotiate a format through [`GraphicsBackend::supported_formats`]
//! - Size the active layer with [`GraphicsBackend::init_size`] and write pixels and palettes
//! - Mark the frame stale with [`GraphicsBackend::update_screen`]; the composite runs when the
//!   host's [`TimingCoordinator`] calls back into [`GraphicsBackend::present_if_pending`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod backend;
mod foundation;
pub(crate) mod render;

/// Compositor construction options.
pub mod config;
pub mod host;
pub mod pixel;
pub mod script;
/// Owned pixel buffers.
pub mod surface;

pub use crate::backend::{
    ActiveTarget, BackendKind, CursorImage, CursorState, Feature, GraphicsBackend, GraphicsMode,
    SoftwareCompositor, UpdateState, UpdateStats, create_backend,
};
pub use crate::config::CompositorOpts;
pub use crate::foundation::core::{PixelPoint, PixelRect, Rect, Rgb};
pub use crate::foundation::error::{SurfError, SurfResult};
pub use crate::host::{
    ChannelCoordinator, HostIntegration, HostServices, HostSettings, NoopIntegration, NoopTiming,
    ScreenInfo, StaticSettings, SwitchReason, TimingCoordinator,
};
pub use crate::pixel::format::{FormatName, PixelFormat};
pub use crate::pixel::palette::Palette;
pub use crate::render::display::{DisplayAreas, ScalingMode, logical_to_output, output_to_logical};
pub use crate::script::{RunSummary, Script, Step};
pub use crate::surface::Surface;
