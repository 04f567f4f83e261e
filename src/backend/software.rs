use crate::backend::caps::{self, Feature, GraphicsMode};
use crate::backend::scheduler::{UpdateScheduler, UpdateState, UpdateStats};
use crate::backend::{ActiveTarget, CursorImage, GraphicsBackend};
use crate::config::CompositorOpts;
use crate::foundation::core::{PixelPoint, PixelRect};
use crate::foundation::error::SurfResult;
use crate::host::{HostServices, ScreenInfo, SwitchReason};
use crate::pixel::format::PixelFormat;
use crate::pixel::palette::Palette;
use crate::render::blit::{blit_scaled, blit_sprite};
use crate::render::display::{DisplayAreas, ScalingMode, logical_to_output, output_to_logical};
use crate::surface::Surface;

/// Cursor attributes independent of the sprite pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorState {
    /// Whether the cursor is drawn.
    pub visible: bool,
    /// Hotspot offset within the sprite.
    pub hotspot: PixelPoint,
    /// Raw pixel value treated as transparent, if any.
    pub key_color: Option<u32>,
    /// Keep the sprite at native size regardless of game scaling.
    pub dont_scale: bool,
    /// Resolve indexed cursor pixels through the cursor palette instead of the game palette.
    pub palette_enabled: bool,
}

/// CPU compositor over four in-memory layers.
///
/// Owns the game surface, the GUI overlay, the cursor sprite and the fixed-resolution RGB565
/// output, plus the game and cursor palettes. Content writes only touch the layers; the output
/// is rebuilt by [`GraphicsBackend::real_update_screen`].
pub struct SoftwareCompositor {
    opts: CompositorOpts,
    host: HostServices,

    game: Surface,
    overlay: Surface,
    cursor: Surface,
    screen: Surface,

    game_palette: Palette,
    cursor_palette: Palette,

    game_draw: PixelRect,
    overlay_draw: PixelRect,
    areas: DisplayAreas,

    target: ActiveTarget,
    cursor_state: CursorState,
    pointer: PixelPoint,
    scheduler: UpdateScheduler,
}

impl SoftwareCompositor {
    /// Build a compositor with its output and overlay at the configured resolution.
    #[tracing::instrument(skip(host))]
    pub fn new(opts: CompositorOpts, host: HostServices) -> SurfResult<Self> {
        opts.validate()?;
        let (w, h) = (opts.output_width, opts.output_height);
        let mut this = Self {
            opts,
            host,
            game: Surface::empty(PixelFormat::CLUT8),
            overlay: Surface::new(w, h, PixelFormat::RGB565),
            cursor: Surface::empty(PixelFormat::CLUT8),
            screen: Surface::new(w, h, PixelFormat::RGB565),
            game_palette: Palette::default(),
            cursor_palette: Palette::default(),
            game_draw: PixelRect::default(),
            overlay_draw: PixelRect::from_size(w, h),
            areas: DisplayAreas::new(w, h),
            target: ActiveTarget::Game,
            cursor_state: CursorState::default(),
            pointer: PixelPoint::default(),
            scheduler: UpdateScheduler::default(),
        };
        this.recalculate_display_areas();
        Ok(this)
    }

    /// Construction options.
    pub fn opts(&self) -> &CompositorOpts {
        &self.opts
    }

    /// The game layer.
    pub fn game_surface(&self) -> &Surface {
        &self.game
    }

    /// The GUI overlay layer.
    pub fn overlay_surface(&self) -> &Surface {
        &self.overlay
    }

    /// The cursor sprite.
    pub fn cursor_surface(&self) -> &Surface {
        &self.cursor
    }

    /// Cursor attributes.
    pub fn cursor_state(&self) -> CursorState {
        self.cursor_state
    }

    /// The game palette.
    pub fn game_palette(&self) -> &Palette {
        &self.game_palette
    }

    /// The cursor palette.
    pub fn cursor_palette(&self) -> &Palette {
        &self.cursor_palette
    }

    /// Game draw rectangle in logical space.
    pub fn game_draw_rect(&self) -> PixelRect {
        self.game_draw
    }

    /// Overlay draw rectangle in logical space.
    pub fn overlay_draw_rect(&self) -> PixelRect {
        self.overlay_draw
    }

    /// Output-space layer areas from the last reflow.
    pub fn display_areas(&self) -> DisplayAreas {
        self.areas
    }

    /// Clean/dirty state of the output.
    pub fn update_state(&self) -> UpdateState {
        self.scheduler.state()
    }

    /// Deferred-update counters.
    pub fn update_stats(&self) -> UpdateStats {
        self.scheduler.stats()
    }

    /// Pointer position in the logical space of the active layer.
    pub fn logical_pointer(&self) -> PixelPoint {
        let (area, draw) = self.active_geometry();
        output_to_logical(area, draw, self.pointer)
    }

    /// Geometry reported to the host for the active layer.
    pub fn screen_info(&self) -> ScreenInfo {
        let (area, draw) = self.active_geometry();
        let format = match self.target {
            ActiveTarget::Game => self.game.format(),
            ActiveTarget::Overlay => self.overlay.format(),
        };
        let aspect_ratio = if draw.is_empty() {
            self.opts.output_width as f32 / self.opts.output_height as f32
        } else {
            draw.width as f32 / draw.height as f32
        };
        ScreenInfo {
            logical_width: draw.width,
            logical_height: draw.height,
            format,
            aspect_ratio,
            output_width: self.screen.width(),
            output_height: self.screen.height(),
            display_area: area,
        }
    }

    fn active_geometry(&self) -> (PixelRect, PixelRect) {
        let draw = match self.target {
            ActiveTarget::Game => self.game_draw,
            ActiveTarget::Overlay => self.overlay_draw,
        };
        (self.areas.area_for(self.target), draw)
    }

    fn recalculate_display_areas(&mut self) {
        self.areas
            .recalculate(self.opts.scaling, self.game_draw, self.overlay_draw);
    }
}

impl GraphicsBackend for SoftwareCompositor {
    fn supported_formats(&self) -> Vec<PixelFormat> {
        caps::supported_formats()
    }

    fn supported_graphics_modes(&self) -> &'static [GraphicsMode] {
        caps::supported_graphics_modes()
    }

    fn has_feature(&self, f: Feature) -> bool {
        caps::has_feature(f)
    }

    fn feature_state(&self, f: Feature) -> bool {
        match f {
            Feature::CursorPalette => self.cursor_state.palette_enabled,
            _ => false,
        }
    }

    fn set_feature_state(&mut self, f: Feature, enable: bool) {
        if f == Feature::CursorPalette {
            self.cursor_state.palette_enabled = enable;
        }
    }

    #[tracing::instrument(skip(self), fields(layer = ?self.target))]
    fn init_size(&mut self, width: u32, height: u32, format: Option<PixelFormat>) {
        match self.target {
            ActiveTarget::Overlay => {
                self.overlay
                    .create(width, height, format.unwrap_or(PixelFormat::RGB565));
                self.overlay_draw = PixelRect::from_size(width, height);
            }
            ActiveTarget::Game => {
                self.game
                    .create(width, height, format.unwrap_or(PixelFormat::CLUT8));
                self.game_draw = PixelRect::from_size(width, height);
            }
        }
        // Reflow and notify unconditionally; unchanged geometry is re-reported.
        self.recalculate_display_areas();
        self.host.integration.refresh_settings(&self.screen_info());
    }

    fn width(&self) -> u32 {
        self.game.width()
    }

    fn height(&self) -> u32 {
        self.game.height()
    }

    fn screen_format(&self) -> PixelFormat {
        self.game.format()
    }

    fn copy_rect_to_screen(
        &mut self,
        buf: &[u8],
        pitch: usize,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    ) {
        self.game.copy_rect_from(buf, pitch, x, y, w, h);
    }

    fn active_target(&self) -> ActiveTarget {
        self.target
    }

    fn show_overlay(&mut self) {
        self.target = ActiveTarget::Overlay;
    }

    fn hide_overlay(&mut self) {
        self.target = ActiveTarget::Game;
    }

    fn clear_overlay(&mut self) {
        let full = self.overlay.bounds();
        self.overlay.fill_rect(full, 0);
    }

    fn grab_overlay(&self, dest: &mut Surface) {
        dest.copy_from(&self.overlay);
    }

    fn copy_rect_to_overlay(
        &mut self,
        buf: &[u8],
        pitch: usize,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    ) {
        self.overlay.copy_rect_from(buf, pitch, x, y, w, h);
    }

    fn overlay_width(&self) -> u32 {
        self.overlay.width()
    }

    fn overlay_height(&self) -> u32 {
        self.overlay.height()
    }

    fn overlay_format(&self) -> PixelFormat {
        self.overlay.format()
    }

    fn set_palette(&mut self, colors: &[u8], start: usize, num: usize) {
        self.game_palette.set(colors, start, num);
    }

    fn grab_palette(&self, colors: &mut [u8], start: usize, num: usize) {
        self.game_palette.grab(colors, start, num);
    }

    fn set_cursor_palette(&mut self, colors: &[u8], start: usize, num: usize) {
        self.cursor_palette.set(colors, start, num);
        self.cursor_state.palette_enabled = true;
    }

    fn show_mouse(&mut self, visible: bool) -> bool {
        std::mem::replace(&mut self.cursor_state.visible, visible)
    }

    fn warp_mouse(&mut self, x: i32, y: i32) {
        let (area, draw) = self.active_geometry();
        self.pointer = logical_to_output(area, draw, PixelPoint::new(x, y));
    }

    fn set_pointer_position(&mut self, p: PixelPoint) {
        self.pointer = p;
    }

    fn pointer_position(&self) -> PixelPoint {
        self.pointer
    }

    fn set_mouse_cursor(&mut self, cursor: &CursorImage<'_>) {
        let CursorImage {
            pixels,
            width,
            height,
            ..
        } = *cursor;
        if pixels.is_empty() || width == 0 || height == 0 {
            return;
        }
        let format = cursor.format.unwrap_or(PixelFormat::CLUT8);
        let pitch = width as usize * format.bpp();
        if pixels.len() < pitch * height as usize {
            tracing::debug!(
                width,
                height,
                len = pixels.len(),
                "cursor buffer shorter than sprite; ignored"
            );
            return;
        }

        self.cursor.create(width, height, format);
        self.cursor.copy_rect_from(pixels, pitch, 0, 0, width, height);

        self.cursor_state.hotspot = PixelPoint::new(cursor.hotspot_x, cursor.hotspot_y);
        self.cursor_state.key_color = cursor.key_color;
        self.cursor_state.dont_scale = cursor.dont_scale;
    }

    fn update_screen(&mut self) {
        let tolerant = self.host.settings.timing_inaccuracies_enabled();
        if self.scheduler.mark_dirty(tolerant, self.target) {
            tracing::trace!("rendezvous requested");
            self.host.timing.request_switch(SwitchReason::Update);
        }
    }

    fn real_update_screen(&mut self) {
        let (area, draw) = self.active_geometry();
        let src = match self.target {
            ActiveTarget::Game => &self.game,
            ActiveTarget::Overlay => &self.overlay,
        };

        if self.opts.scaling == ScalingMode::AspectFit {
            let full = self.screen.bounds();
            self.screen.fill_rect(full, 0);
        }
        if !src.is_empty() && !draw.is_empty() {
            blit_scaled(&mut self.screen, src, draw, area, &self.game_palette);
        }

        let cs = self.cursor_state;
        if cs.visible && !self.cursor.is_empty() {
            let pos = PixelPoint::new(
                self.pointer.x.saturating_sub(cs.hotspot.x),
                self.pointer.y.saturating_sub(cs.hotspot.y),
            );
            let palette = if cs.palette_enabled {
                &self.cursor_palette
            } else {
                &self.game_palette
            };
            let key = cs.key_color.filter(|_| self.opts.apply_cursor_key);
            blit_sprite(&mut self.screen, &self.cursor, pos, palette, key);
        }

        self.scheduler.complete();
        tracing::trace!(target_layer = ?self.target, "composited");
    }

    fn is_update_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    fn screen(&self) -> &Surface {
        &self.screen
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/software.rs"]
mod tests;
