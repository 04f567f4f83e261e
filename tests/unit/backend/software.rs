use super::*;
use crate::host::{HostIntegration, StaticSettings, TimingCoordinator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct CountingTiming(Arc<AtomicUsize>);

impl TimingCoordinator for CountingTiming {
    fn request_switch(&self, reason: SwitchReason) {
        assert_eq!(reason, SwitchReason::Update);
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
struct RecordingIntegration(Arc<Mutex<Vec<ScreenInfo>>>);

impl HostIntegration for RecordingIntegration {
    fn refresh_settings(&self, info: &ScreenInfo) {
        self.0.lock().unwrap().push(*info);
    }
}

fn compositor() -> SoftwareCompositor {
    SoftwareCompositor::new(CompositorOpts::default(), HostServices::detached()).unwrap()
}

fn red_palette(c: &mut SoftwareCompositor) {
    c.set_palette(&[255, 0, 0], 0, 1);
}

#[test]
fn construction_allocates_output_and_overlay_only() {
    let c = compositor();
    assert_eq!((c.screen().width(), c.screen().height()), (640, 480));
    assert_eq!(c.screen().format(), PixelFormat::RGB565);
    assert_eq!((c.overlay_width(), c.overlay_height()), (640, 480));
    assert_eq!(c.overlay_format(), PixelFormat::RGB565);
    assert_eq!(c.overlay_draw_rect(), PixelRect::from_size(640, 480));
    assert!(c.game_surface().is_empty());
    assert!(c.cursor_surface().is_empty());
    assert_eq!(c.active_target(), ActiveTarget::Game);
    assert!(!c.is_update_pending());
}

#[test]
fn invalid_opts_fail_construction() {
    let opts = CompositorOpts {
        output_width: 0,
        ..CompositorOpts::default()
    };
    assert!(SoftwareCompositor::new(opts, HostServices::detached()).is_err());
}

#[test]
fn indexed_game_pixel_composites_to_red() {
    let mut c = compositor();
    c.init_size(320, 200, Some(PixelFormat::CLUT8));
    c.copy_rect_to_screen(&[0u8; 64], 8, 0, 0, 8, 8);
    red_palette(&mut c);
    c.update_screen();
    assert!(c.present_if_pending());

    let raw = c.screen().pixel(PixelPoint::new(0, 0)).unwrap();
    assert_eq!(PixelFormat::RGB565.color_to_rgba(raw), [255, 0, 0, 255]);
}

#[test]
fn cursor_lands_at_pointer_minus_hotspot() {
    let mut c = compositor();
    c.init_size(320, 200, None);
    c.set_palette(&[0, 0, 255, 0, 255, 0], 1, 2);
    let sprite = [1u8, 2, 2, 2];
    c.set_mouse_cursor(&CursorImage::new(&sprite, 2, 2).with_hotspot(1, 1));
    c.set_pointer_position(PixelPoint::new(10, 10));
    assert!(!c.show_mouse(true));
    c.update_screen();
    c.real_update_screen();

    let top_left = c.screen().pixel(PixelPoint::new(9, 9)).unwrap();
    assert_eq!(top_left, PixelFormat::RGB565.rgb(0, 0, 255));
    let next = c.screen().pixel(PixelPoint::new(10, 9)).unwrap();
    assert_eq!(next, PixelFormat::RGB565.rgb(0, 255, 0));
}

#[test]
fn hidden_cursor_is_not_drawn() {
    let mut c = compositor();
    c.init_size(320, 200, None);
    c.set_palette(&[255, 255, 255], 1, 1);
    c.set_mouse_cursor(&CursorImage::new(&[1], 1, 1));
    c.set_pointer_position(PixelPoint::new(5, 5));
    c.real_update_screen();
    assert_eq!(c.screen().pixel(PixelPoint::new(5, 5)), Some(0));
}

#[test]
fn malformed_cursor_updates_change_nothing() {
    let mut c = compositor();
    c.set_mouse_cursor(
        &CursorImage::new(&[3, 3, 3, 3], 2, 2)
            .with_hotspot(1, 0)
            .with_key_color(9),
    );
    let surface_before = c.cursor_surface().clone();
    let state_before = c.cursor_state();

    c.set_mouse_cursor(&CursorImage::new(&[], 4, 4).with_hotspot(7, 7));
    c.set_mouse_cursor(&CursorImage::new(&[1, 2, 3, 4], 0, 2).with_hotspot(7, 7));
    c.set_mouse_cursor(&CursorImage::new(&[1, 2, 3, 4], 2, 0).with_key_color(1));
    c.set_mouse_cursor(&CursorImage::new(&[1, 2, 3], 2, 2));

    assert_eq!(c.cursor_surface(), &surface_before);
    assert_eq!(c.cursor_state(), state_before);
}

#[test]
fn same_shape_cursor_reuses_storage_but_rewrites_content() {
    let mut c = compositor();
    c.set_mouse_cursor(&CursorImage::new(&[1, 1, 1, 1], 2, 2));
    let ptr = c.cursor_surface().pixels().as_ptr();
    c.set_mouse_cursor(&CursorImage::new(&[4, 5, 6, 7], 2, 2).with_hotspot(1, 1));
    assert_eq!(c.cursor_surface().pixels().as_ptr(), ptr);
    assert_eq!(c.cursor_surface().pixels(), &[4, 5, 6, 7]);
    assert_eq!(c.cursor_state().hotspot, PixelPoint::new(1, 1));
}

#[test]
fn many_updates_leave_one_composite() {
    let mut c = compositor();
    assert!(!c.present_if_pending());
    for _ in 0..5 {
        c.update_screen();
    }
    assert_eq!(c.update_state(), UpdateState::Dirty);
    assert!(c.present_if_pending());
    assert!(!c.present_if_pending());
    assert_eq!(c.update_stats().composites, 1);
    assert_eq!(c.update_stats().update_calls, 5);
}

#[test]
fn rendezvous_requested_only_during_strict_gameplay() {
    let timing = CountingTiming::default();
    let count = timing.0.clone();
    let host = HostServices::detached().with_timing(timing);
    let mut c = SoftwareCompositor::new(CompositorOpts::default(), host).unwrap();

    c.update_screen();
    assert_eq!(count.load(Ordering::SeqCst), 1);

    c.show_overlay();
    c.update_screen();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(c.is_update_pending());
}

#[test]
fn tolerant_host_skips_rendezvous() {
    let timing = CountingTiming::default();
    let count = timing.0.clone();
    let host = HostServices::detached()
        .with_timing(timing)
        .with_settings(StaticSettings {
            timing_inaccuracies: true,
        });
    let mut c = SoftwareCompositor::new(CompositorOpts::default(), host).unwrap();
    c.update_screen();
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(c.is_update_pending());
}

#[test]
fn init_size_always_notifies_host() {
    let integ = RecordingIntegration::default();
    let log = integ.0.clone();
    let host = HostServices::detached().with_integration(integ);
    let mut c = SoftwareCompositor::new(CompositorOpts::default(), host).unwrap();

    c.init_size(320, 200, None);
    c.init_size(320, 200, None);
    let log = log.lock().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0], log[1]);
    assert_eq!((log[0].logical_width, log[0].logical_height), (320, 200));
    assert_eq!(log[0].format, PixelFormat::CLUT8);
    assert!((log[0].aspect_ratio - 1.6).abs() < 1e-6);
}

#[test]
fn init_size_on_overlay_leaves_game_untouched() {
    let mut c = compositor();
    c.init_size(4, 4, None);
    c.copy_rect_to_screen(&[7u8; 16], 4, 0, 0, 4, 4);
    let game_before = c.game_surface().clone();

    c.show_overlay();
    c.init_size(320, 240, None);
    assert_eq!(c.game_surface(), &game_before);
    assert_eq!(c.overlay_format(), PixelFormat::RGB565);
    assert_eq!(c.overlay_draw_rect(), PixelRect::from_size(320, 240));
    assert_eq!((c.width(), c.height()), (4, 4));
}

#[test]
fn init_size_same_shape_keeps_content() {
    let mut c = compositor();
    c.init_size(2, 2, None);
    c.copy_rect_to_screen(&[1, 2, 3, 4], 2, 0, 0, 2, 2);
    c.init_size(2, 2, Some(PixelFormat::CLUT8));
    assert_eq!(c.game_surface().pixels(), &[1, 2, 3, 4]);
}

#[test]
fn clear_overlay_does_not_touch_output_or_pending() {
    let mut c = compositor();
    c.copy_rect_to_overlay(&0xFFFFu16.to_ne_bytes(), 2, 0, 0, 1, 1);
    let screen_before = c.screen().clone();
    c.clear_overlay();
    assert_eq!(c.overlay_surface().pixel(PixelPoint::new(0, 0)), Some(0));
    assert_eq!(c.screen(), &screen_before);
    assert!(!c.is_update_pending());
}

#[test]
fn overlay_is_composited_when_active() {
    let mut c = compositor();
    c.show_overlay();
    let white = PixelFormat::RGB565.rgb(255, 255, 255) as u16;
    c.copy_rect_to_overlay(&white.to_ne_bytes(), 2, 3, 4, 1, 1);
    c.update_screen();
    c.real_update_screen();
    assert_eq!(c.screen().pixel(PixelPoint::new(3, 4)), Some(u32::from(white)));

    let mut grabbed = Surface::empty(PixelFormat::CLUT8);
    c.grab_overlay(&mut grabbed);
    assert_eq!(&grabbed, c.overlay_surface());
}

#[test]
fn cursor_palette_overrides_game_palette() {
    let mut c = compositor();
    c.init_size(16, 16, None);
    c.set_palette(&[255, 0, 0], 1, 1);
    c.set_mouse_cursor(&CursorImage::new(&[1], 1, 1));
    c.show_mouse(true);

    assert!(!c.feature_state(Feature::CursorPalette));
    c.set_cursor_palette(&[0, 255, 0], 1, 1);
    assert!(c.feature_state(Feature::CursorPalette));
    c.real_update_screen();
    assert_eq!(
        c.screen().pixel(PixelPoint::new(0, 0)),
        Some(PixelFormat::RGB565.rgb(0, 255, 0))
    );

    c.set_feature_state(Feature::CursorPalette, false);
    c.real_update_screen();
    assert_eq!(
        c.screen().pixel(PixelPoint::new(0, 0)),
        Some(PixelFormat::RGB565.rgb(255, 0, 0))
    );
}

#[test]
fn only_cursor_palette_feature_is_settable() {
    let mut c = compositor();
    c.set_feature_state(Feature::FullscreenMode, true);
    assert!(!c.feature_state(Feature::FullscreenMode));
    c.set_feature_state(Feature::CursorAlpha, true);
    assert!(!c.feature_state(Feature::CursorAlpha));
    assert!(c.has_feature(Feature::CursorAlpha));
}

#[test]
fn composite_is_idempotent_without_writes() {
    let mut c = compositor();
    c.init_size(320, 200, None);
    c.copy_rect_to_screen(&[3u8; 100], 10, 5, 5, 10, 10);
    c.set_palette(&[10, 200, 30], 3, 1);
    c.update_screen();
    c.real_update_screen();
    let first = c.screen().clone();
    c.real_update_screen();
    assert_eq!(c.screen(), &first);
}

#[test]
fn warp_mouse_maps_logical_to_output() {
    let mut c = compositor();
    c.init_size(320, 240, None);
    c.warp_mouse(160, 120);
    assert_eq!(c.pointer_position(), PixelPoint::new(320, 240));
    assert_eq!(c.logical_pointer(), PixelPoint::new(160, 120));
}

#[test]
fn aspect_fit_letterboxes_output() {
    let opts = CompositorOpts::default().with_scaling(ScalingMode::AspectFit);
    let mut c = SoftwareCompositor::new(opts, HostServices::detached()).unwrap();
    c.init_size(320, 200, None);
    c.set_palette(&[255, 255, 255], 0, 1);
    c.update_screen();
    c.real_update_screen();

    assert_eq!(c.display_areas().game, PixelRect::new(0, 40, 640, 400));
    assert_eq!(c.screen().pixel(PixelPoint::new(0, 10)), Some(0));
    assert_eq!(c.screen().pixel(PixelPoint::new(0, 40)), Some(0xFFFF));
    assert_eq!(c.screen().pixel(PixelPoint::new(639, 439)), Some(0xFFFF));
    assert_eq!(c.screen().pixel(PixelPoint::new(639, 440)), Some(0));
}

#[test]
fn palette_round_trip_through_backend() {
    let mut c = compositor();
    let colors: Vec<u8> = (0..30).collect();
    c.set_palette(&colors, 200, 10);
    let mut out = vec![0u8; 30];
    c.grab_palette(&mut out, 200, 10);
    assert_eq!(out, colors);
}

#[test]
fn unkeyed_cursor_draws_index_zero() {
    let mut c = compositor();
    c.init_size(320, 200, None);
    c.set_palette(&[0, 255, 0], 0, 1);
    c.set_mouse_cursor(&CursorImage::new(&[0, 1, 1, 1], 2, 2).with_hotspot(1, 1));
    assert_eq!(c.cursor_state().key_color, None);
    c.set_pointer_position(PixelPoint::new(10, 10));
    c.show_mouse(true);
    c.update_screen();
    assert!(c.present_if_pending());

    let raw = c.screen().pixel(PixelPoint::new(9, 9)).unwrap();
    assert_eq!(PixelFormat::RGB565.color_to_rgba(raw), [0, 255, 0, 255]);
}

#[test]
fn key_colour_ignored_when_disabled_in_opts() {
    let opts = CompositorOpts {
        apply_cursor_key: false,
        ..CompositorOpts::default()
    };
    let mut c = SoftwareCompositor::new(opts, HostServices::detached()).unwrap();
    c.init_size(16, 16, None);
    c.set_palette(&[0, 0, 0, 255, 255, 255], 0, 2);
    c.copy_rect_to_screen(&[1], 1, 0, 0, 1, 1);
    c.set_mouse_cursor(&CursorImage::new(&[0], 1, 1).with_key_color(0));
    c.show_mouse(true);
    c.real_update_screen();
    assert_eq!(c.screen().pixel(PixelPoint::new(0, 0)), Some(0));
}
