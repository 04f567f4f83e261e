use super::*;
use crate::foundation::core::Rgb;

#[test]
fn create_skips_reallocation_for_same_shape() {
    let mut s = Surface::new(4, 4, PixelFormat::CLUT8);
    s.set_pixel(PixelPoint::new(1, 1), 7);
    assert!(!s.create(4, 4, PixelFormat::CLUT8));
    assert_eq!(s.pixel(PixelPoint::new(1, 1)), Some(7));

    assert!(s.create(4, 4, PixelFormat::RGB565));
    assert_eq!(s.pitch(), 8);
    assert_eq!(s.pixel(PixelPoint::new(1, 1)), Some(0));
}

#[test]
fn free_drops_storage_but_keeps_format() {
    let mut s = Surface::new(8, 2, PixelFormat::RGB565);
    s.free();
    assert!(s.is_empty());
    assert!(s.pixels().is_empty());
    assert_eq!(s.format(), PixelFormat::RGB565);
    assert!(s.create(8, 2, PixelFormat::RGB565));
}

#[test]
fn copy_rect_respects_source_pitch() {
    let mut s = Surface::new(4, 3, PixelFormat::CLUT8);
    // 2x2 block taken from a 5-byte-pitch buffer.
    let buf = [1, 2, 0, 0, 0, 3, 4, 0, 0, 0];
    s.copy_rect_from(&buf, 5, 1, 1, 2, 2);
    assert_eq!(s.pixel(PixelPoint::new(1, 1)), Some(1));
    assert_eq!(s.pixel(PixelPoint::new(2, 1)), Some(2));
    assert_eq!(s.pixel(PixelPoint::new(1, 2)), Some(3));
    assert_eq!(s.pixel(PixelPoint::new(2, 2)), Some(4));
    assert_eq!(s.pixel(PixelPoint::new(0, 0)), Some(0));
}

#[test]
fn copy_rect_clips_instead_of_panicking() {
    let mut s = Surface::new(2, 2, PixelFormat::CLUT8);
    let buf = [9u8; 16];
    s.copy_rect_from(&buf, 4, -1, -1, 4, 4);
    assert!(s.pixels().iter().all(|&b| b == 9));

    let mut t = Surface::new(2, 2, PixelFormat::CLUT8);
    t.copy_rect_from(&[5], 2, 0, 0, 2, 2);
    assert_eq!(t.pixels(), &[0, 0, 0, 0]);
}

#[test]
fn fill_rect_writes_multibyte_pixels() {
    let mut s = Surface::new(3, 2, PixelFormat::RGB565);
    s.fill_rect(PixelRect::new(1, 0, 5, 1), 0xF800);
    assert_eq!(s.pixel(PixelPoint::new(0, 0)), Some(0));
    assert_eq!(s.pixel(PixelPoint::new(1, 0)), Some(0xF800));
    assert_eq!(s.pixel(PixelPoint::new(2, 0)), Some(0xF800));
    assert_eq!(s.pixel(PixelPoint::new(2, 1)), Some(0));
}

#[test]
fn copy_from_clones_shape_and_content() {
    let mut src = Surface::new(3, 3, PixelFormat::RGB565);
    src.set_pixel(PixelPoint::new(2, 2), 0x1234);
    let mut dst = Surface::default();
    dst.copy_from(&src);
    assert_eq!(dst, src);
}

#[test]
fn rgba_resolves_indexed_through_palette() {
    let mut pal = Palette::default();
    pal.set(&[10, 20, 30], 3, 1);
    let mut s = Surface::new(1, 1, PixelFormat::CLUT8);
    s.set_pixel(PixelPoint::new(0, 0), 3);
    assert_eq!(s.rgba_at(PixelPoint::new(0, 0), &pal), Some([10, 20, 30, 255]));
    assert_eq!(s.to_rgba8(&pal), vec![10, 20, 30, 255]);
    assert_eq!(pal.get(3), Rgb::new(10, 20, 30));
}

#[test]
fn from_pixels_validates_length() {
    assert!(Surface::from_pixels(2, 2, PixelFormat::RGB565, vec![0; 7]).is_err());
    assert!(Surface::from_pixels(2, 2, PixelFormat::RGB565, vec![0; 8]).is_ok());
}

#[test]
fn save_png_rejects_empty_surface() {
    let s = Surface::default();
    let err = s
        .save_png(std::path::Path::new("target/never.png"), &Palette::default())
        .unwrap_err();
    assert!(err.to_string().contains("empty"));
}
