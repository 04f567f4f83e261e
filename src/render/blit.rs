use crate::foundation::core::{PixelPoint, PixelRect};
use crate::foundation::math::blend_channel;
use crate::pixel::format::PixelFormat;
use crate::pixel::palette::Palette;
use crate::surface::Surface;
use rayon::prelude::*;

/// Per-blit pixel converter from one format into another.
///
/// Indexed sources resolve through a lookup table built once from the palette. True-colour
/// sources with an alpha channel are blended over the destination; fully transparent pixels and
/// pixels equal to `key` are skipped.
struct PixelConverter {
    src: PixelFormat,
    dst: PixelFormat,
    lut: Option<Box<[u32; 256]>>,
    key: Option<u32>,
}

impl PixelConverter {
    fn new(src: PixelFormat, dst: PixelFormat, palette: &Palette, key: Option<u32>) -> Self {
        let lut = (src.is_clut8() && !dst.is_clut8()).then(|| {
            let mut lut = Box::new([0u32; 256]);
            for (i, slot) in lut.iter_mut().enumerate() {
                let c = palette.get(i);
                *slot = dst.rgb(c.r, c.g, c.b);
            }
            lut
        });
        if !src.is_clut8() && dst.is_clut8() {
            tracing::debug!(%src, "true-colour source cannot be drawn onto an indexed target");
        }
        Self { src, dst, lut, key }
    }

    #[inline]
    fn apply(&self, raw: u32, out: &mut [u8]) {
        if self.key == Some(raw) {
            return;
        }
        if let Some(lut) = &self.lut {
            self.dst.write_raw(out, lut[(raw & 0xFF) as usize]);
            return;
        }
        match (self.src.is_clut8(), self.dst.is_clut8()) {
            (true, true) => self.dst.write_raw(out, raw),
            (false, true) | (true, false) => {}
            (false, false) => {
                if self.src == self.dst && !self.src.has_alpha() {
                    self.dst.write_raw(out, raw);
                    return;
                }
                let [r, g, b, a] = self.src.color_to_rgba(raw);
                match a {
                    0 => {}
                    255 => self.dst.write_raw(out, self.dst.argb(255, r, g, b)),
                    _ => {
                        let [dr, dg, db, _] = self.dst.color_to_rgba(self.dst.read_raw(out));
                        let v = self.dst.argb(
                            255,
                            blend_channel(dr, r, a),
                            blend_channel(dg, g, a),
                            blend_channel(db, b, a),
                        );
                        self.dst.write_raw(out, v);
                    }
                }
            }
        }
    }
}

/// Nearest-neighbour, format-converting blit of `src_rect` (of `src`) onto `dst_rect` (of `dst`).
///
/// Source and destination sizes may differ. Destination pixels outside `dst` are clipped; rows
/// are processed in parallel.
pub(crate) fn blit_scaled(
    dst: &mut Surface,
    src: &Surface,
    src_rect: PixelRect,
    dst_rect: PixelRect,
    palette: &Palette,
) {
    if src.is_empty() || dst.is_empty() || src_rect.is_empty() || dst_rect.is_empty() {
        return;
    }
    let Some(clip) = dst_rect.intersect(dst.bounds()) else {
        return;
    };

    let conv = PixelConverter::new(src.format(), dst.format(), palette, None);
    let src_bounds = src.bounds();
    let map_axis = |d: i32, d0: i32, dlen: u32, s0: i32, slen: u32| -> i64 {
        let off = i64::from(d) - i64::from(d0);
        i64::from(s0) + off * i64::from(slen) / i64::from(dlen)
    };
    let xs: Vec<Option<usize>> = (clip.x..clip.x + clip.width as i32)
        .map(|dx| {
            let sx = map_axis(dx, dst_rect.x, dst_rect.width, src_rect.x, src_rect.width);
            (sx >= i64::from(src_bounds.x) && sx < src_bounds.right()).then_some(sx as usize)
        })
        .collect();

    let dst_bpp = dst.format().bpp();
    let src_bpp = src.format().bpp();
    let src_fmt = src.format();
    let dst_pitch = dst.pitch();
    let x_off = clip.x as usize * dst_bpp;

    dst.pixels_mut()
        .par_chunks_exact_mut(dst_pitch)
        .enumerate()
        .skip(clip.y as usize)
        .take(clip.height as usize)
        .for_each(|(dy, row)| {
            let sy = map_axis(
                dy as i32,
                dst_rect.y,
                dst_rect.height,
                src_rect.y,
                src_rect.height,
            );
            if sy < i64::from(src_bounds.y) || sy >= src_bounds.bottom() {
                return;
            }
            let src_row = &src.pixels()[sy as usize * src.pitch()..][..src.pitch()];
            let row = &mut row[x_off..x_off + clip.width as usize * dst_bpp];
            for (out, sx) in row.chunks_exact_mut(dst_bpp).zip(&xs) {
                let Some(sx) = *sx else {
                    continue;
                };
                let raw = src_fmt.read_raw(&src_row[sx * src_bpp..]);
                conv.apply(raw, out);
            }
        });
}

/// Unscaled blit of the whole of `src` with its top-left corner at `pos`, clipped to `dst`.
///
/// Source pixels equal to `key` are left undrawn.
pub(crate) fn blit_sprite(
    dst: &mut Surface,
    src: &Surface,
    pos: PixelPoint,
    palette: &Palette,
    key: Option<u32>,
) {
    let placed = PixelRect::new(pos.x, pos.y, src.width(), src.height());
    let Some(clip) = placed.intersect(dst.bounds()) else {
        return;
    };

    let conv = PixelConverter::new(src.format(), dst.format(), palette, key);
    let src_fmt = src.format();
    let src_bpp = src_fmt.bpp();
    let dst_bpp = dst.format().bpp();
    let dst_pitch = dst.pitch();
    let src_pitch = src.pitch();
    let pixels = dst.pixels_mut();

    for y in 0..clip.height as usize {
        let sy = (clip.y - pos.y) as usize + y;
        let sx0 = (clip.x - pos.x) as usize;
        let src_row = &src.pixels()[sy * src_pitch..][..src_pitch];
        let start = (clip.y as usize + y) * dst_pitch + clip.x as usize * dst_bpp;
        let row = &mut pixels[start..start + clip.width as usize * dst_bpp];
        for (x, out) in row.chunks_exact_mut(dst_bpp).enumerate() {
            let raw = src_fmt.read_raw(&src_row[(sx0 + x) * src_bpp..]);
            conv.apply(raw, out);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blit.rs"]
mod tests;
