use crate::foundation::core::{PixelPoint, PixelRect};
use crate::foundation::error::{SurfError, SurfResult};
use crate::pixel::format::PixelFormat;
use crate::pixel::palette::Palette;
use anyhow::Context as _;
use std::path::Path;

/// Owned 2D pixel buffer.
///
/// Rows are tightly packed (`pitch == width * bytes_per_pixel`) and pixels are stored in host
/// byte order as described by [`PixelFormat`]. An empty surface (zero width or height) holds no
/// storage but keeps its last format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pitch: usize,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl Surface {
    /// Allocate a zero-filled surface.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let pitch = width as usize * format.bpp();
        Self {
            width,
            height,
            pitch,
            format,
            pixels: vec![0; pitch * height as usize],
        }
    }

    /// An empty surface with no storage.
    pub fn empty(format: PixelFormat) -> Self {
        Self::new(0, 0, format)
    }

    /// Wrap tightly packed pixel bytes.
    pub fn from_pixels(
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: Vec<u8>,
    ) -> SurfResult<Self> {
        let pitch = width as usize * format.bpp();
        if pixels.len() != pitch * height as usize {
            return Err(SurfError::validation(format!(
                "surface {width}x{height} {format} expects {} bytes, got {}",
                pitch * height as usize,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pitch,
            format,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Pixel format of the raw buffer.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw pixel bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Return `true` when the surface covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Full-surface rectangle.
    pub fn bounds(&self) -> PixelRect {
        PixelRect::from_size(self.width, self.height)
    }

    /// (Re)allocate to `width x height` in `format`, zero-filled.
    ///
    /// Returns `false` without touching the pixels when the shape and format already match.
    pub fn create(&mut self, width: u32, height: u32, format: PixelFormat) -> bool {
        if self.width == width
            && self.height == height
            && self.format == format
            && self.pixels.len() == self.pitch * height as usize
        {
            return false;
        }
        tracing::debug!(width, height, %format, "allocate surface");
        *self = Self::new(width, height, format);
        true
    }

    /// Drop the pixel storage, leaving an empty surface in the same format.
    pub fn free(&mut self) {
        self.width = 0;
        self.height = 0;
        self.pitch = 0;
        self.pixels = Vec::new();
    }

    /// Replace this surface with a copy of `other` (shape, format and pixels).
    pub fn copy_from(&mut self, other: &Surface) {
        self.create(other.width, other.height, other.format);
        self.pixels.copy_from_slice(&other.pixels);
    }

    /// Copy a `w x h` block of raw pixels from `buf` (rows `src_pitch` bytes apart) to `(x, y)`.
    ///
    /// The destination is clipped to the surface, and copying stops at the end of `buf`.
    pub fn copy_rect_from(
        &mut self,
        buf: &[u8],
        src_pitch: usize,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    ) {
        let req = PixelRect::new(x, y, w, h);
        let Some(clip) = req.intersect(self.bounds()) else {
            return;
        };
        if clip != req {
            tracing::debug!(?req, ?clip, "copy_rect_from clipped to surface");
        }

        let bpp = self.format.bpp();
        let skip_x = (clip.x - x) as usize * bpp;
        let row_len = clip.width as usize * bpp;
        for row in 0..clip.height as usize {
            let sy = (clip.y - y) as usize + row;
            let src_off = sy * src_pitch + skip_x;
            let Some(src) = buf.get(src_off..src_off + row_len) else {
                tracing::debug!(row = sy, "copy_rect_from source buffer exhausted");
                return;
            };
            let dst_off = (clip.y as usize + row) * self.pitch + clip.x as usize * bpp;
            self.pixels[dst_off..dst_off + row_len].copy_from_slice(src);
        }
    }

    /// Fill `rect` (clipped to the surface) with a raw pixel value.
    pub fn fill_rect(&mut self, rect: PixelRect, color: u32) {
        let Some(clip) = rect.intersect(self.bounds()) else {
            return;
        };
        let format = self.format;
        let bpp = format.bpp();
        let mut px = [0u8; 4];
        format.write_raw(&mut px, color);
        for y in clip.y as usize..clip.y as usize + clip.height as usize {
            let start = y * self.pitch + clip.x as usize * bpp;
            let row = &mut self.pixels[start..start + clip.width as usize * bpp];
            for dst in row.chunks_exact_mut(bpp) {
                dst.copy_from_slice(&px[..bpp]);
            }
        }
    }

    /// Raw pixel value at `p`, or `None` outside the surface.
    pub fn pixel(&self, p: PixelPoint) -> Option<u32> {
        if !self.bounds().contains(p) {
            return None;
        }
        let bpp = self.format.bpp();
        let off = p.y as usize * self.pitch + p.x as usize * bpp;
        Some(self.format.read_raw(&self.pixels[off..off + bpp]))
    }

    /// Write a raw pixel value at `p`; ignored outside the surface.
    pub fn set_pixel(&mut self, p: PixelPoint, value: u32) {
        if !self.bounds().contains(p) {
            return;
        }
        let bpp = self.format.bpp();
        let off = p.y as usize * self.pitch + p.x as usize * bpp;
        self.format.write_raw(&mut self.pixels[off..off + bpp], value);
    }

    /// Straight RGBA of the pixel at `p`, resolving indexed pixels through `palette`.
    pub fn rgba_at(&self, p: PixelPoint, palette: &Palette) -> Option<[u8; 4]> {
        self.pixel(p).map(|raw| resolve_rgba(self.format, raw, palette))
    }

    /// Convert the whole surface to tightly packed straight RGBA8.
    pub fn to_rgba8(&self, palette: &Palette) -> Vec<u8> {
        let bpp = self.format.bpp();
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for px in self.pixels.chunks_exact(bpp) {
            let raw = self.format.read_raw(px);
            out.extend_from_slice(&resolve_rgba(self.format, raw, palette));
        }
        out
    }

    /// Write the surface as a PNG image.
    pub fn save_png(&self, path: &Path, palette: &Palette) -> SurfResult<()> {
        if self.is_empty() {
            return Err(SurfError::validation("cannot export an empty surface"));
        }
        let rgba = self.to_rgba8(palette);
        image::save_buffer_with_format(
            path,
            &rgba,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::empty(PixelFormat::CLUT8)
    }
}

/// Straight RGBA for a raw pixel value; indexed values go through `palette` and are opaque.
pub(crate) fn resolve_rgba(format: PixelFormat, raw: u32, palette: &Palette) -> [u8; 4] {
    if format.is_clut8() {
        let c = palette.get(raw as usize);
        [c.r, c.g, c.b, 255]
    } else {
        format.color_to_rgba(raw)
    }
}

#[cfg(test)]
#[path = "../tests/unit/surface.rs"]
mod tests;
