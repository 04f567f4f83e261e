use crate::foundation::error::{SurfError, SurfResult};
use crate::foundation::math::{expand_channel, quantize_channel};
use std::fmt;

/// Semantic descriptor of a packed pixel encoding.
///
/// A format with one byte per pixel and no colour channels is the indexed (CLUT8) format; every
/// other format packs its channels into a host-endian integer of `bytes_per_pixel` bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawPixelFormat")]
pub struct PixelFormat {
    /// Bytes per pixel (1..=4).
    pub bytes_per_pixel: u8,
    /// Red channel width in bits.
    pub r_bits: u8,
    /// Green channel width in bits.
    pub g_bits: u8,
    /// Blue channel width in bits.
    pub b_bits: u8,
    /// Alpha channel width in bits (0 = opaque format).
    pub a_bits: u8,
    /// Red channel shift.
    pub r_shift: u8,
    /// Green channel shift.
    pub g_shift: u8,
    /// Blue channel shift.
    pub b_shift: u8,
    /// Alpha channel shift.
    pub a_shift: u8,
}

impl PixelFormat {
    /// 8-bit palette-indexed format.
    pub const CLUT8: Self = Self::from_parts(1, [0, 0, 0, 0], [0, 0, 0, 0]);

    /// 16-bit 5-6-5 true-colour format. The output surface and default overlay use it.
    pub const RGB565: Self = Self::from_parts(2, [5, 6, 5, 0], [11, 5, 0, 0]);

    /// 16-bit 5-5-5 format with a 1-bit alpha in the top bit.
    pub const RGB555_A1: Self = Self::from_parts(2, [5, 5, 5, 1], [10, 5, 0, 15]);

    const fn from_parts(bytes_per_pixel: u8, bits: [u8; 4], shifts: [u8; 4]) -> Self {
        Self {
            bytes_per_pixel,
            r_bits: bits[0],
            g_bits: bits[1],
            b_bits: bits[2],
            a_bits: bits[3],
            r_shift: shifts[0],
            g_shift: shifts[1],
            b_shift: shifts[2],
            a_shift: shifts[3],
        }
    }

    /// 32-bit RGBA whose in-memory byte order follows host endianness.
    pub const fn rgba8888_native() -> Self {
        if cfg!(target_endian = "little") {
            Self::from_parts(4, [8, 8, 8, 8], [24, 16, 8, 0])
        } else {
            Self::from_parts(4, [8, 8, 8, 8], [0, 8, 16, 24])
        }
    }

    /// Build and validate a custom format.
    ///
    /// `bits` and `shifts` are in `[r, g, b, a]` order.
    pub fn new(bytes_per_pixel: u8, bits: [u8; 4], shifts: [u8; 4]) -> SurfResult<Self> {
        if !(1..=4).contains(&bytes_per_pixel) {
            return Err(SurfError::format(format!(
                "bytes_per_pixel must be in 1..=4, got {bytes_per_pixel}"
            )));
        }
        let width = u32::from(bytes_per_pixel) * 8;
        for (name, (b, s)) in ["r", "g", "b", "a"].iter().zip(bits.iter().zip(shifts.iter())) {
            if *b > 8 {
                return Err(SurfError::format(format!("{name} channel wider than 8 bits")));
            }
            if u32::from(*s) >= width {
                return Err(SurfError::format(format!(
                    "{name} shift {s} is outside a {width}-bit pixel"
                )));
            }
            if *b > 0 && u32::from(*b) + u32::from(*s) > width {
                return Err(SurfError::format(format!(
                    "{name} channel ({b} bits at shift {s}) exceeds {width}-bit pixel"
                )));
            }
        }
        Ok(Self::from_parts(bytes_per_pixel, bits, shifts))
    }

    /// Return `true` for the palette-indexed format.
    pub fn is_clut8(self) -> bool {
        self.bytes_per_pixel == 1
            && self.r_bits == 0
            && self.g_bits == 0
            && self.b_bits == 0
            && self.a_bits == 0
    }

    /// Return `true` when pixels carry an alpha channel.
    pub fn has_alpha(self) -> bool {
        self.a_bits > 0
    }

    pub(crate) fn bpp(self) -> usize {
        usize::from(self.bytes_per_pixel)
    }

    /// Encode straight RGBA into a raw pixel value. Formats without alpha drop `a`.
    pub fn argb(self, a: u8, r: u8, g: u8, b: u8) -> u32 {
        (quantize_channel(r, self.r_bits) << self.r_shift)
            | (quantize_channel(g, self.g_bits) << self.g_shift)
            | (quantize_channel(b, self.b_bits) << self.b_shift)
            | (quantize_channel(a, self.a_bits) << self.a_shift)
    }

    /// Encode an opaque colour into a raw pixel value.
    pub fn rgb(self, r: u8, g: u8, b: u8) -> u32 {
        self.argb(255, r, g, b)
    }

    /// Decode a raw pixel value into straight `[r, g, b, a]`.
    ///
    /// Alpha is 255 for formats without an alpha channel.
    pub fn color_to_rgba(self, color: u32) -> [u8; 4] {
        let ch = |bits: u8, shift: u8| -> u8 {
            if bits == 0 {
                return 0;
            }
            let mask = (1u32 << bits) - 1;
            expand_channel((color >> shift) & mask, bits)
        };
        let a = if self.a_bits == 0 {
            255
        } else {
            ch(self.a_bits, self.a_shift)
        };
        [
            ch(self.r_bits, self.r_shift),
            ch(self.g_bits, self.g_shift),
            ch(self.b_bits, self.b_shift),
            a,
        ]
    }

    /// Read one raw pixel from `bytes` (at least `bytes_per_pixel` long), host byte order.
    pub(crate) fn read_raw(self, bytes: &[u8]) -> u32 {
        match self.bytes_per_pixel {
            1 => u32::from(bytes[0]),
            2 => u32::from(u16::from_ne_bytes([bytes[0], bytes[1]])),
            3 => {
                if cfg!(target_endian = "little") {
                    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0])
                } else {
                    u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]])
                }
            }
            _ => u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        }
    }

    /// Write one raw pixel into `bytes` (at least `bytes_per_pixel` long), host byte order.
    pub(crate) fn write_raw(self, bytes: &mut [u8], value: u32) {
        match self.bytes_per_pixel {
            1 => bytes[0] = value as u8,
            2 => bytes[..2].copy_from_slice(&(value as u16).to_ne_bytes()),
            3 => {
                if cfg!(target_endian = "little") {
                    bytes[..3].copy_from_slice(&value.to_le_bytes()[..3]);
                } else {
                    bytes[..3].copy_from_slice(&value.to_be_bytes()[1..]);
                }
            }
            _ => bytes[..4].copy_from_slice(&value.to_ne_bytes()),
        }
    }
}

/// Unvalidated wire form of [`PixelFormat`].
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPixelFormat {
    bytes_per_pixel: u8,
    r_bits: u8,
    g_bits: u8,
    b_bits: u8,
    a_bits: u8,
    r_shift: u8,
    g_shift: u8,
    b_shift: u8,
    a_shift: u8,
}

impl TryFrom<RawPixelFormat> for PixelFormat {
    type Error = SurfError;

    fn try_from(raw: RawPixelFormat) -> SurfResult<Self> {
        Self::new(
            raw.bytes_per_pixel,
            [raw.r_bits, raw.g_bits, raw.b_bits, raw.a_bits],
            [raw.r_shift, raw.g_shift, raw.b_shift, raw.a_shift],
        )
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clut8() {
            return f.write_str("CLUT8");
        }
        let mut channels: Vec<(u8, char, u8)> = [
            (self.r_shift, 'R', self.r_bits),
            (self.g_shift, 'G', self.g_bits),
            (self.b_shift, 'B', self.b_bits),
            (self.a_shift, 'A', self.a_bits),
        ]
        .into_iter()
        .filter(|c| c.2 > 0)
        .collect();
        channels.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, name, _) in &channels {
            write!(f, "{name}")?;
        }
        for (_, _, bits) in &channels {
            write!(f, "{bits}")?;
        }
        Ok(())
    }
}

/// Well-known formats by name, for configuration and scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatName {
    /// [`PixelFormat::CLUT8`].
    Clut8,
    /// [`PixelFormat::RGB565`].
    Rgb565,
    /// [`PixelFormat::RGB555_A1`].
    Rgb555A1,
    /// [`PixelFormat::rgba8888_native`].
    Rgba8888,
}

impl From<FormatName> for PixelFormat {
    fn from(name: FormatName) -> Self {
        match name {
            FormatName::Clut8 => PixelFormat::CLUT8,
            FormatName::Rgb565 => PixelFormat::RGB565,
            FormatName::Rgb555A1 => PixelFormat::RGB555_A1,
            FormatName::Rgba8888 => PixelFormat::rgba8888_native(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pixel/format.rs"]
mod tests;
