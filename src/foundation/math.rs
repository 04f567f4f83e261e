pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Widen an `bits`-wide channel value to 8 bits by replicating its high bits into the low ones,
/// so the maximum code maps to 255.
pub(crate) fn expand_channel(v: u32, bits: u8) -> u8 {
    match bits {
        0 => 0,
        b if b >= 8 => (v >> (b - 8)) as u8,
        b => {
            let mut out = v << (8 - b);
            let mut filled = b;
            while filled < 8 {
                out |= out >> filled;
                filled *= 2;
            }
            (out & 0xFF) as u8
        }
    }
}

/// Truncate an 8-bit channel value to `bits` wide.
pub(crate) fn quantize_channel(v: u8, bits: u8) -> u32 {
    match bits {
        0 => 0,
        b if b >= 8 => u32::from(v) << (b - 8),
        b => u32::from(v) >> (8 - b),
    }
}

/// Straight-alpha "source over" for one channel.
pub(crate) fn blend_channel(dst: u8, src: u8, alpha: u8) -> u8 {
    let a = u16::from(alpha);
    mul_div255_u8(u16::from(src), a).saturating_add(mul_div255_u8(u16::from(dst), 255 - a))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
