use crate::foundation::core::Rgb;

/// Fixed-size colour lookup table.
///
/// Entries are exchanged with callers as packed `r, g, b` byte triples. Range operations clip
/// to the table size and to the supplied buffer; the table is never resized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<Rgb>,
}

impl Palette {
    /// Size of the game and cursor palettes.
    pub const FULL: usize = 256;

    /// Create a table of `len` black entries.
    pub fn new(len: usize) -> Self {
        Self {
            entries: vec![Rgb::BLACK; len],
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, or black when out of range.
    pub fn get(&self, index: usize) -> Rgb {
        self.entries.get(index).copied().unwrap_or(Rgb::BLACK)
    }

    /// Overwrite entries `[start, start + num)` from packed RGB triples.
    pub fn set(&mut self, colors: &[u8], start: usize, num: usize) {
        let slots = self.entries.iter_mut().skip(start).take(num);
        for (slot, c) in slots.zip(colors.chunks_exact(3)) {
            *slot = Rgb::new(c[0], c[1], c[2]);
        }
    }

    /// Copy entries `[start, start + num)` out as packed RGB triples.
    pub fn grab(&self, colors: &mut [u8], start: usize, num: usize) {
        let slots = self.entries.iter().skip(start).take(num);
        for (c, out) in slots.zip(colors.chunks_exact_mut(3)) {
            out.copy_from_slice(&[c.r, c.g, c.b]);
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(Self::FULL)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pixel/palette.rs"]
mod tests;
