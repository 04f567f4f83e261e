//! Pixel encodings and colour tables.

/// Pixel format descriptors.
pub mod format;
/// Colour lookup tables.
pub mod palette;
