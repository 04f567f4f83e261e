/// Convenience result type used across retrosurf.
pub type SurfResult<T> = Result<T, SurfError>;

/// Error taxonomy for the fallible edges of the compositor.
///
/// Engine-facing surface, palette and cursor operations never return errors; these variants
/// cover backend construction, pixel format descriptors, configuration and export.
#[derive(thiserror::Error, Debug)]
pub enum SurfError {
    /// Invalid caller-provided options or geometry.
    #[error("validation error: {0}")]
    Validation(String),

    /// A pixel format descriptor that cannot describe a real encoding.
    #[error("pixel format error: {0}")]
    Format(String),

    /// Errors when serializing or deserializing configuration and scripts.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SurfError {
    /// Build a [`SurfError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SurfError::Format`] value.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Build a [`SurfError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
