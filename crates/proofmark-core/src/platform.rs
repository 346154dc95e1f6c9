//! Platform abstraction for caret handling.
//!
//! Host-page DOM failures are never fatal: the browser layer returns
//! `Result<_, PlatformError>` from its helpers and callers log and degrade.

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Capture and restore a plain-text caret offset on some rendered surface.
///
/// The browser implementation walks text nodes with the Selection API.
/// Offsets count UTF-16 units of the surface's visible text.
pub trait CaretPlatform {
    /// Handle to the text-bearing surface (an element in the browser).
    type Surface;

    /// Offset of the selection's end boundary, or 0 when the selection is
    /// not inside `surface`.
    fn capture_offset(&self, surface: &Self::Surface) -> usize;

    /// Place a collapsed caret at `offset`, clamped to the content length.
    fn restore_offset(&self, surface: &Self::Surface, offset: usize) -> Result<(), PlatformError>;
}
